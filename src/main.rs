use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use shard_merge::engine::merge::{Dialect, MergeEngine, MergedResult};
use shard_merge::logging;
use shard_merge::scenario::Scenario;
use shard_merge::shared::config::CONFIG;
use tracing::info;

#[derive(Parser)]
#[command(name = "shard_merge")]
#[command(about = "Merge per-shard result rows into one logical result", long_about = None)]
struct Args {
    /// JSON scenario with the statement descriptor and per-shard rows
    #[arg(short, long)]
    scenario: PathBuf,

    /// Dialect to assume when the statement does not carry one
    #[arg(short, long)]
    dialect: Option<String>,

    /// Maximum number of merged rows to print (0 = unlimited)
    #[arg(short, long, default_value = "0")]
    limit_rows: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init()?;

    let scenario = Scenario::load(&args.scenario)?;

    let mut engine = MergeEngine::from_config(&CONFIG.merge)?;
    if let Some(name) = &args.dialect {
        engine = MergeEngine::new(name.parse::<Dialect>()?)
            .with_sort_buffer_limit(CONFIG.merge.sort_buffer_limit);
    }

    let cursors = scenario.cursors();
    info!(target: "shard_merge::cli", shards = cursors.len(), "Loaded scenario");

    let mut merged = engine.merge(cursors, &scenario.statement)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut printed = 0usize;
    loop {
        if args.limit_rows > 0 && printed >= args.limit_rows {
            merged.close();
            break;
        }
        match merged.advance() {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => {
                err.log_error();
                return Err(err.into());
            }
        }
        let row = merged.current_row()?;
        writeln!(out, "{}", serde_json::to_string(&row)?)?;
        printed += 1;
    }

    info!(target: "shard_merge::cli", rows = printed, "Merge complete");
    Ok(())
}
