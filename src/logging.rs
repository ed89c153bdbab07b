use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::shared::config::CONFIG;
use crate::shared::config::model::LoggingConfig;

const LOG_FILE_PREFIX: &str = "shard_merge.log";

pub fn init() -> anyhow::Result<()> {
    init_with(&CONFIG.logging)
}

/// Console output goes to stderr since stdout carries the merged rows. `RUST_LOG`, when
/// set, replaces the configured console level.
pub fn init_with(cfg: &LoggingConfig) -> anyhow::Result<()> {
    let console_filter = match std::env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::try_new(directives)?,
        Err(_) => EnvFilter::new(cfg.stdout_level.as_str()),
    };
    let file_filter = cfg.file_level.parse::<LevelFilter>()?;

    let console_layer = fmt::layer()
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let file_appender = tracing_appender::rolling::daily(&cfg.log_dir, LOG_FILE_PREFIX);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(file_appender)
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    info!(
        target: "shard_merge::logging",
        log_dir = %cfg.log_dir,
        file_level = %cfg.file_level,
        "Logging initialized"
    );
    Ok(())
}

#[cfg(test)]
pub fn init_for_tests() {
    use std::sync::Once;

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter =
            EnvFilter::from_default_env().add_directive("shard_merge=debug".parse().unwrap());

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}
