use crate::integration::scenarios::TestScenario;
use shard_merge::engine::merge::{Dialect, MergeEngine, MergedResult};
use tracing::{debug, error, info};

/// Renders the merged rows as JSON lines, or the error that stopped the merge.
fn merged_output(scenario: &TestScenario) -> String {
    let dialect = match scenario.dialect.as_deref().unwrap_or("mysql").parse::<Dialect>() {
        Ok(dialect) => dialect,
        Err(err) => return format!("config error: {}", err),
    };
    let engine = MergeEngine::new(dialect).with_sort_buffer_limit(scenario.sort_buffer_limit);

    let mut merged = match engine.merge(scenario.scenario.cursors(), &scenario.scenario.statement) {
        Ok(merged) => merged,
        Err(err) => return format!("config error: {}", err),
    };

    let mut lines = Vec::new();
    loop {
        match merged.advance() {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => {
                lines.push(format!("merge error: {}", err));
                break;
            }
        }
        match merged.current_row() {
            Ok(row) => lines.push(serde_json::to_string(&row).expect("row serializes")),
            Err(err) => {
                lines.push(format!("merge error: {}", err));
                break;
            }
        }
    }
    lines.join("\n")
}

/// Returns `true` when every matcher accepts the scenario's output.
pub fn run_scenario(scenario: &TestScenario) -> bool {
    info!("▶ Running scenario: {}", scenario.name);
    let output = merged_output(scenario);
    debug!("Output of {}:\n{}", scenario.name, output);

    let mut passed = true;
    for (i, matcher) in scenario.matchers.iter().enumerate() {
        if !matcher.matches(&output) {
            error!(
                "❌ Scenario '{}' matcher #{} failed: {:?}\nOutput:\n{}",
                scenario.name, i, matcher, output
            );
            passed = false;
        }
    }
    if passed {
        info!("✅ Scenario '{}' passed", scenario.name);
    }
    passed
}
