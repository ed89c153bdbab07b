use crate::integration::matcher::Matcher;
use serde::Deserialize;
use shard_merge::scenario::Scenario;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct TestScenario {
    pub name: String,
    #[serde(flatten)]
    pub scenario: Scenario,
    /// Engine default dialect; the statement may still carry its own
    #[serde(default)]
    pub dialect: Option<String>,
    #[serde(default)]
    pub sort_buffer_limit: Option<usize>,
    pub matchers: Vec<Matcher>,
}

pub fn load_scenarios_from_json(path: &str) -> Vec<TestScenario> {
    let content = fs::read_to_string(path).expect("Failed to read scenario file");
    serde_json::from_str(&content).expect("Invalid JSON format")
}
