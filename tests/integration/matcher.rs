use regex::Regex;
use serde::Deserialize;
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    /// Whole output, one JSON row per line
    Eq,
    Include,
    NotInclude,
    IncludeAll,
    /// Number of output lines
    RowCount,
    Regex,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MatcherValue {
    Count(usize),
    Single(String),
    Multiple(Vec<String>),
}

#[derive(Debug, Deserialize)]
pub struct Matcher {
    pub kind: MatcherKind,
    pub value: MatcherValue,
}

impl Matcher {
    pub fn matches(&self, actual: &str) -> bool {
        let result = match (&self.kind, &self.value) {
            (MatcherKind::Eq, MatcherValue::Single(s)) => actual.trim() == s.trim(),
            (MatcherKind::Eq, MatcherValue::Multiple(lines)) => {
                actual.lines().map(str::trim).eq(lines.iter().map(|l| l.trim()))
            }
            (MatcherKind::Include, MatcherValue::Single(s)) => actual.contains(s.as_str()),
            (MatcherKind::NotInclude, MatcherValue::Single(s)) => !actual.contains(s.as_str()),
            (MatcherKind::IncludeAll, MatcherValue::Multiple(fragments)) => fragments
                .iter()
                .all(|fragment| actual.contains(fragment.as_str())),
            (MatcherKind::RowCount, MatcherValue::Count(count)) => {
                actual.lines().filter(|l| !l.trim().is_empty()).count() == *count
            }
            (MatcherKind::Regex, MatcherValue::Single(pattern)) => match Regex::new(pattern) {
                Ok(re) => re.is_match(actual),
                Err(e) => {
                    error!("Invalid regex '{}': {}", pattern, e);
                    false
                }
            },
            _ => {
                error!("Invalid matcher kind/value combination: {:?}", self);
                false
            }
        };
        debug!("{:?} match result: {}", self.kind, result);
        result
    }
}
