use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::engine::merge::{MemoryShardCursor, ShardCursor, StatementDescriptor};
use crate::engine::types::ScalarValue;

/// A statement plus the rows each shard returned for it, as read from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub statement: StatementDescriptor,
    pub shards: Vec<Vec<Vec<ScalarValue>>>,
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing scenario {}", path.display()))
    }

    /// One in-memory cursor per shard, in registration order.
    pub fn cursors(&self) -> Vec<Box<dyn ShardCursor>> {
        self.shards
            .iter()
            .map(|rows| Box::new(MemoryShardCursor::from_rows(rows.clone())) as Box<dyn ShardCursor>)
            .collect()
    }
}
