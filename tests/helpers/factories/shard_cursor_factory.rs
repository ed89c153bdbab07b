use crate::engine::merge::cursor::{MemoryShardCursor, ShardCursor};
use crate::engine::types::ScalarValue;
use crate::test_helpers::factories::{CursorProbe, ScriptedShardCursor};

pub struct ShardCursorFactory {
    column_count: Option<usize>,
    rows: Vec<Vec<ScalarValue>>,
    fail_on_advance: Option<usize>,
    probe: CursorProbe,
}

impl ShardCursorFactory {
    pub fn new() -> Self {
        Self {
            column_count: None,
            rows: Vec::new(),
            fail_on_advance: None,
            probe: CursorProbe::default(),
        }
    }

    pub fn with_column_count(mut self, column_count: usize) -> Self {
        self.column_count = Some(column_count);
        self
    }

    pub fn with_rows(mut self, rows: Vec<Vec<ScalarValue>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_int_rows(mut self, rows: &[&[i64]]) -> Self {
        self.rows = rows
            .iter()
            .map(|r| r.iter().map(|v| ScalarValue::Int64(*v)).collect())
            .collect();
        self
    }

    /// Fails on the n-th call to `advance()` (1-based).
    pub fn failing_on_advance(mut self, call: usize) -> Self {
        self.fail_on_advance = Some(call);
        self
    }

    pub fn with_probe(mut self, probe: CursorProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn create(self) -> MemoryShardCursor {
        match self.column_count {
            Some(count) => MemoryShardCursor::new(count, self.rows),
            None => MemoryShardCursor::from_rows(self.rows),
        }
    }

    pub fn boxed(self) -> Box<dyn ShardCursor> {
        let fail_on_advance = self.fail_on_advance;
        let probe = self.probe.clone();
        Box::new(ScriptedShardCursor::new(self.create(), fail_on_advance, probe))
    }

    /// `shards` cursors of `rows_per_shard` single-column rows, numbered globally
    /// from 1 in registration order.
    pub fn uniform(shards: usize, rows_per_shard: usize) -> Vec<Box<dyn ShardCursor>> {
        (0..shards)
            .map(|shard| {
                let rows = (0..rows_per_shard)
                    .map(|row| vec![ScalarValue::Int64((shard * rows_per_shard + row + 1) as i64)])
                    .collect();
                ShardCursorFactory::new().with_rows(rows).boxed()
            })
            .collect()
    }

    pub fn from_int_shards(shards: &[Vec<Vec<i64>>]) -> Vec<Box<dyn ShardCursor>> {
        shards
            .iter()
            .map(|rows| {
                let rows = rows
                    .iter()
                    .map(|r| r.iter().map(|v| ScalarValue::Int64(*v)).collect())
                    .collect();
                ShardCursorFactory::new().with_rows(rows).boxed()
            })
            .collect()
    }
}
