use crate::engine::errors::ShardCursorError;
use crate::engine::types::ScalarValue;

/// Pull-based row cursor over one shard's result.
///
/// Columns are readable only after `advance()` returned `true` and until the next
/// call to `advance()`. Implementations are owned by the execution engine and handed
/// to the merge pipeline for the lifetime of one query.
pub trait ShardCursor: Send {
    fn advance(&mut self) -> Result<bool, ShardCursorError>;

    fn value(&self, column_index: usize) -> Result<ScalarValue, ShardCursorError>;

    fn column_count(&self) -> usize;

    /// Releases the underlying shard resources. Called on cancellation.
    fn close(&mut self) {}
}

/// In-memory shard cursor over already materialized rows.
#[derive(Debug, Clone)]
pub struct MemoryShardCursor {
    column_count: usize,
    rows: Vec<Vec<ScalarValue>>,
    position: Option<usize>,
    closed: bool,
}

impl MemoryShardCursor {
    pub fn new(column_count: usize, rows: Vec<Vec<ScalarValue>>) -> Self {
        Self {
            column_count,
            rows,
            position: None,
            closed: false,
        }
    }

    /// Builds a cursor whose width is taken from the first row.
    pub fn from_rows(rows: Vec<Vec<ScalarValue>>) -> Self {
        let column_count = rows.first().map(|r| r.len()).unwrap_or(0);
        Self::new(column_count, rows)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn current(&self) -> Result<&[ScalarValue], ShardCursorError> {
        match self.position {
            Some(idx) if !self.closed && idx < self.rows.len() => Ok(&self.rows[idx]),
            _ => Err(ShardCursorError::NotPositioned),
        }
    }
}

impl ShardCursor for MemoryShardCursor {
    fn advance(&mut self) -> Result<bool, ShardCursorError> {
        if self.closed {
            return Ok(false);
        }
        let next = self.position.map_or(0, |p| p.saturating_add(1));
        if next < self.rows.len() {
            self.position = Some(next);
            Ok(true)
        } else {
            self.position = Some(self.rows.len());
            Ok(false)
        }
    }

    fn value(&self, column_index: usize) -> Result<ScalarValue, ShardCursorError> {
        let row = self.current()?;
        row.get(column_index)
            .cloned()
            .ok_or(ShardCursorError::ColumnOutOfRange {
                index: column_index,
                count: row.len(),
            })
    }

    fn column_count(&self) -> usize {
        self.column_count
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
