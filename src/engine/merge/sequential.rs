use tracing::debug;

use crate::engine::errors::MergeError;
use crate::engine::merge::cursor::ShardCursor;
use crate::engine::merge::merged_result::{CursorState, MergedResult};
use crate::engine::types::ScalarValue;

/// Concatenates shard cursors in registration order: cursor 0 is drained fully,
/// then cursor 1, and so on.
pub struct SequentialMergedResult {
    cursors: Vec<Box<dyn ShardCursor>>,
    active: usize,
    state: CursorState,
}

impl SequentialMergedResult {
    pub fn new(cursors: Vec<Box<dyn ShardCursor>>) -> Self {
        Self {
            cursors,
            active: 0,
            state: CursorState::Unstarted,
        }
    }
}

impl MergedResult for SequentialMergedResult {
    fn advance(&mut self) -> Result<bool, MergeError> {
        if self.state == CursorState::Exhausted {
            return Ok(false);
        }
        while let Some(cursor) = self.cursors.get_mut(self.active) {
            match cursor.advance() {
                Ok(true) => {
                    self.state = CursorState::Positioned;
                    return Ok(true);
                }
                Ok(false) => {
                    debug!(
                        target: "shard_merge::merge::sequential",
                        shard = self.active,
                        "Shard cursor exhausted, switching to next"
                    );
                    self.active += 1;
                }
                Err(err) => {
                    self.state = CursorState::Exhausted;
                    return Err(MergeError::shard(self.active, err));
                }
            }
        }
        self.state = CursorState::Exhausted;
        Ok(false)
    }

    fn value(&self, column_index: usize) -> Result<ScalarValue, MergeError> {
        if self.state != CursorState::Positioned {
            return Err(MergeError::NotPositioned);
        }
        let cursor = self
            .cursors
            .get(self.active)
            .ok_or(MergeError::NotPositioned)?;
        cursor
            .value(column_index)
            .map_err(|e| MergeError::shard(self.active, e))
    }

    fn column_count(&self) -> usize {
        self.cursors.first().map(|c| c.column_count()).unwrap_or(0)
    }

    fn state(&self) -> CursorState {
        self.state
    }

    fn close(&mut self) {
        for cursor in &mut self.cursors {
            cursor.close();
        }
        self.state = CursorState::Exhausted;
    }
}
