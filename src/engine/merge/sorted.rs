use std::collections::VecDeque;

use tracing::debug;

use crate::engine::errors::MergeError;
use crate::engine::merge::merged_result::{CursorState, MergedResult, MergedResultKind, row_value};
use crate::engine::merge::ordering::OrderingKey;
use crate::engine::types::ScalarValue;

/// Re-sorts an upstream stream whose order differs from the requested ORDER BY.
///
/// The upstream is drained on the first `advance()`; this is the only stage that
/// buffers more than one row per shard.
pub struct SortedMergedResult {
    inner: MergedResultKind,
    key: OrderingKey,
    buffer_limit: Option<usize>,
    rows: VecDeque<Vec<ScalarValue>>,
    current: Option<Vec<ScalarValue>>,
    state: CursorState,
}

impl SortedMergedResult {
    pub fn new(inner: MergedResultKind, key: OrderingKey, buffer_limit: Option<usize>) -> Self {
        Self {
            inner,
            key,
            buffer_limit,
            rows: VecDeque::new(),
            current: None,
            state: CursorState::Unstarted,
        }
    }

    pub fn inner(&self) -> &MergedResultKind {
        &self.inner
    }

    fn fill(&mut self) -> Result<(), MergeError> {
        let mut rows = Vec::new();
        while self.inner.advance()? {
            if let Some(limit) = self.buffer_limit {
                if rows.len() >= limit {
                    return Err(MergeError::SortBufferExceeded { limit });
                }
            }
            rows.push(self.inner.current_row()?);
        }
        // stable: equal keys keep upstream order
        rows.sort_by(|a, b| self.key.compare_rows(a, b));
        debug!(
            target: "shard_merge::merge::sorted",
            rows = rows.len(),
            "Buffered and sorted upstream rows"
        );
        self.rows = rows.into();
        Ok(())
    }
}

impl MergedResult for SortedMergedResult {
    fn advance(&mut self) -> Result<bool, MergeError> {
        match self.state {
            CursorState::Exhausted => return Ok(false),
            CursorState::Unstarted => {
                if let Err(err) = self.fill() {
                    self.state = CursorState::Exhausted;
                    return Err(err);
                }
            }
            CursorState::Positioned => {}
        }
        self.current = self.rows.pop_front();
        if self.current.is_some() {
            self.state = CursorState::Positioned;
            Ok(true)
        } else {
            self.state = CursorState::Exhausted;
            Ok(false)
        }
    }

    fn value(&self, column_index: usize) -> Result<ScalarValue, MergeError> {
        if self.state != CursorState::Positioned {
            return Err(MergeError::NotPositioned);
        }
        row_value(self.current.as_ref(), column_index)
    }

    fn column_count(&self) -> usize {
        self.inner.column_count()
    }

    fn state(&self) -> CursorState {
        self.state
    }

    fn close(&mut self) {
        self.inner.close();
        self.rows.clear();
        self.current = None;
        self.state = CursorState::Exhausted;
    }
}
