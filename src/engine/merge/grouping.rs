use tracing::trace;

use crate::engine::errors::MergeError;
use crate::engine::merge::aggregate::AggregateState;
use crate::engine::merge::merged_result::{CursorState, MergedResult, MergedResultKind, row_value};
use crate::engine::merge::statement::Projection;
use crate::engine::types::ScalarValue;

/// Coalesces adjacent rows that share a group key into one row, folding the
/// aggregate columns as it goes.
///
/// The wrapped stream must already be ordered by the group key. Non-aggregate
/// columns are taken from the first row of each group.
pub struct GroupingMergedResult {
    inner: MergedResultKind,
    key_columns: Vec<usize>,
    projections: Vec<Projection>,
    /// First row of the next group, already drawn from `inner`.
    lookahead: Option<Vec<ScalarValue>>,
    source_exhausted: bool,
    current: Option<Vec<ScalarValue>>,
    state: CursorState,
}

impl GroupingMergedResult {
    pub fn new(inner: MergedResultKind, key_columns: Vec<usize>, projections: Vec<Projection>) -> Self {
        Self {
            inner,
            key_columns,
            projections,
            lookahead: None,
            source_exhausted: false,
            current: None,
            state: CursorState::Unstarted,
        }
    }

    pub fn inner(&self) -> &MergedResultKind {
        &self.inner
    }

    fn pull(&mut self) -> Result<Option<Vec<ScalarValue>>, MergeError> {
        if self.source_exhausted {
            return Ok(None);
        }
        if self.inner.advance()? {
            Ok(Some(self.inner.current_row()?))
        } else {
            self.source_exhausted = true;
            Ok(None)
        }
    }

    fn same_group(&self, a: &[ScalarValue], b: &[ScalarValue]) -> bool {
        self.key_columns.iter().all(|&idx| match (a.get(idx), b.get(idx)) {
            (Some(va), Some(vb)) => va.group_eq(vb),
            (None, None) => true,
            _ => false,
        })
    }

    fn fold_row(
        &self,
        states: &mut [Option<AggregateState>],
        row: &[ScalarValue],
    ) -> Result<(), MergeError> {
        for (column, state) in states.iter_mut().enumerate() {
            if let Some(state) = state {
                state
                    .fold(row, column)
                    .map_err(|reason| MergeError::Aggregate { column, reason })?;
            }
        }
        Ok(())
    }

    fn next_group(&mut self) -> Result<Option<Vec<ScalarValue>>, MergeError> {
        let first = match self.lookahead.take() {
            Some(row) => row,
            None => match self.pull()? {
                Some(row) => row,
                None => return Ok(None),
            },
        };

        let mut states: Vec<Option<AggregateState>> = self
            .projections
            .iter()
            .map(AggregateState::for_projection)
            .collect();
        self.fold_row(&mut states, &first)?;

        let mut folded = 1usize;
        while let Some(row) = self.pull()? {
            if self.same_group(&first, &row) {
                self.fold_row(&mut states, &row)?;
                folded += 1;
            } else {
                self.lookahead = Some(row);
                break;
            }
        }

        trace!(
            target: "shard_merge::merge::grouping",
            rows = folded,
            "Group complete"
        );

        let mut output = first;
        for (column, state) in states.iter().enumerate() {
            if let (Some(state), Some(slot)) = (state, output.get_mut(column)) {
                *slot = state.finalize();
            }
        }
        Ok(Some(output))
    }
}

impl MergedResult for GroupingMergedResult {
    fn advance(&mut self) -> Result<bool, MergeError> {
        if self.state == CursorState::Exhausted {
            return Ok(false);
        }
        match self.next_group() {
            Ok(Some(row)) => {
                self.current = Some(row);
                self.state = CursorState::Positioned;
                Ok(true)
            }
            Ok(None) => {
                self.current = None;
                self.state = CursorState::Exhausted;
                Ok(false)
            }
            Err(err) => {
                self.current = None;
                self.state = CursorState::Exhausted;
                Err(err)
            }
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
        self.lookahead = None;
        self.current = None;
        self.state = CursorState::Exhausted;
    }
}
