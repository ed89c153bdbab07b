use crate::engine::errors::MergeError;
use crate::engine::merge::grouping::GroupingMergedResult;
use crate::engine::merge::ordered::OrderedMergedResult;
use crate::engine::merge::pagination::PaginationDecorator;
use crate::engine::merge::sequential::SequentialMergedResult;
use crate::engine::merge::sorted::SortedMergedResult;
use crate::engine::types::ScalarValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Unstarted,
    Positioned,
    Exhausted,
}

/// Pull contract shared by every stage of the merge pipeline. It mirrors
/// `ShardCursor`, so a consumer cannot tell a merged result from a single shard.
pub trait MergedResult {
    /// Moves to the next row. Returns `Ok(false)` once exhausted, and keeps doing so.
    fn advance(&mut self) -> Result<bool, MergeError>;

    /// Reads a column of the current row. Only valid while positioned.
    fn value(&self, column_index: usize) -> Result<ScalarValue, MergeError>;

    fn column_count(&self) -> usize;

    fn state(&self) -> CursorState;

    /// Closes every shard cursor reachable from this stage.
    fn close(&mut self);

    fn current_row(&self) -> Result<Vec<ScalarValue>, MergeError> {
        (0..self.column_count()).map(|idx| self.value(idx)).collect()
    }
}

/// The closed set of pipeline stages.
pub enum MergedResultKind {
    Sequential(SequentialMergedResult),
    Ordered(OrderedMergedResult),
    Grouping(Box<GroupingMergedResult>),
    Sorted(Box<SortedMergedResult>),
    Pagination(Box<PaginationDecorator>),
}

impl MergedResultKind {
    pub fn stage_name(&self) -> &'static str {
        match self {
            MergedResultKind::Sequential(_) => "sequential",
            MergedResultKind::Ordered(_) => "ordered",
            MergedResultKind::Grouping(_) => "grouping",
            MergedResultKind::Sorted(_) => "sorted",
            MergedResultKind::Pagination(_) => "pagination",
        }
    }

    /// Stage names from the outermost decorator down to the base.
    pub fn describe(&self) -> Vec<&'static str> {
        let mut stages = vec![self.stage_name()];
        match self {
            MergedResultKind::Sequential(_) | MergedResultKind::Ordered(_) => {}
            MergedResultKind::Grouping(stage) => stages.extend(stage.inner().describe()),
            MergedResultKind::Sorted(stage) => stages.extend(stage.inner().describe()),
            MergedResultKind::Pagination(stage) => stages.extend(stage.inner().describe()),
        }
        stages
    }

    /// Drains the remaining rows. Intended for callers that need the whole result.
    pub fn collect_rows(&mut self) -> Result<Vec<Vec<ScalarValue>>, MergeError> {
        let mut rows = Vec::new();
        while self.advance()? {
            rows.push(self.current_row()?);
        }
        Ok(rows)
    }
}

impl MergedResult for MergedResultKind {
    fn advance(&mut self) -> Result<bool, MergeError> {
        match self {
            MergedResultKind::Sequential(m) => m.advance(),
            MergedResultKind::Ordered(m) => m.advance(),
            MergedResultKind::Grouping(m) => m.advance(),
            MergedResultKind::Sorted(m) => m.advance(),
            MergedResultKind::Pagination(m) => m.advance(),
        }
    }

    fn value(&self, column_index: usize) -> Result<ScalarValue, MergeError> {
        match self {
            MergedResultKind::Sequential(m) => m.value(column_index),
            MergedResultKind::Ordered(m) => m.value(column_index),
            MergedResultKind::Grouping(m) => m.value(column_index),
            MergedResultKind::Sorted(m) => m.value(column_index),
            MergedResultKind::Pagination(m) => m.value(column_index),
        }
    }

    fn column_count(&self) -> usize {
        match self {
            MergedResultKind::Sequential(m) => m.column_count(),
            MergedResultKind::Ordered(m) => m.column_count(),
            MergedResultKind::Grouping(m) => m.column_count(),
            MergedResultKind::Sorted(m) => m.column_count(),
            MergedResultKind::Pagination(m) => m.column_count(),
        }
    }

    fn state(&self) -> CursorState {
        match self {
            MergedResultKind::Sequential(m) => m.state(),
            MergedResultKind::Ordered(m) => m.state(),
            MergedResultKind::Grouping(m) => m.state(),
            MergedResultKind::Sorted(m) => m.state(),
            MergedResultKind::Pagination(m) => m.state(),
        }
    }

    fn close(&mut self) {
        match self {
            MergedResultKind::Sequential(m) => m.close(),
            MergedResultKind::Ordered(m) => m.close(),
            MergedResultKind::Grouping(m) => m.close(),
            MergedResultKind::Sorted(m) => m.close(),
            MergedResultKind::Pagination(m) => m.close(),
        }
    }
}

/// Reads `column_index` out of a synthesized row.
pub(crate) fn row_value(
    row: Option<&Vec<ScalarValue>>,
    column_index: usize,
) -> Result<ScalarValue, MergeError> {
    let row = row.ok_or(MergeError::NotPositioned)?;
    row.get(column_index)
        .cloned()
        .ok_or(MergeError::ColumnOutOfRange {
            index: column_index,
            count: row.len(),
        })
}
