pub mod aggregate;
pub mod cursor;
pub mod engine;
pub mod grouping;
pub mod merged_result;
pub mod ordered;
pub mod ordering;
pub mod pagination;
pub mod sequential;
pub mod sorted;
pub mod statement;

#[cfg(test)]
mod ordered_test;

pub use cursor::{MemoryShardCursor, ShardCursor};
pub use engine::MergeEngine;
pub use merged_result::{CursorState, MergedResult, MergedResultKind};
pub use ordering::{NullOrdering, OrderByItem, OrderDirection};
pub use statement::{
    AggregateFunction, Dialect, LowerBound, PaginationDescriptor, PaginationStyle, Projection,
    StatementDescriptor,
};
