use std::io;
use thiserror::Error;
use tracing::{debug, error};

/// Errors raised by a single shard cursor.
#[derive(Debug, Error)]
pub enum ShardCursorError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Shard fault: {0}")]
    Fault(String),

    #[error("Column index {index} out of range ({count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },

    #[error("Cursor is not positioned on a row")]
    NotPositioned,
}

/// Errors that can occur while iterating a merged result.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Shard {shard} failed: {source}")]
    Shard {
        shard: usize,
        #[source]
        source: ShardCursorError,
    },

    #[error("Merged result is not positioned on a row")]
    NotPositioned,

    #[error("Column index {index} out of range ({count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },

    #[error("Aggregate fold failed on column {column}: {reason}")]
    Aggregate { column: usize, reason: String },

    #[error("Sort buffer limit of {limit} rows exceeded")]
    SortBufferExceeded { limit: usize },
}

impl MergeError {
    pub fn shard(shard: usize, source: ShardCursorError) -> Self {
        MergeError::Shard { shard, source }
    }

    pub fn log_error(&self) {
        match self {
            MergeError::Shard { shard, source } => {
                error!(target: "shard_merge::merge", "Shard {} failed during merge: {}", shard, source);
                debug!(target: "shard_merge::merge", "Shard failure details: {:?}", source);
            }
            MergeError::NotPositioned => {
                error!(target: "shard_merge::merge", "Merged result read while not positioned");
            }
            MergeError::ColumnOutOfRange { index, count } => {
                error!(target: "shard_merge::merge", "Column {} requested from a {}-column row", index, count);
            }
            MergeError::Aggregate { column, reason } => {
                error!(target: "shard_merge::merge", "Aggregate fold failed on column {}: {}", column, reason);
                debug!(target: "shard_merge::merge", "Aggregate error details: column={} reason={}", column, reason);
            }
            MergeError::SortBufferExceeded { limit } => {
                error!(target: "shard_merge::merge", "Sort buffer limit exceeded: {}", limit);
                debug!(target: "shard_merge::merge", "Raise merge.sort_buffer_limit or push ORDER BY down to shards");
            }
        }
    }
}

/// Configuration errors detected while building the merge pipeline, before any row
/// is read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeConfigError {
    #[error("No shard cursors supplied")]
    NoShardCursors,

    #[error("Pagination style {style} is not supported for dialect {dialect}")]
    UnsupportedPagination { style: String, dialect: String },

    #[error("Negative pagination bound: {0}")]
    NegativeBound(i64),

    #[error("Upper bound {upper} is below lower bound {lower}")]
    InvertedWindow { lower: i64, upper: i64 },

    #[error("Grouping requested without an ordering that makes group keys adjacent")]
    GroupingWithoutOrdering,

    #[error("Column index {index} is outside the projection ({count} columns)")]
    ColumnOutOfProjection { index: usize, count: usize },

    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),
}
