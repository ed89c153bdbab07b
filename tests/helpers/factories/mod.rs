pub mod scripted_cursor;
pub mod shard_cursor_factory;
pub mod statement_factory;

pub use scripted_cursor::{CursorProbe, ScriptedShardCursor};
pub use shard_cursor_factory::ShardCursorFactory;
pub use statement_factory::StatementFactory;
