pub use super::factories::{ShardCursorFactory, StatementFactory};

pub struct Factory;

impl Factory {
    pub fn shard_cursor() -> ShardCursorFactory {
        ShardCursorFactory::new()
    }

    pub fn statement() -> StatementFactory {
        StatementFactory::new()
    }
}
