use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::engine::errors::ShardCursorError;
use crate::engine::merge::cursor::{MemoryShardCursor, ShardCursor};
use crate::engine::types::ScalarValue;

/// Observes a scripted cursor from the outside after it was handed to the pipeline.
#[derive(Clone, Default)]
pub struct CursorProbe {
    advances: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl CursorProbe {
    pub fn advances(&self) -> usize {
        self.advances.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Memory cursor that counts draws, records close, and can fail on a given draw.
pub struct ScriptedShardCursor {
    inner: MemoryShardCursor,
    fail_on_advance: Option<usize>,
    probe: CursorProbe,
}

impl ScriptedShardCursor {
    pub fn new(inner: MemoryShardCursor, fail_on_advance: Option<usize>, probe: CursorProbe) -> Self {
        Self {
            inner,
            fail_on_advance,
            probe,
        }
    }
}

impl ShardCursor for ScriptedShardCursor {
    fn advance(&mut self) -> Result<bool, ShardCursorError> {
        let call = self.probe.advances.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_advance == Some(call) {
            return Err(ShardCursorError::Fault(format!("injected fault on advance {}", call)));
        }
        self.inner.advance()
    }

    fn value(&self, column_index: usize) -> Result<ScalarValue, ShardCursorError> {
        self.inner.value(column_index)
    }

    fn column_count(&self) -> usize {
        self.inner.column_count()
    }

    fn close(&mut self) {
        self.probe.closed.store(true, Ordering::SeqCst);
        self.inner.close();
    }
}
