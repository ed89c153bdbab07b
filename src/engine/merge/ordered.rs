use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use tracing::debug;

use crate::engine::errors::MergeError;
use crate::engine::merge::cursor::ShardCursor;
use crate::engine::merge::merged_result::{CursorState, MergedResult};
use crate::engine::merge::ordering::OrderingKey;
use crate::engine::types::ScalarValue;

/// K-way merge of shard cursors that are each sorted by the same ordering key.
///
/// Every live cursor sits in a min-heap keyed by the ordering values of its current
/// row, so at most one row per shard is buffered. Ties are broken by registration
/// order.
pub struct OrderedMergedResult {
    key: Arc<OrderingKey>,
    unprimed: Vec<Box<dyn ShardCursor>>,
    heap: BinaryHeap<HeapEntry>,
    drained: Vec<Box<dyn ShardCursor>>,
    column_count: usize,
    state: CursorState,
}

struct HeapEntry {
    shard_idx: usize,
    cursor: Box<dyn ShardCursor>,
    order_values: Vec<ScalarValue>,
    key: Arc<OrderingKey>,
}

impl HeapEntry {
    fn new(
        shard_idx: usize,
        cursor: Box<dyn ShardCursor>,
        order_values: Vec<ScalarValue>,
        key: Arc<OrderingKey>,
    ) -> Self {
        Self {
            shard_idx,
            cursor,
            order_values,
            key,
        }
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        let ord = self
            .key
            .compare(&self.order_values, &other.order_values)
            .then_with(|| self.shard_idx.cmp(&other.shard_idx));
        // BinaryHeap is a max-heap
        ord.reverse()
    }
}

impl OrderedMergedResult {
    pub fn new(cursors: Vec<Box<dyn ShardCursor>>, key: OrderingKey) -> Self {
        let column_count = cursors.first().map(|c| c.column_count()).unwrap_or(0);
        let capacity = cursors.len();
        Self {
            key: Arc::new(key),
            unprimed: cursors,
            heap: BinaryHeap::with_capacity(capacity),
            drained: Vec::new(),
            column_count,
            state: CursorState::Unstarted,
        }
    }

    /// Advances one cursor and reads its ordering values. `None` once the shard is drained.
    fn next_values(
        key: &OrderingKey,
        shard_idx: usize,
        cursor: &mut dyn ShardCursor,
    ) -> Result<Option<Vec<ScalarValue>>, MergeError> {
        if !cursor
            .advance()
            .map_err(|e| MergeError::shard(shard_idx, e))?
        {
            return Ok(None);
        }
        key.extract_from_cursor(&*cursor)
            .map(Some)
            .map_err(|e| MergeError::shard(shard_idx, e))
    }

    fn prime(&mut self) -> Result<(), MergeError> {
        let mut pending = std::mem::take(&mut self.unprimed).into_iter().enumerate();
        while let Some((shard_idx, mut cursor)) = pending.next() {
            match Self::next_values(&self.key, shard_idx, cursor.as_mut()) {
                Ok(Some(order_values)) => self.heap.push(HeapEntry::new(
                    shard_idx,
                    cursor,
                    order_values,
                    Arc::clone(&self.key),
                )),
                Ok(None) => self.drained.push(cursor),
                Err(err) => {
                    // keep every cursor reachable for close()
                    self.drained.push(cursor);
                    self.drained.extend(pending.map(|(_, rest)| rest));
                    return Err(err);
                }
            }
        }
        debug!(
            target: "shard_merge::merge::ordered",
            live_shards = self.heap.len(),
            empty_shards = self.drained.len(),
            "Primed ordered merge"
        );
        Ok(())
    }

    fn step(&mut self) -> Result<(), MergeError> {
        let Some(mut top) = self.heap.pop() else {
            return Ok(());
        };
        match Self::next_values(&self.key, top.shard_idx, top.cursor.as_mut()) {
            Ok(Some(order_values)) => {
                top.order_values = order_values;
                self.heap.push(top);
                Ok(())
            }
            Ok(None) => {
                self.drained.push(top.cursor);
                Ok(())
            }
            Err(err) => {
                self.drained.push(top.cursor);
                Err(err)
            }
        }
    }
}

impl MergedResult for OrderedMergedResult {
    fn advance(&mut self) -> Result<bool, MergeError> {
        let stepped = match self.state {
            CursorState::Exhausted => return Ok(false),
            CursorState::Unstarted => self.prime(),
            CursorState::Positioned => self.step(),
        };
        if let Err(err) = stepped {
            self.state = CursorState::Exhausted;
            return Err(err);
        }
        if self.heap.is_empty() {
            self.state = CursorState::Exhausted;
            return Ok(false);
        }
        self.state = CursorState::Positioned;
        Ok(true)
    }

    fn value(&self, column_index: usize) -> Result<ScalarValue, MergeError> {
        if self.state != CursorState::Positioned {
            return Err(MergeError::NotPositioned);
        }
        let top = self.heap.peek().ok_or(MergeError::NotPositioned)?;
        top.cursor
            .value(column_index)
            .map_err(|e| MergeError::shard(top.shard_idx, e))
    }

    fn column_count(&self) -> usize {
        self.column_count
    }

    fn state(&self) -> CursorState {
        self.state
    }

    fn close(&mut self) {
        for cursor in self.unprimed.iter_mut().chain(self.drained.iter_mut()) {
            cursor.close();
        }
        for mut entry in std::mem::take(&mut self.heap).into_vec() {
            entry.cursor.close();
            self.drained.push(entry.cursor);
        }
        self.state = CursorState::Exhausted;
    }
}
