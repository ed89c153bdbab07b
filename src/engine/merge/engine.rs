use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::engine::errors::MergeConfigError;
use crate::engine::merge::cursor::ShardCursor;
use crate::engine::merge::grouping::GroupingMergedResult;
use crate::engine::merge::merged_result::MergedResultKind;
use crate::engine::merge::ordered::OrderedMergedResult;
use crate::engine::merge::ordering::OrderingKey;
use crate::engine::merge::pagination::{PaginationDecorator, PaginationWindow};
use crate::engine::merge::sequential::SequentialMergedResult;
use crate::engine::merge::sorted::SortedMergedResult;
use crate::engine::merge::statement::{Dialect, StatementDescriptor};
use crate::shared::config::model::MergeConfig;

/// Builds the decorator chain Base → (Grouping) → (Sorted) → (Pagination) for one
/// statement. Holds no iteration state.
#[derive(Debug, Clone)]
pub struct MergeEngine {
    default_dialect: Dialect,
    sort_buffer_limit: Option<usize>,
}

impl MergeEngine {
    pub fn new(default_dialect: Dialect) -> Self {
        Self {
            default_dialect,
            sort_buffer_limit: None,
        }
    }

    pub fn from_config(config: &MergeConfig) -> Result<Self, MergeConfigError> {
        let dialect = config.default_dialect.parse::<Dialect>()?;
        Ok(Self::new(dialect).with_sort_buffer_limit(config.sort_buffer_limit))
    }

    pub fn with_sort_buffer_limit(mut self, limit: Option<usize>) -> Self {
        self.sort_buffer_limit = limit;
        self
    }

    pub fn merge(
        &self,
        cursors: Vec<Box<dyn ShardCursor>>,
        statement: &StatementDescriptor,
    ) -> Result<MergedResultKind, MergeConfigError> {
        if cursors.is_empty() {
            return Err(MergeConfigError::NoShardCursors);
        }
        let dialect = statement.dialect.unwrap_or(self.default_dialect);

        Self::check_columns(statement)?;
        let window = statement
            .pagination
            .as_ref()
            .map(|descriptor| PaginationWindow::from_descriptor(descriptor, dialect))
            .transpose()?;

        let order_by = OrderingKey::resolve(&statement.order_by, dialect);
        let shard_count = cursors.len();

        let mut merged = if statement.needs_grouping() {
            self.build_grouping(cursors, statement, dialect, &order_by)?
        } else {
            self.build_plain(cursors, statement, dialect, &order_by)
        };

        if let Some(window) = window {
            merged = MergedResultKind::Pagination(Box::new(PaginationDecorator::new(merged, window)));
        }

        info!(
            target: "shard_merge::engine",
            shards = shard_count,
            dialect = %dialect,
            chain = ?merged.describe(),
            "Built merge pipeline"
        );
        Ok(merged)
    }

    /// Plain selection: k-way merge when the shards already deliver ORDER BY order,
    /// otherwise concatenate and sort in memory.
    fn build_plain(
        &self,
        cursors: Vec<Box<dyn ShardCursor>>,
        statement: &StatementDescriptor,
        dialect: Dialect,
        order_by: &OrderingKey,
    ) -> MergedResultKind {
        if order_by.is_empty() {
            return MergedResultKind::Sequential(SequentialMergedResult::new(cursors));
        }
        let shard_ordering = match &statement.shard_ordering {
            Some(items) => OrderingKey::resolve(items, dialect),
            None => order_by.clone(),
        };
        if shard_ordering.starts_with(order_by) {
            MergedResultKind::Ordered(OrderedMergedResult::new(cursors, shard_ordering))
        } else {
            debug!(
                target: "shard_merge::engine",
                "Shard ordering does not cover ORDER BY, sorting in memory"
            );
            let base = MergedResultKind::Sequential(SequentialMergedResult::new(cursors));
            MergedResultKind::Sorted(Box::new(SortedMergedResult::new(
                base,
                order_by.clone(),
                self.sort_buffer_limit,
            )))
        }
    }

    fn build_grouping(
        &self,
        cursors: Vec<Box<dyn ShardCursor>>,
        statement: &StatementDescriptor,
        dialect: Dialect,
        order_by: &OrderingKey,
    ) -> Result<MergedResultKind, MergeConfigError> {
        let column_count = match statement.projections.len() {
            0 => cursors.first().map(|c| c.column_count()).unwrap_or(0),
            n => n,
        };
        let group_key = OrderingKey::resolve(&statement.group_items(column_count), dialect);
        let key_columns: Vec<usize> = group_key.items().iter().map(|i| i.column_index).collect();

        let (base, stream_order) = if group_key.is_empty() {
            // aggregates without GROUP BY: a single group, any order will do
            let base = MergedResultKind::Sequential(SequentialMergedResult::new(cursors));
            (base, OrderingKey::default())
        } else {
            let shard_ordering = match &statement.shard_ordering {
                Some(items) => OrderingKey::resolve(items, dialect),
                None => group_key.clone(),
            };
            if !Self::covers_group_key(&shard_ordering, &key_columns) {
                return Err(MergeConfigError::GroupingWithoutOrdering);
            }
            let stream_order = shard_ordering.truncated(key_columns.len());
            let base = MergedResultKind::Ordered(OrderedMergedResult::new(cursors, shard_ordering));
            (base, stream_order)
        };

        let mut merged = MergedResultKind::Grouping(Box::new(GroupingMergedResult::new(
            base,
            key_columns,
            statement.projections.clone(),
        )));

        if !order_by.is_empty() && !stream_order.starts_with(order_by) {
            merged = MergedResultKind::Sorted(Box::new(SortedMergedResult::new(
                merged,
                order_by.clone(),
                self.sort_buffer_limit,
            )));
        }
        Ok(merged)
    }

    /// The leading items of the shard ordering must be exactly the group key columns,
    /// in any order, for equal keys to arrive adjacently.
    fn covers_group_key(shard_ordering: &OrderingKey, key_columns: &[usize]) -> bool {
        if shard_ordering.len() < key_columns.len() {
            return false;
        }
        let leading: BTreeSet<usize> = shard_ordering
            .items()
            .iter()
            .take(key_columns.len())
            .map(|item| item.column_index)
            .collect();
        let wanted: BTreeSet<usize> = key_columns.iter().copied().collect();
        leading == wanted
    }

    fn check_columns(statement: &StatementDescriptor) -> Result<(), MergeConfigError> {
        let count = statement.projections.len();
        if count == 0 {
            return Ok(());
        }
        match statement
            .referenced_columns()
            .into_iter()
            .find(|&index| index >= count)
        {
            Some(index) => Err(MergeConfigError::ColumnOutOfProjection { index, count }),
            None => Ok(()),
        }
    }
}
