use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::engine::errors::ShardCursorError;
use crate::engine::merge::cursor::ShardCursor;
use crate::engine::merge::statement::Dialect;
use crate::engine::types::ScalarValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

/// Where NULLs land in the merged order, independent of direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullOrdering {
    First,
    Last,
}

/// ORDER BY / GROUP BY item as described by the statement. `nulls` may be left for
/// the dialect to decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderByItem {
    pub column_index: usize,
    #[serde(default)]
    pub direction: OrderDirection,
    #[serde(default)]
    pub nulls: Option<NullOrdering>,
}

impl OrderByItem {
    pub fn asc(column_index: usize) -> Self {
        Self {
            column_index,
            direction: OrderDirection::Asc,
            nulls: None,
        }
    }

    pub fn desc(column_index: usize) -> Self {
        Self {
            column_index,
            direction: OrderDirection::Desc,
            nulls: None,
        }
    }

    pub fn with_nulls(mut self, nulls: NullOrdering) -> Self {
        self.nulls = Some(nulls);
        self
    }

    pub fn resolve(&self, dialect: Dialect) -> OrderItem {
        OrderItem {
            column_index: self.column_index,
            direction: self.direction,
            nulls: self
                .nulls
                .unwrap_or_else(|| dialect.default_null_ordering(self.direction)),
        }
    }
}

/// Fully resolved ordering item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderItem {
    pub column_index: usize,
    pub direction: OrderDirection,
    pub nulls: NullOrdering,
}

impl OrderItem {
    pub fn compare(&self, a: &ScalarValue, b: &ScalarValue) -> Ordering {
        match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => match self.nulls {
                NullOrdering::First => Ordering::Less,
                NullOrdering::Last => Ordering::Greater,
            },
            (false, true) => match self.nulls {
                NullOrdering::First => Ordering::Greater,
                NullOrdering::Last => Ordering::Less,
            },
            (false, false) => {
                let ord = a.compare(b);
                match self.direction {
                    OrderDirection::Asc => ord,
                    OrderDirection::Desc => ord.reverse(),
                }
            }
        }
    }
}

/// Ordered list of order items. Key values are extracted once per row and compared
/// item by item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderingKey {
    items: Vec<OrderItem>,
}

impl OrderingKey {
    pub fn new(items: Vec<OrderItem>) -> Self {
        Self { items }
    }

    pub fn resolve(items: &[OrderByItem], dialect: Dialect) -> Self {
        Self::new(items.iter().map(|item| item.resolve(dialect)).collect())
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when a stream ordered by `self` is also ordered by `other`.
    pub fn starts_with(&self, other: &OrderingKey) -> bool {
        self.items.starts_with(&other.items)
    }

    pub fn truncated(&self, len: usize) -> OrderingKey {
        OrderingKey::new(self.items.iter().take(len).copied().collect())
    }

    pub fn extract_from_cursor(
        &self,
        cursor: &dyn ShardCursor,
    ) -> Result<Vec<ScalarValue>, ShardCursorError> {
        self.items
            .iter()
            .map(|item| cursor.value(item.column_index))
            .collect()
    }

    /// Compares two extracted key tuples.
    pub fn compare(&self, a: &[ScalarValue], b: &[ScalarValue]) -> Ordering {
        for ((item, va), vb) in self.items.iter().zip(a).zip(b) {
            let ord = item.compare(va, vb);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Compares two full rows by the key columns.
    pub fn compare_rows(&self, a: &[ScalarValue], b: &[ScalarValue]) -> Ordering {
        for item in &self.items {
            let va = a.get(item.column_index).unwrap_or(&ScalarValue::Null);
            let vb = b.get(item.column_index).unwrap_or(&ScalarValue::Null);
            let ord = item.compare(va, vb);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}
