use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::errors::MergeConfigError;
use crate::engine::merge::ordering::{NullOrdering, OrderByItem, OrderDirection};

/// SQL dialect of the logical database the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MySql,
    MariaDb,
    PostgreSql,
    OpenGauss,
    Sqlite,
    H2,
    Oracle,
    SqlServer,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::MySql => "MySQL",
            Dialect::MariaDb => "MariaDB",
            Dialect::PostgreSql => "PostgreSQL",
            Dialect::OpenGauss => "openGauss",
            Dialect::Sqlite => "SQLite",
            Dialect::H2 => "H2",
            Dialect::Oracle => "Oracle",
            Dialect::SqlServer => "SQLServer",
        }
    }

    /// Pagination syntax the dialect's rewrite produces descriptors for.
    pub fn supports_pagination(&self, style: PaginationStyle) -> bool {
        match self {
            Dialect::Oracle => style == PaginationStyle::RowNumber,
            Dialect::SqlServer => style == PaginationStyle::TopAndRowNumber,
            _ => style == PaginationStyle::LimitOffset,
        }
    }

    pub fn default_null_ordering(&self, direction: OrderDirection) -> NullOrdering {
        let nulls_high = matches!(
            self,
            Dialect::PostgreSql | Dialect::OpenGauss | Dialect::Oracle
        );
        match (nulls_high, direction) {
            (true, OrderDirection::Asc) | (false, OrderDirection::Desc) => NullOrdering::Last,
            (true, OrderDirection::Desc) | (false, OrderDirection::Asc) => NullOrdering::First,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = MergeConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(Dialect::MySql),
            "mariadb" => Ok(Dialect::MariaDb),
            "postgresql" | "postgres" => Ok(Dialect::PostgreSql),
            "opengauss" => Ok(Dialect::OpenGauss),
            "sqlite" => Ok(Dialect::Sqlite),
            "h2" => Ok(Dialect::H2),
            "oracle" => Ok(Dialect::Oracle),
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            _ => Err(MergeConfigError::UnknownDialect(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationStyle {
    /// `LIMIT count OFFSET offset` and friends.
    LimitOffset,
    /// `ROWNUM` predicates (Oracle).
    RowNumber,
    /// `TOP n` over a `ROW_NUMBER() OVER (...)` subquery (SQL Server).
    TopAndRowNumber,
}

impl fmt::Display for PaginationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaginationStyle::LimitOffset => "LIMIT/OFFSET",
            PaginationStyle::RowNumber => "ROWNUM",
            PaginationStyle::TopAndRowNumber => "TOP/ROW_NUMBER",
        })
    }
}

/// Lower row-number bound. `inclusive` keeps the boundary row itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowerBound {
    pub value: i64,
    pub inclusive: bool,
}

/// Pagination as translated by the upstream rewrite. Bounds are absolute row numbers
/// over the merged stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationDescriptor {
    pub style: PaginationStyle,
    #[serde(default)]
    pub lower: Option<LowerBound>,
    #[serde(default)]
    pub upper: Option<i64>,
}

impl PaginationDescriptor {
    /// `LIMIT row_count OFFSET offset`: rows `offset+1 ..= offset+row_count`.
    pub fn limit_offset(offset: Option<i64>, row_count: Option<i64>) -> Self {
        let lower = offset.map(|value| LowerBound {
            value,
            inclusive: false,
        });
        let upper = row_count.map(|count| offset.unwrap_or(0).saturating_add(count));
        Self {
            style: PaginationStyle::LimitOffset,
            lower,
            upper,
        }
    }

    pub fn row_number(lower: Option<LowerBound>, upper: Option<i64>) -> Self {
        Self {
            style: PaginationStyle::RowNumber,
            lower,
            upper,
        }
    }

    pub fn top_and_row_number(lower: Option<LowerBound>, upper: Option<i64>) -> Self {
        Self {
            style: PaginationStyle::TopAndRowNumber,
            lower,
            upper,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateFunction {
    Count,
    Sum,
    Min,
    Max,
    Avg,
}

/// SUM and COUNT columns appended by the rewrite so AVG can be recomputed exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvgDerivedColumns {
    pub sum_index: usize,
    pub count_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub name: String,
    #[serde(default)]
    pub aggregate: Option<AggregateFunction>,
    #[serde(default)]
    pub avg_derived: Option<AvgDerivedColumns>,
}

impl Projection {
    pub fn column(name: &str) -> Self {
        Self {
            name: name.to_string(),
            aggregate: None,
            avg_derived: None,
        }
    }

    pub fn aggregate(name: &str, function: AggregateFunction) -> Self {
        Self {
            name: name.to_string(),
            aggregate: Some(function),
            avg_derived: None,
        }
    }

    pub fn avg_with_derived(name: &str, sum_index: usize, count_index: usize) -> Self {
        Self {
            name: name.to_string(),
            aggregate: Some(AggregateFunction::Avg),
            avg_derived: Some(AvgDerivedColumns {
                sum_index,
                count_index,
            }),
        }
    }
}

/// Everything the merge pipeline needs to know about the bound statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementDescriptor {
    #[serde(default)]
    pub projections: Vec<Projection>,
    #[serde(default)]
    pub order_by: Vec<OrderByItem>,
    #[serde(default)]
    pub group_by: Vec<OrderByItem>,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub pagination: Option<PaginationDescriptor>,
    /// Ordering the per-shard SQL guarantees. `None` means the rewrite contract:
    /// shards are sorted by GROUP BY items when grouping, otherwise by ORDER BY items.
    #[serde(default)]
    pub shard_ordering: Option<Vec<OrderByItem>>,
    #[serde(default)]
    pub dialect: Option<Dialect>,
}

impl StatementDescriptor {
    pub fn has_aggregates(&self) -> bool {
        self.projections.iter().any(|p| p.aggregate.is_some())
    }

    pub fn needs_grouping(&self) -> bool {
        !self.group_by.is_empty() || self.distinct || self.has_aggregates()
    }

    /// Items that define a group. DISTINCT without GROUP BY groups on every column.
    pub fn group_items(&self, column_count: usize) -> Vec<OrderByItem> {
        if self.group_by.is_empty() && self.distinct {
            (0..column_count).map(OrderByItem::asc).collect()
        } else {
            self.group_by.clone()
        }
    }

    /// Every column index the descriptor references, for projection bounds checks.
    pub fn referenced_columns(&self) -> Vec<usize> {
        let mut columns: Vec<usize> = self
            .order_by
            .iter()
            .chain(self.group_by.iter())
            .chain(self.shard_ordering.iter().flatten())
            .map(|item| item.column_index)
            .collect();
        for projection in &self.projections {
            if let Some(derived) = projection.avg_derived {
                columns.push(derived.sum_index);
                columns.push(derived.count_index);
            }
        }
        columns
    }
}
