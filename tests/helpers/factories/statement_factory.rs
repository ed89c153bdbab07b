use crate::engine::merge::ordering::OrderByItem;
use crate::engine::merge::statement::{
    Dialect, PaginationDescriptor, Projection, StatementDescriptor,
};

pub struct StatementFactory {
    statement: StatementDescriptor,
}

impl StatementFactory {
    pub fn new() -> Self {
        Self {
            statement: StatementDescriptor::default(),
        }
    }

    pub fn with_columns(mut self, names: &[&str]) -> Self {
        self.statement.projections = names.iter().map(|n| Projection::column(n)).collect();
        self
    }

    pub fn with_projections(mut self, projections: Vec<Projection>) -> Self {
        self.statement.projections = projections;
        self
    }

    pub fn with_order_by(mut self, items: Vec<OrderByItem>) -> Self {
        self.statement.order_by = items;
        self
    }

    pub fn with_group_by(mut self, items: Vec<OrderByItem>) -> Self {
        self.statement.group_by = items;
        self
    }

    pub fn with_shard_ordering(mut self, items: Vec<OrderByItem>) -> Self {
        self.statement.shard_ordering = Some(items);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.statement.distinct = true;
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationDescriptor) -> Self {
        self.statement.pagination = Some(pagination);
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.statement.dialect = Some(dialect);
        self
    }

    pub fn create(self) -> StatementDescriptor {
        self.statement
    }
}
