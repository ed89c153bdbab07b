use tracing::debug;

use crate::engine::errors::{MergeConfigError, MergeError};
use crate::engine::merge::merged_result::{CursorState, MergedResult, MergedResultKind};
use crate::engine::merge::statement::{Dialect, PaginationDescriptor};
use crate::engine::types::ScalarValue;

/// Validated row-number window. Row numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaginationWindow {
    /// `(value, inclusive)`
    pub lower: Option<(u64, bool)>,
    pub upper: Option<u64>,
}

impl PaginationWindow {
    /// Validates a descriptor against the dialect. Errors surface before any row is
    /// read.
    pub fn from_descriptor(
        descriptor: &PaginationDescriptor,
        dialect: Dialect,
    ) -> Result<Self, MergeConfigError> {
        if !dialect.supports_pagination(descriptor.style) {
            return Err(MergeConfigError::UnsupportedPagination {
                style: descriptor.style.to_string(),
                dialect: dialect.to_string(),
            });
        }
        if let Some(lower) = descriptor.lower {
            if lower.value < 0 {
                return Err(MergeConfigError::NegativeBound(lower.value));
            }
        }
        if let Some(upper) = descriptor.upper {
            if upper < 0 {
                return Err(MergeConfigError::NegativeBound(upper));
            }
            if let Some(lower) = descriptor.lower {
                if upper < lower.value {
                    return Err(MergeConfigError::InvertedWindow {
                        lower: lower.value,
                        upper,
                    });
                }
            }
        }
        Ok(Self {
            lower: descriptor
                .lower
                .map(|lower| (lower.value as u64, lower.inclusive)),
            upper: descriptor.upper.map(|upper| upper as u64),
        })
    }

    pub fn satisfies_lower(&self, row_number: u64) -> bool {
        match self.lower {
            Some((value, true)) => row_number >= value,
            Some((value, false)) => row_number > value,
            None => true,
        }
    }

    pub fn exceeds_upper(&self, row_number: u64) -> bool {
        self.upper.is_some_and(|upper| row_number > upper)
    }

    pub fn admits(&self, row_number: u64) -> bool {
        self.satisfies_lower(row_number) && !self.exceeds_upper(row_number)
    }
}

/// Applies a row-number window lazily over any merged result.
pub struct PaginationDecorator {
    inner: MergedResultKind,
    window: PaginationWindow,
    row_number: u64,
    state: CursorState,
}

impl PaginationDecorator {
    pub fn new(inner: MergedResultKind, window: PaginationWindow) -> Self {
        Self {
            inner,
            window,
            row_number: 0,
            state: CursorState::Unstarted,
        }
    }

    pub fn inner(&self) -> &MergedResultKind {
        &self.inner
    }

    pub fn row_number(&self) -> u64 {
        self.row_number
    }

    fn next_in_window(&mut self) -> Result<bool, MergeError> {
        loop {
            // Stop before drawing a row that could never be surfaced.
            if self.window.exceeds_upper(self.row_number.saturating_add(1)) {
                debug!(
                    target: "shard_merge::merge::pagination",
                    row_number = self.row_number,
                    "Upper bound reached, not drawing further rows"
                );
                return Ok(false);
            }
            if !self.inner.advance()? {
                return Ok(false);
            }
            self.row_number += 1;
            if self.window.satisfies_lower(self.row_number) {
                return Ok(true);
            }
        }
    }
}

impl MergedResult for PaginationDecorator {
    fn advance(&mut self) -> Result<bool, MergeError> {
        if self.state == CursorState::Exhausted {
            return Ok(false);
        }
        match self.next_in_window() {
            Ok(true) => {
                self.state = CursorState::Positioned;
                Ok(true)
            }
            Ok(false) => {
                self.state = CursorState::Exhausted;
                Ok(false)
            }
            Err(err) => {
                self.state = CursorState::Exhausted;
                Err(err)
            }
        }
    }

    fn value(&self, column_index: usize) -> Result<ScalarValue, MergeError> {
        if self.state != CursorState::Positioned {
            return Err(MergeError::NotPositioned);
        }
        self.inner.value(column_index)
    }

    fn column_count(&self) -> usize {
        self.inner.column_count()
    }

    fn state(&self) -> CursorState {
        self.state
    }

    fn close(&mut self) {
        self.inner.close();
        self.state = CursorState::Exhausted;
    }
}
