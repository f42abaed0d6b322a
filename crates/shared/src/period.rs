//! Calendar-date period used to scope settlement queries.
//!
//! Periods are inclusive on both ends and carry no time-of-day component.
//! Settlements are recorded against the exact period they were computed for;
//! two settlements with ranges that merely overlap belong to different
//! reporting buckets.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors constructing a [`Period`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    /// The start date is after the end date.
    #[error("Period start {from} is after end {to}")]
    Inverted {
        /// Requested start date.
        from: NaiveDate,
        /// Requested end date.
        to: NaiveDate,
    },
}

/// An inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    /// First day of the period (inclusive).
    pub from: NaiveDate,
    /// Last day of the period (inclusive).
    pub to: NaiveDate,
}

impl Period {
    /// Creates a period, rejecting inverted ranges.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::Inverted`] if `from > to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, PeriodError> {
        if from > to {
            return Err(PeriodError::Inverted { from, to });
        }
        Ok(Self { from, to })
    }

    /// Returns true if `date` falls within the period, ends inclusive.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}
