//! Errors reported by the calendar core.
use chrono::NaiveDate;
use thiserror::Error;

/// Configuration misuse detected while building or reconfiguring a calendar.
///
/// Expected runtime conditions (out-of-range moves, duplicate selections) are
/// not errors; they are reported through the return values of the navigation
/// methods instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CalendarError {
    /// The lower navigation bound lies after the upper one.
    #[error("minimum date {min} is after maximum date {max}")]
    InvalidDateRange {
        /// Configured lower bound.
        min: NaiveDate,
        /// Configured upper bound.
        max: NaiveDate,
    },
    /// A week-day index outside `0..=6` was supplied.
    #[error("start week day index {0} is out of range (expected 0..=6)")]
    InvalidStartWeekDay(u8),
}
