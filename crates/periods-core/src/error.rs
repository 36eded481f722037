//! Error types for period resolution.
//!
//! This module defines [`PeriodError`] which covers every way a resolution can
//! fail. All variants describe caller contract violations or defects; none of
//! them are transient.

use thiserror::Error;

/// Errors that can occur while computing periods.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    /// The textual relative period is not one of the known tags.
    #[error("Unknown relative period: {0}")]
    UnknownRelativePeriod(String),

    /// The fiscal year start month is outside 1-12.
    #[error("Invalid calendar configuration: fiscal year start month {0} is outside 1-12")]
    InvalidCalendarConfig(u32),

    /// A period type was requested in a combination that has no boundary function.
    #[error("Unsupported period type: {0}")]
    UnsupportedPeriodType(String),

    /// A period identifier could not be parsed, or is not in canonical form.
    #[error("Invalid period identifier: {0}")]
    InvalidPeriodId(String),

    /// Date arithmetic left the representable calendar range.
    #[error("Date out of range: {0}")]
    DateOutOfRange(String),
}

impl PeriodError {
    /// Returns true if the error was caused by caller input rather than a defect.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        !matches!(self, Self::UnsupportedPeriodType(_))
    }
}

/// Result type alias using [`PeriodError`].
pub type Result<T> = std::result::Result<T, PeriodError>;
