//! Concrete periods.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, TimeDelta};
use serde::Serialize;

use crate::{
    error::{PeriodError, Result},
    period_type::PeriodType,
};

/// One concrete span of days with a type and a canonical identifier.
///
/// Periods are only produced by [`PeriodType::containing`] (directly or through
/// parsing), so `start_date <= end_date` always holds and the identifier always
/// matches the span. Periods order by start date.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Period {
    period_type: PeriodType,
    start_date: NaiveDate,
    end_date: NaiveDate,
    iso_id: String,
}

impl Period {
    pub(crate) const fn new(
        period_type: PeriodType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        iso_id: String,
    ) -> Self {
        Self {
            period_type,
            start_date,
            end_date,
            iso_id,
        }
    }

    /// Parses a canonical period identifier such as `2024Q1` or `2023April`.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::InvalidPeriodId`] if the identifier is not canonical.
    pub fn parse(iso_id: &str) -> Result<Self> {
        PeriodType::parse_iso_id(iso_id)
    }

    /// Returns the type of this period.
    #[must_use]
    pub const fn period_type(&self) -> PeriodType {
        self.period_type
    }

    /// Returns the first day of the period.
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Returns the last day of the period, inclusive.
    #[must_use]
    pub const fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Returns the canonical identifier.
    #[must_use]
    pub fn iso_id(&self) -> &str {
        &self.iso_id
    }

    /// Consumes the period and returns its identifier.
    #[must_use]
    pub fn into_iso_id(self) -> String {
        self.iso_id
    }

    /// Returns true if `date` falls inside the period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Returns the number of days in the period.
    #[must_use]
    pub fn days(&self) -> i64 {
        self.end_date.signed_duration_since(self.start_date).num_days() + 1
    }

    /// Returns the middle day of the period, rounding down.
    #[must_use]
    pub fn midpoint(&self) -> NaiveDate {
        let half = self.end_date.signed_duration_since(self.start_date).num_days() / 2;
        self.start_date + TimeDelta::days(half)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iso_id)
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start_date
            .cmp(&other.start_date)
            .then_with(|| self.end_date.cmp(&other.end_date))
            .then_with(|| self.iso_id.cmp(&other.iso_id))
    }
}
