//! Gregorian calendar arithmetic with a configurable fiscal year.
//!
//! Everything here operates on calendar dates ([`NaiveDate`]), never on instants,
//! so there is no time zone or leap second handling. Arithmetic that would leave
//! chrono's representable range fails with [`PeriodError::DateOutOfRange`]
//! instead of panicking.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{PeriodError, Result};

/// Fiscal year start month of the standard calendar.
pub const STANDARD_FISCAL_START: u32 = 1;

/// Calendar convention used for one resolution.
///
/// The only configurable part of the Gregorian calendar is the month the
/// fiscal year starts in. A start month of 1 makes fiscal years coincide with
/// calendar years.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCalendarConfig")]
pub struct CalendarConfig {
    fiscal_year_start_month: u32,
}

#[derive(Deserialize)]
struct RawCalendarConfig {
    #[serde(default = "standard_fiscal_start")]
    fiscal_year_start_month: u32,
}

const fn standard_fiscal_start() -> u32 {
    STANDARD_FISCAL_START
}

impl TryFrom<RawCalendarConfig> for CalendarConfig {
    type Error = PeriodError;

    fn try_from(raw: RawCalendarConfig) -> Result<Self> {
        Self::new(raw.fiscal_year_start_month)
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            fiscal_year_start_month: STANDARD_FISCAL_START,
        }
    }
}

impl CalendarConfig {
    /// Creates a calendar whose fiscal year starts on the 1st of `fiscal_year_start_month`.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::InvalidCalendarConfig`] if the month is outside 1-12.
    pub const fn new(fiscal_year_start_month: u32) -> Result<Self> {
        if fiscal_year_start_month < 1 || fiscal_year_start_month > 12 {
            return Err(PeriodError::InvalidCalendarConfig(fiscal_year_start_month));
        }
        Ok(Self {
            fiscal_year_start_month,
        })
    }

    /// Returns the month (1-12) the fiscal year starts in.
    #[must_use]
    pub const fn fiscal_year_start_month(&self) -> u32 {
        self.fiscal_year_start_month
    }

    /// Returns true if fiscal years coincide with calendar years.
    #[must_use]
    pub const fn is_standard(&self) -> bool {
        self.fiscal_year_start_month == STANDARD_FISCAL_START
    }

    /// Returns the first and last day of the fiscal year containing `date`.
    pub fn fiscal_year_containing(&self, date: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        fiscal_year_containing(date, self.fiscal_year_start_month)
    }
}

/// Adds `n` calendar months to `date`, clamping the day to the end of the target month.
pub fn add_months(date: NaiveDate, n: i32) -> Result<NaiveDate> {
    let months = Months::new(n.unsigned_abs());
    let shifted = if n >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    };
    shifted.ok_or_else(|| PeriodError::DateOutOfRange(format!("{date} {n:+} months")))
}

/// Adds `n` days to `date`.
pub fn add_days(date: NaiveDate, n: i64) -> Result<NaiveDate> {
    let days = Days::new(n.unsigned_abs());
    let shifted = if n >= 0 {
        date.checked_add_days(days)
    } else {
        date.checked_sub_days(days)
    };
    shifted.ok_or_else(|| PeriodError::DateOutOfRange(format!("{date} {n:+} days")))
}

/// Returns the latest date on or before `date` that falls on `week_start`.
pub fn start_of_week(date: NaiveDate, week_start: Weekday) -> Result<NaiveDate> {
    let back = (7 + date.weekday().num_days_from_monday() - week_start.num_days_from_monday()) % 7;
    add_days(date, -i64::from(back))
}

/// Returns the number of days in `month` of `year`.
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let first = first_of_month(year, month)?;
    let next = add_months(first, 1)?;
    let days = next.signed_duration_since(first).num_days();
    u32::try_from(days).map_err(|_| PeriodError::DateOutOfRange(format!("{year}-{month:02}")))
}

/// Returns the first day of `month` in `year`.
pub fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| PeriodError::DateOutOfRange(format!("{year}-{month:02}-01")))
}

/// Returns the first and last day of the fiscal year that begins on the 1st of
/// `start_month` and contains `date`.
///
/// # Errors
///
/// Returns [`PeriodError::InvalidCalendarConfig`] if `start_month` is outside 1-12.
pub fn fiscal_year_containing(date: NaiveDate, start_month: u32) -> Result<(NaiveDate, NaiveDate)> {
    CalendarConfig::new(start_month)?;
    let year = if date.month() >= start_month {
        date.year()
    } else {
        date.year() - 1
    };
    let start = first_of_month(year, start_month)?;
    let end = add_days(add_months(start, 12)?, -1)?;
    Ok((start, end))
}
