//! Period type catalogue.
//!
//! This module defines [`PeriodType`], the closed set of granularities a period
//! can have. Each type knows how to find the period containing a date, how to
//! step to neighbouring periods and how to read its canonical identifiers back.
//!
//! Week based types number weeks by the year of their fourth day, so a week
//! starting on Monday carries its ISO-8601 week number.

use std::fmt;

use chrono::{Datelike, Month, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::{
    calendar::{self, CalendarConfig, add_days, add_months, first_of_month, start_of_week},
    error::{PeriodError, Result},
    period::Period,
};

/// Granularity of a concrete period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodType {
    /// A single day.
    Daily,
    /// Seven days starting on the given weekday.
    Weekly(Weekday),
    /// Two consecutive ISO weeks.
    BiWeekly,
    /// A calendar month.
    Monthly,
    /// Two calendar months, January-February first.
    BiMonthly,
    /// Three calendar months, January-March first.
    Quarterly,
    /// Six calendar months, January-June first.
    SixMonthly,
    /// A calendar year.
    Yearly,
    /// Twelve months starting on the 1st of the given month.
    FinancialYear(Month),
}

impl PeriodType {
    /// ISO weeks, starting on Monday.
    pub const WEEKLY: Self = Self::Weekly(Weekday::Mon);
    /// Weeks starting on Wednesday.
    pub const WEEKLY_WEDNESDAY: Self = Self::Weekly(Weekday::Wed);
    /// Weeks starting on Thursday.
    pub const WEEKLY_THURSDAY: Self = Self::Weekly(Weekday::Thu);
    /// Weeks starting on Saturday.
    pub const WEEKLY_SATURDAY: Self = Self::Weekly(Weekday::Sat);
    /// Weeks starting on Sunday.
    pub const WEEKLY_SUNDAY: Self = Self::Weekly(Weekday::Sun);
    /// Financial years starting in April.
    pub const FINANCIAL_APRIL: Self = Self::FinancialYear(Month::April);
    /// Financial years starting in July.
    pub const FINANCIAL_JULY: Self = Self::FinancialYear(Month::July);
    /// Financial years starting in October.
    pub const FINANCIAL_OCTOBER: Self = Self::FinancialYear(Month::October);
    /// Financial years starting in November.
    pub const FINANCIAL_NOVEMBER: Self = Self::FinancialYear(Month::November);

    /// The supported period types, finest first.
    pub const CATALOGUE: [Self; 16] = [
        Self::Daily,
        Self::WEEKLY,
        Self::WEEKLY_WEDNESDAY,
        Self::WEEKLY_THURSDAY,
        Self::WEEKLY_SATURDAY,
        Self::WEEKLY_SUNDAY,
        Self::BiWeekly,
        Self::Monthly,
        Self::BiMonthly,
        Self::Quarterly,
        Self::SixMonthly,
        Self::Yearly,
        Self::FINANCIAL_APRIL,
        Self::FINANCIAL_JULY,
        Self::FINANCIAL_OCTOBER,
        Self::FINANCIAL_NOVEMBER,
    ];

    /// Returns the financial-year analogue of this type under `calendar`.
    ///
    /// Only [`PeriodType::Yearly`] has one.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::UnsupportedPeriodType`] for every other type.
    pub fn fiscal(self, calendar: &CalendarConfig) -> Result<Self> {
        match self {
            Self::Yearly => {
                let start = u8::try_from(calendar.fiscal_year_start_month())
                    .ok()
                    .and_then(|m| Month::try_from(m).ok())
                    .ok_or(PeriodError::InvalidCalendarConfig(
                        calendar.fiscal_year_start_month(),
                    ))?;
                Ok(Self::FinancialYear(start))
            }
            other => Err(PeriodError::UnsupportedPeriodType(format!(
                "{other} has no financial year analogue"
            ))),
        }
    }

    /// Returns the period of this type containing `date`.
    pub fn containing(self, date: NaiveDate) -> Result<Period> {
        match self {
            Self::Daily => Ok(Period::new(
                self,
                date,
                date,
                format!("{:04}{:02}{:02}", date.year(), date.month(), date.day()),
            )),
            Self::Weekly(week_start) => {
                let start = start_of_week(date, week_start)?;
                let end = add_days(start, 6)?;
                let (year, week) = week_number(start)?;
                Ok(Period::new(
                    self,
                    start,
                    end,
                    format!("{year:04}{}W{week:02}", weekday_prefix(week_start)),
                ))
            }
            Self::BiWeekly => {
                let week_start = start_of_week(date, Weekday::Mon)?;
                let (year, week) = week_number(week_start)?;
                let start = if week % 2 == 0 {
                    add_days(week_start, -7)?
                } else {
                    week_start
                };
                // A trailing odd week (week 53) forms a one-week bi-week.
                let end = if week_number(add_days(start, 7)?)?.0 == year {
                    add_days(start, 13)?
                } else {
                    add_days(start, 6)?
                };
                Ok(Period::new(
                    self,
                    start,
                    end,
                    format!("{year:04}BiW{:02}", week.div_ceil(2)),
                ))
            }
            Self::Monthly => {
                let (start, end, _) = month_block(date, 1)?;
                Ok(Period::new(
                    self,
                    start,
                    end,
                    format!("{:04}{:02}", start.year(), start.month()),
                ))
            }
            Self::BiMonthly => {
                let (start, end, index) = month_block(date, 2)?;
                Ok(Period::new(
                    self,
                    start,
                    end,
                    format!("{:04}{index:02}B", start.year()),
                ))
            }
            Self::Quarterly => {
                let (start, end, index) = month_block(date, 3)?;
                Ok(Period::new(
                    self,
                    start,
                    end,
                    format!("{:04}Q{index}", start.year()),
                ))
            }
            Self::SixMonthly => {
                let (start, end, index) = month_block(date, 6)?;
                Ok(Period::new(
                    self,
                    start,
                    end,
                    format!("{:04}S{index}", start.year()),
                ))
            }
            Self::Yearly => {
                let (start, end, _) = month_block(date, 12)?;
                Ok(Period::new(self, start, end, format!("{:04}", start.year())))
            }
            Self::FinancialYear(start_month) => {
                let (start, end) =
                    calendar::fiscal_year_containing(date, start_month.number_from_month())?;
                Ok(Period::new(
                    self,
                    start,
                    end,
                    format!("{:04}{}", start.year(), start_month.name()),
                ))
            }
        }
    }

    /// Returns the period of this type immediately before `period`.
    pub fn previous(self, period: &Period) -> Result<Period> {
        self.containing(add_days(period.start_date(), -1)?)
    }

    /// Returns the period of this type immediately after `period`.
    pub fn next(self, period: &Period) -> Result<Period> {
        self.containing(add_days(period.end_date(), 1)?)
    }

    /// Moves `period` by `steps` periods of this type; negative steps go back in time.
    pub fn shift(self, period: &Period, steps: i32) -> Result<Period> {
        let mut current = self.containing(period.start_date())?;
        for _ in 0..steps.unsigned_abs() {
            current = if steps < 0 {
                self.previous(&current)?
            } else {
                self.next(&current)?
            };
        }
        Ok(current)
    }

    /// Returns every period of this type intersecting `start..=end`, ascending.
    ///
    /// An empty range (`start > end`) yields no periods.
    pub fn periods_between(self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Period>> {
        let mut periods = Vec::new();
        if start > end {
            return Ok(periods);
        }
        let mut current = self.containing(start)?;
        loop {
            let reached_end = current.end_date() >= end;
            let next_start = current.end_date();
            periods.push(current);
            if reached_end {
                break;
            }
            current = self.containing(add_days(next_start, 1)?)?;
        }
        Ok(periods)
    }

    /// Parses a canonical period identifier.
    ///
    /// The identifier must be exactly what [`PeriodType::containing`] would
    /// produce for the period, so `2024W54`, `202413` or `2024Apr` are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::InvalidPeriodId`] if the identifier is malformed or
    /// not canonical.
    pub fn parse_iso_id(id: &str) -> Result<Period> {
        let invalid = || PeriodError::InvalidPeriodId(id.to_string());

        let year = id
            .get(..4)
            .and_then(digits)
            .and_then(|y| i32::try_from(y).ok())
            .ok_or_else(invalid)?;
        let suffix = id.get(4..).ok_or_else(invalid)?;

        let (period_type, anchor) = locate(year, suffix).ok_or_else(invalid)?;
        let period = period_type.containing(anchor).map_err(|_| invalid())?;
        if period.iso_id() != id {
            return Err(invalid());
        }
        Ok(period)
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "Daily"),
            Self::Weekly(Weekday::Mon) => write!(f, "Weekly"),
            Self::Weekly(start) => write!(f, "Weekly{}", weekday_name(*start)),
            Self::BiWeekly => write!(f, "BiWeekly"),
            Self::Monthly => write!(f, "Monthly"),
            Self::BiMonthly => write!(f, "BiMonthly"),
            Self::Quarterly => write!(f, "Quarterly"),
            Self::SixMonthly => write!(f, "SixMonthly"),
            Self::Yearly => write!(f, "Yearly"),
            Self::FinancialYear(start) => write!(f, "Financial{}", start.name()),
        }
    }
}

/// Maps an identifier suffix to the period type and a date inside the period it names.
fn locate(year: i32, suffix: &str) -> Option<(PeriodType, NaiveDate)> {
    if suffix.is_empty() {
        return Some((PeriodType::Yearly, NaiveDate::from_ymd_opt(year, 1, 1)?));
    }
    if suffix.bytes().all(|b| b.is_ascii_digit()) {
        return match suffix.len() {
            2 => Some((PeriodType::Monthly, NaiveDate::from_ymd_opt(year, digits(suffix)?, 1)?)),
            4 => {
                let month = digits(suffix.get(..2)?)?;
                let day = digits(suffix.get(2..)?)?;
                Some((PeriodType::Daily, NaiveDate::from_ymd_opt(year, month, day)?))
            }
            _ => None,
        };
    }
    if let Some(index) = suffix.strip_suffix('B').and_then(digits) {
        if !(1..=6).contains(&index) || suffix.len() != 3 {
            return None;
        }
        return Some((PeriodType::BiMonthly, NaiveDate::from_ymd_opt(year, index * 2 - 1, 1)?));
    }
    if let Some(index) = suffix.strip_prefix('Q').and_then(digits) {
        if !(1..=4).contains(&index) {
            return None;
        }
        return Some((PeriodType::Quarterly, NaiveDate::from_ymd_opt(year, index * 3 - 2, 1)?));
    }
    if let Some(index) = suffix.strip_prefix('S').and_then(digits) {
        if !(1..=2).contains(&index) {
            return None;
        }
        return Some((PeriodType::SixMonthly, NaiveDate::from_ymd_opt(year, index * 6 - 5, 1)?));
    }
    if let Some(index) = suffix.strip_prefix("BiW").and_then(digits) {
        let first = week_one_start(year, Weekday::Mon).ok()?;
        let anchor = add_days(first, 14 * (i64::from(index) - 1)).ok()?;
        return (index >= 1).then_some((PeriodType::BiWeekly, anchor));
    }
    if let Some((prefix, week)) = suffix.split_once('W') {
        let week = digits(week)?;
        let week_start = match prefix {
            "" => Weekday::Mon,
            other => parse_weekday_prefix(other)?,
        };
        let first = week_one_start(year, week_start).ok()?;
        let anchor = add_days(first, 7 * (i64::from(week) - 1)).ok()?;
        return (week >= 1).then_some((PeriodType::Weekly(week_start), anchor));
    }
    let start_month = suffix.parse::<Month>().ok()?;
    Some((
        PeriodType::FinancialYear(start_month),
        NaiveDate::from_ymd_opt(year, start_month.number_from_month(), 1)?,
    ))
}

/// Parses a non-empty run of ASCII digits.
fn digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Returns `(start, end, 1-based index within the year)` of the block of
/// `months` months containing `date`.
fn month_block(date: NaiveDate, months: u32) -> Result<(NaiveDate, NaiveDate, u32)> {
    let index = (date.month() - 1) / months;
    let start = first_of_month(date.year(), index * months + 1)?;
    let end = add_days(add_months(start, months as i32)?, -1)?;
    Ok((start, end, index + 1))
}

/// Returns `(year, week)` for the week starting on `start`.
fn week_number(start: NaiveDate) -> Result<(i32, u32)> {
    let fourth_day = add_days(start, 3)?;
    Ok((fourth_day.year(), (fourth_day.ordinal() - 1) / 7 + 1))
}

/// Returns the first day of week 1 of `year` for weeks starting on `week_start`.
fn week_one_start(year: i32, week_start: Weekday) -> Result<NaiveDate> {
    let fourth_of_january = add_days(first_of_month(year, 1)?, 3)?;
    start_of_week(fourth_of_january, week_start)
}

const fn weekday_prefix(week_start: Weekday) -> &'static str {
    match week_start {
        Weekday::Mon => "",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

fn parse_weekday_prefix(prefix: &str) -> Option<Weekday> {
    match prefix {
        "Tue" => Some(Weekday::Tue),
        "Wed" => Some(Weekday::Wed),
        "Thu" => Some(Weekday::Thu),
        "Fri" => Some(Weekday::Fri),
        "Sat" => Some(Weekday::Sat),
        "Sun" => Some(Weekday::Sun),
        _ => None,
    }
}

const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
