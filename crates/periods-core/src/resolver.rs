//! Relative period resolution.
//!
//! [`resolve`] turns a [`RelativePeriod`] and a [`ReferenceContext`] into the
//! ordered list of concrete periods it denotes. Resolution is a pure function of
//! its inputs: no shared state, no caching, no I/O.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{
    calendar::CalendarConfig,
    error::Result,
    period::Period,
    period_type::PeriodType,
    relative::{RelativePeriod, WindowDirection},
};

/// Inputs that a relative period is resolved against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceContext {
    #[serde(default = "today")]
    reference_date: NaiveDate,
    #[serde(default)]
    calendar: CalendarConfig,
}

impl Default for ReferenceContext {
    fn default() -> Self {
        Self::new(None, CalendarConfig::default())
    }
}

impl ReferenceContext {
    /// Creates a context; a missing reference date means today (UTC).
    #[must_use]
    pub fn new(reference_date: Option<NaiveDate>, calendar: CalendarConfig) -> Self {
        Self {
            reference_date: reference_date.unwrap_or_else(today),
            calendar,
        }
    }

    /// Creates a context for `reference_date` with the standard calendar.
    #[must_use]
    pub fn at(reference_date: NaiveDate) -> Self {
        Self::new(Some(reference_date), CalendarConfig::default())
    }

    /// Sets the reference date.
    #[must_use]
    pub const fn with_reference_date(mut self, reference_date: NaiveDate) -> Self {
        self.reference_date = reference_date;
        self
    }

    /// Sets the calendar convention.
    #[must_use]
    pub const fn with_calendar(mut self, calendar: CalendarConfig) -> Self {
        self.calendar = calendar;
        self
    }

    /// Returns the reference date.
    #[must_use]
    pub const fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Returns the calendar convention.
    #[must_use]
    pub const fn calendar(&self) -> &CalendarConfig {
        &self.calendar
    }
}

/// Today's date in UTC.
fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Resolves `tag` into concrete periods, ascending by start date.
///
/// Trailing windows end with the period containing the reference date, even
/// when that period is still in progress: `LAST_3_MONTHS` on 2024-03-10 is
/// January, February and March 2024.
///
/// # Errors
///
/// Propagates [`PeriodError`](crate::PeriodError) from the calendar and period
/// type layers unchanged; there are no partial results.
#[instrument(
    skip_all,
    fields(
        tag = %tag,
        reference_date = %ctx.reference_date(),
        fiscal_start = ctx.calendar().fiscal_year_start_month()
    )
)]
pub fn resolve(tag: RelativePeriod, ctx: &ReferenceContext) -> Result<Vec<Period>> {
    let rule = tag.rule();
    let period_type = rule.period.resolve(ctx.calendar())?;

    let periods = match rule.direction {
        WindowDirection::Current => {
            vec![anchor(period_type, ctx.reference_date(), rule.offset)?]
        }
        WindowDirection::Trailing => {
            let mut window = Vec::with_capacity(rule.count as usize);
            let mut current = anchor(period_type, ctx.reference_date(), rule.offset)?;
            for _ in 1..rule.count {
                let previous = period_type.previous(&current)?;
                window.push(current);
                current = previous;
            }
            window.push(current);
            window.reverse();
            window
        }
        WindowDirection::Within(outer) => {
            let outer_type = outer.resolve(ctx.calendar())?;
            let outer_period = anchor(outer_type, ctx.reference_date(), rule.offset)?;
            period_type
                .periods_between(outer_period.start_date(), outer_period.end_date())?
                .into_iter()
                .filter(|p| outer_period.contains(p.midpoint()))
                .collect()
        }
    };

    let periods = dedup_by_iso_id(periods);
    debug!(
        period_type = %period_type,
        count = periods.len(),
        "Resolved relative period"
    );
    Ok(periods)
}

/// Resolves `tag` into canonical period identifiers.
pub fn resolve_iso_ids(tag: RelativePeriod, ctx: &ReferenceContext) -> Result<Vec<String>> {
    Ok(resolve(tag, ctx)?
        .into_iter()
        .map(Period::into_iso_id)
        .collect())
}

/// Resolves several tags into their union, ascending and without duplicates.
///
/// Fails on the first tag that fails.
pub fn resolve_all(tags: &[RelativePeriod], ctx: &ReferenceContext) -> Result<Vec<Period>> {
    let mut periods = Vec::new();
    for tag in tags {
        periods.extend(resolve(*tag, ctx)?);
    }
    periods.sort();
    periods.dedup_by(|a, b| a.iso_id() == b.iso_id());
    Ok(periods)
}

impl RelativePeriod {
    /// Resolves this tag against `ctx`. See [`resolve`].
    pub fn resolve(self, ctx: &ReferenceContext) -> Result<Vec<Period>> {
        resolve(self, ctx)
    }
}

/// Returns the period containing `date`, moved `offset` periods.
fn anchor(period_type: PeriodType, date: NaiveDate, offset: i32) -> Result<Period> {
    let period = period_type.containing(date)?;
    if offset == 0 {
        return Ok(period);
    }
    period_type.shift(&period, offset)
}

fn dedup_by_iso_id(mut periods: Vec<Period>) -> Vec<Period> {
    let before = periods.len();
    let mut seen = HashSet::with_capacity(before);
    periods.retain(|p| seen.insert(p.iso_id().to_string()));
    if periods.len() != before {
        warn!(
            dropped = before - periods.len(),
            "Duplicate periods removed from resolution"
        );
    }
    periods
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PeriodError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ids(tag: RelativePeriod, ctx: &ReferenceContext) -> Vec<String> {
        resolve_iso_ids(tag, ctx).unwrap()
    }

    #[test]
    fn test_context_deserializes_with_defaults() {
        let before = today();
        let ctx: ReferenceContext = serde_json::from_str("{}").unwrap();
        let after = today();
        assert!(ctx.reference_date() == before || ctx.reference_date() == after);
        assert_eq!(ctx.calendar(), &CalendarConfig::default());

        let ctx: ReferenceContext = serde_json::from_str(
            r#"{"reference_date":"2024-03-15","calendar":{"fiscal_year_start_month":4}}"#,
        )
        .unwrap();
        let expected =
            ReferenceContext::at(date(2024, 3, 15)).with_calendar(CalendarConfig::new(4).unwrap());
        assert_eq!(ctx, expected);
    }

    #[test]
    fn test_this_year() {
        let ctx = ReferenceContext::at(date(2024, 6, 10));
        assert_eq!(ids(RelativePeriod::ThisYear, &ctx), vec!["2024"]);
        assert_eq!(ids(RelativePeriod::LastYear, &ctx), vec!["2023"]);
    }

    #[test]
    fn test_trailing_months_include_current() {
        let ctx = ReferenceContext::at(date(2024, 3, 10));
        assert_eq!(
            ids(RelativePeriod::Last3Months, &ctx),
            vec!["202401", "202402", "202403"]
        );
        let last_12 = ids(RelativePeriod::Last12Months, &ctx);
        assert_eq!(last_12.len(), 12);
        assert_eq!(last_12.first().unwrap(), "202304");
        assert_eq!(last_12.last().unwrap(), "202403");
    }

    #[test]
    fn test_this_quarter() {
        let ctx = ReferenceContext::at(date(2024, 5, 1));
        assert_eq!(ids(RelativePeriod::ThisQuarter, &ctx), vec!["2024Q2"]);
        assert_eq!(ids(RelativePeriod::LastQuarter, &ctx), vec!["2024Q1"]);
        assert_eq!(
            ids(RelativePeriod::Last4Quarters, &ctx),
            vec!["2023Q3", "2023Q4", "2024Q1", "2024Q2"]
        );
    }

    #[test]
    fn test_fiscal_boundary() {
        let ctx = ReferenceContext::at(date(2024, 3, 15)).with_calendar(CalendarConfig::new(4).unwrap());
        assert_eq!(ids(RelativePeriod::ThisFinancialYear, &ctx), vec!["2023April"]);
        assert_eq!(ids(RelativePeriod::LastFinancialYear, &ctx), vec!["2022April"]);

        let ctx = ctx.with_reference_date(date(2024, 4, 1));
        assert_eq!(ids(RelativePeriod::ThisFinancialYear, &ctx), vec!["2024April"]);
    }

    #[test]
    fn test_trailing_financial_years() {
        let ctx = ReferenceContext::at(date(2024, 11, 1)).with_calendar(CalendarConfig::new(10).unwrap());
        assert_eq!(
            ids(RelativePeriod::Last5FinancialYears, &ctx),
            vec![
                "2020October",
                "2021October",
                "2022October",
                "2023October",
                "2024October"
            ]
        );
    }

    #[test]
    fn test_standard_calendar_financial_year_is_calendar_year() {
        let ctx = ReferenceContext::at(date(2024, 6, 10));
        let periods = resolve(RelativePeriod::ThisFinancialYear, &ctx).unwrap();
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].iso_id(), "2024January");
        assert_eq!(periods[0].start_date(), date(2024, 1, 1));
        assert_eq!(periods[0].end_date(), date(2024, 12, 31));
    }

    #[test]
    fn test_days_and_weeks() {
        let ctx = ReferenceContext::at(date(2024, 3, 1));
        assert_eq!(ids(RelativePeriod::Today, &ctx), vec!["20240301"]);
        assert_eq!(ids(RelativePeriod::Yesterday, &ctx), vec!["20240229"]);
        assert_eq!(
            ids(RelativePeriod::Last3Days, &ctx),
            vec!["20240228", "20240229", "20240301"]
        );

        let ctx = ReferenceContext::at(date(2024, 1, 15));
        assert_eq!(ids(RelativePeriod::ThisWeek, &ctx), vec!["2024W03"]);
        assert_eq!(ids(RelativePeriod::LastWeek, &ctx), vec!["2024W02"]);
        assert_eq!(
            ids(RelativePeriod::Last4Weeks, &ctx),
            vec!["2023W52", "2024W01", "2024W02", "2024W03"]
        );
    }

    #[test]
    fn test_biweeks_across_53_week_year() {
        let ctx = ReferenceContext::at(date(2021, 1, 10));
        assert_eq!(
            ids(RelativePeriod::Last4Biweeks, &ctx),
            vec!["2020BiW25", "2020BiW26", "2020BiW27", "2021BiW01"]
        );
    }

    #[test]
    fn test_within_year() {
        let ctx = ReferenceContext::at(date(2024, 6, 10));
        let months: Vec<String> = (1..=12).map(|m| format!("2023{m:02}")).collect();
        assert_eq!(ids(RelativePeriod::MonthsLastYear, &ctx), months);
        assert_eq!(
            ids(RelativePeriod::QuartersThisYear, &ctx),
            vec!["2024Q1", "2024Q2", "2024Q3", "2024Q4"]
        );
        assert_eq!(ids(RelativePeriod::BimonthsThisYear, &ctx).len(), 6);

        let weeks = ids(RelativePeriod::WeeksThisYear, &ReferenceContext::at(date(2020, 7, 1)));
        assert_eq!(weeks.len(), 53);
        assert_eq!(weeks.first().unwrap(), "2020W01");
        assert_eq!(weeks.last().unwrap(), "2020W53");

        let weeks = ids(RelativePeriod::WeeksThisYear, &ReferenceContext::at(date(2021, 1, 2)));
        assert_eq!(weeks.len(), 52);
        assert_eq!(weeks.first().unwrap(), "2021W01");
    }

    #[test]
    fn test_idempotent_containment() {
        let mut d = date(2024, 2, 1);
        while d <= date(2024, 2, 29) {
            assert_eq!(ids(RelativePeriod::ThisMonth, &ReferenceContext::at(d)), vec!["202402"]);
            d = d.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_ordering_uniqueness_and_counts() {
        let calendars = [1, 4, 7, 10, 11].map(|m| CalendarConfig::new(m).unwrap());
        let dates = [
            date(2020, 12, 31),
            date(2021, 1, 1),
            date(2024, 2, 29),
            date(2024, 3, 31),
            date(2024, 10, 1),
        ];
        for calendar in calendars {
            for d in dates {
                let ctx = ReferenceContext::at(d).with_calendar(calendar);
                for tag in RelativePeriod::ALL {
                    let periods = resolve(tag, &ctx).unwrap();
                    assert!(!periods.is_empty(), "{tag} at {d}");
                    for pair in periods.windows(2) {
                        assert!(pair[0].end_date() < pair[1].start_date(), "{tag} at {d}");
                    }
                    let unique: HashSet<_> = periods.iter().map(Period::iso_id).collect();
                    assert_eq!(unique.len(), periods.len(), "{tag} at {d}");

                    let rule = tag.rule();
                    if rule.direction == WindowDirection::Trailing {
                        assert_eq!(periods.len(), rule.count as usize, "{tag} at {d}");
                        assert!(periods.last().unwrap().contains(d), "{tag} at {d}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_determinism() {
        let ctx = ReferenceContext::at(date(2024, 8, 20)).with_calendar(CalendarConfig::new(7).unwrap());
        for tag in RelativePeriod::ALL {
            assert_eq!(resolve(tag, &ctx).unwrap(), resolve(tag, &ctx).unwrap());
        }
    }

    #[test]
    fn test_resolve_all_unions() {
        let ctx = ReferenceContext::at(date(2024, 3, 10));
        let periods = resolve_all(
            &[RelativePeriod::ThisMonth, RelativePeriod::Last3Months, RelativePeriod::ThisYear],
            &ctx,
        )
        .unwrap();
        let ids: Vec<_> = periods.iter().map(Period::iso_id).collect();
        // Ascending by start date, shorter periods first on ties
        assert_eq!(ids, vec!["202401", "2024", "202402", "202403"]);
    }

    #[test]
    fn test_out_of_range_reference_date() {
        let ctx = ReferenceContext::at(NaiveDate::MIN);
        assert!(matches!(
            resolve(RelativePeriod::Last12Months, &ctx),
            Err(PeriodError::DateOutOfRange(_))
        ));
    }

    #[test]
    fn test_default_context_uses_today() {
        let ctx = ReferenceContext::default();
        assert_eq!(ctx.reference_date(), Utc::now().date_naive());
        assert!(ctx.calendar().is_standard());
    }
}
