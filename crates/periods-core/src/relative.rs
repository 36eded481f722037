//! Relative period tags and their generation rules.
//!
//! A [`RelativePeriod`] is a symbolic request such as "last 12 months". Each
//! tag maps to exactly one [`GenerationRule`] through [`RelativePeriod::rule`],
//! a `const fn` lookup with no computation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    calendar::CalendarConfig,
    error::{PeriodError, Result},
    period_type::PeriodType,
};

/// Period type referenced by a rule, before the calendar is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RulePeriod {
    /// Use the period type as is.
    Standard(PeriodType),
    /// Use the financial-year analogue of the period type under the request calendar.
    Fiscal(PeriodType),
}

impl RulePeriod {
    /// Resolves the concrete period type under `calendar`.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::UnsupportedPeriodType`] if a fiscal rule wraps a
    /// type with no financial-year analogue.
    pub fn resolve(self, calendar: &CalendarConfig) -> Result<PeriodType> {
        match self {
            Self::Standard(period_type) => Ok(period_type),
            Self::Fiscal(period_type) => period_type.fiscal(calendar),
        }
    }
}

/// How a rule selects periods around the anchor period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowDirection {
    /// The anchor period alone.
    Current,
    /// `count` periods ending with the anchor period, which is included even
    /// when still in progress.
    Trailing,
    /// Every period whose midpoint lies in the anchoring outer period.
    Within(RulePeriod),
}

/// Generation rule behind a relative period tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenerationRule {
    /// Type of the generated periods.
    pub period: RulePeriod,
    /// Window selection.
    pub direction: WindowDirection,
    /// Number of periods in a trailing window; 1 otherwise.
    pub count: u32,
    /// Steps the anchor moves from the period containing the reference date.
    /// For [`WindowDirection::Within`] the outer period moves.
    pub offset: i32,
}

impl GenerationRule {
    const fn current(period: RulePeriod, offset: i32) -> Self {
        Self {
            period,
            direction: WindowDirection::Current,
            count: 1,
            offset,
        }
    }

    const fn trailing(period: RulePeriod, count: u32) -> Self {
        Self {
            period,
            direction: WindowDirection::Trailing,
            count,
            offset: 0,
        }
    }

    const fn within(period: RulePeriod, outer: RulePeriod, offset: i32) -> Self {
        Self {
            period,
            direction: WindowDirection::Within(outer),
            count: 1,
            offset,
        }
    }
}

/// Symbolic, reference-date-relative period request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[allow(missing_docs)]
pub enum RelativePeriod {
    Today,
    Yesterday,
    Last3Days,
    Last7Days,
    Last14Days,
    Last30Days,
    Last60Days,
    Last90Days,
    Last180Days,
    ThisWeek,
    LastWeek,
    Last4Weeks,
    Last12Weeks,
    Last52Weeks,
    WeeksThisYear,
    ThisBiweek,
    LastBiweek,
    Last4Biweeks,
    ThisMonth,
    LastMonth,
    Last3Months,
    Last6Months,
    Last12Months,
    MonthsThisYear,
    MonthsLastYear,
    ThisBimonth,
    LastBimonth,
    Last6Bimonths,
    BimonthsThisYear,
    ThisQuarter,
    LastQuarter,
    Last4Quarters,
    QuartersThisYear,
    QuartersLastYear,
    ThisSixMonth,
    LastSixMonth,
    Last2Sixmonths,
    ThisYear,
    LastYear,
    Last5Years,
    Last10Years,
    ThisFinancialYear,
    LastFinancialYear,
    Last5FinancialYears,
    Last10FinancialYears,
}

impl RelativePeriod {
    /// Every relative period tag.
    pub const ALL: [Self; 45] = [
        Self::Today,
        Self::Yesterday,
        Self::Last3Days,
        Self::Last7Days,
        Self::Last14Days,
        Self::Last30Days,
        Self::Last60Days,
        Self::Last90Days,
        Self::Last180Days,
        Self::ThisWeek,
        Self::LastWeek,
        Self::Last4Weeks,
        Self::Last12Weeks,
        Self::Last52Weeks,
        Self::WeeksThisYear,
        Self::ThisBiweek,
        Self::LastBiweek,
        Self::Last4Biweeks,
        Self::ThisMonth,
        Self::LastMonth,
        Self::Last3Months,
        Self::Last6Months,
        Self::Last12Months,
        Self::MonthsThisYear,
        Self::MonthsLastYear,
        Self::ThisBimonth,
        Self::LastBimonth,
        Self::Last6Bimonths,
        Self::BimonthsThisYear,
        Self::ThisQuarter,
        Self::LastQuarter,
        Self::Last4Quarters,
        Self::QuartersThisYear,
        Self::QuartersLastYear,
        Self::ThisSixMonth,
        Self::LastSixMonth,
        Self::Last2Sixmonths,
        Self::ThisYear,
        Self::LastYear,
        Self::Last5Years,
        Self::Last10Years,
        Self::ThisFinancialYear,
        Self::LastFinancialYear,
        Self::Last5FinancialYears,
        Self::Last10FinancialYears,
    ];

    /// Returns the canonical textual form, e.g. `LAST_12_MONTHS`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "TODAY",
            Self::Yesterday => "YESTERDAY",
            Self::Last3Days => "LAST_3_DAYS",
            Self::Last7Days => "LAST_7_DAYS",
            Self::Last14Days => "LAST_14_DAYS",
            Self::Last30Days => "LAST_30_DAYS",
            Self::Last60Days => "LAST_60_DAYS",
            Self::Last90Days => "LAST_90_DAYS",
            Self::Last180Days => "LAST_180_DAYS",
            Self::ThisWeek => "THIS_WEEK",
            Self::LastWeek => "LAST_WEEK",
            Self::Last4Weeks => "LAST_4_WEEKS",
            Self::Last12Weeks => "LAST_12_WEEKS",
            Self::Last52Weeks => "LAST_52_WEEKS",
            Self::WeeksThisYear => "WEEKS_THIS_YEAR",
            Self::ThisBiweek => "THIS_BIWEEK",
            Self::LastBiweek => "LAST_BIWEEK",
            Self::Last4Biweeks => "LAST_4_BIWEEKS",
            Self::ThisMonth => "THIS_MONTH",
            Self::LastMonth => "LAST_MONTH",
            Self::Last3Months => "LAST_3_MONTHS",
            Self::Last6Months => "LAST_6_MONTHS",
            Self::Last12Months => "LAST_12_MONTHS",
            Self::MonthsThisYear => "MONTHS_THIS_YEAR",
            Self::MonthsLastYear => "MONTHS_LAST_YEAR",
            Self::ThisBimonth => "THIS_BIMONTH",
            Self::LastBimonth => "LAST_BIMONTH",
            Self::Last6Bimonths => "LAST_6_BIMONTHS",
            Self::BimonthsThisYear => "BIMONTHS_THIS_YEAR",
            Self::ThisQuarter => "THIS_QUARTER",
            Self::LastQuarter => "LAST_QUARTER",
            Self::Last4Quarters => "LAST_4_QUARTERS",
            Self::QuartersThisYear => "QUARTERS_THIS_YEAR",
            Self::QuartersLastYear => "QUARTERS_LAST_YEAR",
            Self::ThisSixMonth => "THIS_SIX_MONTH",
            Self::LastSixMonth => "LAST_SIX_MONTH",
            Self::Last2Sixmonths => "LAST_2_SIXMONTHS",
            Self::ThisYear => "THIS_YEAR",
            Self::LastYear => "LAST_YEAR",
            Self::Last5Years => "LAST_5_YEARS",
            Self::Last10Years => "LAST_10_YEARS",
            Self::ThisFinancialYear => "THIS_FINANCIAL_YEAR",
            Self::LastFinancialYear => "LAST_FINANCIAL_YEAR",
            Self::Last5FinancialYears => "LAST_5_FINANCIAL_YEARS",
            Self::Last10FinancialYears => "LAST_10_FINANCIAL_YEARS",
        }
    }

    /// Returns the generation rule for this tag.
    #[must_use]
    pub const fn rule(self) -> GenerationRule {
        use RulePeriod::{Fiscal, Standard};

        const DAY: RulePeriod = Standard(PeriodType::Daily);
        const WEEK: RulePeriod = Standard(PeriodType::WEEKLY);
        const BIWEEK: RulePeriod = Standard(PeriodType::BiWeekly);
        const MONTH: RulePeriod = Standard(PeriodType::Monthly);
        const BIMONTH: RulePeriod = Standard(PeriodType::BiMonthly);
        const QUARTER: RulePeriod = Standard(PeriodType::Quarterly);
        const SIX_MONTH: RulePeriod = Standard(PeriodType::SixMonthly);
        const YEAR: RulePeriod = Standard(PeriodType::Yearly);
        const FINANCIAL_YEAR: RulePeriod = Fiscal(PeriodType::Yearly);

        match self {
            Self::Today => GenerationRule::current(DAY, 0),
            Self::Yesterday => GenerationRule::current(DAY, -1),
            Self::Last3Days => GenerationRule::trailing(DAY, 3),
            Self::Last7Days => GenerationRule::trailing(DAY, 7),
            Self::Last14Days => GenerationRule::trailing(DAY, 14),
            Self::Last30Days => GenerationRule::trailing(DAY, 30),
            Self::Last60Days => GenerationRule::trailing(DAY, 60),
            Self::Last90Days => GenerationRule::trailing(DAY, 90),
            Self::Last180Days => GenerationRule::trailing(DAY, 180),
            Self::ThisWeek => GenerationRule::current(WEEK, 0),
            Self::LastWeek => GenerationRule::current(WEEK, -1),
            Self::Last4Weeks => GenerationRule::trailing(WEEK, 4),
            Self::Last12Weeks => GenerationRule::trailing(WEEK, 12),
            Self::Last52Weeks => GenerationRule::trailing(WEEK, 52),
            Self::WeeksThisYear => GenerationRule::within(WEEK, YEAR, 0),
            Self::ThisBiweek => GenerationRule::current(BIWEEK, 0),
            Self::LastBiweek => GenerationRule::current(BIWEEK, -1),
            Self::Last4Biweeks => GenerationRule::trailing(BIWEEK, 4),
            Self::ThisMonth => GenerationRule::current(MONTH, 0),
            Self::LastMonth => GenerationRule::current(MONTH, -1),
            Self::Last3Months => GenerationRule::trailing(MONTH, 3),
            Self::Last6Months => GenerationRule::trailing(MONTH, 6),
            Self::Last12Months => GenerationRule::trailing(MONTH, 12),
            Self::MonthsThisYear => GenerationRule::within(MONTH, YEAR, 0),
            Self::MonthsLastYear => GenerationRule::within(MONTH, YEAR, -1),
            Self::ThisBimonth => GenerationRule::current(BIMONTH, 0),
            Self::LastBimonth => GenerationRule::current(BIMONTH, -1),
            Self::Last6Bimonths => GenerationRule::trailing(BIMONTH, 6),
            Self::BimonthsThisYear => GenerationRule::within(BIMONTH, YEAR, 0),
            Self::ThisQuarter => GenerationRule::current(QUARTER, 0),
            Self::LastQuarter => GenerationRule::current(QUARTER, -1),
            Self::Last4Quarters => GenerationRule::trailing(QUARTER, 4),
            Self::QuartersThisYear => GenerationRule::within(QUARTER, YEAR, 0),
            Self::QuartersLastYear => GenerationRule::within(QUARTER, YEAR, -1),
            Self::ThisSixMonth => GenerationRule::current(SIX_MONTH, 0),
            Self::LastSixMonth => GenerationRule::current(SIX_MONTH, -1),
            Self::Last2Sixmonths => GenerationRule::trailing(SIX_MONTH, 2),
            Self::ThisYear => GenerationRule::current(YEAR, 0),
            Self::LastYear => GenerationRule::current(YEAR, -1),
            Self::Last5Years => GenerationRule::trailing(YEAR, 5),
            Self::Last10Years => GenerationRule::trailing(YEAR, 10),
            Self::ThisFinancialYear => GenerationRule::current(FINANCIAL_YEAR, 0),
            Self::LastFinancialYear => GenerationRule::current(FINANCIAL_YEAR, -1),
            Self::Last5FinancialYears => GenerationRule::trailing(FINANCIAL_YEAR, 5),
            Self::Last10FinancialYears => GenerationRule::trailing(FINANCIAL_YEAR, 10),
        }
    }
}

impl fmt::Display for RelativePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legacy camelCase names whose word breaks differ from the canonical tag.
const LEGACY_ALIASES: [(&str, RelativePeriod); 8] = [
    ("THIS_BI_WEEK", RelativePeriod::ThisBiweek),
    ("LAST_BI_WEEK", RelativePeriod::LastBiweek),
    ("LAST_4_BI_WEEKS", RelativePeriod::Last4Biweeks),
    ("THIS_BI_MONTH", RelativePeriod::ThisBimonth),
    ("LAST_BI_MONTH", RelativePeriod::LastBimonth),
    ("LAST_6_BI_MONTHS", RelativePeriod::Last6Bimonths),
    ("BI_MONTHS_THIS_YEAR", RelativePeriod::BimonthsThisYear),
    ("LAST_2_SIX_MONTHS", RelativePeriod::Last2Sixmonths),
];

/// Accepts the canonical name in any letter case, or a legacy camelCase name
/// such as `last12Months`.
impl FromStr for RelativePeriod {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let canonical = trimmed.to_ascii_uppercase();
        if let Some(tag) = Self::ALL.into_iter().find(|tag| tag.as_str() == canonical) {
            return Ok(tag);
        }

        // Underscored input must match a canonical name exactly.
        if !trimmed.contains('_') {
            let snake = camel_to_snake(trimmed);
            if let Some(tag) = Self::ALL.into_iter().find(|tag| tag.as_str() == snake) {
                return Ok(tag);
            }
            if let Some((_, tag)) = LEGACY_ALIASES.iter().find(|(alias, _)| *alias == snake) {
                return Ok(*tag);
            }
        }

        Err(PeriodError::UnknownRelativePeriod(s.to_string()))
    }
}

/// Upper snake case of a camelCase word: `last12Months` becomes `LAST_12_MONTHS`.
fn camel_to_snake(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev: Option<char> = None;
    for c in s.chars() {
        if let Some(p) = prev {
            let word_break = (p.is_ascii_lowercase()
                && (c.is_ascii_uppercase() || c.is_ascii_digit()))
                || (p.is_ascii_digit() && c.is_ascii_alphabetic());
            if word_break {
                out.push('_');
            }
        }
        out.push(c.to_ascii_uppercase());
        prev = Some(c);
    }
    out
}

impl TryFrom<String> for RelativePeriod {
    type Error = PeriodError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<RelativePeriod> for String {
    fn from(tag: RelativePeriod) -> Self {
        tag.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_names() {
        for tag in RelativePeriod::ALL {
            assert_eq!(tag.as_str().parse::<RelativePeriod>().unwrap(), tag);
        }
    }

    #[test]
    fn test_parse_legacy_names() {
        assert_eq!(
            "last12Months".parse::<RelativePeriod>().unwrap(),
            RelativePeriod::Last12Months
        );
        assert_eq!(
            "thisFinancialYear".parse::<RelativePeriod>().unwrap(),
            RelativePeriod::ThisFinancialYear
        );
        assert_eq!(
            "last2SixMonths".parse::<RelativePeriod>().unwrap(),
            RelativePeriod::Last2Sixmonths
        );
        assert_eq!(
            "lastBiWeek".parse::<RelativePeriod>().unwrap(),
            RelativePeriod::LastBiweek
        );
        assert_eq!(
            " this_quarter ".parse::<RelativePeriod>().unwrap(),
            RelativePeriod::ThisQuarter
        );
    }

    #[test]
    fn test_parse_unknown() {
        for bad in [
            "",
            "___",
            "LAST_13_MONTHS",
            "NEXT_MONTH",
            "THIS_FORTNIGHT",
            "LAST_1_2_MONTHS",
            "L_A_S_T_3_MONTHS",
            "L_A_S_T_3_M_O_N_T_H_S",
            "THISYEAR_",
            "THISYEAR",
            "last_12Months",
        ] {
            assert_eq!(
                bad.parse::<RelativePeriod>(),
                Err(PeriodError::UnknownRelativePeriod(bad.to_string()))
            );
        }
    }

    #[test]
    fn test_parse_camel_case_of_every_tag() {
        for tag in RelativePeriod::ALL {
            let camel: String = tag
                .as_str()
                .split('_')
                .enumerate()
                .map(|(i, word)| {
                    let lower = word.to_ascii_lowercase();
                    if i == 0 {
                        lower
                    } else {
                        let mut chars = lower.chars();
                        chars.next().map_or_else(String::new, |first| {
                            first.to_ascii_uppercase().to_string() + chars.as_str()
                        })
                    }
                })
                .collect();
            assert_eq!(camel.parse::<RelativePeriod>().unwrap(), tag, "{camel}");
        }
    }

    #[test]
    fn test_camel_to_snake() {
        assert_eq!(camel_to_snake("last12Months"), "LAST_12_MONTHS");
        assert_eq!(camel_to_snake("thisFinancialYear"), "THIS_FINANCIAL_YEAR");
        assert_eq!(camel_to_snake("LAST_3_MONTHS"), "LAST_3_MONTHS");
    }

    #[test]
    fn test_rules_are_well_formed() {
        let calendar = CalendarConfig::new(7).unwrap();
        for tag in RelativePeriod::ALL {
            let rule = tag.rule();
            assert!(rule.count >= 1, "{tag}");
            assert!(rule.count <= 180, "{tag}");
            assert!(rule.offset <= 0, "{tag}");
            if rule.direction != WindowDirection::Trailing {
                assert_eq!(rule.count, 1, "{tag}");
            }
            assert!(rule.period.resolve(&calendar).is_ok(), "{tag}");
        }
    }

    #[test]
    fn test_fiscal_rules_follow_calendar() {
        let calendar = CalendarConfig::new(4).unwrap();
        let rule = RelativePeriod::LastFinancialYear.rule();
        assert_eq!(
            rule.period.resolve(&calendar).unwrap(),
            PeriodType::FINANCIAL_APRIL
        );
        assert_eq!(rule.offset, -1);
    }

    #[test]
    fn test_fiscal_wrapping_without_analogue_fails() {
        let rule_period = RulePeriod::Fiscal(PeriodType::WEEKLY);
        assert!(matches!(
            rule_period.resolve(&CalendarConfig::default()),
            Err(PeriodError::UnsupportedPeriodType(_))
        ));
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&RelativePeriod::Last4Quarters).unwrap();
        assert_eq!(json, r#""LAST_4_QUARTERS""#);
        let tag: RelativePeriod = serde_json::from_str(r#""LAST_52_WEEKS""#).unwrap();
        assert_eq!(tag, RelativePeriod::Last52Weeks);
        assert!(serde_json::from_str::<RelativePeriod>(r#""LAST_53_WEEKS""#).is_err());
    }
}
