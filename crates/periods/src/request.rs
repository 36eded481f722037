//! Request adapter for relative period lookups.
//!
//! This module turns loosely typed request parameters into the resolver's
//! inputs and the resolver's output into a response body. It performs no HTTP
//! routing itself; a web handler binds the query parameters into a
//! [`RelativePeriodQuery`] and returns the [`Response`] produced by [`respond`].

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use periods_core::{CalendarConfig, PeriodError, ReferenceContext, RelativePeriod, resolve_iso_ids};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

/// Date format accepted for the `date` parameter.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors raised while handling a relative period request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// A required parameter was absent or empty.
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// The `date` parameter is not a `YYYY-MM-DD` calendar date.
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The `financialYearStart` parameter is not a known key or month number.
    #[error("Unknown financial year start: {0}")]
    UnknownFinancialYearStart(String),

    /// Resolution failed.
    #[error(transparent)]
    Period(#[from] PeriodError),
}

impl RequestError {
    /// Returns the HTTP status code for this error.
    ///
    /// Caller errors map to 400; an unsupported period type is a defect and maps to 500.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Period(e) if !e.is_caller_error() => 500,
            _ => 400,
        }
    }
}

/// Result type alias using [`RequestError`].
pub type Result<T> = std::result::Result<T, RequestError>;

/// Named fiscal year conventions accepted by the `financialYearStart` parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinancialYearStart {
    /// Financial year starting on 1 April.
    #[serde(rename = "FINANCIAL_YEAR_APRIL")]
    April,
    /// Financial year starting on 1 July.
    #[serde(rename = "FINANCIAL_YEAR_JULY")]
    July,
    /// Financial year starting on 1 October.
    #[default]
    #[serde(rename = "FINANCIAL_YEAR_OCTOBER")]
    October,
    /// Financial year starting on 1 November.
    #[serde(rename = "FINANCIAL_YEAR_NOVEMBER")]
    November,
}

impl FinancialYearStart {
    /// Every named convention.
    pub const ALL: [Self; 4] = [Self::April, Self::July, Self::October, Self::November];

    /// Returns the parameter key, e.g. `FINANCIAL_YEAR_APRIL`.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::April => "FINANCIAL_YEAR_APRIL",
            Self::July => "FINANCIAL_YEAR_JULY",
            Self::October => "FINANCIAL_YEAR_OCTOBER",
            Self::November => "FINANCIAL_YEAR_NOVEMBER",
        }
    }

    /// Returns the month (1-12) the financial year starts in.
    #[must_use]
    pub const fn month(&self) -> u32 {
        match self {
            Self::April => 4,
            Self::July => 7,
            Self::October => 10,
            Self::November => 11,
        }
    }

    /// Returns the calendar for this convention.
    pub fn calendar(&self) -> Result<CalendarConfig> {
        Ok(CalendarConfig::new(self.month())?)
    }
}

impl fmt::Display for FinancialYearStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FinancialYearStart {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|start| start.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RequestError::UnknownFinancialYearStart(s.to_string()))
    }
}

/// Parses the `financialYearStart` parameter into a calendar.
///
/// Accepts a named key or a bare month number; a number outside 1-12 fails
/// with [`PeriodError::InvalidCalendarConfig`].
pub fn parse_financial_year_start(value: &str) -> Result<CalendarConfig> {
    let value = value.trim();
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        let month = value
            .parse::<u32>()
            .map_err(|_| RequestError::UnknownFinancialYearStart(value.to_string()))?;
        return Ok(CalendarConfig::new(month)?);
    }
    value.parse::<FinancialYearStart>()?.calendar()
}

/// Query parameters of a relative period request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelativePeriodQuery {
    /// Relative period tag, e.g. `LAST_12_MONTHS`. Required.
    #[serde(default)]
    pub relative_period: Option<String>,
    /// Reference date as `YYYY-MM-DD`; defaults to today.
    #[serde(default)]
    pub date: Option<String>,
    /// Financial year start key; defaults to [`FinancialYearStart::October`].
    #[serde(default)]
    pub financial_year_start: Option<String>,
}

impl RelativePeriodQuery {
    /// Creates a query for `relative_period` with default date and fiscal convention.
    #[must_use]
    pub fn new(relative_period: impl Into<String>) -> Self {
        Self {
            relative_period: Some(relative_period.into()),
            ..Default::default()
        }
    }

    /// Sets the reference date parameter.
    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Sets the financial year start parameter.
    #[must_use]
    pub fn with_financial_year_start(mut self, financial_year_start: impl Into<String>) -> Self {
        self.financial_year_start = Some(financial_year_start.into());
        self
    }

    /// Decodes the parameters into resolver inputs, using `today` when no date is given.
    pub fn parse(&self, today: NaiveDate) -> Result<(RelativePeriod, ReferenceContext)> {
        let tag = self
            .relative_period
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(RequestError::MissingParameter("relativePeriod"))?
            .parse::<RelativePeriod>()?;

        let reference_date = match self.date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(date) => NaiveDate::parse_from_str(date, DATE_FORMAT)
                .map_err(|_| RequestError::InvalidDate(date.to_string()))?,
            None => today,
        };

        let calendar = match self
            .financial_year_start
            .as_deref()
            .filter(|s| !s.trim().is_empty())
        {
            Some(value) => parse_financial_year_start(value)?,
            None => FinancialYearStart::default().calendar()?,
        };

        Ok((tag, ReferenceContext::at(reference_date).with_calendar(calendar)))
    }
}

/// Ordered list of canonical period identifiers; serializes as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodIdList(Vec<String>);

impl PeriodIdList {
    /// Returns the number of identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no identifiers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the identifiers as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns an iterator over the identifiers.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    /// Consumes the list and returns the underlying vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl IntoIterator for PeriodIdList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<String> for PeriodIdList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Resolves a query against `today`.
#[instrument(skip_all, fields(relative_period = ?query.relative_period, date = ?query.date))]
pub fn resolve_query_at(query: &RelativePeriodQuery, today: NaiveDate) -> Result<PeriodIdList> {
    let (tag, ctx) = query.parse(today).inspect_err(|e| {
        warn!(error = %e, "Rejected relative period request");
    })?;
    let ids = resolve_iso_ids(tag, &ctx)?;
    debug!(count = ids.len(), "Resolved relative period request");
    Ok(PeriodIdList(ids))
}

/// Resolves a query against the current UTC date.
pub fn resolve_query(query: &RelativePeriodQuery) -> Result<PeriodIdList> {
    resolve_query_at(query, Utc::now().date_naive())
}

/// JSON error body returned for failed requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// HTTP status code.
    pub http_status_code: u16,
    /// Always `ERROR`.
    pub status: String,
    /// Human readable cause.
    pub message: String,
}

impl From<&RequestError> for ErrorBody {
    fn from(e: &RequestError) -> Self {
        Self {
            http_status_code: e.status_code(),
            status: "ERROR".to_string(),
            message: e.to_string(),
        }
    }
}

/// Status code and JSON body for a handled request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// JSON body.
    pub body: String,
}

/// Handles a request end to end: resolves it and serializes the outcome.
pub fn respond(query: &RelativePeriodQuery, today: NaiveDate) -> Response {
    let (status, body) = match resolve_query_at(query, today) {
        Ok(ids) => (200, serde_json::to_string(&ids)),
        Err(e) => {
            let body = ErrorBody::from(&e);
            (body.http_status_code, serde_json::to_string(&body))
        }
    };
    match body {
        Ok(body) => Response { status, body },
        Err(e) => {
            error!(error = %e, "Failed to serialize response body");
            Response {
                status: 500,
                body: String::new(),
            }
        }
    }
}
