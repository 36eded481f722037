#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/periods/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Relative period resolution for analytics requests.
//!
//! This crate re-exports the core types from `periods-core` and adds the
//! request adapter that sits between a web handler and the resolver:
//!
//! - [`RelativePeriodQuery`] - Loosely typed request parameters
//! - [`FinancialYearStart`] - Named fiscal year conventions
//! - [`resolve_query_at`] / [`respond`] - Resolution and response serialization
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use periods::{RelativePeriodQuery, resolve_query_at};
//!
//! let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
//! let query = RelativePeriodQuery::new("LAST_4_QUARTERS");
//! let ids = resolve_query_at(&query, today).unwrap();
//! assert_eq!(ids.as_slice(), ["2023Q3", "2023Q4", "2024Q1", "2024Q2"]);
//! ```

// Core types and resolver
pub use periods_core::*;

/// Request adapter.
pub mod request;
pub use request::{
    ErrorBody, FinancialYearStart, PeriodIdList, RelativePeriodQuery, RequestError, Response,
    parse_financial_year_start, resolve_query, resolve_query_at, respond,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_agree() {
        let ctx = Arc::new(
            ReferenceContext::at(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
                .with_calendar(CalendarConfig::new(4).unwrap()),
        );
        let expected: Vec<_> = RelativePeriod::ALL
            .iter()
            .map(|tag| resolve_iso_ids(*tag, &ctx).unwrap())
            .collect();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let ctx = Arc::clone(&ctx);
            handles.push(tokio::spawn(async move {
                RelativePeriod::ALL
                    .iter()
                    .map(|tag| resolve_iso_ids(*tag, &ctx).unwrap())
                    .collect::<Vec<_>>()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), expected);
        }
    }

    #[test]
    fn test_request_error_wraps_core_error() {
        let err: RequestError = "SOMETIME".parse::<RelativePeriod>().unwrap_err().into();
        assert!(matches!(
            err,
            RequestError::Period(PeriodError::UnknownRelativePeriod(_))
        ));
    }
}
