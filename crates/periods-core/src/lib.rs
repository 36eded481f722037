#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/periods/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types for relative period resolution.
//!
//! This crate provides the building blocks, leaves first:
//!
//! - [`CalendarConfig`](calendar::CalendarConfig) - Gregorian arithmetic with a fiscal year start
//! - [`PeriodType`](period_type::PeriodType) - Catalogue of period granularities
//! - [`Period`](period::Period) - A concrete span with a canonical identifier
//! - [`RelativePeriod`](relative::RelativePeriod) - Symbolic tags and their generation rules
//! - [`resolve`](resolver::resolve) - Tag + reference context to ordered periods

/// Calendar arithmetic and configuration.
pub mod calendar;
/// Error types for period operations.
pub mod error;
/// Concrete periods.
pub mod period;
/// Period type catalogue and identifier parsing.
pub mod period_type;
/// Relative period tags and generation rules.
pub mod relative;
/// Resolution of relative periods.
pub mod resolver;

// Re-export commonly used items at crate root
pub use calendar::CalendarConfig;
pub use error::{PeriodError, Result};
pub use period::Period;
pub use period_type::PeriodType;
pub use relative::{GenerationRule, RelativePeriod, RulePeriod, WindowDirection};
pub use resolver::{ReferenceContext, resolve, resolve_all, resolve_iso_ids};
