//! # timegate
//!
//! A temporal predicate library for feature gating: decide whether an
//! instant falls inside an active time window, under a recurring schedule
//! or a crontab expression.
//!
//! ## Features
//!
//! - **Recurring windows**: daily, weekly, absolute/relative monthly and
//!   absolute/relative yearly patterns, bounded by an end date or an
//!   occurrence count, evaluated in an explicit fixed-offset time zone
//! - **Constant-time evaluation**: the previous occurrence is computed from
//!   the gap to the window start; occurrences are never enumerated
//! - **Crontab matching**: five-field crontab expressions compiled into
//!   per-field value sets
//! - **Typed validation**: every broken invariant surfaces as a dotted
//!   field path plus a closed reason tag
//! - **Pure functions**: no clocks, no I/O, no shared state; settings
//!   records deserialize with serde and are evaluated as-is
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::DateTime;
//! use timegate::{is_active, DayOfWeek, Recurrence, TimeWindowSettings};
//!
//! // Open every Monday and Wednesday from 08:00 to 09:00 UTC
//! let start = DateTime::parse_from_rfc3339("2023-09-04T08:00:00+00:00").unwrap();
//! let end = DateTime::parse_from_rfc3339("2023-09-04T09:00:00+00:00").unwrap();
//! let settings = TimeWindowSettings::bounded(start, end)
//!     .repeating(Recurrence::weekly([DayOfWeek::Monday, DayOfWeek::Wednesday]));
//!
//! let wednesday = DateTime::parse_from_rfc3339("2023-09-06T08:30:00+00:00").unwrap();
//! assert!(is_active(&settings, wednesday));
//! ```

pub mod crontab;
pub mod recurrence;
pub mod settings;
pub mod timezone;
pub mod validation;

mod calendar;
mod error;

pub use crontab::{CrontabExpression, CrontabField, CrontabFieldKind};
pub use error::{CrontabParseError, ValidationError, ValidationErrorKind};
pub use recurrence::{is_active, TimeWindow};
pub use settings::{
    DayOfWeek, Recurrence, RecurrencePattern, RecurrencePatternKind, RecurrenceRange,
    RecurrenceRangeKind, TimeWindowSettings, WeekIndex,
};
pub use validation::validate;

// Re-export commonly used types
pub use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
