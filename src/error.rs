//! Error types for the timegate library

use thiserror::Error;

use crate::crontab::CrontabFieldKind;

/// Reason tag attached to a [`ValidationError`].
///
/// The set is closed: every settings problem maps onto exactly one of these
/// four tags, and callers can match on the tag without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// A mandatory field is absent or empty.
    Required,
    /// A numeric value lies outside its domain, or the window duration
    /// exceeds the minimum gap between occurrences.
    OutOfRange,
    /// An enumeration value or time zone string does not parse.
    Unrecognizable,
    /// The start instant is not itself a valid first occurrence of the
    /// recurrence pattern.
    NotMatched,
}

impl ValidationErrorKind {
    fn describe(self) -> &'static str {
        match self {
            ValidationErrorKind::Required => "required field is missing or empty",
            ValidationErrorKind::OutOfRange => "value is out of its accepted range",
            ValidationErrorKind::Unrecognizable => "value is not recognizable",
            ValidationErrorKind::NotMatched => "start is not a valid first occurrence",
        }
    }
}

/// Error produced by [`validate`](crate::validate) when a
/// [`TimeWindowSettings`](crate::TimeWindowSettings) record breaks one of its
/// invariants.
///
/// `field` is a dotted locator into the settings record (for example
/// `recurrence.pattern.days_of_week`); `kind` is the machine-readable reason.
/// The `Display` message is derived from the pair and is not part of the
/// stable contract.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{} at `{field}`", .kind.describe())]
pub struct ValidationError {
    /// Dotted path of the offending field within the settings record.
    pub field: &'static str,
    /// Machine-readable reason tag.
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub(crate) fn required(field: &'static str) -> Self {
        Self {
            field,
            kind: ValidationErrorKind::Required,
        }
    }

    pub(crate) fn out_of_range(field: &'static str) -> Self {
        Self {
            field,
            kind: ValidationErrorKind::OutOfRange,
        }
    }

    pub(crate) fn unrecognizable(field: &'static str) -> Self {
        Self {
            field,
            kind: ValidationErrorKind::Unrecognizable,
        }
    }

    pub(crate) fn not_matched(field: &'static str) -> Self {
        Self {
            field,
            kind: ValidationErrorKind::NotMatched,
        }
    }
}

/// Error produced when a crontab expression fails to parse.
///
/// `field` names the offending field, or is `None` when the expression as a
/// whole is malformed (wrong field count). `position` is the index of the
/// whitespace-separated field token the diagnostic refers to.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "invalid crontab {} (token {position}): {reason}",
    .field.map_or("expression", CrontabFieldKind::name)
)]
pub struct CrontabParseError {
    /// Which of the five fields failed, if the failure is field-local.
    pub field: Option<CrontabFieldKind>,
    /// Token index of the field within the expression.
    pub position: usize,
    /// Diagnostic text.
    pub reason: String,
}
