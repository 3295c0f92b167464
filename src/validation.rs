//! Settings validation
//!
//! Checks every invariant a [`TimeWindowSettings`] record must satisfy
//! before it can be evaluated. Validation surfaces the first failing
//! invariant only, in a fixed order, as a [`ValidationError`] carrying the
//! dotted field path and a reason tag.

use chrono::{DateTime, Datelike, Duration, FixedOffset};

use crate::calendar::{earliest_nth_weekday_of, min_weekly_gap_days, sorted_days_of_week};
use crate::error::ValidationError;
use crate::settings::{
    DayOfWeek, RecurrencePattern, RecurrencePatternKind, RecurrenceRangeKind, TimeWindowSettings,
};
use crate::timezone;

pub(crate) const FIELD_START: &str = "start";
pub(crate) const FIELD_END: &str = "end";
pub(crate) const FIELD_INTERVAL: &str = "recurrence.pattern.interval";
pub(crate) const FIELD_DAYS_OF_WEEK: &str = "recurrence.pattern.days_of_week";
pub(crate) const FIELD_DAY_OF_MONTH: &str = "recurrence.pattern.day_of_month";
pub(crate) const FIELD_MONTH: &str = "recurrence.pattern.month";
pub(crate) const FIELD_END_DATE: &str = "recurrence.range.end_date";
pub(crate) const FIELD_NUMBER_OF_OCCURRENCES: &str = "recurrence.range.number_of_occurrences";

/// Validate a settings record.
///
/// Returns the first broken invariant; later checks are not run. A record
/// that validates is safe to evaluate with [`is_active`](crate::is_active)
/// for any instant.
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use timegate::{validate, Recurrence, TimeWindowSettings};
///
/// let start = DateTime::parse_from_rfc3339("2024-03-04T09:00:00+00:00").unwrap();
/// let end = DateTime::parse_from_rfc3339("2024-03-04T10:00:00+00:00").unwrap();
/// let settings = TimeWindowSettings::bounded(start, end).repeating(Recurrence::daily());
///
/// assert!(validate(&settings).is_ok());
/// ```
pub fn validate(settings: &TimeWindowSettings) -> Result<(), ValidationError> {
    let Some(recurrence) = settings.recurrence.as_ref() else {
        // plain window: at least one bound, and the bounds must be ordered
        if settings.start.is_none() && settings.end.is_none() {
            return Err(ValidationError::required(FIELD_START));
        }
        if let (Some(start), Some(end)) = (settings.start, settings.end) {
            if end <= start {
                return Err(ValidationError::out_of_range(FIELD_END));
            }
        }
        return Ok(());
    };

    // a recurring window needs both bounds
    let start = settings
        .start
        .ok_or_else(|| ValidationError::required(FIELD_START))?;
    let end = settings
        .end
        .ok_or_else(|| ValidationError::required(FIELD_END))?;

    if end <= start {
        return Err(ValidationError::out_of_range(FIELD_END));
    }

    let pattern = &recurrence.pattern;

    if pattern.interval == 0 {
        return Err(ValidationError::out_of_range(FIELD_INTERVAL));
    }

    validate_pattern_fields(pattern)?;

    // resolving the offset also validates the time zone string
    let offset = match recurrence.range.recurrence_time_zone.as_deref() {
        Some(zone) => timezone::parse_utc_offset(zone)?,
        None => *start.offset(),
    };
    let aligned_start = timezone::align(start, offset);

    let duration = end.signed_duration_since(start);
    validate_duration(pattern, duration)?;
    validate_first_occurrence(pattern, aligned_start)?;

    match recurrence.range.kind {
        RecurrenceRangeKind::NoEnd => {}
        RecurrenceRangeKind::Numbered {
            number_of_occurrences,
        } => {
            if number_of_occurrences == 0 {
                return Err(ValidationError::out_of_range(FIELD_NUMBER_OF_OCCURRENCES));
            }
        }
        RecurrenceRangeKind::EndDate { end_date } => {
            if end_date < aligned_start.date_naive() {
                return Err(ValidationError::out_of_range(FIELD_END_DATE));
            }
        }
    }

    Ok(())
}

fn validate_pattern_fields(pattern: &RecurrencePattern) -> Result<(), ValidationError> {
    match &pattern.kind {
        RecurrencePatternKind::Daily => Ok(()),
        RecurrencePatternKind::Weekly { days_of_week, .. }
        | RecurrencePatternKind::RelativeMonthly { days_of_week, .. } => {
            require_days(days_of_week)
        }
        RecurrencePatternKind::AbsoluteMonthly { day_of_month } => {
            require_day_of_month(*day_of_month)
        }
        RecurrencePatternKind::AbsoluteYearly {
            month,
            day_of_month,
        } => {
            require_month(*month)?;
            require_day_of_month(*day_of_month)
        }
        RecurrencePatternKind::RelativeYearly {
            days_of_week,
            month,
            ..
        } => {
            require_days(days_of_week)?;
            require_month(*month)
        }
    }
}

fn require_days(days_of_week: &[DayOfWeek]) -> Result<(), ValidationError> {
    if days_of_week.is_empty() {
        Err(ValidationError::required(FIELD_DAYS_OF_WEEK))
    } else {
        Ok(())
    }
}

fn require_day_of_month(day_of_month: u32) -> Result<(), ValidationError> {
    if (1..=31).contains(&day_of_month) {
        Ok(())
    } else {
        Err(ValidationError::out_of_range(FIELD_DAY_OF_MONTH))
    }
}

fn require_month(month: u32) -> Result<(), ValidationError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(ValidationError::out_of_range(FIELD_MONTH))
    }
}

/// The window must be shorter than any possible gap between two consecutive
/// occurrences, so that occurrences never overlap. Month and year based
/// patterns use conservative lower bounds (28 and 365 days).
fn validate_duration(pattern: &RecurrencePattern, duration: Duration) -> Result<(), ValidationError> {
    let interval = i64::from(pattern.interval);

    let bound_days = match &pattern.kind {
        RecurrencePatternKind::Daily => interval,
        RecurrencePatternKind::Weekly { .. } => interval * 7,
        RecurrencePatternKind::AbsoluteMonthly { .. }
        | RecurrencePatternKind::RelativeMonthly { .. } => interval * 28,
        RecurrencePatternKind::AbsoluteYearly { .. }
        | RecurrencePatternKind::RelativeYearly { .. } => interval * 365,
    };

    // a bound beyond chrono's representable span cannot be exceeded
    if let Some(bound) = Duration::try_days(bound_days) {
        if duration > bound {
            return Err(ValidationError::out_of_range(FIELD_END));
        }
    }

    if let RecurrencePatternKind::Weekly {
        days_of_week,
        first_day_of_week,
    } = &pattern.kind
    {
        let sorted = sorted_days_of_week(days_of_week, *first_day_of_week);
        if let Some(gap) = min_weekly_gap_days(&sorted, pattern.interval) {
            if duration > Duration::days(gap) {
                return Err(ValidationError::out_of_range(FIELD_END));
            }
        }
    }

    Ok(())
}

/// The aligned start must itself be a valid first occurrence of the pattern.
fn validate_first_occurrence(
    pattern: &RecurrencePattern,
    aligned_start: DateTime<FixedOffset>,
) -> Result<(), ValidationError> {
    let not_matched = || ValidationError::not_matched(FIELD_START);

    match &pattern.kind {
        RecurrencePatternKind::Daily => Ok(()),
        RecurrencePatternKind::Weekly { days_of_week, .. } => {
            if days_of_week.contains(&DayOfWeek::from(aligned_start.weekday())) {
                Ok(())
            } else {
                Err(not_matched())
            }
        }
        RecurrencePatternKind::AbsoluteMonthly { day_of_month } => {
            if aligned_start.day() == *day_of_month {
                Ok(())
            } else {
                Err(not_matched())
            }
        }
        RecurrencePatternKind::RelativeMonthly {
            days_of_week,
            index,
        } => {
            let expected = earliest_nth_weekday_of(
                aligned_start.year(),
                aligned_start.month(),
                *index,
                days_of_week,
            );
            if expected == Some(aligned_start.date_naive()) {
                Ok(())
            } else {
                Err(not_matched())
            }
        }
        RecurrencePatternKind::AbsoluteYearly {
            month,
            day_of_month,
        } => {
            if aligned_start.month() == *month && aligned_start.day() == *day_of_month {
                Ok(())
            } else {
                Err(not_matched())
            }
        }
        RecurrencePatternKind::RelativeYearly {
            days_of_week,
            index,
            month,
        } => {
            if aligned_start.month() != *month {
                return Err(not_matched());
            }
            let expected =
                earliest_nth_weekday_of(aligned_start.year(), *month, *index, days_of_week);
            if expected == Some(aligned_start.date_naive()) {
                Ok(())
            } else {
                Err(not_matched())
            }
        }
    }
}
