//! Fixed-offset time zone handling
//!
//! Recurrence settings name their time zone as a fixed UTC offset of the
//! exact form `UTC+HH:MM` or `UTC-HH:MM` (hours `00..=14`, minutes
//! `00..=59`). This module parses that form and aligns instants into the
//! resolved offset so calendar fields (day, weekday, time of day) can be
//! read off the right wall-clock.

use chrono::{DateTime, FixedOffset};

use crate::error::ValidationError;
use crate::settings::TimeWindowSettings;

const FIELD_RECURRENCE_TIME_ZONE: &str = "recurrence.range.recurrence_time_zone";

/// Parse a time zone string of the exact form `UTC+HH:MM` or `UTC-HH:MM`.
///
/// Any other form, including whitespace, named zones and missing digits, is
/// rejected.
///
/// # Examples
///
/// ```
/// use timegate::timezone::parse_utc_offset;
///
/// let offset = parse_utc_offset("UTC+05:30").unwrap();
/// assert_eq!(offset.local_minus_utc(), (5 * 60 + 30) * 60);
/// assert!(parse_utc_offset("Asia/Kolkata").is_err());
/// assert!(parse_utc_offset("UTC+5:30").is_err());
/// ```
pub fn parse_utc_offset(zone: &str) -> Result<FixedOffset, ValidationError> {
    let unrecognizable = || ValidationError::unrecognizable(FIELD_RECURRENCE_TIME_ZONE);

    let rest = zone.strip_prefix("UTC").ok_or_else(unrecognizable)?;
    let bytes = rest.as_bytes();

    // expect exactly "+HH:MM" / "-HH:MM"
    if bytes.len() != 6 || bytes[3] != b':' {
        return Err(unrecognizable());
    }

    let negative = match bytes[0] {
        b'+' => false,
        b'-' => true,
        _ => return Err(unrecognizable()),
    };

    let digit = |b: u8| -> Result<i32, ValidationError> {
        if b.is_ascii_digit() {
            Ok(i32::from(b - b'0'))
        } else {
            Err(unrecognizable())
        }
    };

    let hours = digit(bytes[1])? * 10 + digit(bytes[2])?;
    let minutes = digit(bytes[4])? * 10 + digit(bytes[5])?;

    if hours > 14 || minutes > 59 {
        return Err(unrecognizable());
    }

    let seconds = (hours * 60 + minutes) * 60;
    let offset = if negative {
        FixedOffset::west_opt(seconds)
    } else {
        FixedOffset::east_opt(seconds)
    };

    offset.ok_or_else(unrecognizable)
}

/// Resolve the offset a recurrence is evaluated in: the parsed
/// `recurrence_time_zone` when present, otherwise the offset attached to the
/// window start.
///
/// Returns `None` when the settings carry neither a recurrence nor a start.
pub(crate) fn recurrence_offset(
    settings: &TimeWindowSettings,
) -> Result<Option<FixedOffset>, ValidationError> {
    let zone = settings
        .recurrence
        .as_ref()
        .and_then(|recurrence| recurrence.range.recurrence_time_zone.as_deref());

    match zone {
        Some(zone) => parse_utc_offset(zone).map(Some),
        None => Ok(settings.start.map(|start| *start.offset())),
    }
}

/// Re-express an instant in the given offset. The instant is unchanged; only
/// the wall-clock components move.
pub(crate) fn align(time: DateTime<FixedOffset>, offset: FixedOffset) -> DateTime<FixedOffset> {
    time.with_timezone(&offset)
}
