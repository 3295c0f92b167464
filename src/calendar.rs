//! Calendar primitives for occurrence arithmetic
//!
//! Small date helpers the recurrence engine is built from. Month and year
//! stepping delegate to chrono's clamping arithmetic (a trailing day that
//! does not exist in the target month becomes that month's last day); none
//! of it is hand-rolled.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::settings::{DayOfWeek, WeekIndex};

/// Step a date forward by whole months, clamping the day to the target
/// month's length. Jan 31 + 1 month is Feb 28 (or 29).
///
/// Returns `None` when the result would leave chrono's representable range.
pub(crate) fn add_months(date: NaiveDate, months: u64) -> Option<NaiveDate> {
    let months = u32::try_from(months).ok()?;
    date.checked_add_months(Months::new(months))
}

/// Step a date forward by whole years, with the same clamping rule
/// (Feb 29 + 1 year is Feb 28).
pub(crate) fn add_years(date: NaiveDate, years: u64) -> Option<NaiveDate> {
    add_months(date, years.checked_mul(12)?)
}

/// The `index`-th occurrence of `weekday` within the given month.
///
/// `Last` resolves to the fifth occurrence when the month has five,
/// otherwise to the fourth.
pub(crate) fn nth_weekday_of(
    year: i32,
    month: u32,
    index: WeekIndex,
    weekday: DayOfWeek,
) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days_until = DayOfWeek::from(first.weekday()).days_since(DayOfWeek::Sunday);
    let days_until = (weekday.days_from_sunday() + 7 - days_until) % 7;

    let first_occurrence = first.checked_add_days(Days::new(u64::from(days_until)))?;
    let candidate =
        first_occurrence.checked_add_days(Days::new(u64::from(7 * index.offset_weeks())))?;

    if candidate.month() == month {
        Some(candidate)
    } else {
        // only Last can overshoot; a month always has a 4th occurrence
        first_occurrence.checked_add_days(Days::new(21))
    }
}

/// The earliest `index`-th-weekday date within the month among the selected
/// weekdays. This date is the month's single occurrence for relative
/// patterns.
pub(crate) fn earliest_nth_weekday_of(
    year: i32,
    month: u32,
    index: WeekIndex,
    days_of_week: &[DayOfWeek],
) -> Option<NaiveDate> {
    days_of_week
        .iter()
        .filter_map(|&day| nth_weekday_of(year, month, index, day))
        .min()
}

/// Selected weekdays sorted by their distance from `first_day_of_week`, i.e.
/// in the order they occur within one week of the schedule.
pub(crate) fn sorted_days_of_week(
    days_of_week: &[DayOfWeek],
    first_day_of_week: DayOfWeek,
) -> Vec<DayOfWeek> {
    let mut sorted: Vec<DayOfWeek> = days_of_week.to_vec();
    sorted.sort_by_key(|day| day.days_since(first_day_of_week));
    sorted.dedup();
    sorted
}

/// Minimum number of days between two consecutive occurrences of a weekly
/// schedule, including the wrap-around gap from the last selected weekday of
/// one interval to the first selected weekday of the next.
///
/// A window longer than this gap would overlap the next occurrence.
pub(crate) fn min_weekly_gap_days(sorted_days: &[DayOfWeek], interval: u32) -> Option<i64> {
    // distances are measured from the first selected day of the week
    let first = *sorted_days.first()?;
    let last = *sorted_days.last()?;

    let wrap = 7 * i64::from(interval) - i64::from(last.days_since(first));
    let within = sorted_days
        .windows(2)
        .map(|pair| i64::from(pair[1].days_since(first)) - i64::from(pair[0].days_since(first)))
        .min();

    Some(match within {
        Some(within) => within.min(wrap),
        None => wrap,
    })
}
