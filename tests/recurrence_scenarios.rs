//! Scenario tests for recurring time window evaluation
//!
//! Each block pins the observable behavior of one pattern kind against
//! hand-checked calendar facts (weekday positions, leap years, month
//! lengths).

use chrono::{DateTime, FixedOffset, NaiveDate};
use timegate::{is_active, DayOfWeek, Recurrence, TimeWindow, TimeWindowSettings, WeekIndex};

fn instant(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339).expect("test instant")
}

fn window(start: &str, end: &str, recurrence: Recurrence) -> TimeWindowSettings {
    TimeWindowSettings::bounded(instant(start), instant(end)).repeating(recurrence)
}

#[test]
fn test_daily_every_other_day() {
    let settings = window(
        "2023-09-01T08:00:00+00:00",
        "2023-09-01T10:00:00+00:00",
        Recurrence::daily().interval(2),
    );

    // on-interval day
    assert!(is_active(&settings, instant("2023-09-03T09:00:00+00:00")));
    // off-interval day
    assert!(!is_active(&settings, instant("2023-09-02T09:00:00+00:00")));
    // before the first occurrence
    assert!(!is_active(&settings, instant("2023-08-31T09:00:00+00:00")));
}

#[test]
fn test_weekly_monday_and_wednesday() {
    // 2023-09-04 is a Monday
    let settings = window(
        "2023-09-04T08:00:00+00:00",
        "2023-09-04T09:00:00+00:00",
        Recurrence::weekly([DayOfWeek::Monday, DayOfWeek::Wednesday]),
    );

    // the Wednesday of start's week
    assert!(is_active(&settings, instant("2023-09-06T08:30:00+00:00")));
    // Tuesday never matches
    assert!(!is_active(&settings, instant("2023-09-05T08:30:00+00:00")));
    // Wednesday after the window closed
    assert!(!is_active(&settings, instant("2023-09-06T09:00:00+00:00")));
    // the following Monday
    assert!(is_active(&settings, instant("2023-09-11T08:15:00+00:00")));
}

#[test]
fn test_weekly_numbered_range_cuts_off_fourth_occurrence() {
    // Mon/Wed weekly starting Monday 2023-09-04. Occurrence order:
    // Sep 4 (1st), Sep 6 (2nd), Sep 11 (3rd), Sep 13 (4th). A range of
    // three keeps the third and rejects the fourth.
    let settings = window(
        "2023-09-04T08:00:00+00:00",
        "2023-09-04T09:00:00+00:00",
        Recurrence::weekly([DayOfWeek::Monday, DayOfWeek::Wednesday]).count(3),
    );

    assert!(is_active(&settings, instant("2023-09-06T08:30:00+00:00")));
    assert!(is_active(&settings, instant("2023-09-11T08:30:00+00:00")));
    assert!(!is_active(&settings, instant("2023-09-13T08:30:00+00:00")));
    assert!(!is_active(&settings, instant("2023-09-20T08:30:00+00:00")));
}

#[test]
fn test_weekly_first_day_of_week_moves_interval_boundary() {
    // Biweekly Sunday schedule. With the week starting on Monday, start's
    // interval runs through the following Sunday; with the week starting on
    // Sunday the boundary falls differently and shifts which Sundays match.
    // 2023-09-03 is a Sunday.
    let monday_first = window(
        "2023-09-03T10:00:00+00:00",
        "2023-09-03T11:00:00+00:00",
        Recurrence::weekly([DayOfWeek::Sunday])
            .interval(2)
            .first_day_of_week(DayOfWeek::Monday),
    );

    // with Monday as first day, Sep 3 closes its week; the next interval
    // spans Sep 4-17 and its Sunday is Sep 17
    assert!(is_active(&monday_first, instant("2023-09-17T10:30:00+00:00")));
    assert!(!is_active(&monday_first, instant("2023-09-10T10:30:00+00:00")));

    let sunday_first = window(
        "2023-09-03T10:00:00+00:00",
        "2023-09-03T11:00:00+00:00",
        Recurrence::weekly([DayOfWeek::Sunday]).interval(2),
    );

    // with Sunday as first day, start sits at the head of a full two-week
    // interval; the next matching Sunday is also Sep 17
    assert!(is_active(&sunday_first, instant("2023-09-17T10:30:00+00:00")));
    assert!(!is_active(&sunday_first, instant("2023-09-10T10:30:00+00:00")));
    assert!(!is_active(&sunday_first, instant("2023-09-24T10:30:00+00:00")));
}

#[test]
fn test_absolute_monthly_mid_month() {
    let settings = window(
        "2023-01-15T12:00:00+00:00",
        "2023-01-15T13:00:00+00:00",
        Recurrence::absolute_monthly(15),
    );

    assert!(is_active(&settings, instant("2023-02-15T12:30:00+00:00")));
    assert!(is_active(&settings, instant("2023-12-15T12:00:00+00:00")));
    assert!(!is_active(&settings, instant("2023-02-14T12:30:00+00:00")));
    assert!(!is_active(&settings, instant("2023-02-15T13:00:00+00:00")));
}

#[test]
fn test_absolute_monthly_quarterly() {
    let settings = window(
        "2023-01-10T00:00:00+00:00",
        "2023-01-10T01:00:00+00:00",
        Recurrence::absolute_monthly(10).interval(3),
    );

    assert!(is_active(&settings, instant("2023-04-10T00:30:00+00:00")));
    assert!(!is_active(&settings, instant("2023-03-10T00:30:00+00:00")));
    assert!(is_active(&settings, instant("2024-01-10T00:30:00+00:00")));
}

#[test]
fn test_relative_monthly_first_friday() {
    // 2023-09-01 is the first Friday of September
    let settings = window(
        "2023-09-01T08:00:00+00:00",
        "2023-09-01T09:00:00+00:00",
        Recurrence::relative_monthly([DayOfWeek::Friday], WeekIndex::First),
    );

    // first Friday of October is the 6th
    assert!(is_active(&settings, instant("2023-10-06T08:30:00+00:00")));
    // the second Friday of October is not an occurrence
    assert!(!is_active(&settings, instant("2023-10-13T08:30:00+00:00")));
}

#[test]
fn test_relative_monthly_earliest_of_selected_days() {
    // Multiple selected weekdays: only the earliest matching date of the
    // month fires, once per interval.
    // 2023-09-01 is a Friday, the first Monday of September is the 4th.
    let settings = window(
        "2023-09-01T08:00:00+00:00",
        "2023-09-01T09:00:00+00:00",
        Recurrence::relative_monthly(
            [DayOfWeek::Monday, DayOfWeek::Friday],
            WeekIndex::First,
        ),
    );

    // October: first Monday is the 2nd, first Friday the 6th; the Monday wins
    assert!(is_active(&settings, instant("2023-10-02T08:30:00+00:00")));
    assert!(!is_active(&settings, instant("2023-10-06T08:30:00+00:00")));
}

#[test]
fn test_absolute_yearly_leap_day() {
    let settings = window(
        "2020-02-29T00:00:00+00:00",
        "2020-02-29T01:00:00+00:00",
        Recurrence::absolute_yearly(2, 29),
    );

    // no Feb 29 in 2021
    assert!(!is_active(&settings, instant("2021-02-28T00:30:00+00:00")));
    assert!(!is_active(&settings, instant("2021-03-01T00:30:00+00:00")));
    // the next leap year fires
    assert!(is_active(&settings, instant("2024-02-29T00:30:00+00:00")));
}

#[test]
fn test_relative_yearly_fourth_thursday_of_november() {
    // Thanksgiving-shaped schedule. 2023-11-23 is the fourth Thursday.
    let settings = window(
        "2023-11-23T12:00:00+00:00",
        "2023-11-23T14:00:00+00:00",
        Recurrence::relative_yearly([DayOfWeek::Thursday], WeekIndex::Fourth, 11),
    );

    assert!(is_active(&settings, instant("2023-11-23T13:00:00+00:00")));
    // 2024-11-28 is the fourth Thursday of November 2024
    assert!(is_active(&settings, instant("2024-11-28T12:30:00+00:00")));
    assert!(!is_active(&settings, instant("2024-11-21T12:30:00+00:00")));
    // earlier in the year, the previous occurrence is last November's
    assert!(!is_active(&settings, instant("2024-06-23T13:00:00+00:00")));
}

#[test]
fn test_recurrence_time_zone_shifts_the_calendar() {
    // Daily 09:00-10:00 in UTC+05:30, with start expressed in UTC
    let settings = window(
        "2023-09-01T03:30:00+00:00",
        "2023-09-01T04:30:00+00:00",
        Recurrence::daily().time_zone("UTC+05:30"),
    );

    // next day, 09:30 local = 04:00 UTC
    assert!(is_active(&settings, instant("2023-09-02T04:00:00+00:00")));
    assert!(!is_active(&settings, instant("2023-09-02T05:00:00+00:00")));
}

#[test]
fn test_recurrence_time_zone_decides_the_weekday() {
    // 2023-09-01T20:00Z is Friday in UTC but already Saturday 01:30 in
    // UTC+05:30; the weekly pattern evaluates in the recurrence zone
    let settings = window(
        "2023-09-01T20:00:00+00:00",
        "2023-09-01T21:00:00+00:00",
        Recurrence::weekly([DayOfWeek::Saturday]).time_zone("UTC+05:30"),
    );

    assert!(is_active(&settings, instant("2023-09-01T20:30:00+00:00")));
    // one week later, same wall-clock
    assert!(is_active(&settings, instant("2023-09-08T20:30:00+00:00")));
}

#[test]
fn test_end_date_is_a_date_in_the_recurrence_zone() {
    let end_date = NaiveDate::from_ymd_opt(2023, 9, 10).expect("date");
    let settings = window(
        "2023-09-01T08:00:00+00:00",
        "2023-09-01T09:00:00+00:00",
        Recurrence::daily().until(end_date),
    );

    assert!(is_active(&settings, instant("2023-09-10T08:30:00+00:00")));
    assert!(!is_active(&settings, instant("2023-09-11T08:30:00+00:00")));
}

#[test]
fn test_numbered_daily_range() {
    let settings = window(
        "2023-09-01T08:00:00+00:00",
        "2023-09-01T09:00:00+00:00",
        Recurrence::daily().count(5),
    );

    // fifth occurrence (Sep 5) is the last included one
    assert!(is_active(&settings, instant("2023-09-05T08:30:00+00:00")));
    assert!(!is_active(&settings, instant("2023-09-06T08:30:00+00:00")));
}

#[test]
fn test_query_offset_never_matters() {
    let settings = window(
        "2023-09-04T08:00:00+00:00",
        "2023-09-04T09:00:00+00:00",
        Recurrence::weekly([DayOfWeek::Monday, DayOfWeek::Wednesday]),
    );

    // the same instant expressed in three offsets
    for query in [
        "2023-09-06T08:30:00+00:00",
        "2023-09-06T14:00:00+05:30",
        "2023-09-06T00:30:00-08:00",
    ] {
        assert!(is_active(&settings, instant(query)), "{query}");
    }
}

#[test]
fn test_validated_window_agrees_with_free_function() {
    let settings = window(
        "2023-09-01T08:00:00+00:00",
        "2023-09-01T10:00:00+00:00",
        Recurrence::daily().interval(2).count(10),
    );
    let evaluator = TimeWindow::new(settings.clone()).expect("valid settings");

    for query in [
        "2023-09-01T08:00:00+00:00",
        "2023-09-03T09:59:59+00:00",
        "2023-09-04T09:00:00+00:00",
        "2023-09-19T08:00:00+00:00",
        "2023-09-21T08:00:00+00:00",
        "2024-01-01T09:00:00+00:00",
    ] {
        let time = instant(query);
        assert_eq!(evaluator.is_active(time), is_active(&settings, time), "{query}");
    }
}
