use std::hint::black_box;

use chrono::DateTime;
use criterion::{criterion_group, criterion_main, Criterion};
use timegate::{CrontabExpression, DayOfWeek, Recurrence, TimeWindow, TimeWindowSettings, WeekIndex};

fn window(start: &str, end: &str, recurrence: Recurrence) -> TimeWindow {
    let start = DateTime::parse_from_rfc3339(start).expect("start");
    let end = DateTime::parse_from_rfc3339(end).expect("end");
    TimeWindow::new(TimeWindowSettings::bounded(start, end).repeating(recurrence))
        .expect("valid settings")
}

fn bench_recurrence(c: &mut Criterion) {
    let probe = DateTime::parse_from_rfc3339("2031-07-16T08:30:00+00:00").expect("probe");

    let daily = window(
        "2023-09-01T08:00:00+00:00",
        "2023-09-01T10:00:00+00:00",
        Recurrence::daily().interval(2),
    );
    c.bench_function("is_active/daily", |b| {
        b.iter(|| daily.is_active(black_box(probe)))
    });

    let weekly = window(
        "2023-09-04T08:00:00+00:00",
        "2023-09-04T09:00:00+00:00",
        Recurrence::weekly([DayOfWeek::Monday, DayOfWeek::Wednesday, DayOfWeek::Friday]),
    );
    c.bench_function("is_active/weekly", |b| {
        b.iter(|| weekly.is_active(black_box(probe)))
    });

    let monthly = window(
        "2023-09-15T08:00:00+00:00",
        "2023-09-15T09:00:00+00:00",
        Recurrence::absolute_monthly(15),
    );
    c.bench_function("is_active/absolute_monthly", |b| {
        b.iter(|| monthly.is_active(black_box(probe)))
    });

    let relative_yearly = window(
        "2023-11-23T12:00:00+00:00",
        "2023-11-23T14:00:00+00:00",
        Recurrence::relative_yearly([DayOfWeek::Thursday], WeekIndex::Fourth, 11),
    );
    c.bench_function("is_active/relative_yearly", |b| {
        b.iter(|| relative_yearly.is_active(black_box(probe)))
    });

    let settings = TimeWindowSettings::bounded(
        DateTime::parse_from_rfc3339("2023-09-01T08:00:00+00:00").expect("start"),
        DateTime::parse_from_rfc3339("2023-09-01T10:00:00+00:00").expect("end"),
    )
    .repeating(Recurrence::daily());
    c.bench_function("time_window/new", |b| {
        b.iter(|| TimeWindow::new(black_box(settings.clone())))
    });
}

fn bench_crontab(c: &mut Criterion) {
    c.bench_function("crontab/parse", |b| {
        b.iter(|| CrontabExpression::parse(black_box("*/15 8-18 * Jan-Jun Mon-Fri")))
    });

    let expression = CrontabExpression::parse("*/15 8-18 * Jan-Jun Mon-Fri").expect("parse");
    let clock = DateTime::parse_from_rfc3339("2024-03-05T10:30:00+00:00").expect("clock");
    c.bench_function("crontab/matches", |b| {
        b.iter(|| expression.matches(black_box(&clock)))
    });
}

criterion_group!(benches, bench_recurrence, bench_crontab);
criterion_main!(benches);
