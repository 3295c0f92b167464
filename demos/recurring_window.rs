//! Example demonstrating recurring time window evaluation

use chrono::{DateTime, Duration};
use timegate::{is_active, DayOfWeek, Recurrence, TimeWindow, TimeWindowSettings, WeekIndex};

fn main() -> anyhow::Result<()> {
    println!("=== timegate recurring window example ===\n");

    // A feature enabled every Monday and Wednesday, 08:00-09:00 UTC
    println!("1. Weekly window (Mon + Wed, 08:00-09:00)");
    let start = DateTime::parse_from_rfc3339("2023-09-04T08:00:00+00:00")?;
    let end = DateTime::parse_from_rfc3339("2023-09-04T09:00:00+00:00")?;

    let weekly = TimeWindowSettings::bounded(start, end)
        .repeating(Recurrence::weekly([DayOfWeek::Monday, DayOfWeek::Wednesday]).count(10));

    let mut probe = start;
    for _ in 0..10 {
        println!(
            "  {}  active: {}",
            probe.format("%Y-%m-%d %A %H:%M"),
            is_active(&weekly, probe)
        );
        probe += Duration::days(1);
    }

    // A maintenance window on the fourth Thursday of November, evaluated in
    // a fixed offset zone
    println!("\n2. Relative yearly window (4th Thursday of November, UTC+05:30)");
    let start = DateTime::parse_from_rfc3339("2023-11-23T12:00:00+05:30")?;
    let end = DateTime::parse_from_rfc3339("2023-11-23T14:00:00+05:30")?;

    let yearly = TimeWindow::new(
        TimeWindowSettings::bounded(start, end)
            .repeating(
                Recurrence::relative_yearly([DayOfWeek::Thursday], WeekIndex::Fourth, 11)
                    .time_zone("UTC+05:30"),
            ),
    )?;

    for year in [2023, 2024, 2025] {
        let probe = DateTime::parse_from_rfc3339(&format!("{year}-11-28T13:00:00+05:30"))?;
        println!(
            "  {}  active: {}",
            probe.format("%Y-%m-%d %A %H:%M"),
            yearly.is_active(probe)
        );
    }

    Ok(())
}
