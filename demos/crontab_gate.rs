//! Example demonstrating crontab expression matching

use chrono::NaiveDate;
use timegate::CrontabExpression;

fn main() -> anyhow::Result<()> {
    println!("=== timegate crontab example ===\n");

    // Business hours on weekdays
    let expression = CrontabExpression::parse("0 9-17 * * Mon-Fri")?;
    println!("expression: {expression}\n");

    let week = NaiveDate::from_ymd_opt(2023, 9, 4).expect("date");
    for day_offset in 0..7 {
        let day = week + chrono::Days::new(day_offset);
        for hour in [8, 12, 18] {
            let clock = day.and_hms_opt(hour, 0, 0).expect("clock");
            println!(
                "  {}  matches: {}",
                clock.format("%Y-%m-%d %A %H:%M"),
                expression.matches(&clock)
            );
        }
    }

    Ok(())
}
