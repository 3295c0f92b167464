//! Settings records for time window filters
//!
//! These are the fully-typed values the engine evaluates. A configuration
//! collaborator is expected to deserialize them (the serde names follow the
//! PascalCase feature-management configuration schema) and hand them over;
//! the engine itself never touches a configuration tree.

use chrono::{DateTime, FixedOffset, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Day of the week, numbered from Sunday (`Sunday = 0` through
/// `Saturday = 6`).
///
/// Recurrence settings use Sunday-based numbering throughout, which is why
/// the crate owns this enum instead of exposing [`chrono::Weekday`] (whose
/// numbering is Monday-based) in its data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    /// Days counted from Sunday, in `0..=6`.
    pub fn days_from_sunday(self) -> u32 {
        self as u32
    }

    /// Number of days from `first_day` up to and including this weekday
    /// within one week, in `0..=6`.
    pub(crate) fn days_since(self, first_day: DayOfWeek) -> u32 {
        (self.days_from_sunday() + 7 - first_day.days_from_sunday()) % 7
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => DayOfWeek::Sunday,
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
        }
    }
}

impl From<DayOfWeek> for Weekday {
    fn from(day: DayOfWeek) -> Self {
        match day {
            DayOfWeek::Sunday => Weekday::Sun,
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
        }
    }
}

/// Which occurrence of a weekday within a month a relative pattern refers to.
///
/// `Last` means the fifth occurrence when the month has five, otherwise the
/// fourth.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum WeekIndex {
    #[default]
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl WeekIndex {
    /// Whole weeks to skip past the first matching weekday of the month.
    pub(crate) fn offset_weeks(self) -> u32 {
        self as u32
    }
}

/// How a recurring window repeats.
///
/// The interval is common to every pattern kind; the kind-specific fields
/// ride on [`RecurrencePatternKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecurrencePattern {
    /// Number of pattern units (days, weeks, months or years) between two
    /// consecutive occurrences. Must be at least 1.
    #[serde(default = "default_interval")]
    pub interval: u32,

    /// The pattern kind and its fields.
    #[serde(flatten)]
    pub kind: RecurrencePatternKind,
}

fn default_interval() -> u32 {
    1
}

/// The six supported recurrence pattern kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum RecurrencePatternKind {
    /// Repeats every `interval` days.
    Daily,

    /// Repeats on the selected weekdays, every `interval` weeks.
    #[serde(rename_all = "PascalCase")]
    Weekly {
        /// Weekdays on which the window opens. Must not be empty.
        days_of_week: Vec<DayOfWeek>,
        /// Weekday at which a new weekly interval begins. Determines interval
        /// boundaries only, not which weekdays match.
        #[serde(default = "default_first_day_of_week")]
        first_day_of_week: DayOfWeek,
    },

    /// Repeats on a fixed day of the month, every `interval` months.
    #[serde(rename_all = "PascalCase")]
    AbsoluteMonthly {
        /// Day of the month in `1..=31`.
        day_of_month: u32,
    },

    /// Repeats on the nth selected weekday of the month, every `interval`
    /// months.
    #[serde(rename_all = "PascalCase")]
    RelativeMonthly {
        /// Candidate weekdays; the earliest matching date in the month is the
        /// occurrence. Must not be empty.
        days_of_week: Vec<DayOfWeek>,
        #[serde(default)]
        index: WeekIndex,
    },

    /// Repeats on a fixed month and day, every `interval` years.
    #[serde(rename_all = "PascalCase")]
    AbsoluteYearly {
        /// Month in `1..=12`.
        month: u32,
        /// Day of the month in `1..=31`.
        day_of_month: u32,
    },

    /// Repeats on the nth selected weekday of a fixed month, every `interval`
    /// years.
    #[serde(rename_all = "PascalCase")]
    RelativeYearly {
        /// Candidate weekdays; the earliest matching date in the month is the
        /// occurrence. Must not be empty.
        days_of_week: Vec<DayOfWeek>,
        #[serde(default)]
        index: WeekIndex,
        /// Month in `1..=12`.
        month: u32,
    },
}

fn default_first_day_of_week() -> DayOfWeek {
    DayOfWeek::Sunday
}

/// How long a recurrence keeps producing occurrences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecurrenceRange {
    /// The bound kind.
    #[serde(flatten)]
    pub kind: RecurrenceRangeKind,

    /// Time zone the recurrence is evaluated in, of the exact form
    /// `UTC+HH:MM` or `UTC-HH:MM`. When absent, the offset of the window
    /// start is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_time_zone: Option<String>,
}

/// The three supported range kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum RecurrenceRangeKind {
    /// The recurrence never stops.
    #[default]
    NoEnd,

    /// Occurrences starting after `end_date` (a date in the recurrence time
    /// zone) are excluded.
    #[serde(rename_all = "PascalCase")]
    EndDate { end_date: NaiveDate },

    /// Only the first `number_of_occurrences` occurrences are included.
    #[serde(rename_all = "PascalCase")]
    Numbered { number_of_occurrences: u32 },
}

/// A recurrence rule: a pattern plus a range bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Recurrence {
    pub pattern: RecurrencePattern,
    #[serde(default)]
    pub range: RecurrenceRange,
}

impl Recurrence {
    fn new(kind: RecurrencePatternKind) -> Self {
        Self {
            pattern: RecurrencePattern { interval: 1, kind },
            range: RecurrenceRange::default(),
        }
    }

    /// Create a daily recurrence.
    ///
    /// # Examples
    ///
    /// ```
    /// use timegate::Recurrence;
    ///
    /// let every_other_day = Recurrence::daily().interval(2);
    /// ```
    pub fn daily() -> Self {
        Self::new(RecurrencePatternKind::Daily)
    }

    /// Create a weekly recurrence on the given weekdays, with the week
    /// starting on Sunday.
    ///
    /// # Examples
    ///
    /// ```
    /// use timegate::{DayOfWeek, Recurrence};
    ///
    /// let standup = Recurrence::weekly([DayOfWeek::Monday, DayOfWeek::Wednesday]);
    /// ```
    pub fn weekly(days: impl IntoIterator<Item = DayOfWeek>) -> Self {
        Self::new(RecurrencePatternKind::Weekly {
            days_of_week: days.into_iter().collect(),
            first_day_of_week: DayOfWeek::Sunday,
        })
    }

    /// Create a monthly recurrence on a fixed day of the month.
    pub fn absolute_monthly(day_of_month: u32) -> Self {
        Self::new(RecurrencePatternKind::AbsoluteMonthly { day_of_month })
    }

    /// Create a monthly recurrence on the nth matching weekday of the month.
    pub fn relative_monthly(days: impl IntoIterator<Item = DayOfWeek>, index: WeekIndex) -> Self {
        Self::new(RecurrencePatternKind::RelativeMonthly {
            days_of_week: days.into_iter().collect(),
            index,
        })
    }

    /// Create a yearly recurrence on a fixed month and day.
    pub fn absolute_yearly(month: u32, day_of_month: u32) -> Self {
        Self::new(RecurrencePatternKind::AbsoluteYearly {
            month,
            day_of_month,
        })
    }

    /// Create a yearly recurrence on the nth matching weekday of a fixed
    /// month.
    pub fn relative_yearly(
        days: impl IntoIterator<Item = DayOfWeek>,
        index: WeekIndex,
        month: u32,
    ) -> Self {
        Self::new(RecurrencePatternKind::RelativeYearly {
            days_of_week: days.into_iter().collect(),
            index,
            month,
        })
    }

    /// Set the interval between occurrences.
    ///
    /// # Examples
    ///
    /// ```
    /// use timegate::{DayOfWeek, Recurrence};
    ///
    /// // Every 2 weeks on Friday
    /// let biweekly = Recurrence::weekly([DayOfWeek::Friday]).interval(2);
    /// ```
    pub fn interval(mut self, interval: u32) -> Self {
        self.pattern.interval = interval;
        self
    }

    /// Set the weekday at which weekly intervals begin. Ignored by
    /// non-weekly patterns.
    pub fn first_day_of_week(mut self, first_day: DayOfWeek) -> Self {
        if let RecurrencePatternKind::Weekly {
            ref mut first_day_of_week,
            ..
        } = self.pattern.kind
        {
            *first_day_of_week = first_day;
        }
        self
    }

    /// Bound the recurrence to a maximum number of occurrences.
    pub fn count(mut self, number_of_occurrences: u32) -> Self {
        self.range.kind = RecurrenceRangeKind::Numbered {
            number_of_occurrences,
        };
        self
    }

    /// Bound the recurrence to occurrences starting no later than `end_date`
    /// (a date in the recurrence time zone).
    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.range.kind = RecurrenceRangeKind::EndDate { end_date };
        self
    }

    /// Evaluate the recurrence in the given time zone, of the exact form
    /// `UTC+HH:MM` or `UTC-HH:MM`.
    pub fn time_zone(mut self, zone: impl Into<String>) -> Self {
        self.range.recurrence_time_zone = Some(zone.into());
        self
    }
}

/// Settings of a time window filter: an activation window, optionally
/// repeating.
///
/// Without a recurrence the window is a plain interval and either bound may
/// be omitted (at least one is required): a start-only window is active from
/// `start` on, an end-only window is active until `end`. With a recurrence
/// both bounds are required and `[start, end)` describes the first
/// occurrence of the repeating window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeWindowSettings {
    /// Instant at which the window (or its first occurrence) opens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<FixedOffset>>,

    /// Instant at which the window (or its first occurrence) closes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<FixedOffset>>,

    /// Optional recurrence rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

impl TimeWindowSettings {
    /// A window with both bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::DateTime;
    /// use timegate::TimeWindowSettings;
    ///
    /// let start = DateTime::parse_from_rfc3339("2024-03-01T09:00:00+00:00").unwrap();
    /// let end = DateTime::parse_from_rfc3339("2024-03-01T17:00:00+00:00").unwrap();
    /// let window = TimeWindowSettings::bounded(start, end);
    /// ```
    pub fn bounded(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            recurrence: None,
        }
    }

    /// A window that opens at `start` and never closes.
    pub fn open_from(start: DateTime<FixedOffset>) -> Self {
        Self {
            start: Some(start),
            end: None,
            recurrence: None,
        }
    }

    /// A window that is open until `end`.
    pub fn open_until(end: DateTime<FixedOffset>) -> Self {
        Self {
            start: None,
            end: Some(end),
            recurrence: None,
        }
    }

    /// Attach a recurrence rule to the window.
    pub fn repeating(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_days_since_first_day() {
        assert_eq!(DayOfWeek::Sunday.days_since(DayOfWeek::Sunday), 0);
        assert_eq!(DayOfWeek::Monday.days_since(DayOfWeek::Sunday), 1);
        assert_eq!(DayOfWeek::Sunday.days_since(DayOfWeek::Monday), 6);
        assert_eq!(DayOfWeek::Saturday.days_since(DayOfWeek::Wednesday), 3);
    }

    #[test]
    fn test_weekday_round_trip() {
        for day in [
            DayOfWeek::Sunday,
            DayOfWeek::Monday,
            DayOfWeek::Tuesday,
            DayOfWeek::Wednesday,
            DayOfWeek::Thursday,
            DayOfWeek::Friday,
            DayOfWeek::Saturday,
        ] {
            assert_eq!(DayOfWeek::from(Weekday::from(day)), day);
        }
    }

    #[test]
    fn test_fluent_recurrence() {
        let recurrence = Recurrence::weekly([DayOfWeek::Monday, DayOfWeek::Friday])
            .interval(2)
            .count(10)
            .time_zone("UTC+05:30");

        assert_eq!(recurrence.pattern.interval, 2);
        assert_eq!(
            recurrence.range.kind,
            RecurrenceRangeKind::Numbered {
                number_of_occurrences: 10
            }
        );
        assert_eq!(
            recurrence.range.recurrence_time_zone.as_deref(),
            Some("UTC+05:30")
        );
    }

    #[test]
    fn test_range_defaults_to_no_end() {
        let recurrence = Recurrence::daily();
        assert_eq!(recurrence.range.kind, RecurrenceRangeKind::NoEnd);
        assert!(recurrence.range.recurrence_time_zone.is_none());
    }
}
