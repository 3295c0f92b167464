//! Recurring time window evaluation
//!
//! The heart of the crate: given validated [`TimeWindowSettings`] and an
//! instant, decide whether the instant lies inside an active occurrence of
//! the window. The previous occurrence is computed directly from the gap
//! between the instant and the window start; occurrences are never
//! enumerated, so the cost per query is constant (weekly patterns scan at
//! most two partial weeks).
//!
//! All calendar arithmetic happens on wall-clocks aligned into the
//! recurrence time zone; comparisons between instants are offset-agnostic.

use chrono::{DateTime, Datelike, Days, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone};

use crate::calendar::{add_months, add_years, earliest_nth_weekday_of, sorted_days_of_week};
use crate::error::ValidationError;
use crate::settings::{
    DayOfWeek, RecurrencePatternKind, RecurrenceRangeKind, TimeWindowSettings, WeekIndex,
};
use crate::timezone;
use crate::validation::validate;

/// A validated, immutable time window evaluator.
///
/// Construction runs [`validate`] once and caches the derived values every
/// query needs (the recurrence offset, the aligned start, the window
/// duration and the ordered weekday set), so `is_active` itself allocates
/// nothing. The evaluator is cheap to clone and safe to share between
/// threads.
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use timegate::{Recurrence, TimeWindow, TimeWindowSettings};
///
/// let start = DateTime::parse_from_rfc3339("2024-03-04T09:00:00+00:00").unwrap();
/// let end = DateTime::parse_from_rfc3339("2024-03-04T10:00:00+00:00").unwrap();
/// let window = TimeWindow::new(
///     TimeWindowSettings::bounded(start, end).repeating(Recurrence::daily()),
/// )
/// .unwrap();
///
/// let next_week = DateTime::parse_from_rfc3339("2024-03-11T09:30:00+00:00").unwrap();
/// assert!(window.is_active(next_week));
/// ```
#[derive(Debug, Clone)]
pub struct TimeWindow {
    settings: TimeWindowSettings,
    engine: Option<Engine>,
}

impl TimeWindow {
    /// Validate the settings and build an evaluator for them.
    pub fn new(settings: TimeWindowSettings) -> Result<Self, ValidationError> {
        validate(&settings)?;
        let engine = Engine::build(&settings)?;
        Ok(Self { settings, engine })
    }

    /// Whether `time` lies inside an active occurrence of the window.
    pub fn is_active(&self, time: DateTime<FixedOffset>) -> bool {
        match &self.engine {
            Some(engine) => engine.is_active(time),
            None => {
                let after_start = self.settings.start.map_or(true, |start| time >= start);
                let before_end = self.settings.end.map_or(true, |end| time < end);
                after_start && before_end
            }
        }
    }

    /// The settings this evaluator was built from.
    pub fn settings(&self) -> &TimeWindowSettings {
        &self.settings
    }
}

/// Whether `time` lies inside an active occurrence of the window described
/// by `settings`.
///
/// Total: settings that fail [`validate`] are never active. Callers that
/// evaluate the same settings repeatedly should build a [`TimeWindow`] once
/// instead.
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use timegate::{is_active, DayOfWeek, Recurrence, TimeWindowSettings};
///
/// let start = DateTime::parse_from_rfc3339("2023-09-04T08:00:00+00:00").unwrap();
/// let end = DateTime::parse_from_rfc3339("2023-09-04T09:00:00+00:00").unwrap();
/// let settings = TimeWindowSettings::bounded(start, end)
///     .repeating(Recurrence::weekly([DayOfWeek::Monday, DayOfWeek::Wednesday]));
///
/// let wednesday = DateTime::parse_from_rfc3339("2023-09-06T08:30:00+00:00").unwrap();
/// assert!(is_active(&settings, wednesday));
/// ```
pub fn is_active(settings: &TimeWindowSettings, time: DateTime<FixedOffset>) -> bool {
    TimeWindow::new(settings.clone())
        .map(|window| window.is_active(time))
        .unwrap_or(false)
}

/// Cached state for recurring evaluation. Only built for settings that
/// carry a recurrence.
#[derive(Debug, Clone)]
struct Engine {
    /// Window start aligned into the recurrence offset.
    start: DateTime<FixedOffset>,
    /// `end - start`.
    duration: Duration,
    offset: FixedOffset,
    interval: u32,
    kind: RecurrencePatternKind,
    range: RecurrenceRangeKind,
    /// Selected weekdays in first-day-of-week order, deduplicated. Empty for
    /// non-weekly patterns.
    week_order: Vec<DayOfWeek>,
}

/// A located occurrence: its start instant (in the recurrence offset) and
/// its 0-based index on the pattern grid.
struct Occurrence {
    start: DateTime<FixedOffset>,
    index: u64,
}

impl Engine {
    fn build(settings: &TimeWindowSettings) -> Result<Option<Self>, ValidationError> {
        let Some(recurrence) = settings.recurrence.as_ref() else {
            return Ok(None);
        };
        let (Some(start), Some(end)) = (settings.start, settings.end) else {
            return Ok(None);
        };

        let offset = match timezone::recurrence_offset(settings)? {
            Some(offset) => offset,
            None => *start.offset(),
        };

        let week_order = match &recurrence.pattern.kind {
            RecurrencePatternKind::Weekly {
                days_of_week,
                first_day_of_week,
            } => sorted_days_of_week(days_of_week, *first_day_of_week),
            _ => Vec::new(),
        };

        Ok(Some(Self {
            start: timezone::align(start, offset),
            duration: end.signed_duration_since(start),
            offset,
            interval: recurrence.pattern.interval,
            kind: recurrence.pattern.kind.clone(),
            range: recurrence.range.kind.clone(),
            week_order,
        }))
    }

    fn is_active(&self, time: DateTime<FixedOffset>) -> bool {
        if time < self.start {
            return false;
        }

        let aligned = timezone::align(time, self.offset);
        let Some(occurrence) = self.previous_occurrence(aligned) else {
            return false;
        };

        if !self.within_range(&occurrence) {
            return false;
        }

        match occurrence.start.checked_add_signed(self.duration) {
            Some(window_end) => time < window_end,
            // the window reaches past the end of representable time
            None => true,
        }
    }

    fn within_range(&self, occurrence: &Occurrence) -> bool {
        match self.range {
            RecurrenceRangeKind::NoEnd => true,
            RecurrenceRangeKind::EndDate { end_date } => {
                occurrence.start.date_naive() <= end_date
            }
            RecurrenceRangeKind::Numbered {
                number_of_occurrences,
            } => occurrence.index < u64::from(number_of_occurrences),
        }
    }

    /// The greatest occurrence start at or before `time` (both aligned into
    /// the recurrence offset), together with its index. `None` means the
    /// occurrence is not representable.
    fn previous_occurrence(&self, time: DateTime<FixedOffset>) -> Option<Occurrence> {
        match &self.kind {
            RecurrencePatternKind::Daily => self.previous_daily(time),
            RecurrencePatternKind::Weekly { .. } => self.previous_weekly(time),
            RecurrencePatternKind::AbsoluteMonthly { .. } => self.previous_monthly(time),
            RecurrencePatternKind::RelativeMonthly {
                days_of_week,
                index,
            } => self.previous_relative_monthly(time, days_of_week, *index),
            RecurrencePatternKind::AbsoluteYearly { .. } => self.previous_yearly(time),
            RecurrencePatternKind::RelativeYearly {
                days_of_week,
                index,
                month,
            } => self.previous_relative_yearly(time, days_of_week, *index, *month),
        }
    }

    fn previous_daily(&self, time: DateTime<FixedOffset>) -> Option<Occurrence> {
        let interval_seconds = i64::from(self.interval).checked_mul(86_400)?;
        let gap = time.signed_duration_since(self.start);
        let n = gap.num_seconds().div_euclid(interval_seconds);

        let start = self
            .start
            .checked_add_signed(Duration::seconds(n.checked_mul(interval_seconds)?))?;

        Some(Occurrence {
            start,
            index: u64::try_from(n).ok()?,
        })
    }

    fn previous_weekly(&self, time: DateTime<FixedOffset>) -> Option<Occurrence> {
        let days = &self.week_order;
        let first_day = match self.kind {
            RecurrencePatternKind::Weekly {
                first_day_of_week, ..
            } => first_day_of_week,
            _ => DayOfWeek::Sunday,
        };

        let interval = i64::from(self.interval);
        let start_date = self.start.date_naive();
        let start_day = DayOfWeek::from(self.start.weekday());

        // days from start until the next first-day-of-week midnight, 1..=7
        let to_boundary = 7 - i64::from(start_day.days_since(first_day));
        let time_of_day = self.start.time() - NaiveTime::MIN;
        let remaining_first = Duration::days(to_boundary + (interval - 1) * 7) - time_of_day;

        let gap = time.signed_duration_since(self.start);

        if gap < remaining_first {
            // still inside the first interval: occurrences live in start's
            // partial week
            let mut matched: u64 = 0;
            let mut previous = None;
            for day_offset in 0..to_boundary {
                let date = start_date.checked_add_days(Days::new(u64::try_from(day_offset).ok()?))?;
                if !days.contains(&DayOfWeek::from(date.weekday())) {
                    continue;
                }
                let occurrence = self.at_start_time(date)?;
                if occurrence > time {
                    break;
                }
                matched += 1;
                previous = Some(occurrence);
            }
            // start itself always matches
            let previous = previous?;
            return Some(Occurrence {
                start: previous,
                index: matched.checked_sub(1)?,
            });
        }

        let interval_days = interval.checked_mul(7)?;
        let interval_seconds = interval_days.checked_mul(86_400)?;
        let n = (gap - remaining_first)
            .num_seconds()
            .div_euclid(interval_seconds);

        // midnight of the occurring week of the current interval
        let boundary = self
            .start
            .checked_add_signed(remaining_first)?
            .checked_add_signed(Duration::seconds(n.checked_mul(interval_seconds)?))?;
        let boundary_date = boundary.date_naive();

        // occurrences inside start's partial week, and the last of them for
        // the fallback below
        let mut first_week_matches: u64 = 0;
        let mut last_of_first_week = None;
        for day_offset in 0..to_boundary {
            let date = start_date.checked_add_days(Days::new(u64::try_from(day_offset).ok()?))?;
            if days.contains(&DayOfWeek::from(date.weekday())) {
                first_week_matches += 1;
                last_of_first_week = Some(date);
            }
        }

        // occurrences of the current interval that have already begun
        let mut current_matches: u64 = 0;
        let mut previous = None;
        for day_offset in 0..7 {
            let date = boundary_date.checked_add_days(Days::new(day_offset))?;
            if !days.contains(&DayOfWeek::from(date.weekday())) {
                continue;
            }
            let occurrence = self.at_start_time(date)?;
            if occurrence > time {
                break;
            }
            current_matches += 1;
            previous = Some(occurrence);
        }

        let n = u64::try_from(n).ok()?;
        let per_interval = days.len() as u64;
        let index = n
            .checked_mul(per_interval)?
            .checked_add(first_week_matches.checked_sub(1)?)?
            .checked_add(current_matches)?;

        let previous = match previous {
            Some(previous) => previous,
            // none of the current interval's occurrences has begun yet; the
            // previous occurrence is the last one of the previous interval
            None if n >= 1 => {
                let week_start =
                    boundary_date.checked_sub_days(Days::new(u64::try_from(interval_days).ok()?))?;
                let mut last = None;
                for day_offset in 0..7 {
                    let date = week_start.checked_add_days(Days::new(day_offset))?;
                    if days.contains(&DayOfWeek::from(date.weekday())) {
                        last = Some(date);
                    }
                }
                self.at_start_time(last?)?
            }
            None => self.at_start_time(last_of_first_week?)?,
        };

        Some(Occurrence {
            start: previous,
            index,
        })
    }

    fn previous_monthly(&self, time: DateTime<FixedOffset>) -> Option<Occurrence> {
        let interval = i64::from(self.interval);
        let mut month_gap = self.month_gap(time);

        if (time.day(), time.time()) < (self.start.day(), self.start.time()) {
            month_gap -= 1;
        }

        let n = month_gap.div_euclid(interval);
        let date = add_months(
            self.start.date_naive(),
            u64::try_from(n.checked_mul(interval)?).ok()?,
        )?;

        Some(Occurrence {
            start: self.at_start_time(date)?,
            index: u64::try_from(n).ok()?,
        })
    }

    fn previous_relative_monthly(
        &self,
        time: DateTime<FixedOffset>,
        days_of_week: &[DayOfWeek],
        index: WeekIndex,
    ) -> Option<Occurrence> {
        let interval = i64::from(self.interval);
        let mut month_gap = self.month_gap(time);

        // step back when the occurrence of time's own month has not begun
        let this_month =
            earliest_nth_weekday_of(time.year(), time.month(), index, days_of_week)?;
        if time < self.at_start_time(this_month)? {
            month_gap -= 1;
        }

        let n = month_gap.div_euclid(interval);
        let target = add_months(
            self.start.date_naive(),
            u64::try_from(n.checked_mul(interval)?).ok()?,
        )?;
        let date = earliest_nth_weekday_of(target.year(), target.month(), index, days_of_week)?;

        Some(Occurrence {
            start: self.at_start_time(date)?,
            index: u64::try_from(n).ok()?,
        })
    }

    fn previous_yearly(&self, time: DateTime<FixedOffset>) -> Option<Occurrence> {
        let interval = i64::from(self.interval);
        let mut year_gap = i64::from(time.year()) - i64::from(self.start.year());

        if (time.ordinal(), time.time()) < (self.start.ordinal(), self.start.time()) {
            year_gap -= 1;
        }

        let n = year_gap.div_euclid(interval);
        let date = add_years(
            self.start.date_naive(),
            u64::try_from(n.checked_mul(interval)?).ok()?,
        )?;

        Some(Occurrence {
            start: self.at_start_time(date)?,
            index: u64::try_from(n).ok()?,
        })
    }

    fn previous_relative_yearly(
        &self,
        time: DateTime<FixedOffset>,
        days_of_week: &[DayOfWeek],
        index: WeekIndex,
        month: u32,
    ) -> Option<Occurrence> {
        let interval = i64::from(self.interval);
        let mut year_gap = i64::from(time.year()) - i64::from(self.start.year());

        if time.month() < month {
            year_gap -= 1;
        } else if time.month() == month {
            let this_year = earliest_nth_weekday_of(time.year(), month, index, days_of_week)?;
            if time < self.at_start_time(this_year)? {
                year_gap -= 1;
            }
        }

        let n = year_gap.div_euclid(interval);
        let target = add_years(
            self.start.date_naive(),
            u64::try_from(n.checked_mul(interval)?).ok()?,
        )?;
        let date = earliest_nth_weekday_of(target.year(), month, index, days_of_week)?;

        Some(Occurrence {
            start: self.at_start_time(date)?,
            index: u64::try_from(n).ok()?,
        })
    }

    /// Whole months from the start's month to the time's month.
    fn month_gap(&self, time: DateTime<FixedOffset>) -> i64 {
        let years = i64::from(time.year()) - i64::from(self.start.year());
        let months = i64::from(time.month()) - i64::from(self.start.month());
        years * 12 + months
    }

    /// The given date at the start's time of day, in the recurrence offset.
    fn at_start_time(&self, date: NaiveDate) -> Option<DateTime<FixedOffset>> {
        self.offset
            .from_local_datetime(&date.and_time(self.start.time()))
            .single()
    }
}
