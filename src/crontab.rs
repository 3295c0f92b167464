//! Crontab expression parsing and matching
//!
//! A five-field crontab expression (`minute hour day-of-month month
//! day-of-week`) compiles into one set of accepted integers per field;
//! matching a wall-clock is then five set lookups. The grammar covers `*`,
//! single values, inclusive ranges, `/step` on `*` or a range, comma
//! unions, month and weekday names, and both `0` and `7` for Sunday.
//!
//! No timezone handling happens here: the caller decides which wall-clock
//! to test.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Timelike};

use crate::error::CrontabParseError;

/// Identifies one of the five crontab fields and carries its domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrontabFieldKind {
    /// `0..=59`
    Minute,
    /// `0..=23`
    Hour,
    /// `1..=31`
    DayOfMonth,
    /// `1..=12`, names `Jan..Dec`
    Month,
    /// `0..=6` counted from Sunday, names `Sun..Sat`; `7` is Sunday too
    DayOfWeek,
}

impl CrontabFieldKind {
    /// Field name as used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            CrontabFieldKind::Minute => "minute",
            CrontabFieldKind::Hour => "hour",
            CrontabFieldKind::DayOfMonth => "day-of-month",
            CrontabFieldKind::Month => "month",
            CrontabFieldKind::DayOfWeek => "day-of-week",
        }
    }

    /// Domain accepted while parsing. Day-of-week admits `7` here; it is
    /// normalized to `0` when the value set is built.
    fn parse_domain(self) -> (u8, u8) {
        match self {
            CrontabFieldKind::Minute => (0, 59),
            CrontabFieldKind::Hour => (0, 23),
            CrontabFieldKind::DayOfMonth => (1, 31),
            CrontabFieldKind::Month => (1, 12),
            CrontabFieldKind::DayOfWeek => (0, 7),
        }
    }

    /// Domain of the values a compiled field can hold.
    fn value_domain(self) -> (u8, u8) {
        match self {
            CrontabFieldKind::DayOfWeek => (0, 6),
            _ => self.parse_domain(),
        }
    }

    fn normalize(self, value: u8) -> u8 {
        if self == CrontabFieldKind::DayOfWeek && value == 7 {
            0
        } else {
            value
        }
    }

    fn alias(self, token: &str) -> Option<u8> {
        let names: &[&str] = match self {
            CrontabFieldKind::Month => &[
                "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
            ],
            CrontabFieldKind::DayOfWeek => &["sun", "mon", "tue", "wed", "thu", "fri", "sat"],
            _ => return None,
        };

        let token = token.to_ascii_lowercase();
        let position = names.iter().position(|name| *name == token)?;
        let offset = if self == CrontabFieldKind::Month { 1 } else { 0 };

        Some(position as u8 + offset)
    }
}

/// One compiled crontab field: its kind plus the set of accepted integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrontabField {
    kind: CrontabFieldKind,
    values: BTreeSet<u8>,
}

impl CrontabField {
    fn parse(kind: CrontabFieldKind, text: &str, position: usize) -> Result<Self, CrontabParseError> {
        let fail = |reason: String| CrontabParseError {
            field: Some(kind),
            position,
            reason,
        };

        let (lo, hi) = kind.parse_domain();
        let mut values = BTreeSet::new();

        for segment in text.split(',') {
            if segment.is_empty() {
                return Err(fail("empty segment".to_string()));
            }

            let (base, step) = match segment.split_once('/') {
                Some((base, step)) => {
                    let step = step
                        .parse::<u8>()
                        .map_err(|_| fail(format!("step `{step}` is not a number")))?;
                    if step == 0 {
                        return Err(fail("step must be at least 1".to_string()));
                    }
                    (base, Some(step))
                }
                None => (segment, None),
            };

            let (first, last) = if base == "*" {
                (lo, hi)
            } else if let Some((from, to)) = base.split_once('-') {
                (
                    parse_value(kind, from).map_err(&fail)?,
                    parse_value(kind, to).map_err(&fail)?,
                )
            } else {
                if step.is_some() {
                    return Err(fail(format!(
                        "step requires `*` or a range, found `{segment}`"
                    )));
                }
                let value = parse_value(kind, base).map_err(&fail)?;
                (value, value)
            };

            if first > last {
                return Err(fail(format!("range `{first}-{last}` is inverted")));
            }
            if first < lo || last > hi {
                return Err(fail(format!("values must lie within {lo}..={hi}")));
            }

            let step = step.unwrap_or(1);
            let mut value = first;
            loop {
                values.insert(kind.normalize(value));
                match value.checked_add(step) {
                    Some(next) if next <= last => value = next,
                    _ => break,
                }
            }
        }

        Ok(Self { kind, values })
    }

    /// The field this set belongs to.
    pub fn kind(&self) -> CrontabFieldKind {
        self.kind
    }

    /// Whether the field accepts `value`.
    pub fn accepts(&self, value: u8) -> bool {
        self.values.contains(&value)
    }

    /// Accepted values in ascending order.
    pub fn values(&self) -> impl Iterator<Item = u8> + '_ {
        self.values.iter().copied()
    }
}

impl fmt::Display for CrontabField {
    /// Renders the normalized form: `*` for the whole domain, otherwise
    /// sorted values with consecutive runs collapsed into ranges.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn render((start, end): (u8, u8)) -> String {
            if start == end {
                start.to_string()
            } else {
                format!("{start}-{end}")
            }
        }

        let (lo, hi) = self.kind.value_domain();
        if self.values.len() == usize::from(hi - lo) + 1 {
            return write!(f, "*");
        }

        let mut parts = Vec::new();
        let mut run: Option<(u8, u8)> = None;

        for value in self.values.iter().copied() {
            run = match run {
                Some((start, end)) if value == end + 1 => Some((start, value)),
                Some(done) => {
                    parts.push(render(done));
                    Some((value, value))
                }
                None => Some((value, value)),
            };
        }
        if let Some(done) = run {
            parts.push(render(done));
        }

        write!(f, "{}", parts.join(","))
    }
}

fn parse_value(kind: CrontabFieldKind, token: &str) -> Result<u8, String> {
    if let Some(value) = kind.alias(token) {
        return Ok(value);
    }
    token
        .parse::<u8>()
        .map_err(|_| format!("`{token}` is not a number or a {} name", kind.name()))
}

/// A parsed crontab expression.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use timegate::CrontabExpression;
///
/// let weekday_business_hours = CrontabExpression::parse("0 9-17 * * Mon-Fri").unwrap();
///
/// let tuesday = NaiveDate::from_ymd_opt(2023, 9, 5)
///     .unwrap()
///     .and_hms_opt(10, 0, 0)
///     .unwrap();
/// assert!(weekday_business_hours.matches(&tuesday));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrontabExpression {
    minute: CrontabField,
    hour: CrontabField,
    day_of_month: CrontabField,
    month: CrontabField,
    day_of_week: CrontabField,
}

impl CrontabExpression {
    /// Parse a five-field crontab expression. Fields are separated by
    /// whitespace; empty tokens are ignored.
    pub fn parse(expression: &str) -> Result<Self, CrontabParseError> {
        let tokens: Vec<&str> = expression.split_whitespace().collect();

        if tokens.len() != 5 {
            return Err(CrontabParseError {
                field: None,
                position: 0,
                reason: format!("expected 5 fields, found {}", tokens.len()),
            });
        }

        Ok(Self {
            minute: CrontabField::parse(CrontabFieldKind::Minute, tokens[0], 0)?,
            hour: CrontabField::parse(CrontabFieldKind::Hour, tokens[1], 1)?,
            day_of_month: CrontabField::parse(CrontabFieldKind::DayOfMonth, tokens[2], 2)?,
            month: CrontabField::parse(CrontabFieldKind::Month, tokens[3], 3)?,
            day_of_week: CrontabField::parse(CrontabFieldKind::DayOfWeek, tokens[4], 4)?,
        })
    }

    /// Whether all five fields accept the corresponding components of the
    /// given wall-clock.
    pub fn matches<T: Datelike + Timelike>(&self, time: &T) -> bool {
        self.minute.accepts(time.minute() as u8)
            && self.hour.accepts(time.hour() as u8)
            && self.day_of_month.accepts(time.day() as u8)
            && self.month.accepts(time.month() as u8)
            && self
                .day_of_week
                .accepts(time.weekday().num_days_from_sunday() as u8)
    }

    /// The compiled fields, in expression order.
    pub fn fields(&self) -> [&CrontabField; 5] {
        [
            &self.minute,
            &self.hour,
            &self.day_of_month,
            &self.month,
            &self.day_of_week,
        ]
    }
}

impl fmt::Display for CrontabExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.minute, self.hour, self.day_of_month, self.month, self.day_of_week
        )
    }
}

impl FromStr for CrontabExpression {
    type Err = CrontabParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::NaiveDateTime;

    fn clock(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_every_minute() {
        let expression = CrontabExpression::parse("* * * * *").unwrap();
        assert!(expression.matches(&clock("2023-09-05 10:00:00")));
        assert!(expression.matches(&clock("2024-02-29 23:59:00")));
    }

    #[test]
    fn test_step_on_star() {
        let expression = CrontabExpression::parse("*/15 * * * *").unwrap();
        assert!(expression.matches(&clock("2023-09-05 10:30:00")));
        assert!(!expression.matches(&clock("2023-09-05 10:31:00")));
    }

    #[test]
    fn test_step_on_range() {
        let expression = CrontabExpression::parse("0 8-18/2 * * *").unwrap();
        assert!(expression.matches(&clock("2023-09-05 10:00:00")));
        assert!(expression.matches(&clock("2023-09-05 18:00:00")));
        assert!(!expression.matches(&clock("2023-09-05 11:00:00")));
    }

    #[test]
    fn test_names_and_ranges() {
        let expression = CrontabExpression::parse("0 9 * Jan-Mar Mon-Fri").unwrap();
        // 2024-02-05 is a Monday
        assert!(expression.matches(&clock("2024-02-05 09:00:00")));
        // Saturday
        assert!(!expression.matches(&clock("2024-02-03 09:00:00")));
        // April
        assert!(!expression.matches(&clock("2024-04-01 09:00:00")));
    }

    #[test]
    fn test_seven_means_sunday() {
        let with_seven = CrontabExpression::parse("0 0 * * 7").unwrap();
        let with_zero = CrontabExpression::parse("0 0 * * 0").unwrap();
        assert_eq!(with_seven, with_zero);

        // 2023-09-03 is a Sunday
        assert!(with_seven.matches(&clock("2023-09-03 00:00:00")));
        assert!(!with_seven.matches(&clock("2023-09-04 00:00:00")));
    }

    #[test]
    fn test_seven_as_range_endpoint() {
        let expression = CrontabExpression::parse("0 0 * * 5-7").unwrap();
        let values: Vec<u8> = expression.fields()[4].values().collect();
        assert_eq!(values, vec![0, 5, 6]);
    }

    #[test]
    fn test_union_of_segments() {
        let expression = CrontabExpression::parse("1,5-7,*/20 * * * *").unwrap();
        let values: Vec<u8> = expression.fields()[0].values().collect();
        assert_eq!(values, vec![0, 1, 5, 6, 7, 20, 40]);
    }

    #[test]
    fn test_field_count_is_enforced() {
        let err = CrontabExpression::parse("* * * *").unwrap_err();
        assert_eq!(err.field, None);

        let err = CrontabExpression::parse("* * * * * *").unwrap_err();
        assert_eq!(err.field, None);
    }

    #[test]
    fn test_extra_whitespace_is_ignored() {
        let expression = CrontabExpression::parse("  */5   *  * *   * ").unwrap();
        assert!(expression.matches(&clock("2023-09-05 10:05:00")));
    }

    #[test]
    fn test_rejects_out_of_domain() {
        let err = CrontabExpression::parse("60 * * * *").unwrap_err();
        assert_eq!(err.field, Some(CrontabFieldKind::Minute));
        assert_eq!(err.position, 0);

        let err = CrontabExpression::parse("* 24 * * *").unwrap_err();
        assert_eq!(err.field, Some(CrontabFieldKind::Hour));

        let err = CrontabExpression::parse("* * 0 * *").unwrap_err();
        assert_eq!(err.field, Some(CrontabFieldKind::DayOfMonth));

        let err = CrontabExpression::parse("* * * 13 *").unwrap_err();
        assert_eq!(err.field, Some(CrontabFieldKind::Month));

        let err = CrontabExpression::parse("* * * * 8").unwrap_err();
        assert_eq!(err.field, Some(CrontabFieldKind::DayOfWeek));
    }

    #[test]
    fn test_rejects_malformed_segments() {
        assert!(CrontabExpression::parse("1,,2 * * * *").is_err());
        assert!(CrontabExpression::parse("*/0 * * * *").is_err());
        assert!(CrontabExpression::parse("5/2 * * * *").is_err());
        assert!(CrontabExpression::parse("7-3 * * * *").is_err());
        assert!(CrontabExpression::parse("abc * * * *").is_err());
        assert!(CrontabExpression::parse("* * * January *").is_err());
    }

    #[test]
    fn test_display_normalizes() {
        let expression = CrontabExpression::parse("0,1,2,10 */6 * Jan-Mar Sun").unwrap();
        assert_eq!(expression.to_string(), "0-2,10 0,6,12,18 * 1-3 0");

        let every = CrontabExpression::parse("* * * * *").unwrap();
        assert_eq!(every.to_string(), "* * * * *");
    }

    #[test]
    fn test_display_round_trip() {
        for source in ["*/15 * * * *", "0 9-17 * * 1-5", "1,2,3 4 5 6 0", "* * * * Sun-Sat"] {
            let parsed = CrontabExpression::parse(source).unwrap();
            let round_tripped = CrontabExpression::parse(&parsed.to_string()).unwrap();
            assert_eq!(parsed, round_tripped, "{source}");
        }
    }
}
