//! Calendar helpers: the `YYYY-MM` budget month and transaction date parsing.
//!
//! All boundaries are computed in UTC.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::{EngineError, ResultEngine};

/// A calendar month, written `YYYY-MM` on the wire and in storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        if !(1..=9999).contains(&year) {
            return Err(invalid_month(&format!("{year}-{month:02}")));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(|| invalid_month(&format!("{year:04}-{month:02}")))
    }

    /// The month containing `instant` (UTC).
    #[must_use]
    pub fn containing(instant: DateTime<Utc>) -> Self {
        let date = instant.date_naive();
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    /// The current UTC month.
    #[must_use]
    pub fn current() -> Self {
        Self::containing(Utc::now())
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.first_day.year()
    }

    #[must_use]
    pub fn month(self) -> u32 {
        self.first_day.month()
    }

    /// First instant of the month.
    #[must_use]
    pub fn start(self) -> DateTime<Utc> {
        self.first_day.and_time(NaiveTime::MIN).and_utc()
    }

    /// The following calendar month (December rolls over into January).
    pub fn next(self) -> ResultEngine<Self> {
        self.first_day
            .checked_add_months(Months::new(1))
            .map(|first_day| Self { first_day })
            .ok_or_else(|| EngineError::Validation("month out of range".to_string()))
    }

    /// Half-open `[start, end)` range covering the whole month.
    pub fn range(self) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
        Ok((self.start(), self.next()?.start()))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = EngineError;

    /// Strict `YYYY-MM`: four-digit year, two-digit month `01..=12`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| invalid_month(trimmed))?;
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if year.len() != 4 || month.len() != 2 || !all_digits(year) || !all_digits(month) {
            return Err(invalid_month(trimmed));
        }
        let year: i32 = year.parse().map_err(|_| invalid_month(trimmed))?;
        let month: u32 = month.parse().map_err(|_| invalid_month(trimmed))?;
        Self::new(year, month)
    }
}

impl TryFrom<&str> for YearMonth {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

fn invalid_month(raw: &str) -> EngineError {
    EngineError::Validation(format!("invalid month '{raw}', expected YYYY-MM"))
}

/// Parses a transaction date.
///
/// Accepts RFC 3339 timestamps (`2025-06-10T08:30:00+02:00`), naive
/// timestamps (`2025-06-10T08:30:00`, read as UTC) and plain dates
/// (`2025-06-10`, midnight UTC).
pub fn parse_occurred_at(raw: &str) -> ResultEngine<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(EngineError::Validation(format!("invalid date: {trimmed}")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn parses_and_displays_year_month() {
        let month: YearMonth = "2025-06".parse().unwrap();
        assert_eq!(month.year(), 2025);
        assert_eq!(month.month(), 6);
        assert_eq!(month.to_string(), "2025-06");
    }

    #[test]
    fn rejects_malformed_months() {
        for raw in ["", "2025", "2025-6", "2025-13", "2025-00", "25-06", "2025/06", "2025-06-01", "abcd-ef"] {
            assert!(
                matches!(raw.parse::<YearMonth>(), Err(EngineError::Validation(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn range_uses_calendar_months() {
        let feb: YearMonth = "2024-02".parse().unwrap();
        let (start, end) = feb.range().unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());

        let jan: YearMonth = "2025-01".parse().unwrap();
        let (_, end) = jan.range().unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn december_rolls_over_to_next_year() {
        let dec: YearMonth = "2025-12".parse().unwrap();
        assert_eq!(dec.next().unwrap().to_string(), "2026-01");
        let (_, end) = dec.range().unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn containing_truncates_to_first_day() {
        let instant = Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 59).unwrap();
        assert_eq!(YearMonth::containing(instant).to_string(), "2025-06");
    }

    #[test]
    fn parses_supported_date_formats() {
        let midnight = Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap();
        assert_eq!(parse_occurred_at("2025-06-10").unwrap(), midnight);
        assert_eq!(parse_occurred_at("2025-06-10T00:00:00Z").unwrap(), midnight);
        assert_eq!(
            parse_occurred_at("2025-06-10T02:00:00+02:00").unwrap(),
            midnight
        );
        assert_eq!(parse_occurred_at("2025-06-10T00:00:00").unwrap(), midnight);
        assert!(parse_occurred_at("10/06/2025").is_err());
    }
}
