use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration, Weekday};

use crate::ValidationError;

const CALENDAR_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Calendar date in `YYYY-MM-DD` form. Time-of-day never enters the domain:
/// all comparisons and arithmetic are whole-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarketDate(Date);

impl MarketDate {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        Date::parse(input.trim(), CALENDAR_FORMAT)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    pub const fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub const fn into_inner(self) -> Date {
        self.0
    }

    /// Shift by a signed number of calendar days.
    pub fn offset_days(self, days: i64) -> Result<Self, ValidationError> {
        self.0
            .checked_add(Duration::days(days))
            .map(Self)
            .ok_or(ValidationError::DateOutOfRange)
    }

    /// Monday through Friday; market holidays are not modeled.
    pub fn is_business_day(self) -> bool {
        !matches!(self.0.weekday(), Weekday::Saturday | Weekday::Sunday)
    }

    pub fn next_business_day(self) -> Result<Self, ValidationError> {
        let mut day = self.offset_days(1)?;
        while !day.is_business_day() {
            day = day.offset_days(1)?;
        }
        Ok(day)
    }

    /// Business days strictly after `self` through `end` inclusive, in
    /// calendar order. Empty when `end <= self`.
    pub fn business_days_through(self, end: Self) -> Result<Vec<Self>, ValidationError> {
        let mut days = Vec::new();
        if end <= self {
            return Ok(days);
        }

        let mut day = self.offset_days(1)?;
        while day <= end {
            if day.is_business_day() {
                days.push(day);
            }
            day = day.offset_days(1)?;
        }
        Ok(days)
    }

    /// Seconds since the Unix epoch at UTC midnight of this date.
    pub fn unix_midnight(self) -> i64 {
        self.0.midnight().assume_utc().unix_timestamp()
    }

    pub fn format_calendar(self) -> String {
        self.0
            .format(CALENDAR_FORMAT)
            .unwrap_or_else(|_| String::from("<unformattable>"))
    }
}

impl Display for MarketDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_calendar())
    }
}

impl Serialize for MarketDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_calendar())
    }
}

impl<'de> Deserialize<'de> for MarketDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn parses_calendar_date() {
        let parsed = MarketDate::parse("2025-12-01").expect("must parse");
        assert_eq!(parsed, MarketDate::from_date(date!(2025 - 12 - 01)));
        assert_eq!(parsed.format_calendar(), "2025-12-01");
    }

    #[test]
    fn rejects_malformed_date() {
        let err = MarketDate::parse("01/12/2025").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidDate { .. }));
    }

    #[test]
    fn weekend_is_not_a_business_day() {
        // 2025-12-06 is a Saturday.
        let saturday = MarketDate::from_date(date!(2025 - 12 - 06));
        assert!(!saturday.is_business_day());
        assert_eq!(
            saturday.next_business_day().expect("in range"),
            MarketDate::from_date(date!(2025 - 12 - 08))
        );
    }

    #[test]
    fn business_days_span_skips_weekends() {
        let monday = MarketDate::from_date(date!(2025 - 12 - 01));
        let next_monday = MarketDate::from_date(date!(2025 - 12 - 08));

        let days = monday
            .business_days_through(next_monday)
            .expect("in range");
        let rendered: Vec<String> = days.iter().map(|d| d.format_calendar()).collect();
        assert_eq!(
            rendered,
            vec![
                "2025-12-02",
                "2025-12-03",
                "2025-12-04",
                "2025-12-05",
                "2025-12-08"
            ]
        );
    }

    #[test]
    fn empty_span_when_end_does_not_exceed_start() {
        let day = MarketDate::from_date(date!(2025 - 12 - 01));
        assert!(day.business_days_through(day).expect("in range").is_empty());
    }
}
