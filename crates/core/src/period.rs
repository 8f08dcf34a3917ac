//! # Period Module
//!
//! Reporting windows for the stats aggregation. Each period maps to a
//! `[start, now]` window; note that `Week` is a rolling 7 days, not
//! aligned to a calendar week.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    /// Start of the current calendar day
    Day,
    /// Rolling `now - 7 days`
    Week,
    /// First of the current month
    Month,
    /// January 1 of the current year
    Year,
}

impl StatsPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatsPeriod::Day => "day",
            StatsPeriod::Week => "week",
            StatsPeriod::Month => "month",
            StatsPeriod::Year => "year",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "day" => Some(StatsPeriod::Day),
            "week" => Some(StatsPeriod::Week),
            "month" => Some(StatsPeriod::Month),
            "year" => Some(StatsPeriod::Year),
            _ => None,
        }
    }

    /// Window start for this period, anchored at `now`.
    pub fn start_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            StatsPeriod::Day => Utc
                .with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
                .single()
                .unwrap_or(now),
            StatsPeriod::Week => now - Duration::days(7),
            StatsPeriod::Month => Utc
                .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
                .single()
                .unwrap_or(now),
            StatsPeriod::Year => Utc
                .with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
                .single()
                .unwrap_or(now),
        }
    }
}

impl fmt::Display for StatsPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_day_start() {
        let now = at(2026, 8, 30, 14, 25);
        assert_eq!(StatsPeriod::Day.start_from(now), at(2026, 8, 30, 0, 0));
    }

    #[test]
    fn test_week_is_rolling_not_calendar_aligned() {
        let now = at(2026, 8, 30, 14, 25);
        assert_eq!(StatsPeriod::Week.start_from(now), at(2026, 8, 23, 14, 25));
    }

    #[test]
    fn test_month_start() {
        let now = at(2026, 8, 30, 14, 25);
        assert_eq!(StatsPeriod::Month.start_from(now), at(2026, 8, 1, 0, 0));
    }

    #[test]
    fn test_year_start() {
        let now = at(2026, 8, 30, 14, 25);
        assert_eq!(StatsPeriod::Year.start_from(now), at(2026, 1, 1, 0, 0));
    }

    #[test]
    fn test_parse_round_trip() {
        for p in [
            StatsPeriod::Day,
            StatsPeriod::Week,
            StatsPeriod::Month,
            StatsPeriod::Year,
        ] {
            assert_eq!(StatsPeriod::parse(p.as_str()), Some(p));
        }
        assert_eq!(StatsPeriod::parse("quarter"), None);
    }
}
