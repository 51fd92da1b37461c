//! Day keys and wall-clock times.
//!
//! Every calendar comparison in the crate goes through [`DayKey`], a
//! timestamp truncated to 00:00:00 UTC. Truncation happens here and nowhere
//! else: constructing or deserializing a `DayKey` from any millisecond
//! timestamp floors it to its UTC day, so equality between day keys is exact.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Milliseconds in one UTC day.
pub const MS_PER_DAY: i64 = 86_400_000;

/// Canonical day key: epoch milliseconds at UTC midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct DayKey(i64);

impl DayKey {
    /// Truncate an arbitrary epoch-millisecond timestamp to its UTC day.
    ///
    /// Floors towards negative infinity, so pre-epoch instants land on the
    /// correct (earlier) day.
    pub fn from_timestamp_ms(ms: i64) -> Self {
        Self(ms.div_euclid(MS_PER_DAY) * MS_PER_DAY)
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self::from_timestamp_ms(at.timestamp_millis())
    }

    pub fn from_naive_date(date: NaiveDate) -> Self {
        let days = date.num_days_from_ce() as i64 - EPOCH_DAYS_FROM_CE;
        Self(days * MS_PER_DAY)
    }

    /// Build from a calendar date; `None` for impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::from_naive_date)
    }

    /// Parse `YYYY-MM-DD`.
    pub fn parse_ymd(s: &str) -> Result<Self, ValidationError> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self::from_naive_date)
            .map_err(|_| ValidationError::InvalidDate(s.to_string()))
    }

    /// The UTC day containing the current instant.
    pub fn today() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn timestamp_ms(self) -> i64 {
        self.0
    }

    /// Whole days since 1970-01-01.
    pub fn days_since_epoch(self) -> i64 {
        self.0 / MS_PER_DAY
    }

    /// Weekday with Sunday = 0 through Saturday = 6.
    pub fn weekday(self) -> u8 {
        // 1970-01-01 was a Thursday.
        (self.days_since_epoch() + 4).rem_euclid(7) as u8
    }

    pub fn add_days(self, days: i64) -> Self {
        Self(self.0 + days * MS_PER_DAY)
    }

    /// Calendar date, or `None` outside chrono's representable range.
    pub fn to_naive_date(self) -> Option<NaiveDate> {
        i32::try_from(self.days_since_epoch() + EPOCH_DAYS_FROM_CE)
            .ok()
            .and_then(NaiveDate::from_num_days_from_ce_opt)
    }
}

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const EPOCH_DAYS_FROM_CE: i64 = 719_163;

impl From<i64> for DayKey {
    fn from(ms: i64) -> Self {
        Self::from_timestamp_ms(ms)
    }
}

impl From<DayKey> for i64 {
    fn from(day: DayKey) -> Self {
        day.0
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_naive_date() {
            Some(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            None => write!(f, "@{}ms", self.0),
        }
    }
}

/// Local wall-clock time of day in minutes since midnight, written `HH:MM`.
///
/// `24:00` is accepted as the end of the day so a slot can run to midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);
    pub const END_OF_DAY: ClockTime = ClockTime(24 * 60);

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes <= 24 * 60).then_some(Self(minutes))
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidClockTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let hours: u16 = h.parse().map_err(|_| invalid())?;
        let minutes: u16 = m.parse().map_err(|_| invalid())?;
        if minutes >= 60 || hours > 24 || (hours == 24 && minutes != 0) {
            return Err(invalid());
        }
        Ok(Self(hours * 60 + minutes))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ClockTime> for String {
    fn from(t: ClockTime) -> Self {
        t.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}
