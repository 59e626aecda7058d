use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{de::Visitor, Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// Nominal wall clock time of a reminder, `HH:MM` on a 24 hour clock.
///
/// Always minute aligned and always within 00:00..=23:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

#[derive(Error, Debug, PartialEq)]
pub enum InvalidTimeOfDayError {
    #[error("Time of day: `{0}` is malformed, expected HH:MM")]
    Malformed(String),
    #[error("Time of day: `{0}` is out of range")]
    OutOfRange(String),
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Result<Self, InvalidTimeOfDayError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| InvalidTimeOfDayError::OutOfRange(format!("{}:{}", hour, minute)))
    }

    /// The time of day of `at`, dropping seconds
    pub fn at(at: NaiveDateTime) -> Self {
        let time = at.time();
        Self(NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time))
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// The same minute on the other half of the day, wrapping past midnight
    pub fn complement(&self) -> Self {
        let (shifted, _) = self.0.overflowing_add_signed(Duration::hours(12));
        Self(shifted)
    }

    /// This time of day on the given date
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.0)
    }

    /// 12 hour clock rendering, e.g. `8:05 AM`
    pub fn to_12_hour_string(&self) -> String {
        let hour = self.hour();
        let am_pm = if hour >= 12 { "PM" } else { "AM" };
        let display_hour = match hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{}:{:02} {}", display_hour, self.minute(), am_pm)
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = InvalidTimeOfDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidTimeOfDayError::Malformed(s.to_string());
        let (hours, minutes) = s.trim().split_once(':').ok_or_else(malformed)?;
        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
            return Err(malformed());
        }
        if !digits(hours) || !digits(minutes) {
            return Err(malformed());
        }
        let hour = hours.parse::<u32>().map_err(|_| malformed())?;
        let minute = minutes.parse::<u32>().map_err(|_| malformed())?;
        Self::new(hour, minute).map_err(|_| InvalidTimeOfDayError::OutOfRange(s.to_string()))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct TimeOfDayVisitor;

        impl<'de> Visitor<'de> for TimeOfDayVisitor {
            type Value = TimeOfDay;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("A time of day formatted as HH:MM")
            }

            fn visit_str<E>(self, value: &str) -> Result<TimeOfDay, E>
            where
                E: serde::de::Error,
            {
                value
                    .parse::<TimeOfDay>()
                    .map_err(|_| E::custom(format!("Malformed time of day: {}", value)))
            }
        }

        deserializer.deserialize_str(TimeOfDayVisitor)
    }
}
