//! # Wall-clock arithmetic
//!
//! The tournament lives inside a single day, so every instant is a
//! wall-clock minute. [`ClockTime`] wraps [`chrono::NaiveTime`] and is
//! serialised as the `"HH:MM"` string the rest of the system speaks.
//! Additions that would pass midnight are refused rather than wrapped;
//! the scheduler treats them as "does not fit today".
use chrono::{NaiveTime, Timelike};
use derive_more::{Add, AddAssign, Display, From, Into, Sum};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Duration in whole minutes.
///
/// Match durations and rest spans are always whole minutes in this
/// domain, there is no sub-minute timing anywhere.
#[derive(
    Default,
    Debug,
    Display,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    From,
    Into,
    Add,
    AddAssign,
    Sum,
    Serialize,
    Deserialize,
)]
pub struct Minutes(pub u32);

impl Minutes {
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Twice the duration, used by the consecutive-match guard.
    pub fn doubled(&self) -> Minutes {
        Minutes(self.0 * 2)
    }
}

/// A wall-clock instant within the tournament day.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Fallible constructor from hour and minute.
    ///
    /// # Errors
    ///
    /// Errors if `hour > 23` or `minute > 59`.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ClockError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(ClockTime)
            .ok_or(ClockError::OutOfRange { hour, minute })
    }

    pub fn minutes_from_midnight(&self) -> u32 {
        self.0.hour() * 60 + self.0.minute()
    }

    /// Advance by a duration, refusing to pass midnight.
    pub fn checked_add(&self, duration: Minutes) -> Option<ClockTime> {
        let (time, wrapped) = self
            .0
            .overflowing_add_signed(chrono::Duration::minutes(i64::from(duration.0)));
        if wrapped == 0 {
            Some(ClockTime(time))
        } else {
            None
        }
    }

    /// Step back by a duration, refusing to pass midnight.
    pub fn checked_sub(&self, duration: Minutes) -> Option<ClockTime> {
        let (time, wrapped) = self
            .0
            .overflowing_sub_signed(chrono::Duration::minutes(i64::from(duration.0)));
        if wrapped == 0 {
            Some(ClockTime(time))
        } else {
            None
        }
    }

    /// Minutes from `self` until `later`, zero when `later` is earlier.
    pub fn until(&self, later: ClockTime) -> Minutes {
        let delta = later
            .0
            .signed_duration_since(self.0)
            .num_minutes()
            .max(0);
        // Bounded by one day, the cast cannot truncate.
        Minutes(delta as u32)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for ClockTime {
    type Err = ClockError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(ClockTime)
            .map_err(|_| ClockError::Parse(String::from(s)))
    }
}

impl Serialize for ClockTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("could not parse clock time '{0}', expected HH:MM")]
    Parse(String),
    #[error("clock time {hour}:{minute} out of range")]
    OutOfRange { hour: u32, minute: u32 },
}
