//! # Clock Values
//!
//! Time-of-day readings recovered from video frames or event logs, and the
//! playback offsets derived from them. Both have whole-second resolution.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{NaiveTime, Timelike};

use crate::error::ClockParseError;

const CLOCK_FORMAT: &str = "%H:%M:%S";

/// An absolute time of day with second resolution and no date component
///
/// Ordering is plain same-day ordering: `23:59:59` sorts after `00:00:00`
/// and there is no wraparound across midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockReading(NaiveTime);

impl ClockReading {
    /// Midnight, `00:00:00`
    pub const MIDNIGHT: ClockReading = ClockReading(NaiveTime::MIN);

    /// Build a reading from its parts, rejecting out-of-range values
    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hours, minutes, seconds).map(Self)
    }

    /// Parse an `HH:MM:SS` string
    pub fn parse(text: &str) -> Result<Self, ClockParseError> {
        let trimmed = text.trim();
        let error = || ClockParseError {
            input: trimmed.to_string(),
        };
        let time = NaiveTime::parse_from_str(trimmed, CLOCK_FORMAT).map_err(|_| error())?;
        // chrono reads second 60 as a leap second
        if time.nanosecond() >= 1_000_000_000 {
            return Err(error());
        }
        Ok(Self(time))
    }

    pub fn hours(&self) -> u32 {
        self.0.hour()
    }

    pub fn minutes(&self) -> u32 {
        self.0.minute()
    }

    pub fn seconds(&self) -> u32 {
        self.0.second()
    }

    /// Seconds elapsed since midnight
    pub fn seconds_from_midnight(&self) -> u32 {
        self.0.num_seconds_from_midnight()
    }

    /// Signed number of seconds from `earlier` to `self`
    pub fn seconds_since(&self, earlier: ClockReading) -> i64 {
        (self.0 - earlier.0).num_seconds()
    }
}

impl fmt::Display for ClockReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(CLOCK_FORMAT))
    }
}

impl FromStr for ClockReading {
    type Err = ClockParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A non-negative seek position, in seconds from the start of the video
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PlaybackOffset(u64);

impl PlaybackOffset {
    pub const ZERO: PlaybackOffset = PlaybackOffset(0);

    pub fn from_secs(seconds: u64) -> Self {
        Self(seconds)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }

    /// Move the offset forward by `seconds`
    pub fn advanced_by(self, seconds: u64) -> Self {
        Self(self.0.saturating_add(seconds))
    }

    /// Limit the offset to a known video duration (in seconds)
    pub fn clamped_to(self, duration: f64) -> Self {
        if !duration.is_finite() || duration <= 0.0 {
            return Self::ZERO;
        }
        let limit = duration.floor() as u64;
        Self(self.0.min(limit))
    }
}

impl fmt::Display for PlaybackOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
