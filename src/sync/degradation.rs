use std::fmt;

use crate::clock::ClockReading;
use crate::error::{ClockParseError, RangeError, TimestampError};

/// A failure the engine recovered from by taking a safe fallback
///
/// Every degradation is shown to the operator together with the fallback
/// that was taken.
#[derive(Debug, Clone, PartialEq)]
pub enum Degradation {
    /// The video could not be re-encoded; the original file is used
    TranscodeSkipped { reason: String },

    /// No clock was read from the first frame
    StartClockMissing,

    /// No clock was read from the last usable frame
    EndClockMissing,

    /// The selected value matches no row of the event log
    NoMatchingRow { column: String, value: String },

    /// The matched row has no usable time of day
    Timestamp(TimestampError),

    /// The event time cannot be placed inside the video
    OutOfRange(RangeError),

    /// The jump field does not read as `HH:MM:SS`
    JumpUnparseable(ClockParseError),

    /// The computed offset lies past the end of the video
    OffsetClamped { requested: u64, duration: f64 },

    /// The player could not be started
    PlaybackFailed { reason: String },
}

impl Degradation {
    /// Whether playback falls back to the start of the video
    pub fn plays_from_start(&self) -> bool {
        matches!(
            self,
            Self::NoMatchingRow { .. } | Self::Timestamp(_) | Self::OutOfRange(_)
        )
    }

    /// Operator-facing message naming the fallback taken
    pub fn message(&self) -> String {
        match self {
            Self::TranscodeSkipped { reason } => {
                format!("Could not convert the video ({}). Using the original file.", reason)
            }
            Self::StartClockMissing => {
                "Could not read the clock on the first frame. Events cannot be located; playback starts at the beginning.".to_string()
            }
            Self::EndClockMissing => {
                "Could not read the clock on the last frame. Events cannot be validated; playback starts at the beginning.".to_string()
            }
            Self::NoMatchingRow { column, value } => {
                format!("No row has {} = '{}'. Playing from the start.", column, value)
            }
            Self::Timestamp(TimestampError::Empty { .. }) => {
                "Time string is empty. Playing from the start.".to_string()
            }
            Self::Timestamp(e) => format!("Error parsing time: {}. Playing from the start.", e),
            Self::OutOfRange(e) => {
                format!("Extracted time is out of the valid range ({}). Playing from the start.", e)
            }
            Self::JumpUnparseable(e) => format!("Ignoring jump time: {}. No jump applied.", e),
            Self::OffsetClamped { requested, duration } => format!(
                "Seek position {}s is past the end of the video ({:.0}s). Playing from the end.",
                requested, duration
            ),
            Self::PlaybackFailed { reason } => format!("Could not start playback: {}", reason),
        }
    }

    pub(crate) fn for_missing_clocks(start: Option<ClockReading>, end: Option<ClockReading>) -> Vec<Self> {
        let mut degradations = Vec::new();
        if start.is_none() {
            degradations.push(Self::StartClockMissing);
        }
        if end.is_none() {
            degradations.push(Self::EndClockMissing);
        }
        degradations
    }
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_fallback() {
        let out_of_range = Degradation::OutOfRange(RangeError::StartUnknown);
        assert!(out_of_range.plays_from_start());
        assert!(out_of_range.message().ends_with("Playing from the start."));

        let jump = Degradation::JumpUnparseable(ClockParseError {
            input: "soon".to_string(),
        });
        assert!(!jump.plays_from_start());
        assert!(jump.message().contains("No jump applied"));
    }

    #[test]
    fn test_missing_clocks() {
        let start = ClockReading::from_hms(9, 0, 0);
        assert_eq!(Degradation::for_missing_clocks(start, None), vec![Degradation::EndClockMissing]);
        assert!(Degradation::for_missing_clocks(start, start).is_empty());
        assert_eq!(Degradation::for_missing_clocks(None, None).len(), 2);
    }
}
