use thiserror::Error;

use crate::clock::ClockReading;

/// Main error type for the clocksync library
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Video error: {0}")]
    Video(#[from] VideoError),

    #[error("Text recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    #[error("Event log error: {0}")]
    EventLog(#[from] EventLogError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Video-specific errors
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Failed to open video source: {path} ({reason})")]
    SourceOpen { path: String, reason: String },

    #[error("Failed to probe video: {path} ({reason})")]
    ProbeFailed { path: String, reason: String },

    #[error("Failed to decode frame {index}: {reason}")]
    DecodeFailed { index: u64, reason: String },

    #[error("Video transcoding failed: {reason}")]
    TranscodeFailed { reason: String },
}

/// Text recognition errors
#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("Recognition engine failed: {reason}")]
    EngineFailed { reason: String },

    #[error("Could not prepare frame for recognition: {reason}")]
    FrameEncoding { reason: String },
}

/// Event log errors
#[derive(Error, Debug)]
pub enum EventLogError {
    #[error("Failed to read event log: {path} ({reason})")]
    ReadFailed { path: String, reason: String },

    #[error("Unknown column: {column}")]
    UnknownColumn { column: String },
}

/// Playback collaborator errors
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Failed to launch player {player}: {reason}")]
    LaunchFailed { player: String, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Text that does not read as an `HH:MM:SS` time of day
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{input}' is not a valid HH:MM:SS time")]
pub struct ClockParseError {
    pub input: String,
}

/// Why an event record's time of day could not be read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("event log has no '{column}' column")]
    MissingColumn { column: String },

    #[error("'{column}' is empty for this event")]
    Empty { column: String },

    #[error(transparent)]
    Unparseable(#[from] ClockParseError),
}

/// Why an event time could not be mapped onto the video
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("video start time is unknown")]
    StartUnknown,

    #[error("video end time is unknown (event {event}, start {start})")]
    EndUnknown { event: ClockReading, start: ClockReading },

    #[error("event {event} is before the video start {start}")]
    BeforeStart { event: ClockReading, start: ClockReading },

    #[error("event {event} is after the video end {end}")]
    AfterEnd { event: ClockReading, end: ClockReading },
}

/// Convenience type alias for Results using SyncError
pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Whether this error halts processing of the current video
    pub fn is_fatal_to_video(&self) -> bool {
        matches!(self, Self::Video(VideoError::SourceOpen { .. }))
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Video(VideoError::SourceOpen { path, .. }) => {
                format!("Could not open video file '{}'. Processing of this video has stopped.", path)
            }
            Self::EventLog(EventLogError::ReadFailed { path, .. }) => {
                format!("Could not read event log '{}'. Please check it is a CSV file with a header row.", path)
            }
            Self::EventLog(EventLogError::UnknownColumn { column }) => {
                format!("The event log has no column named '{}'.", column)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_open_is_fatal() {
        let err: SyncError = VideoError::SourceOpen {
            path: "missing.mp4".to_string(),
            reason: "no such file".to_string(),
        }
        .into();
        assert!(err.is_fatal_to_video());
        assert!(err.user_message().contains("missing.mp4"));

        let err: SyncError = VideoError::DecodeFailed {
            index: 3,
            reason: "eof".to_string(),
        }
        .into();
        assert!(!err.is_fatal_to_video());
    }

    #[test]
    fn test_range_error_display() {
        let err = RangeError::BeforeStart {
            event: ClockReading::from_hms(8, 59, 0).unwrap(),
            start: ClockReading::from_hms(9, 0, 0).unwrap(),
        };
        assert_eq!(err.to_string(), "event 08:59:00 is before the video start 09:00:00");
    }
}
