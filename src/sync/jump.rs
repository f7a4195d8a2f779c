use std::fmt;

use crate::clock::{ClockReading, PlaybackOffset};
use crate::error::ClockParseError;
use crate::sync::range::VideoTimeRange;

/// Operator-entered time of day that pushes the seek position forward
///
/// Held as the raw text the operator typed; it is only parsed when an
/// offset is computed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JumpSpec {
    text: String,
}

impl JumpSpec {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }

    /// The default jump: the video's own start time, or empty when unknown
    pub fn default_for(range: &VideoTimeRange) -> Self {
        Self {
            text: range.start.map(|start| start.to_string()).unwrap_or_default(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parse the jump text; blank text means no jump
    pub fn clock(&self) -> Result<Option<ClockReading>, ClockParseError> {
        if self.text.trim().is_empty() {
            return Ok(None);
        }
        ClockReading::parse(&self.text).map(Some)
    }
}

impl fmt::Display for JumpSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Seconds a jump adds on top of an event: zero unless the jump is at or after it
pub fn jump_adjustment(event_time: ClockReading, jump_time: ClockReading) -> u64 {
    if jump_time >= event_time {
        jump_time.seconds_since(event_time).max(0) as u64
    } else {
        0
    }
}

/// Apply a forward-only jump to a mapped offset
pub fn apply_jump(base_offset: PlaybackOffset, event_time: ClockReading, jump_time: ClockReading) -> PlaybackOffset {
    base_offset.advanced_by(jump_adjustment(event_time, jump_time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(text: &str) -> ClockReading {
        ClockReading::parse(text).unwrap()
    }

    #[test]
    fn test_forward_jump_adds_difference() {
        let base = PlaybackOffset::from_secs(210);
        let offset = apply_jump(base, clock("09:03:30"), clock("09:04:00"));
        assert_eq!(offset.as_secs(), 240);
    }

    #[test]
    fn test_jump_equal_to_event_adds_nothing() {
        let base = PlaybackOffset::from_secs(210);
        assert_eq!(apply_jump(base, clock("09:03:30"), clock("09:03:30")), base);
    }

    #[test]
    fn test_earlier_jump_is_ignored() {
        let base = PlaybackOffset::from_secs(210);
        assert_eq!(apply_jump(base, clock("09:03:30"), clock("09:03:00")), base);
        assert_eq!(apply_jump(base, clock("09:03:30"), clock("00:00:00")), base);
    }

    #[test]
    fn test_default_follows_video_start() {
        let range = VideoTimeRange::new(Some(clock("09:00:00")), Some(clock("09:10:00")));
        let jump = JumpSpec::default_for(&range);
        assert_eq!(jump.text(), "09:00:00");
        assert_eq!(jump.clock().unwrap(), Some(clock("09:00:00")));

        let unknown = JumpSpec::default_for(&VideoTimeRange::default());
        assert_eq!(unknown.text(), "");
        assert_eq!(unknown.clock().unwrap(), None);
    }

    #[test]
    fn test_unparseable_jump() {
        assert!(JumpSpec::new("half past nine").clock().is_err());
        assert!(JumpSpec::new("09:04:60").clock().is_err());
        assert_eq!(JumpSpec::new("   ").clock().unwrap(), None);
    }
}
