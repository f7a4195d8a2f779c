use std::path::Path;

use tracing::{info, warn};

use crate::clock::ClockReading;
use crate::error::Result;
use crate::video::{FramePosition, VideoClockReader};

/// The on-screen clock readings at the start and end of a video
///
/// Either side may be missing when its frame could not be read. The engine
/// never assumes `start <= end`; all comparisons against the range are
/// explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoTimeRange {
    pub start: Option<ClockReading>,
    pub end: Option<ClockReading>,
}

impl VideoTimeRange {
    pub fn new(start: Option<ClockReading>, end: Option<ClockReading>) -> Self {
        Self { start, end }
    }

    /// Both ends were recovered
    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Whether `start <= end`, when both are known
    pub fn is_ordered(&self) -> Option<bool> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(start <= end),
            _ => None,
        }
    }

    /// Seconds covered by the on-screen clock, when both ends are known
    pub fn span_seconds(&self) -> Option<i64> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(end.seconds_since(start)),
            _ => None,
        }
    }
}

/// Establishes a video's time range from its first and last usable frames
#[derive(Clone)]
pub struct TimeRangeResolver {
    reader: VideoClockReader,
}

impl TimeRangeResolver {
    pub fn new(reader: VideoClockReader) -> Self {
        Self { reader }
    }

    /// Read the start and end clocks of the video at `path`
    ///
    /// Fails only if the video cannot be opened; unreadable clocks are left
    /// absent in the returned range.
    pub fn resolve_range(&self, path: &Path) -> Result<VideoTimeRange> {
        let start = self.reader.read_clock_at(path, FramePosition::First)?;
        let end = self.reader.read_clock_at(path, FramePosition::LastUsable)?;
        let range = VideoTimeRange::new(start, end);

        match (start, end) {
            (Some(start), Some(end)) => {
                info!("Video clock runs from {} to {}", start, end);
                if range.is_ordered() == Some(false) {
                    warn!("Video end clock {} reads earlier than start {}", end, start);
                }
            }
            _ => warn!(
                "Incomplete video clock range: start={}, end={}",
                start.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string()),
                end.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string())
            ),
        }

        Ok(range)
    }
}
