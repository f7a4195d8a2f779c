use crate::clock::{ClockReading, PlaybackOffset};
use crate::error::RangeError;
use crate::sync::range::VideoTimeRange;

/// Convert an event's time of day into a seek position inside the video
///
/// The event must satisfy `start <= event <= end` by same-day comparison.
/// A range without a start or without an end cannot validate anything and
/// is rejected as a whole; no partial mapping is attempted.
pub fn map_event(event_time: ClockReading, range: &VideoTimeRange) -> Result<PlaybackOffset, RangeError> {
    let start = range.start.ok_or(RangeError::StartUnknown)?;
    let end = range.end.ok_or(RangeError::EndUnknown {
        event: event_time,
        start,
    })?;

    if event_time < start {
        return Err(RangeError::BeforeStart {
            event: event_time,
            start,
        });
    }
    if event_time > end {
        return Err(RangeError::AfterEnd {
            event: event_time,
            end,
        });
    }

    // Non-negative: event_time >= start was checked above
    let seconds = event_time.seconds_since(start).max(0) as u64;
    Ok(PlaybackOffset::from_secs(seconds))
}
