use std::path::Path;

use tracing::{debug, info, warn};

use crate::clock::{ClockReading, PlaybackOffset};
use crate::config::EventsConfig;
use crate::error::Result;
use crate::events::{EventLog, EventRecord};
use crate::playback::Player;
use crate::sync::degradation::Degradation;
use crate::sync::engine::LoadedVideo;
use crate::sync::jump::{apply_jump, JumpSpec};
use crate::sync::mapper::map_event;
use crate::sync::range::VideoTimeRange;

/// Whether an event is currently selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekState {
    /// No event selected
    Idle,
    /// An event is selected and its seek position is stable across jump edits
    Locked,
}

/// A computed seek, as handed to the player
#[derive(Debug, Clone, PartialEq)]
pub struct SeekOutcome {
    /// The selected column value
    pub value: String,
    /// The first row matching the value, if any
    pub record: Option<EventRecord>,
    /// The event's time of day, if it could be read
    pub event_time: Option<ClockReading>,
    /// Offset of the event inside the video, before the jump
    pub base: PlaybackOffset,
    /// Seconds added by the jump
    pub adjustment: u64,
    /// Final seek position
    pub offset: PlaybackOffset,
    /// Jump text used for this computation
    pub jump: JumpSpec,
}

/// State transitions emitted for the presentation layer, in order
#[derive(Debug, Clone, PartialEq)]
pub enum SeekEvent {
    /// Selection cleared, or a new video loaded
    Unselected,
    /// The jump field was reset for a newly selected event
    JumpReset(JumpSpec),
    /// A fallback was taken
    Degraded(Degradation),
    /// A seek position was computed and sent to the player
    Seek(SeekOutcome),
}

#[derive(Debug, Clone)]
struct LockedEvent {
    value: String,
    record: Option<EventRecord>,
    event_time: Option<ClockReading>,
    /// Offset of the event; `None` when the event could not be placed
    mapped: Option<PlaybackOffset>,
}

/// Per-video operator state
#[derive(Debug, Clone, Default)]
pub struct SyncSession {
    last_selected: Option<String>,
    jump: JumpSpec,
    locked: Option<LockedEvent>,
}

impl SyncSession {
    pub fn new(range: &VideoTimeRange) -> Self {
        Self {
            last_selected: None,
            jump: JumpSpec::default_for(range),
            locked: None,
        }
    }

    pub fn state(&self) -> SeekState {
        if self.locked.is_some() {
            SeekState::Locked
        } else {
            SeekState::Idle
        }
    }

    /// Currently locked value
    pub fn selected(&self) -> Option<&str> {
        self.locked.as_ref().map(|locked| locked.value.as_str())
    }

    pub fn jump(&self) -> &JumpSpec {
        &self.jump
    }
}

/// Drives one operator interaction at a time through mapping and jump
///
/// Selecting a value different from the previous one resets the jump to
/// the video's start time, and the reset is emitted before the new seek.
pub struct SeekCoordinator {
    video: LoadedVideo,
    time_column: String,
    unselected_label: String,
    session: SyncSession,
    player: Box<dyn Player>,
}

impl SeekCoordinator {
    pub fn new(video: LoadedVideo, config: &EventsConfig, player: Box<dyn Player>) -> Self {
        let session = SyncSession::new(&video.range);
        Self {
            video,
            time_column: config.time_column.clone(),
            unselected_label: config.unselected_label.clone(),
            session,
            player,
        }
    }

    pub fn video(&self) -> &LoadedVideo {
        &self.video
    }

    pub fn session(&self) -> &SyncSession {
        &self.session
    }

    pub fn state(&self) -> SeekState {
        self.session.state()
    }

    pub fn time_column(&self) -> &str {
        &self.time_column
    }

    pub fn unselected_label(&self) -> &str {
        &self.unselected_label
    }

    /// Replace the video; the session starts over in `Idle`
    pub fn load_video(&mut self, video: LoadedVideo) -> Vec<SeekEvent> {
        info!("Loaded video {:?}, session reset", video.media);
        self.session = SyncSession::new(&video.range);
        self.video = video;

        let mut events = vec![SeekEvent::Unselected];
        events.extend(self.video.degradations.iter().cloned().map(SeekEvent::Degraded));
        events
    }

    /// Operator picked `value` in `column`
    ///
    /// Fails only when `column` does not exist in the log.
    pub fn select(&mut self, log: &EventLog, column: &str, value: &str) -> Result<Vec<SeekEvent>> {
        let mut events = Vec::new();

        if value == self.unselected_label {
            if self.session.locked.take().is_some() {
                debug!("Selection cleared");
            }
            events.push(SeekEvent::Unselected);
            return Ok(events);
        }

        let record = log.find_first(column, value)?.cloned();

        if self.session.last_selected.as_deref() != Some(value) {
            self.session.jump = JumpSpec::default_for(&self.video.range);
            self.session.last_selected = Some(value.to_string());
            debug!("New selection '{}', jump reset to '{}'", value, self.session.jump);
            events.push(SeekEvent::JumpReset(self.session.jump.clone()));
        }

        let locked = self.lock_event(column, value, record, &mut events);
        self.session.locked = Some(locked);
        self.recompute(&mut events);
        Ok(events)
    }

    /// Operator edited the jump field
    ///
    /// With an event locked, only the jump is recomputed; the event is not
    /// looked up or mapped again.
    pub fn edit_jump(&mut self, text: &str) -> Vec<SeekEvent> {
        self.session.jump = JumpSpec::new(text);

        let mut events = Vec::new();
        match &self.session.locked {
            Some(locked) if locked.mapped.is_some() => self.recompute(&mut events),
            Some(locked) => debug!("Jump stored; '{}' has no position in this video", locked.value),
            None => debug!("Jump stored; no event selected"),
        }
        events
    }

    fn lock_event(
        &self,
        column: &str,
        value: &str,
        record: Option<EventRecord>,
        events: &mut Vec<SeekEvent>,
    ) -> LockedEvent {
        let mut locked = LockedEvent {
            value: value.to_string(),
            record: record.clone(),
            event_time: None,
            mapped: None,
        };

        let Some(record) = record else {
            degrade(events, Degradation::NoMatchingRow {
                column: column.to_string(),
                value: value.to_string(),
            });
            return locked;
        };

        match record.clock(&self.time_column) {
            Ok(event_time) => {
                locked.event_time = Some(event_time);
                match map_event(event_time, &self.video.range) {
                    Ok(base) => locked.mapped = Some(base),
                    Err(e) => degrade(events, Degradation::OutOfRange(e)),
                }
            }
            Err(e) => degrade(events, Degradation::Timestamp(e)),
        }

        locked
    }

    fn recompute(&mut self, events: &mut Vec<SeekEvent>) {
        let Some(locked) = self.session.locked.clone() else {
            return;
        };

        let base = locked.mapped.unwrap_or(PlaybackOffset::ZERO);
        let mut offset = match (locked.mapped, locked.event_time) {
            (Some(base), Some(event_time)) => match self.session.jump.clock() {
                Ok(Some(jump_time)) => apply_jump(base, event_time, jump_time),
                Ok(None) => base,
                Err(e) => {
                    degrade(events, Degradation::JumpUnparseable(e));
                    base
                }
            },
            _ => PlaybackOffset::ZERO,
        };
        let adjustment = offset.as_secs() - base.as_secs();

        if let Some(duration) = self.video.duration() {
            let clamped = offset.clamped_to(duration);
            if clamped != offset {
                degrade(events, Degradation::OffsetClamped {
                    requested: offset.as_secs(),
                    duration,
                });
                offset = clamped;
            }
        }

        info!(
            "Seek '{}': base {} + jump {}s = {}",
            locked.value, base, adjustment, offset
        );
        let media = self.video.media.clone();
        self.hand_to_player(&media, offset, events);

        events.push(SeekEvent::Seek(SeekOutcome {
            value: locked.value,
            record: locked.record,
            event_time: locked.event_time,
            base,
            adjustment,
            offset,
            jump: self.session.jump.clone(),
        }));
    }

    fn hand_to_player(&mut self, media: &Path, offset: PlaybackOffset, events: &mut Vec<SeekEvent>) {
        if let Err(e) = self.player.play(media, offset) {
            degrade(events, Degradation::PlaybackFailed {
                reason: e.to_string(),
            });
        }
    }
}

fn degrade(events: &mut Vec<SeekEvent>, degradation: Degradation) {
    warn!("{}", degradation.message());
    events.push(SeekEvent::Degraded(degradation));
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::error::RangeError;
    use crate::playback::testing::RecordingPlayer;
    use crate::video::VideoMetadata;

    const LOG: &str = "\
ID,DATE AND TIME,NOTE
E1,2024-01-05 09:03:30,inside
E2,2024-01-05 08:59:00,too early
E3,2024-01-05 09:09:00,near the end
E4,,missing
";

    fn clock(text: &str) -> ClockReading {
        ClockReading::parse(text).unwrap()
    }

    fn video(start: Option<&str>, end: Option<&str>, duration: f64) -> LoadedVideo {
        LoadedVideo {
            source: PathBuf::from("upload.avi"),
            media: PathBuf::from("assets/out_h264.mp4"),
            range: VideoTimeRange::new(start.map(clock), end.map(clock)),
            metadata: VideoMetadata {
                duration,
                fps: 25.0,
                width: 1280,
                height: 720,
                frame_count: (duration * 25.0) as u64,
            },
            degradations: Vec::new(),
        }
    }

    fn setup(video: LoadedVideo) -> (SeekCoordinator, RecordingPlayer, EventLog) {
        let player = RecordingPlayer::default();
        let coordinator = SeekCoordinator::new(video, &EventsConfig::default(), Box::new(player.clone()));
        let log = EventLog::from_reader(LOG.as_bytes(), &EventsConfig::default()).unwrap();
        (coordinator, player, log)
    }

    fn last_seek(events: &[SeekEvent]) -> &SeekOutcome {
        match events.last() {
            Some(SeekEvent::Seek(outcome)) => outcome,
            other => panic!("expected a seek, got {:?}", other),
        }
    }

    #[test]
    fn test_idle_until_selected() {
        let (mut coordinator, player, log) = setup(video(Some("09:00:00"), Some("09:10:00"), 600.0));
        assert_eq!(coordinator.state(), SeekState::Idle);

        let events = coordinator.select(&log, "ID", "Select").unwrap();
        assert_eq!(events, vec![SeekEvent::Unselected]);
        assert_eq!(coordinator.state(), SeekState::Idle);
        assert!(player.offsets().is_empty());
    }

    #[test]
    fn test_select_maps_and_plays() {
        let (mut coordinator, player, log) = setup(video(Some("09:00:00"), Some("09:10:00"), 600.0));

        let events = coordinator.select(&log, "ID", "E1").unwrap();
        assert!(matches!(events[0], SeekEvent::JumpReset(_)));
        let outcome = last_seek(&events);
        assert_eq!(outcome.offset.as_secs(), 210);
        assert_eq!(outcome.adjustment, 0);
        assert_eq!(outcome.event_time, Some(clock("09:03:30")));
        assert_eq!(coordinator.state(), SeekState::Locked);
        assert_eq!(coordinator.session().selected(), Some("E1"));
        assert_eq!(player.offsets(), vec![210]);
    }

    #[test]
    fn test_jump_edits_recompute_only_the_jump() {
        let (mut coordinator, player, log) = setup(video(Some("09:00:00"), Some("09:10:00"), 600.0));
        coordinator.select(&log, "ID", "E1").unwrap();

        let events = coordinator.edit_jump("09:04:00");
        assert_eq!(events.len(), 1);
        assert_eq!(last_seek(&events).offset.as_secs(), 240);
        assert_eq!(last_seek(&events).adjustment, 30);

        let events = coordinator.edit_jump("09:03:00");
        assert_eq!(last_seek(&events).offset.as_secs(), 210);

        let events = coordinator.edit_jump("");
        assert_eq!(last_seek(&events).offset.as_secs(), 210);

        assert_eq!(player.offsets(), vec![210, 240, 210, 210]);
    }

    #[test]
    fn test_unparseable_jump_reports_and_keeps_base() {
        let (mut coordinator, _player, log) = setup(video(Some("09:00:00"), Some("09:10:00"), 600.0));
        coordinator.select(&log, "ID", "E1").unwrap();

        let events = coordinator.edit_jump("9 o'clock");
        assert!(matches!(events[0], SeekEvent::Degraded(Degradation::JumpUnparseable(_))));
        assert_eq!(last_seek(&events).offset.as_secs(), 210);
    }

    #[test]
    fn test_new_selection_resets_jump_before_recompute() {
        let (mut coordinator, player, log) = setup(video(Some("09:00:00"), Some("09:10:00"), 600.0));
        coordinator.select(&log, "ID", "E1").unwrap();
        coordinator.edit_jump("09:05:00");
        assert_eq!(coordinator.session().jump().text(), "09:05:00");

        let events = coordinator.select(&log, "ID", "E3").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], SeekEvent::JumpReset(JumpSpec::new("09:00:00")));
        let outcome = last_seek(&events);
        assert_eq!(outcome.jump.text(), "09:00:00");
        assert_eq!(outcome.offset.as_secs(), 540);
        assert_eq!(player.offsets().last(), Some(&540));
    }

    #[test]
    fn test_reselecting_same_value_keeps_jump() {
        let (mut coordinator, _player, log) = setup(video(Some("09:00:00"), Some("09:10:00"), 600.0));
        coordinator.select(&log, "ID", "E1").unwrap();
        coordinator.edit_jump("09:04:00");

        let events = coordinator.select(&log, "ID", "E1").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(last_seek(&events).offset.as_secs(), 240);
    }

    #[test]
    fn test_out_of_range_falls_back_to_start() {
        let (mut coordinator, player, log) = setup(video(Some("09:00:00"), Some("09:10:00"), 600.0));

        let events = coordinator.select(&log, "ID", "E2").unwrap();
        assert!(events.contains(&SeekEvent::Degraded(Degradation::OutOfRange(
            RangeError::BeforeStart {
                event: clock("08:59:00"),
                start: clock("09:00:00"),
            }
        ))));
        assert_eq!(last_seek(&events).offset, PlaybackOffset::ZERO);
        assert_eq!(player.offsets(), vec![0]);

        // Jump edits cannot move a fallback seek
        assert!(coordinator.edit_jump("09:30:00").is_empty());
    }

    #[test]
    fn test_missing_end_clock_is_a_range_error() {
        let (mut coordinator, _player, log) = setup(video(Some("09:00:00"), None, 600.0));
        let events = coordinator.select(&log, "ID", "E1").unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            SeekEvent::Degraded(Degradation::OutOfRange(RangeError::EndUnknown { .. }))
        )));
        assert_eq!(last_seek(&events).offset, PlaybackOffset::ZERO);
    }

    #[test]
    fn test_missing_row_and_missing_time() {
        let (mut coordinator, _player, log) = setup(video(Some("09:00:00"), Some("09:10:00"), 600.0));

        let events = coordinator.select(&log, "ID", "E404").unwrap();
        assert!(events.iter().any(|e| matches!(e, SeekEvent::Degraded(Degradation::NoMatchingRow { .. }))));
        assert_eq!(last_seek(&events).offset, PlaybackOffset::ZERO);

        let events = coordinator.select(&log, "ID", "E4").unwrap();
        assert!(events.iter().any(|e| matches!(e, SeekEvent::Degraded(Degradation::Timestamp(_)))));
        assert_eq!(last_seek(&events).offset, PlaybackOffset::ZERO);
    }

    #[test]
    fn test_unknown_column_is_an_error() {
        let (mut coordinator, _player, log) = setup(video(Some("09:00:00"), Some("09:10:00"), 600.0));
        assert!(coordinator.select(&log, "WHO", "E1").is_err());
    }

    #[test]
    fn test_offset_clamped_to_duration() {
        let (mut coordinator, player, log) = setup(video(Some("09:00:00"), Some("09:10:00"), 400.0));
        coordinator.select(&log, "ID", "E1").unwrap();

        let events = coordinator.edit_jump("09:09:00");
        assert!(events.iter().any(|e| matches!(
            e,
            SeekEvent::Degraded(Degradation::OffsetClamped { requested: 540, .. })
        )));
        assert_eq!(last_seek(&events).offset.as_secs(), 400);
        assert_eq!(player.offsets().last(), Some(&400));
    }

    #[test]
    fn test_player_failure_is_reported() {
        let player = RecordingPlayer {
            fail: true,
            ..Default::default()
        };
        let mut coordinator = SeekCoordinator::new(
            video(Some("09:00:00"), Some("09:10:00"), 600.0),
            &EventsConfig::default(),
            Box::new(player),
        );
        let log = EventLog::from_reader(LOG.as_bytes(), &EventsConfig::default()).unwrap();

        let events = coordinator.select(&log, "ID", "E1").unwrap();
        assert!(events.iter().any(|e| matches!(e, SeekEvent::Degraded(Degradation::PlaybackFailed { .. }))));
        assert_eq!(last_seek(&events).offset.as_secs(), 210);
    }

    #[test]
    fn test_loading_video_returns_to_idle() {
        let (mut coordinator, _player, log) = setup(video(Some("09:00:00"), Some("09:10:00"), 600.0));
        coordinator.select(&log, "ID", "E1").unwrap();
        coordinator.edit_jump("09:05:00");

        let mut next = video(Some("10:00:00"), None, 300.0);
        next.degradations.push(Degradation::EndClockMissing);
        let events = coordinator.load_video(next);

        assert_eq!(events, vec![SeekEvent::Unselected, SeekEvent::Degraded(Degradation::EndClockMissing)]);
        assert_eq!(coordinator.state(), SeekState::Idle);
        assert_eq!(coordinator.session().jump().text(), "10:00:00");
        assert_eq!(coordinator.session().selected(), None);
    }
}
