//! # Clocksync
//!
//! Line up rows of an event log with the moment they happen in a video,
//! using the clock that the recording device burned into every frame.
//!
//! The library reads the on-screen `HH:MM:SS` clock on the first and last
//! usable frame of a video, maps an event's time of day to a playback
//! offset, and lets the operator push the position forward with a jump time.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use clocksync::{
//!     config::Config,
//!     events::EventLog,
//!     playback::player_from_config,
//!     recognition::TesseractRecognizer,
//!     sync::SyncEngine,
//!     video::FfmpegSource,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let source = Arc::new(FfmpegSource::new(&config.video));
//! let recognizer = Arc::new(TesseractRecognizer::new(&config.recognition));
//! let engine = SyncEngine::new(config.clone(), source, recognizer);
//!
//! let video = engine.load_video("camera.avi")?;
//! let log = EventLog::from_path("events.csv", &config.events)?;
//!
//! let mut coordinator = engine.coordinator(video, player_from_config(&config.playback));
//! coordinator.select(&log, "CASE", "A-17")?;
//! coordinator.edit_jump("09:04:00");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`clock`] - Time-of-day readings and playback offsets
//! - [`video`] - Opening videos, decoding frames, transcoding
//! - [`recognition`] - Text recognition and clock extraction
//! - [`events`] - The tabular event log
//! - [`sync`] - Range resolution, mapping, jumps and the seek coordinator
//! - [`playback`] - Players that receive the computed offset
//! - [`config`] - Configuration management

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod playback;
pub mod recognition;
pub mod sync;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    clock::{ClockReading, PlaybackOffset},
    config::Config,
    error::{Result, SyncError},
    events::EventLog,
    sync::{SeekCoordinator, SeekEvent, SyncEngine},
};
