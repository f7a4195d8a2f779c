//! # Synchronization Module
//!
//! Resolves a video's on-screen clock range, maps event times to playback
//! offsets, applies the operator's forward jump and coordinates seeks.
//!
//! ## Overview
//!
//! - [`TimeRangeResolver`] reads the clock on the first and last usable frame
//! - [`map_event`] places an event time inside that range
//! - [`apply_jump`] pushes the position forward to a later time of day
//! - [`SeekCoordinator`] owns the operator session and talks to the player
//! - [`SyncEngine`] wires these together for one video at a time

pub mod coordinator;
pub mod degradation;
pub mod engine;
pub mod jump;
pub mod mapper;
pub mod range;

pub use coordinator::{SeekCoordinator, SeekEvent, SeekOutcome, SeekState, SyncSession};
pub use degradation::Degradation;
pub use engine::{LoadedVideo, SyncEngine};
pub use jump::{apply_jump, jump_adjustment, JumpSpec};
pub use mapper::map_event;
pub use range::{TimeRangeResolver, VideoTimeRange};
