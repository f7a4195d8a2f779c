//! # Video Module
//!
//! Opens video files, decodes single frames by index and reads the
//! burned-in clock from them. Also re-encodes uploads for playback.

pub mod clock_reader;
pub mod ffmpeg;
pub mod source;
pub mod transcode;
pub mod types;

pub use clock_reader::{FramePosition, VideoClockReader};
pub use ffmpeg::FfmpegSource;
pub use source::{VideoHandle, VideoSource};
pub use transcode::Transcoder;
pub use types::{Frame, VideoMetadata};
