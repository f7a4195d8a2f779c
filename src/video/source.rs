use std::path::Path;

use crate::error::Result;
use crate::video::types::{Frame, VideoMetadata};

/// Something that can open video files for index-based frame access
///
/// Opening fails with [`VideoError::SourceOpen`](crate::error::VideoError::SourceOpen)
/// when the file cannot be read as a video.
pub trait VideoSource: Send + Sync {
    /// Returns the name of this backend
    fn name(&self) -> &str;

    /// Open a video for reading
    fn open(&self, path: &Path) -> Result<Box<dyn VideoHandle>>;
}

/// An opened video
///
/// The handle is released when dropped, so every exit path of a caller
/// releases it.
pub trait VideoHandle {
    /// Stream properties, including the total frame count
    fn metadata(&self) -> &VideoMetadata;

    /// Seek to `index` and decode exactly one frame
    ///
    /// Returns `Ok(None)` when the decoder produced no frame at that position.
    fn decode_frame(&mut self, index: u64) -> Result<Option<Frame>>;

    fn frame_count(&self) -> u64 {
        self.metadata().frame_count
    }
}
