use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clock::ClockReading;
use crate::error::Result;
use crate::recognition::ClockExtractor;
use crate::video::source::{VideoHandle, VideoSource};

/// Which frame of a video to read the clock from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePosition {
    /// The first frame (index 0)
    First,
    /// `end_frame_backoff` frames before the reported end of the stream
    LastUsable,
    /// An explicit frame index
    Index(u64),
}

/// Reads the on-screen clock at a given frame position of a video
#[derive(Clone)]
pub struct VideoClockReader {
    source: Arc<dyn VideoSource>,
    extractor: ClockExtractor,
    end_frame_backoff: u64,
}

impl VideoClockReader {
    pub fn new(source: Arc<dyn VideoSource>, extractor: ClockExtractor, end_frame_backoff: u64) -> Self {
        Self {
            source,
            extractor,
            end_frame_backoff,
        }
    }

    /// Open the video, decode one frame and recognize its clock
    ///
    /// Fails only when the video cannot be opened. A frame that does not
    /// decode, or that carries no recognizable clock, yields `Ok(None)`.
    /// The video handle is released before this returns on every path.
    pub fn read_clock_at(&self, path: &Path, position: FramePosition) -> Result<Option<ClockReading>> {
        let mut handle = self.source.open(path)?;
        let index = self.frame_index(handle.as_ref(), position);
        debug!("Reading clock at frame {} ({:?}) of {:?}", index, position, path);

        let decoded = handle.decode_frame(index);
        drop(handle);

        let frame = match decoded {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                warn!("No frame decoded at index {}; clock reading unavailable", index);
                return Ok(None);
            }
            Err(e) => {
                warn!("{}; clock reading unavailable", e);
                return Ok(None);
            }
        };

        let reading = self.extractor.extract_clock(&frame);
        match reading {
            Some(clock) => info!("Frame {} shows {}", index, clock),
            None => warn!("No clock recognized on frame {}", index),
        }
        Ok(reading)
    }

    fn frame_index(&self, handle: &dyn VideoHandle, position: FramePosition) -> u64 {
        match position {
            FramePosition::First => 0,
            FramePosition::LastUsable => handle.metadata().last_usable_index(self.end_frame_backoff),
            FramePosition::Index(index) => index,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fake collaborators shared by tests across the crate

    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::error::{RecognitionError, Result, VideoError};
    use crate::recognition::TextRecognizer;
    use crate::video::source::{VideoHandle, VideoSource};
    use crate::video::types::{Frame, VideoMetadata};

    /// Serves synthetic frames whose red channel encodes the frame index
    pub struct FakeSource {
        pub frame_count: u64,
        pub duration: f64,
        pub failing_indices: Vec<u64>,
        pub openable: bool,
        pub opened: Arc<AtomicUsize>,
        pub released: Arc<AtomicUsize>,
        pub decoded: Arc<Mutex<Vec<u64>>>,
    }

    impl FakeSource {
        pub fn new(frame_count: u64) -> Self {
            Self {
                frame_count,
                duration: frame_count as f64,
                failing_indices: Vec::new(),
                openable: true,
                opened: Arc::new(AtomicUsize::new(0)),
                released: Arc::new(AtomicUsize::new(0)),
                decoded: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl VideoSource for FakeSource {
        fn name(&self) -> &str {
            "fake"
        }

        fn open(&self, path: &Path) -> Result<Box<dyn VideoHandle>> {
            if !self.openable {
                return Err(VideoError::SourceOpen {
                    path: path.display().to_string(),
                    reason: "unreadable".to_string(),
                }
                .into());
            }
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeHandle {
                path: path.to_path_buf(),
                metadata: VideoMetadata {
                    duration: self.duration,
                    fps: 1.0,
                    width: 4,
                    height: 4,
                    frame_count: self.frame_count,
                },
                failing_indices: self.failing_indices.clone(),
                released: Arc::clone(&self.released),
                decoded: Arc::clone(&self.decoded),
            }))
        }
    }

    struct FakeHandle {
        #[allow(dead_code)]
        path: PathBuf,
        metadata: VideoMetadata,
        failing_indices: Vec<u64>,
        released: Arc<AtomicUsize>,
        decoded: Arc<Mutex<Vec<u64>>>,
    }

    impl VideoHandle for FakeHandle {
        fn metadata(&self) -> &VideoMetadata {
            &self.metadata
        }

        fn decode_frame(&mut self, index: u64) -> Result<Option<Frame>> {
            self.decoded.lock().unwrap().push(index);
            if self.failing_indices.contains(&index) {
                return Err(VideoError::DecodeFailed {
                    index,
                    reason: "corrupt packet".to_string(),
                }
                .into());
            }
            if index >= self.metadata.frame_count {
                return Ok(None);
            }
            Ok(Some(Frame::new_filled(4, 4, [index as u8, 0, 0])))
        }
    }

    impl Drop for FakeHandle {
        fn drop(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Returns canned fragments keyed by the red channel of the first pixel
    #[derive(Default)]
    pub struct FakeRecognizer {
        pub texts: HashMap<u8, Vec<String>>,
        pub broken: bool,
    }

    impl FakeRecognizer {
        pub fn with(mut self, key: u8, fragments: &[&str]) -> Self {
            self.texts
                .insert(key, fragments.iter().map(|s| s.to_string()).collect());
            self
        }
    }

    impl TextRecognizer for FakeRecognizer {
        fn name(&self) -> &str {
            "fake"
        }

        fn recognize(&self, frame: &Frame) -> std::result::Result<Vec<String>, RecognitionError> {
            if self.broken {
                return Err(RecognitionError::EngineFailed {
                    reason: "model not loaded".to_string(),
                });
            }
            let key = frame.get_pixel(0, 0)[0];
            Ok(self.texts.get(&key).cloned().unwrap_or_default())
        }
    }

    pub fn fake_path() -> PathBuf {
        PathBuf::from("/videos/cam1.mp4")
    }
}
