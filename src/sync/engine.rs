use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::playback::Player;
use crate::recognition::{ClockExtractor, TextRecognizer};
use crate::sync::coordinator::SeekCoordinator;
use crate::sync::degradation::Degradation;
use crate::sync::range::{TimeRangeResolver, VideoTimeRange};
use crate::video::{Transcoder, VideoClockReader, VideoMetadata, VideoSource};

/// A video ready for seeking
#[derive(Debug, Clone)]
pub struct LoadedVideo {
    /// The file the operator picked
    pub source: PathBuf,
    /// The file that is read and played; the transcoded copy when available
    pub media: PathBuf,
    pub range: VideoTimeRange,
    pub metadata: VideoMetadata,
    /// Fallbacks taken while loading
    pub degradations: Vec<Degradation>,
}

impl LoadedVideo {
    /// Duration in seconds, when the container reports a usable one
    pub fn duration(&self) -> Option<f64> {
        let duration = self.metadata.duration;
        (duration.is_finite() && duration > 0.0).then_some(duration)
    }
}

/// Wires video access, recognition and seeking together
///
/// The recognizer is created once by the caller and shared by every video
/// loaded through this engine.
pub struct SyncEngine {
    config: Config,
    source: Arc<dyn VideoSource>,
    extractor: ClockExtractor,
}

impl SyncEngine {
    pub fn new(config: Config, source: Arc<dyn VideoSource>, recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            config,
            source,
            extractor: ClockExtractor::new(recognizer),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Prepare a video: optional transcode, metadata probe and clock range
    ///
    /// Fails only when the video cannot be opened at all.
    pub fn load_video<P: AsRef<Path>>(&self, path: P) -> Result<LoadedVideo> {
        let source = path.as_ref().to_path_buf();
        let mut degradations = Vec::new();

        let media = if self.config.video.transcode {
            match Transcoder::new(&self.config.video).transcode(&source) {
                Ok(output) => output,
                Err(e) => {
                    let degradation = Degradation::TranscodeSkipped { reason: e.to_string() };
                    warn!("{}", degradation.message());
                    degradations.push(degradation);
                    source.clone()
                }
            }
        } else {
            source.clone()
        };

        let metadata = {
            let handle = self.source.open(&media)?;
            handle.metadata().clone()
        };
        info!(
            "Opened {:?} with {}: {:.2}s, {} frames at {:.2} fps, {}x{}",
            media,
            self.source.name(),
            metadata.duration,
            metadata.frame_count,
            metadata.fps,
            metadata.width,
            metadata.height
        );

        let reader = VideoClockReader::new(
            Arc::clone(&self.source),
            self.extractor.clone(),
            self.config.video.end_frame_backoff,
        );
        let range = TimeRangeResolver::new(reader).resolve_range(&media)?;

        for degradation in Degradation::for_missing_clocks(range.start, range.end) {
            warn!("{}", degradation.message());
            degradations.push(degradation);
        }

        Ok(LoadedVideo {
            source,
            media,
            range,
            metadata,
            degradations,
        })
    }

    /// Start an operator session over a loaded video
    pub fn coordinator(&self, video: LoadedVideo, player: Box<dyn Player>) -> SeekCoordinator {
        SeekCoordinator::new(video, &self.config.events, player)
    }
}
