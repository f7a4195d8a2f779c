use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::config::VideoConfig;
use crate::error::{Result, VideoError};

/// Re-encodes uploaded videos into a browser/player friendly codec
///
/// The output lands at a fixed path inside the working directory and is
/// overwritten on every run.
pub struct Transcoder {
    ffmpeg_path: String,
    video_codec: String,
    output_path: PathBuf,
}

impl Transcoder {
    pub fn new(config: &VideoConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            video_codec: config.video_codec.clone(),
            output_path: config.transcoded_path(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Transcode `input` and return the path of the re-encoded file
    pub fn transcode(&self, input: &Path) -> Result<PathBuf> {
        if let Some(dir) = self.output_path.parent() {
            if !dir.as_os_str().is_empty() {
                create_dir_all(dir)?;
            }
        }

        info!("Transcoding {:?} to {} -> {:?}", input, self.video_codec, self.output_path);

        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
            .arg(input)
            .args(["-c:v", &self.video_codec])
            .arg(&self.output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null());

        debug!("FFmpeg command: {:?}", cmd);

        let output = cmd.output().map_err(|e| VideoError::TranscodeFailed {
            reason: format!("could not run {}: {}", self.ffmpeg_path, e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VideoError::TranscodeFailed {
                reason: stderr.trim().to_string(),
            }
            .into());
        }

        if !self.output_path.exists() {
            return Err(VideoError::TranscodeFailed {
                reason: format!("output file not created: {}", self.output_path.display()),
            }
            .into());
        }

        Ok(self.output_path.clone())
    }
}
