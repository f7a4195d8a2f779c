// Video access through the external ffprobe/ffmpeg executables

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::VideoConfig;
use crate::error::{Result, VideoError};
use crate::video::source::{VideoHandle, VideoSource};
use crate::video::types::{Frame, VideoMetadata};

/// Video source backed by the FFmpeg command line tools
pub struct FfmpegSource {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl FfmpegSource {
    pub fn new(config: &VideoConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
        }
    }

    /// Check that the ffmpeg executable can be started
    pub fn check_available(&self) -> bool {
        Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn probe(&self, path: &Path) -> Result<VideoMetadata> {
        let path_str = path.display().to_string();

        if !path.is_file() {
            return Err(VideoError::SourceOpen {
                path: path_str,
                reason: "file not found".to_string(),
            }
            .into());
        }

        // Counting packets reads the whole file; only do it when the container
        // does not report a frame count
        let mut probe = self.run_probe(path, false)?;
        if needs_packet_count(&probe) {
            debug!("{} reports no frame count; counting packets", path_str);
            probe = self.run_probe(path, true)?;
        }

        let metadata = metadata_from_probe(&probe).ok_or_else(|| VideoError::SourceOpen {
            path: path_str.clone(),
            reason: "no video stream".to_string(),
        })?;

        info!(
            "Video metadata: {}x{} @ {:.2}fps, {:.1}s, {} frames",
            metadata.width, metadata.height, metadata.fps, metadata.duration, metadata.frame_count
        );
        Ok(metadata)
    }

    fn run_probe(&self, path: &Path, count_packets: bool) -> Result<ProbeOutput> {
        let path_str = path.display().to_string();
        debug!("Probing {} with {} (count_packets={})", path_str, self.ffprobe_path, count_packets);

        let output = Command::new(&self.ffprobe_path)
            .args(probe_args(count_packets))
            .arg(path)
            .output()
            .map_err(|e| VideoError::SourceOpen {
                path: path_str.clone(),
                reason: format!("could not run {}: {}", self.ffprobe_path, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VideoError::SourceOpen {
                path: path_str,
                reason: stderr.trim().to_string(),
            }
            .into());
        }

        let probe = serde_json::from_slice(&output.stdout).map_err(|e| VideoError::ProbeFailed {
            path: path_str,
            reason: format!("invalid ffprobe output: {}", e),
        })?;
        Ok(probe)
    }
}

impl VideoSource for FfmpegSource {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn VideoHandle>> {
        let metadata = self.probe(path)?;
        Ok(Box::new(FfmpegHandle {
            path: path.to_path_buf(),
            ffmpeg_path: self.ffmpeg_path.clone(),
            metadata,
        }))
    }
}

struct FfmpegHandle {
    path: PathBuf,
    ffmpeg_path: String,
    metadata: VideoMetadata,
}

impl VideoHandle for FfmpegHandle {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn decode_frame(&mut self, index: u64) -> Result<Option<Frame>> {
        if self.metadata.frame_count > 0 && index >= self.metadata.frame_count {
            debug!("Frame {} is past the end of {:?}", index, self.path);
            return Ok(None);
        }

        let select = format!("select=eq(n\\,{})", index);
        debug!("Decoding frame {} of {:?}", index, self.path);

        let output = Command::new(&self.ffmpeg_path)
            .args(["-hide_banner", "-loglevel", "error", "-i"])
            .arg(&self.path)
            .args([
                "-vf", &select,
                "-vsync", "0",
                "-frames:v", "1",
                "-f", "image2pipe",
                "-c:v", "png",
                "-",
            ])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| VideoError::DecodeFailed {
                index,
                reason: format!("could not run {}: {}", self.ffmpeg_path, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VideoError::DecodeFailed {
                index,
                reason: stderr.trim().to_string(),
            }
            .into());
        }

        if output.stdout.is_empty() {
            warn!("Decoder produced no frame at index {}", index);
            return Ok(None);
        }

        let frame = Frame::from_encoded(&output.stdout).map_err(|e| VideoError::DecodeFailed {
            index,
            reason: format!("unreadable frame image: {}", e),
        })?;
        Ok(Some(frame))
    }
}

impl Drop for FfmpegHandle {
    fn drop(&mut self) {
        debug!("Released video handle for {:?}", self.path);
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
    nb_read_packets: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

fn probe_args(count_packets: bool) -> Vec<&'static str> {
    let mut args = vec!["-v", "error"];
    if count_packets {
        args.push("-count_packets");
    }
    args.extend([
        "-select_streams", "v:0",
        "-show_entries",
        "stream=width,height,avg_frame_rate,r_frame_rate,nb_frames,nb_read_packets,duration:format=duration",
        "-of", "json",
    ]);
    args
}

/// Whether a video stream is present but its header carries no frame count
fn needs_packet_count(probe: &ProbeOutput) -> bool {
    probe.streams.first().is_some_and(|stream| {
        parse_count(stream.nb_frames.as_deref()).is_none()
            && parse_count(stream.nb_read_packets.as_deref()).is_none()
    })
}

fn metadata_from_probe(probe: &ProbeOutput) -> Option<VideoMetadata> {
    let stream = probe.streams.first()?;

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_rate))
        .unwrap_or_else(|| {
            warn!("Could not determine frame rate, defaulting to 30.0");
            30.0
        });

    let duration = stream
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .or_else(|| {
            probe
                .format
                .as_ref()
                .and_then(|f| f.duration.as_deref())
                .and_then(|d| d.parse::<f64>().ok())
        })
        .unwrap_or(0.0);

    let frame_count = parse_count(stream.nb_frames.as_deref())
        .or_else(|| parse_count(stream.nb_read_packets.as_deref()))
        .unwrap_or_else(|| (duration * fps).round() as u64);

    Some(VideoMetadata {
        duration,
        fps,
        width: stream.width.unwrap_or(0),
        height: stream.height.unwrap_or(0),
        frame_count,
    })
}

fn parse_count(value: Option<&str>) -> Option<u64> {
    value.and_then(|v| v.parse::<u64>().ok()).filter(|&n| n > 0)
}

/// Parse an ffprobe rational such as `30000/1001`
fn parse_rate(rate: &str) -> Option<f64> {
    let (num, den) = rate.split_once('/')?;
    let num: f64 = num.parse().ok()?;
    let den: f64 = den.parse().ok()?;
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}
