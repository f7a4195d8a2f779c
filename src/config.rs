use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for clocksync
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Video probing, decoding and transcoding
    pub video: VideoConfig,

    /// Text recognition engine settings
    pub recognition: RecognitionConfig,

    /// Event log parsing
    pub events: EventsConfig,

    /// Playback collaborator settings
    pub playback: PlaybackConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.video.validate()?;
        self.recognition.validate()?;
        self.events.validate()?;
        Ok(())
    }
}

/// Video access configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// ffmpeg executable used for decoding and transcoding
    pub ffmpeg_path: String,

    /// ffprobe executable used to open videos and count frames
    pub ffprobe_path: String,

    /// Re-encode the input before reading clocks and playing it back
    pub transcode: bool,

    /// Working directory for transcoded copies
    pub work_dir: PathBuf,

    /// File name of the transcoded copy inside `work_dir`
    pub transcoded_name: String,

    /// Codec passed to ffmpeg's `-c:v`
    pub video_codec: String,

    /// How many frames before the reported end the end clock is read
    pub end_frame_backoff: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            transcode: true,
            work_dir: PathBuf::from("./assets"),
            transcoded_name: "out_h264.mp4".to_string(),
            video_codec: "libx264".to_string(),
            end_frame_backoff: 2,
        }
    }
}

impl VideoConfig {
    /// Fixed location of the transcoded copy
    pub fn transcoded_path(&self) -> PathBuf {
        self.work_dir.join(&self.transcoded_name)
    }

    fn validate(&self) -> Result<()> {
        if self.end_frame_backoff == 0 {
            return Err(ConfigError::InvalidValue {
                key: "video.end_frame_backoff".to_string(),
                value: self.end_frame_backoff.to_string()
            }.into());
        }

        if self.transcoded_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "video.transcoded_name".to_string(),
                value: self.transcoded_name.clone()
            }.into());
        }

        Ok(())
    }
}

/// Text recognition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// tesseract executable
    pub tesseract_path: String,

    /// Recognition language (tesseract `-l`)
    pub language: String,

    /// Page segmentation mode (tesseract `--psm`, 0-13)
    pub page_segmentation_mode: u8,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            tesseract_path: "tesseract".to_string(),
            language: "eng".to_string(),
            // Sparse text: overlays are isolated glyph runs
            page_segmentation_mode: 11,
        }
    }
}

impl RecognitionConfig {
    fn validate(&self) -> Result<()> {
        if self.page_segmentation_mode > 13 {
            return Err(ConfigError::InvalidValue {
                key: "recognition.page_segmentation_mode".to_string(),
                value: self.page_segmentation_mode.to_string()
            }.into());
        }

        if self.language.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "recognition.language".to_string(),
                value: self.language.clone()
            }.into());
        }

        Ok(())
    }
}

/// Event log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Column holding each row's date-time; its last token is the time of day
    pub time_column: String,

    /// Field delimiter of the CSV file
    pub delimiter: char,

    /// Placeholder shown before any value is selected
    pub unselected_label: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            time_column: "DATE AND TIME".to_string(),
            delimiter: ',',
            unselected_label: "Select".to_string(),
        }
    }
}

impl EventsConfig {
    /// Delimiter as the single byte the CSV reader expects
    pub fn delimiter_byte(&self) -> Option<u8> {
        u8::try_from(self.delimiter).ok().filter(u8::is_ascii)
    }

    fn validate(&self) -> Result<()> {
        if self.delimiter_byte().is_none() {
            return Err(ConfigError::InvalidValue {
                key: "events.delimiter".to_string(),
                value: self.delimiter.to_string()
            }.into());
        }

        if self.time_column.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "events.time_column".to_string(),
                value: self.time_column.clone()
            }.into());
        }

        Ok(())
    }
}

/// Playback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Launch a player after every seek
    pub enabled: bool,

    /// Player executable (ffplay-compatible `-ss` flag)
    pub player_path: String,

    /// Close the player when the video ends
    pub autoexit: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            player_path: "ffplay".to_string(),
            autoexit: true,
        }
    }
}
