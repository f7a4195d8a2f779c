//! # Playback
//!
//! The playback collaborator receives a media file and a start offset and
//! takes care of rendering. The engine's only promise is a non-negative
//! offset within the video's duration.

use std::path::Path;
use std::process::{Child, Command, Stdio};

use tracing::{debug, info};

use crate::clock::PlaybackOffset;
use crate::config::PlaybackConfig;
use crate::error::{PlaybackError, Result};

/// Something that can play a video from a given offset
pub trait Player {
    /// Returns the name of this player
    fn name(&self) -> &str;

    /// Start playback of `media` at `offset`
    fn play(&mut self, media: &Path, offset: PlaybackOffset) -> Result<()>;
}

/// Create the player described by the configuration
pub fn player_from_config(config: &PlaybackConfig) -> Box<dyn Player> {
    if config.enabled {
        Box::new(FfplayPlayer::new(config))
    } else {
        Box::new(NullPlayer)
    }
}

/// Plays through an ffplay-compatible executable
///
/// Only one playback window is kept open; starting a new seek closes the
/// previous one.
pub struct FfplayPlayer {
    player_path: String,
    autoexit: bool,
    current: Option<Child>,
}

impl FfplayPlayer {
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            player_path: config.player_path.clone(),
            autoexit: config.autoexit,
            current: None,
        }
    }

    fn stop_current(&mut self) {
        if let Some(mut child) = self.current.take() {
            if let Err(e) = child.kill() {
                debug!("Previous player already exited: {}", e);
            }
            let _ = child.wait();
        }
    }
}

impl Player for FfplayPlayer {
    fn name(&self) -> &str {
        "ffplay"
    }

    fn play(&mut self, media: &Path, offset: PlaybackOffset) -> Result<()> {
        self.stop_current();

        let mut cmd = Command::new(&self.player_path);
        cmd.args(["-hide_banner", "-loglevel", "error", "-ss"])
            .arg(offset.as_secs().to_string());
        if self.autoexit {
            cmd.arg("-autoexit");
        }
        cmd.arg(media)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        debug!("Player command: {:?}", cmd);

        let child = cmd.spawn().map_err(|e| PlaybackError::LaunchFailed {
            player: self.player_path.clone(),
            reason: e.to_string(),
        })?;

        info!("Playing {:?} from {}", media, offset);
        self.current = Some(child);
        Ok(())
    }
}

impl Drop for FfplayPlayer {
    fn drop(&mut self) {
        self.stop_current();
    }
}

/// Logs seek requests without rendering anything
pub struct NullPlayer;

impl Player for NullPlayer {
    fn name(&self) -> &str {
        "none"
    }

    fn play(&mut self, media: &Path, offset: PlaybackOffset) -> Result<()> {
        info!("Seek {:?} to {} (playback disabled)", media, offset);
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_from_config() {
        let disabled = PlaybackConfig {
            enabled: false,
            ..PlaybackConfig::default()
        };
        assert_eq!(player_from_config(&disabled).name(), "none");
        assert_eq!(player_from_config(&PlaybackConfig::default()).name(), "ffplay");
    }

    #[test]
    fn test_missing_player_binary() {
        let config = PlaybackConfig {
            player_path: "/nonexistent/ffplay".to_string(),
            ..PlaybackConfig::default()
        };
        let mut player = FfplayPlayer::new(&config);
        let result = player.play(Path::new("video.mp4"), PlaybackOffset::from_secs(5));
        assert!(result.is_err());
    }

    #[test]
    fn test_null_player_accepts_everything() {
        let mut player = NullPlayer;
        assert!(player.play(Path::new("video.mp4"), PlaybackOffset::ZERO).is_ok());
    }
}
