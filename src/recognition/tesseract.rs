use std::io::Write;
use std::process::{Command, Output, Stdio};

use tracing::debug;

use crate::config::RecognitionConfig;
use crate::error::RecognitionError;
use crate::recognition::TextRecognizer;
use crate::video::types::Frame;

/// Text recognition through the `tesseract` command line engine
///
/// Frames are encoded as PNG and piped to `tesseract stdin stdout`; every
/// non-empty output line becomes one fragment.
pub struct TesseractRecognizer {
    tesseract_path: String,
    language: String,
    page_segmentation_mode: u8,
}

impl TesseractRecognizer {
    pub fn new(config: &RecognitionConfig) -> Self {
        Self {
            tesseract_path: config.tesseract_path.clone(),
            language: config.language.clone(),
            page_segmentation_mode: config.page_segmentation_mode,
        }
    }

    /// Check that the tesseract executable can be started
    pub fn check_available(&self) -> bool {
        Command::new(&self.tesseract_path)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, frame: &Frame) -> Result<Vec<String>, RecognitionError> {
        let png = frame.to_png_bytes().map_err(|e| RecognitionError::FrameEncoding {
            reason: e.to_string(),
        })?;

        debug!(
            "Running {} on {}x{} frame (lang={}, psm={})",
            self.tesseract_path,
            frame.width(),
            frame.height(),
            self.language,
            self.page_segmentation_mode
        );

        let mut child = Command::new(&self.tesseract_path)
            .args(["stdin", "stdout", "-l", &self.language, "--psm"])
            .arg(self.page_segmentation_mode.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RecognitionError::EngineFailed {
                reason: format!("could not run {}: {}", self.tesseract_path, e),
            })?;

        // stdin is closed at the end of this block so tesseract sees EOF
        let sent = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&png),
            None => Ok(()),
        };

        // Reap the child even when the frame could not be sent
        let output = child.wait_with_output().map_err(|e| RecognitionError::EngineFailed {
            reason: e.to_string(),
        })?;

        if let Some(reason) = failure_reason(sent.err(), &output) {
            return Err(RecognitionError::EngineFailed { reason });
        }

        Ok(split_fragments(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Prefer tesseract's own stderr over a broken pipe on our side
fn failure_reason(send_error: Option<std::io::Error>, output: &Output) -> Option<String> {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    match send_error {
        Some(e) if stderr.is_empty() => Some(format!("could not send frame: {}", e)),
        Some(_) => Some(stderr),
        None if !output.status.success() => Some(stderr),
        None => None,
    }
}

fn split_fragments(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
