use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, warn};

use crate::clock::ClockReading;
use crate::recognition::TextRecognizer;
use crate::video::types::Frame;

/// Fixed shape of an on-screen clock: two digits, colon, two digits, colon, two digits
static CLOCK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]{2}:[0-9]{2}:[0-9]{2}").expect("invalid clock pattern")
});

/// Find the first `HH:MM:SS` substring in `text`
///
/// Only the first match is considered. A match whose fields are out of range
/// (such as `99:99:99`) is reported as no clock rather than skipped in favour
/// of a later match.
pub fn find_clock(text: &str) -> Option<ClockReading> {
    let matched = CLOCK_PATTERN.find(text)?.as_str();
    match ClockReading::parse(matched) {
        Ok(clock) => Some(clock),
        Err(e) => {
            warn!("Recognized clock text is out of range: {}", e);
            None
        }
    }
}

/// Extracts the on-screen clock from a frame using a shared recognizer
#[derive(Clone)]
pub struct ClockExtractor {
    recognizer: Arc<dyn TextRecognizer>,
}

impl ClockExtractor {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self { recognizer }
    }

    pub fn recognizer_name(&self) -> &str {
        self.recognizer.name()
    }

    /// Recognize all text on the frame and return the first clock found
    ///
    /// Fragments are joined with single spaces, in recognizer order, before
    /// matching. Recognition failures are logged and read as no clock.
    pub fn extract_clock(&self, frame: &Frame) -> Option<ClockReading> {
        let fragments = match self.recognizer.recognize(frame) {
            Ok(fragments) => fragments,
            Err(e) => {
                warn!("{} recognition failed: {}", self.recognizer.name(), e);
                return None;
            }
        };

        let text = fragments.join(" ");
        debug!("Recognized text: {:?}", text);
        find_clock(&text)
    }
}
