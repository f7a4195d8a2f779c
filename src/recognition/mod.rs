//! # Text Recognition Module
//!
//! Runs text recognition over decoded frames and pulls the burned-in
//! `HH:MM:SS` clock out of the recognized text.
//!
//! Recognition engines are expensive to start, so one [`TextRecognizer`] is
//! created per process and shared as an `Arc<dyn TextRecognizer>`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use clocksync::config::RecognitionConfig;
//! use clocksync::recognition::{ClockExtractor, TesseractRecognizer};
//! use clocksync::video::Frame;
//!
//! let recognizer = Arc::new(TesseractRecognizer::new(&RecognitionConfig::default()));
//! let extractor = ClockExtractor::new(recognizer);
//!
//! let frame = Frame::open("frame.png").unwrap();
//! if let Some(clock) = extractor.extract_clock(&frame) {
//!     println!("On-screen clock: {}", clock);
//! }
//! ```

pub mod extractor;
pub mod tesseract;

pub use extractor::{find_clock, ClockExtractor};
pub use tesseract::TesseractRecognizer;

use crate::error::RecognitionError;
use crate::video::types::Frame;

/// A text recognition engine
///
/// Implementations are treated as pure functions of the frame; no state is
/// kept between calls.
pub trait TextRecognizer: Send + Sync {
    /// Returns the name of this engine
    fn name(&self) -> &str;

    /// Recognize the text fragments on a frame, in the order the engine reports them
    fn recognize(&self, frame: &Frame) -> Result<Vec<String>, RecognitionError>;
}
