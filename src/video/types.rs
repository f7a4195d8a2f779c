use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// Represents a single decoded video frame
///
/// This is a simple wrapper around an RGB image buffer, the unit handed
/// from a video source to text recognition.
#[derive(Clone, Debug)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_fn(width, height, |_, _| Rgb(color));
        Self { buffer }
    }

    /// Decode a frame from encoded image bytes (PNG, JPEG)
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self::from_dynamic(image))
    }

    /// Load a frame from an image file on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, image::ImageError> {
        let image = image::open(path)?;
        Ok(Self::from_dynamic(image))
    }

    fn from_dynamic(image: DynamicImage) -> Self {
        let buffer = match image {
            DynamicImage::ImageRgb8(img) => img,
            other => other.to_rgb8(),
        };
        Self { buffer }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let pixel = self.buffer.get_pixel(x, y);
        [pixel[0], pixel[1], pixel[2]]
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Encode the frame as PNG bytes
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(self.buffer.clone())
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
        Ok(bytes)
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.buffer.save(path)
    }
}

/// Stream properties of an opened video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub duration: f64,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub frame_count: u64,
}

impl VideoMetadata {
    /// Index `backoff` frames before the reported end of the stream
    pub fn last_usable_index(&self, backoff: u64) -> u64 {
        self.frame_count.saturating_sub(backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_roundtrip_keeps_pixels() {
        let frame = Frame::new_filled(8, 4, [10, 20, 30]);
        let bytes = frame.to_png_bytes().unwrap();
        let decoded = Frame::from_encoded(&bytes).unwrap();
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 4);
        assert_eq!(decoded.get_pixel(3, 2), [10, 20, 30]);
    }

    #[test]
    fn test_last_usable_index() {
        let metadata = VideoMetadata {
            duration: 10.0,
            fps: 30.0,
            width: 640,
            height: 480,
            frame_count: 300,
        };
        assert_eq!(metadata.last_usable_index(2), 298);

        let tiny = VideoMetadata { frame_count: 1, ..metadata };
        assert_eq!(tiny.last_usable_index(2), 0);
    }
}
