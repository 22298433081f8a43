//! Raw video frames sampled from a live stream

use crate::error::{MediaError, MediaResult};

/// Bytes per pixel of a packed RGB24 raster
pub const RGB24_BYTES_PER_PIXEL: usize = 3;

/// Video frame representation
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Packed RGB24 pixels, row-major
    pub data: Vec<u8>,
    /// Timestamp in milliseconds
    pub timestamp: u64,
}

impl VideoFrame {
    /// Size in bytes of an RGB24 raster of the given dimensions
    pub fn expected_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * RGB24_BYTES_PER_PIXEL
    }

    /// Check that the pixel buffer matches the declared dimensions
    pub fn validate(&self) -> MediaResult<()> {
        let expected = Self::expected_len(self.width, self.height);
        if self.width == 0 || self.height == 0 || self.data.len() != expected {
            return Err(MediaError::InvalidFrameData {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}
