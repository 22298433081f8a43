//! Still image encoding
//!
//! Frames sampled from a stream are encoded as PNG at their native
//! resolution. Blobs handed in from a file picker are already encoded; they
//! are only sniffed to make sure they are an image at all.

use crate::error::{MediaError, MediaResult};
use crate::tracks::VideoFrame;
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

/// Mime type of encoded frames
pub const PNG_MIME: &str = "image/png";

/// Encode an RGB24 frame as PNG
pub fn encode_png(frame: VideoFrame) -> MediaResult<Vec<u8>> {
    frame.validate()?;

    let expected = VideoFrame::expected_len(frame.width, frame.height);
    let actual = frame.data.len();
    let raster = RgbImage::from_raw(frame.width, frame.height, frame.data)
        .ok_or(MediaError::InvalidFrameData { expected, actual })?;

    let mut out = Cursor::new(Vec::with_capacity(actual / 2));
    raster
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| MediaError::EncodingFailed {
            format: "png".to_string(),
            reason: e.to_string(),
        })?;

    Ok(out.into_inner())
}

/// Identify an encoded image by its magic bytes and return its mime type
pub fn sniff_mime(bytes: &[u8]) -> MediaResult<&'static str> {
    if bytes.is_empty() {
        return Err(MediaError::DecodeFailure {
            reason: "empty file".to_string(),
        });
    }

    let format = image::guess_format(bytes).map_err(|e| MediaError::DecodeFailure {
        reason: e.to_string(),
    })?;

    Ok(format.to_mime_type())
}
