//! # snapcam media
//!
//! Camera lifecycle and still capture for snapcam. A capture session
//! acquires a camera stream, binds it to a preview surface, samples frames
//! into PNG stills, accepts already-encoded blobs, and guarantees the stream
//! is stopped on every exit path.

#![warn(clippy::all)]

pub mod capture;
pub mod encode;
pub mod error;
pub mod session;
pub mod tracks;

// Re-export main types
pub use capture::synthetic::{SyntheticCamera, SyntheticFailure};
pub use capture::{
    default_devices, CameraConstraints, CaptureConfig, FacingMode, MediaDevices, MediaStream,
    NullSurface, PreviewSurface, StreamInfo, VideoResolution,
};
pub use encode::{encode_png, sniff_mime, PNG_MIME};
pub use error::{ErrorCategory, MediaError, MediaResult};
pub use session::{CameraHandle, CaptureEvent, CaptureSession, SessionState};
pub use tracks::VideoFrame;

#[cfg(feature = "native")]
pub use capture::native::NativeCamera;
