//! # snapcam
//!
//! Camera photo capture with in-memory queueing and batch upload.
//!
//! A [`PhotoBooth`] opens the camera (or falls back to file input on touch
//! devices), keeps every captured photo in memory in capture order, and
//! uploads the whole queue concurrently to one HTTP endpoint, reporting a
//! single verdict for the batch.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snapcam::{default_devices, BoothConfig, NullSurface, PhotoBooth};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     snapcam::init_logging();
//!
//!     let mut booth = PhotoBooth::with_http(
//!         BoothConfig::from_env()?,
//!         default_devices(),
//!         Box::new(NullSurface::new()),
//!     )?;
//!
//!     if booth.start().await? {
//!         booth.capture()?;
//!     }
//!
//!     let mut events = booth.events();
//!     let verdict = booth.upload_all().await?;
//!     println!("{}", verdict.message());
//!
//!     for event in events.drain() {
//!         println!("Booth event: {:?}", event);
//!     }
//!
//!     booth.shutdown();
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export core types for easy access
pub use snapcam_core::{CapturedImage, DataUrl, ImageId, SnapcamError};

pub use snapcam_media::{
    default_devices, CaptureConfig, CaptureEvent, FacingMode, MediaDevices, MediaError,
    MediaStream, NullSurface, PreviewSurface, SessionState, StreamInfo, SyntheticCamera,
    SyntheticFailure, VideoResolution,
};

#[cfg(feature = "native")]
pub use snapcam_media::NativeCamera;

pub use snapcam_upload::{
    HttpUploadSink, MemorySink, UploadConfig, UploadError, UploadResult, UploadSink, UploadUnit,
    Verdict,
};

// Public API modules
pub mod booth;
pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod logging;

// Re-export main API types
pub use booth::PhotoBooth;
pub use config::{BoothConfig, DeviceProfile, InputMode, PointerKind};
pub use error::{BoothError, BoothResult};
pub use event::{BoothEvent, EventStream};
pub use export::export_image;
pub use logging::init_logging;
