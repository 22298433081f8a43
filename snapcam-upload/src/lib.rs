//! # snapcam upload
//!
//! Concurrent upload of captured photos. Every image of a batch is decoded,
//! packaged as a `photo-<id>.png` multipart part and submitted without
//! waiting for its siblings; the outcomes are joined into one verdict.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod config;
pub mod error;
pub mod sink;

// Re-export main types
pub use batch::{UploadResult, Uploader, Verdict};
pub use config::UploadConfig;
pub use error::UploadError;
pub use sink::{HttpUploadSink, MemorySink, UploadSink, UploadUnit};
