//! # snapcam core
//!
//! Shared building blocks for snapcam: identified image records, the
//! `data:` URL payload codec they are stored in, and the common error type.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod data_url;
pub mod error;
pub mod record;

// Re-export main types
pub use data_url::DataUrl;
pub use error::{SnapcamError, SnapcamResult};
pub use record::{CapturedImage, ImageId, ImageStore};
