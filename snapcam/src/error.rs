//! Error type for the photo booth facade

use snapcam_core::SnapcamError;
use snapcam_media::MediaError;
use snapcam_upload::UploadError;
use thiserror::Error;

/// Main error type for photo booth operations
#[derive(Error, Debug)]
pub enum BoothError {
    /// Camera or still capture error
    #[error(transparent)]
    Media(#[from] MediaError),

    /// Upload error
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Image record or payload error
    #[error(transparent)]
    Core(#[from] SnapcamError),

    /// Invalid configuration provided
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },
}

/// Result type alias for photo booth operations
pub type BoothResult<T> = Result<T, BoothError>;

impl From<std::io::Error> for BoothError {
    fn from(source: std::io::Error) -> Self {
        BoothError::Core(SnapcamError::Io { source })
    }
}
