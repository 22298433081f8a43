//! Error types for snapcam

use thiserror::Error;

/// Main error type for snapcam core operations
#[derive(Error, Debug)]
pub enum SnapcamError {
    /// A data URL did not have the `data:<mime>;base64,<payload>` shape
    #[error("Malformed data URL: {reason}")]
    MalformedDataUrl {
        /// What was wrong with the URL
        reason: String,
    },

    /// The base64 payload of a data URL could not be decoded
    #[error("Payload decode failed: {source}")]
    PayloadDecode {
        /// Underlying base64 error
        #[from]
        source: base64::DecodeError,
    },

    /// No image with the given id is held
    #[error("Image not found: {id}")]
    ImageNotFound {
        /// Requested image id
        id: String,
    },

    /// Invalid configuration provided
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },

    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

/// Result type alias for snapcam core operations
pub type SnapcamResult<T> = Result<T, SnapcamError>;

impl SnapcamError {
    /// Whether this error means an image payload could not be read back
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            SnapcamError::MalformedDataUrl { .. } | SnapcamError::PayloadDecode { .. }
        )
    }
}
