//! Upload error types

use snapcam_core::SnapcamError;
use std::time::Duration;
use thiserror::Error;

/// Main error type for upload operations
#[derive(Error, Debug)]
pub enum UploadError {
    /// The request never produced a response
    #[error("Transport error uploading {id}: {reason}")]
    Transport {
        /// Image id
        id: String,
        /// Reason for transport failure
        reason: String,
    },

    /// The endpoint answered with a non-success status
    #[error("Upload of {id} rejected with status {status}")]
    Status {
        /// Image id
        id: String,
        /// HTTP status code
        status: u16,
    },

    /// No answer within the per-submission timeout
    #[error("Upload of {id} timed out after {duration:?}")]
    Timeout {
        /// Image id
        id: String,
        /// Timeout that elapsed
        duration: Duration,
    },

    /// Stored payload could not be turned back into bytes
    #[error("Cannot decode payload of {id}: {source}")]
    Decode {
        /// Image id
        id: String,
        /// Underlying decode error
        #[source]
        source: SnapcamError,
    },

    /// Another batch is still in flight
    #[error("An upload batch is already in flight")]
    BatchInFlight,

    /// The HTTP client could not be built
    #[error("Failed to build HTTP client: {reason}")]
    HttpClientBuild {
        /// Reason reported by the client builder
        reason: String,
    },

    /// Invalid configuration provided
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },
}

impl UploadError {
    /// Whether this is a failure of a single item, folded into the verdict
    pub fn is_item_failure(&self) -> bool {
        matches!(
            self,
            UploadError::Transport { .. }
                | UploadError::Status { .. }
                | UploadError::Timeout { .. }
                | UploadError::Decode { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_failures() {
        let status = UploadError::Status {
            id: "a".to_string(),
            status: 500,
        };
        assert!(status.is_item_failure());
        assert_eq!(status.to_string(), "Upload of a rejected with status 500");

        assert!(!UploadError::BatchInFlight.is_item_failure());
    }
}
