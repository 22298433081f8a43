//! Media error types and handling
//!
//! This module defines the error types used by camera acquisition and still
//! capture, and how each one is classified when the session decides whether
//! to degrade or report.

use thiserror::Error;

/// Main error type for media operations
#[derive(Error, Debug)]
pub enum MediaError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Invalid configuration provided
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },

    /// Permission to use the camera was denied
    #[error("Permission denied: {operation}")]
    PermissionDenied {
        /// Operation that was denied
        operation: String,
    },

    /// No camera matches the requested constraints
    #[error("Device not found: {device_id}")]
    DeviceNotFound {
        /// Device identifier
        device_id: String,
    },

    /// The camera exists but is held by someone else
    #[error("Device busy: {device_id}")]
    DeviceBusy {
        /// Device identifier
        device_id: String,
    },

    /// The acquired stream could not be attached to the preview surface
    #[error("Preview binding failed: {reason}")]
    BindFailed {
        /// Failure reason
        reason: String,
    },

    /// Capture requested without a live stream
    #[error("Capture not active")]
    CaptureNotActive,

    /// Invalid frame data error
    #[error("Invalid frame data: expected {expected} bytes, got {actual}")]
    InvalidFrameData {
        /// Expected data size
        expected: usize,
        /// Actual data size
        actual: usize,
    },

    /// Encoding operation failed
    #[error("Encoding failed: {format} - {reason}")]
    EncodingFailed {
        /// Target format
        format: String,
        /// Failure reason
        reason: String,
    },

    /// A supplied blob is not a readable image
    #[error("Decode failure: {reason}")]
    DecodeFailure {
        /// Failure reason
        reason: String,
    },

    /// Invalid state for operation
    #[error("Invalid state: {message}")]
    InvalidState {
        /// State error message
        message: String,
    },

    /// Error reported by a platform camera library
    #[error("Backend error: {library} - {message}")]
    Backend {
        /// Library name
        library: String,
        /// Error message
        message: String,
    },
}

/// Result type alias for media operations
pub type MediaResult<T> = Result<T, MediaError>;

impl MediaError {
    /// Check if error is recoverable
    ///
    /// Recoverable errors leave the session usable: the camera may be tried
    /// again later and file capture keeps working.
    pub fn is_recoverable(&self) -> bool {
        match self {
            MediaError::DeviceBusy { .. } => true,
            MediaError::DeviceNotFound { .. } => true,
            MediaError::PermissionDenied { .. } => true,
            MediaError::BindFailed { .. } => true,
            MediaError::Backend { .. } => true,
            MediaError::CaptureNotActive => true,
            MediaError::DecodeFailure { .. } => true,
            MediaError::InvalidConfiguration { .. } => false,
            MediaError::InvalidFrameData { .. } => false,
            _ => false,
        }
    }

    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            MediaError::Io { .. } => ErrorCategory::System,
            MediaError::InvalidConfiguration { .. } => ErrorCategory::Configuration,
            MediaError::PermissionDenied { .. } => ErrorCategory::DeviceUnavailable,
            MediaError::DeviceNotFound { .. } => ErrorCategory::DeviceUnavailable,
            MediaError::DeviceBusy { .. } => ErrorCategory::DeviceUnavailable,
            MediaError::BindFailed { .. } => ErrorCategory::DeviceUnavailable,
            MediaError::Backend { .. } => ErrorCategory::DeviceUnavailable,
            MediaError::CaptureNotActive => ErrorCategory::State,
            MediaError::InvalidState { .. } => ErrorCategory::State,
            MediaError::InvalidFrameData { .. } => ErrorCategory::Encode,
            MediaError::EncodingFailed { .. } => ErrorCategory::Encode,
            MediaError::DecodeFailure { .. } => ErrorCategory::Decode,
        }
    }

    /// Whether the camera could not be obtained or kept
    pub fn is_device_unavailable(&self) -> bool {
        self.category() == ErrorCategory::DeviceUnavailable
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// System-level errors (I/O)
    System,
    /// Configuration and parameter errors
    Configuration,
    /// Camera could not be acquired or bound
    DeviceUnavailable,
    /// Operation not valid in the current session state
    State,
    /// Frame could not be turned into a still image
    Encode,
    /// Supplied blob is not a readable image
    Decode,
}
