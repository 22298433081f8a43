//! Upload configuration

use crate::error::UploadError;
use std::time::Duration;

/// Default upload endpoint
pub const DEFAULT_UPLOAD_URL: &str = "http://localhost:3000/api/upload";
/// Default per-submission timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";

/// Upload configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    /// Endpoint receiving `POST` multipart uploads
    pub endpoint: String,
    /// Upper bound for one submission, from dispatch to response status
    pub request_timeout: Duration,
    /// Upper bound for establishing the connection
    pub connect_timeout: Duration,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_UPLOAD_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl UploadConfig {
    /// Configuration for the given endpoint with default timeouts
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), UploadError> {
        let url = reqwest::Url::parse(&self.endpoint).map_err(|e| {
            UploadError::InvalidConfiguration {
                message: format!("invalid upload endpoint '{}': {e}", self.endpoint),
            }
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(UploadError::InvalidConfiguration {
                message: format!("unsupported upload scheme '{}'", url.scheme()),
            });
        }

        if self.request_timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(UploadError::InvalidConfiguration {
                message: "timeouts must be > 0".to_string(),
            });
        }

        Ok(())
    }
}
