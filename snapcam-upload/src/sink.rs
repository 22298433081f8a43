//! Upload sinks
//!
//! A sink receives one [`UploadUnit`] at a time and reports success or
//! failure. [`HttpUploadSink`] posts to the remote endpoint; [`MemorySink`]
//! keeps everything in memory for demos and tests.

use crate::config::{UploadConfig, FILE_FIELD};
use crate::error::UploadError;
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::multipart::{Form, Part};
use snapcam_core::{CapturedImage, ImageId};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// One image packaged for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadUnit {
    /// Id of the image being uploaded
    pub id: ImageId,
    /// File name sent with the part, `photo-<id>.png`
    pub file_name: String,
    /// Mime type of the payload
    pub mime: String,
    /// Decoded image bytes
    pub bytes: Vec<u8>,
}

impl UploadUnit {
    /// Decode a captured image into an upload unit
    pub fn from_image(image: &CapturedImage) -> Result<Self, UploadError> {
        let bytes = image.decode().map_err(|source| UploadError::Decode {
            id: image.id.to_string(),
            source,
        })?;

        Ok(Self {
            id: image.id.clone(),
            file_name: image.file_name(),
            mime: image.mime().to_string(),
            bytes,
        })
    }
}

/// Destination of uploaded images
#[async_trait]
pub trait UploadSink: Send + Sync {
    /// Submit one unit; `Ok` only when the destination accepted it
    async fn submit(&self, unit: UploadUnit) -> Result<(), UploadError>;
}

/// Multipart `POST` to an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpUploadSink {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpUploadSink {
    /// Build a sink for the configured endpoint
    pub fn new(config: &UploadConfig) -> Result<Self, UploadError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| UploadError::HttpClientBuild {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Endpoint uploads are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl UploadSink for HttpUploadSink {
    async fn submit(&self, unit: UploadUnit) -> Result<(), UploadError> {
        let id = unit.id.to_string();
        let part = Part::bytes(unit.bytes)
            .file_name(unit.file_name)
            .mime_str(&unit.mime)
            .map_err(|e| UploadError::Transport {
                id: id.clone(),
                reason: e.to_string(),
            })?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport {
                id: id.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        debug!("Upload of {} answered {}", id, status);
        if status.is_success() {
            Ok(())
        } else {
            Err(UploadError::Status {
                id,
                status: status.as_u16(),
            })
        }
    }
}

/// In-memory sink recording every accepted unit
///
/// Individual ids can be scripted to fail with a status code or to stall
/// before answering.
#[derive(Debug, Default)]
pub struct MemorySink {
    received: Mutex<Vec<UploadUnit>>,
    failures: Mutex<HashMap<ImageId, u16>>,
    delays: Mutex<HashMap<ImageId, Duration>>,
}

impl MemorySink {
    /// Create an empty sink that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the given id with a non-success status
    pub fn fail_with(&self, id: &ImageId, status: u16) {
        self.failures.lock().insert(id.clone(), status);
    }

    /// Wait before answering the given id
    pub fn delay(&self, id: &ImageId, delay: Duration) {
        self.delays.lock().insert(id.clone(), delay);
    }

    /// Units that reached the sink, in completion order
    pub fn received(&self) -> Vec<UploadUnit> {
        self.received.lock().clone()
    }

    /// Ids of units that reached the sink, in completion order
    pub fn received_ids(&self) -> Vec<ImageId> {
        self.received.lock().iter().map(|unit| unit.id.clone()).collect()
    }
}

#[async_trait]
impl UploadSink for MemorySink {
    async fn submit(&self, unit: UploadUnit) -> Result<(), UploadError> {
        let delay = self.delays.lock().get(&unit.id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.failures.lock().get(&unit.id).copied();
        let id = unit.id.to_string();
        self.received.lock().push(unit);

        match failure {
            Some(status) => Err(UploadError::Status { id, status }),
            None => Ok(()),
        }
    }
}
