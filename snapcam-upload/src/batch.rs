//! Upload batches
//!
//! An [`Uploader`] submits every image of a batch concurrently and folds the
//! per-item outcomes into one [`Verdict`]. Only one batch may be in flight
//! per uploader; the guard is released when the batch settles, whatever its
//! outcome.

use crate::config::UploadConfig;
use crate::error::UploadError;
use crate::sink::{HttpUploadSink, UploadSink, UploadUnit};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use snapcam_core::{CapturedImage, ImageId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Aggregate outcome of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// Every item was accepted (vacuously true for an empty batch)
    AllSucceeded,
    /// At least one item failed
    PartialOrTotalFailure,
}

impl Verdict {
    /// Fold per-item results into a verdict
    pub fn from_results(results: &[UploadResult]) -> Self {
        if results.iter().all(|result| result.ok) {
            Verdict::AllSucceeded
        } else {
            Verdict::PartialOrTotalFailure
        }
    }

    /// Whether every item succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::AllSucceeded)
    }

    /// The single message surfaced to the user after a batch
    pub fn message(&self) -> &'static str {
        match self {
            Verdict::AllSucceeded => "All photos uploaded successfully.",
            Verdict::PartialOrTotalFailure => "Some photos failed to upload.",
        }
    }
}

/// Outcome of one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// Id of the submitted image
    pub id: ImageId,
    /// True only when the destination accepted the image
    pub ok: bool,
}

/// Resets the in-flight flag when the batch settles
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Dispatches upload batches to a sink
pub struct Uploader {
    sink: Arc<dyn UploadSink>,
    timeout: Duration,
    in_flight: AtomicBool,
}

impl Uploader {
    /// Create an uploader for any sink
    pub fn new(sink: Arc<dyn UploadSink>, timeout: Duration) -> Self {
        Self {
            sink,
            timeout,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Create an uploader posting to the configured HTTP endpoint
    pub fn http(config: &UploadConfig) -> Result<Self, UploadError> {
        let sink = HttpUploadSink::new(config)?;
        Ok(Self::new(Arc::new(sink), config.request_timeout))
    }

    /// Whether a batch is currently in flight
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Per-submission timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn begin(&self) -> Result<InFlightGuard<'_>, UploadError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| UploadError::BatchInFlight)?;
        Ok(InFlightGuard {
            flag: &self.in_flight,
        })
    }

    /// Upload every image and return the aggregate verdict
    ///
    /// Fails only with [`UploadError::BatchInFlight`]; item failures are
    /// folded into the verdict.
    pub async fn upload_all(&self, images: &[CapturedImage]) -> Result<Verdict, UploadError> {
        let results = self.upload_each(images).await?;
        let verdict = Verdict::from_results(&results);
        let failed = results.iter().filter(|result| !result.ok).count();
        info!(
            "Upload batch settled: {} of {} succeeded ({:?})",
            results.len() - failed,
            results.len(),
            verdict
        );
        Ok(verdict)
    }

    /// Upload every image and return the per-item results in input order
    pub async fn upload_each(
        &self,
        images: &[CapturedImage],
    ) -> Result<Vec<UploadResult>, UploadError> {
        let _guard = self.begin()?;

        if images.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Dispatching {} uploads", images.len());
        let submissions = images.iter().map(|image| self.submit_one(image));
        Ok(join_all(submissions).await)
    }

    async fn submit_one(&self, image: &CapturedImage) -> UploadResult {
        let outcome = match UploadUnit::from_image(image) {
            Ok(unit) => match tokio::time::timeout(self.timeout, self.sink.submit(unit)).await {
                Ok(result) => result,
                Err(_) => Err(UploadError::Timeout {
                    id: image.id.to_string(),
                    duration: self.timeout,
                }),
            },
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                debug!("Uploaded {}", image.id);
                UploadResult {
                    id: image.id.clone(),
                    ok: true,
                }
            }
            Err(e) => {
                warn!("Upload failed: {}", e);
                UploadResult {
                    id: image.id.clone(),
                    ok: false,
                }
            }
        }
    }
}

impl std::fmt::Debug for Uploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Uploader")
            .field("timeout", &self.timeout)
            .field("in_flight", &self.is_busy())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(ok: bool) -> UploadResult {
        UploadResult {
            id: ImageId::generate(),
            ok,
        }
    }

    #[test]
    fn test_verdict_from_results() {
        assert_eq!(Verdict::from_results(&[]), Verdict::AllSucceeded);
        assert_eq!(
            Verdict::from_results(&[result(true), result(true)]),
            Verdict::AllSucceeded
        );
        assert_eq!(
            Verdict::from_results(&[result(true), result(false), result(true)]),
            Verdict::PartialOrTotalFailure
        );
        assert_eq!(
            Verdict::from_results(&[result(false)]),
            Verdict::PartialOrTotalFailure
        );
    }

    #[test]
    fn test_verdict_messages() {
        assert!(Verdict::AllSucceeded.is_success());
        assert!(!Verdict::PartialOrTotalFailure.is_success());
        assert_ne!(
            Verdict::AllSucceeded.message(),
            Verdict::PartialOrTotalFailure.message()
        );
    }
}
