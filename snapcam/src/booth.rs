//! Photo booth: one capture session plus one uploader

use crate::config::{BoothConfig, InputMode};
use crate::error::BoothResult;
use crate::event::{BoothEvent, EventStream};
use crate::export;
use snapcam_core::{CapturedImage, ImageId, SnapcamError};
use snapcam_media::{
    CaptureEvent, CaptureSession, MediaDevices, MediaError, PreviewSurface, SessionState,
};
use snapcam_upload::{HttpUploadSink, UploadError, UploadSink, Uploader, Verdict};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Capture, queue and upload photos
///
/// # Example
/// ```rust,no_run
/// use snapcam::{BoothConfig, NullSurface, PhotoBooth, SyntheticCamera};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), snapcam::BoothError> {
/// let mut booth = PhotoBooth::with_http(
///     BoothConfig::from_env()?,
///     Arc::new(SyntheticCamera::new()),
///     Box::new(NullSurface::new()),
/// )?;
///
/// booth.start().await?;
/// booth.capture()?;
/// let verdict = booth.upload_all().await?;
/// println!("{}", verdict.message());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PhotoBooth {
    config: BoothConfig,
    session: CaptureSession,
    capture_events: broadcast::Receiver<CaptureEvent>,
    uploader: Arc<Uploader>,
    event_tx: broadcast::Sender<BoothEvent>,
}

impl PhotoBooth {
    /// Create a booth uploading to an arbitrary sink
    pub fn new(
        config: BoothConfig,
        devices: Arc<dyn MediaDevices>,
        surface: Box<dyn PreviewSurface>,
        sink: Arc<dyn UploadSink>,
    ) -> BoothResult<Self> {
        config.validate()?;
        let session = CaptureSession::new(devices, surface, config.capture.clone())?;
        let capture_events = session.subscribe();
        let uploader = Arc::new(Uploader::new(sink, config.upload.request_timeout));
        let (event_tx, _) = broadcast::channel(config.capture.event_capacity);

        Ok(Self {
            config,
            session,
            capture_events,
            uploader,
            event_tx,
        })
    }

    /// Create a booth posting to the configured HTTP endpoint
    pub fn with_http(
        config: BoothConfig,
        devices: Arc<dyn MediaDevices>,
        surface: Box<dyn PreviewSurface>,
    ) -> BoothResult<Self> {
        let sink = HttpUploadSink::new(&config.upload)?;
        Self::new(config, devices, surface, Arc::new(sink))
    }

    /// Start the live preview when the device supports it
    ///
    /// Returns `Ok(true)` when the camera is live. An unavailable camera is
    /// not an error: the booth keeps working with file capture only and a
    /// [`BoothEvent::CameraUnavailable`] is emitted.
    pub async fn start(&mut self) -> BoothResult<bool> {
        if self.config.input_mode == InputMode::FilePicker {
            info!("File picker mode, camera stays off");
            return Ok(false);
        }

        let outcome = self.session.acquire(self.config.capture.facing).await;
        self.forward_capture_events();

        match outcome {
            Ok(_) => Ok(true),
            Err(e) if e.is_device_unavailable() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Release the camera; capture from files keeps working
    pub fn stop_camera(&mut self) {
        self.session.release();
        self.forward_capture_events();
    }

    /// Take a photo from the live preview
    ///
    /// Blocks while the camera delivers a frame; see
    /// [`CaptureSession::capture`].
    pub fn capture(&mut self) -> BoothResult<CapturedImage> {
        let image = self.session.capture();
        self.forward_capture_events();
        Ok(image?)
    }

    /// Add a photo from an encoded file
    ///
    /// Unreadable files are ignored and yield `None`.
    pub fn capture_from_blob(&mut self, bytes: &[u8]) -> Option<CapturedImage> {
        let image = match self.session.capture_from_blob(bytes) {
            Ok(image) => Some(image),
            Err(MediaError::DecodeFailure { reason }) => {
                debug!("Ignoring unreadable file: {}", reason);
                None
            }
            Err(e) => {
                debug!("Ignoring file: {}", e);
                None
            }
        };
        self.forward_capture_events();
        image
    }

    /// Remove a photo; unknown ids are ignored
    pub fn delete(&mut self, id: &ImageId) -> bool {
        let removed = self.session.delete(id);
        self.forward_capture_events();
        removed
    }

    /// Upload every held photo as one batch
    ///
    /// Rejected with [`UploadError::BatchInFlight`] while a previous batch
    /// is still running.
    pub async fn upload_all(&self) -> BoothResult<Verdict> {
        if self.uploader.is_busy() {
            return Err(UploadError::BatchInFlight.into());
        }

        let photos = self.session.images().to_vec();
        let _ = self.event_tx.send(BoothEvent::UploadStarted {
            count: photos.len(),
        });

        let verdict = self.uploader.upload_all(&photos).await?;
        info!("{}", verdict.message());
        let _ = self.event_tx.send(BoothEvent::UploadFinished { verdict });

        Ok(verdict)
    }

    /// Save a photo as `dir/photo-<id>.png`
    pub async fn export(&self, id: &ImageId, dir: &Path) -> BoothResult<PathBuf> {
        let image = self
            .session
            .get(id)
            .ok_or_else(|| SnapcamError::ImageNotFound { id: id.to_string() })?;
        export::export_image(image, dir).await
    }

    /// Release the camera and drop every held photo
    pub fn shutdown(&mut self) {
        self.session.shutdown();
        self.forward_capture_events();
    }

    /// Subscribe to booth events
    pub fn events(&self) -> EventStream {
        EventStream::new(self.event_tx.subscribe())
    }

    /// Photos held, in capture order
    pub fn images(&self) -> &[CapturedImage] {
        self.session.images()
    }

    /// Look up a photo by id
    pub fn get(&self, id: &ImageId) -> Option<&CapturedImage> {
        self.session.get(id)
    }

    /// Current camera lifecycle state
    pub fn camera_state(&self) -> SessionState {
        self.session.state()
    }

    /// Input mode resolved at construction
    pub fn input_mode(&self) -> InputMode {
        self.config.input_mode
    }

    /// Whether an upload batch is in flight
    pub fn is_uploading(&self) -> bool {
        self.uploader.is_busy()
    }

    /// Get the booth configuration
    pub fn config(&self) -> &BoothConfig {
        &self.config
    }

    fn forward_capture_events(&mut self) {
        loop {
            match self.capture_events.try_recv() {
                Ok(event) => {
                    let _ = self.event_tx.send(BoothEvent::from(event));
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    }
}
