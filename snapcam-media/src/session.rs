//! Capture session
//!
//! A [`CaptureSession`] owns at most one live camera stream and the ordered
//! collection of images captured during its lifetime.
//!
//! ```text
//! Idle -> Acquiring -> Live   -> Idle   (release)
//! Idle -> Acquiring -> Failed -> Idle   (release after a failed acquisition)
//! Idle -> Acquiring -> Idle             (acquisition cancelled)
//! Live -> Failed                        (stream ended on its own)
//! ```
//!
//! The stream lives in a [`CameraHandle`], which stops it when released or
//! dropped, so leaving the session by any path frees the hardware.

use crate::capture::{CaptureConfig, FacingMode, MediaDevices, MediaStream, PreviewSurface, StreamInfo};
use crate::encode::{self, PNG_MIME};
use crate::error::{MediaError, MediaResult};
use crate::tracks::VideoFrame;
use snapcam_core::{CapturedImage, ImageId, ImageStore};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Camera lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No stream held; file capture available
    Idle,
    /// Waiting for the camera
    Acquiring,
    /// Stream held and bound to the preview surface
    Live,
    /// Last acquisition failed; file capture still available
    Failed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Acquiring => "acquiring",
            SessionState::Live => "live",
            SessionState::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capture session events
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    StateChanged {
        from: SessionState,
        to: SessionState,
    },
    ImageCaptured {
        id: ImageId,
    },
    ImageDeleted {
        id: ImageId,
    },
    AcquisitionFailed {
        error: String,
    },
}

/// Exclusive ownership of one live camera stream
///
/// Releasing is idempotent and also happens on drop.
pub struct CameraHandle {
    stream: Box<dyn MediaStream>,
    info: StreamInfo,
    released: bool,
}

impl CameraHandle {
    fn new(stream: Box<dyn MediaStream>) -> Self {
        let info = stream.info();
        Self {
            stream,
            info,
            released: false,
        }
    }

    pub fn info(&self) -> &StreamInfo {
        &self.info
    }

    pub fn is_live(&self) -> bool {
        !self.released && self.stream.is_live()
    }

    fn sample(&mut self) -> MediaResult<VideoFrame> {
        if self.released {
            return Err(MediaError::CaptureNotActive);
        }
        self.stream.current_frame()
    }

    /// Stop every track of the stream
    pub fn release(&mut self) {
        if !self.released {
            self.stream.stop();
            self.released = true;
            debug!("Released camera stream '{}'", self.info.label);
        }
    }
}

impl Drop for CameraHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for CameraHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraHandle")
            .field("info", &self.info)
            .field("released", &self.released)
            .finish()
    }
}

/// Owner of the camera lifecycle and of captured images
pub struct CaptureSession {
    devices: Arc<dyn MediaDevices>,
    surface: Box<dyn PreviewSurface>,
    config: CaptureConfig,
    handle: Option<CameraHandle>,
    state: SessionState,
    images: ImageStore,
    event_tx: broadcast::Sender<CaptureEvent>,
}

impl CaptureSession {
    /// Create a session; no camera is touched until [`acquire`](Self::acquire)
    pub fn new(
        devices: Arc<dyn MediaDevices>,
        surface: Box<dyn PreviewSurface>,
        config: CaptureConfig,
    ) -> MediaResult<Self> {
        config.validate()?;
        let (event_tx, _) = broadcast::channel(config.event_capacity);

        Ok(Self {
            devices,
            surface,
            config,
            handle: None,
            state: SessionState::Idle,
            images: ImageStore::new(),
            event_tx,
        })
    }

    /// Acquire a camera stream and bind it to the preview surface
    ///
    /// Fails with [`MediaError::InvalidState`] while a stream is held; call
    /// [`release`](Self::release) first. When the camera is unavailable the
    /// session moves to [`SessionState::Failed`] and keeps accepting blobs.
    pub async fn acquire(&mut self, facing: FacingMode) -> MediaResult<StreamInfo> {
        if self.handle.is_some() {
            return Err(MediaError::InvalidState {
                message: "camera already acquired; release it first".to_string(),
            });
        }

        self.transition(SessionState::Acquiring);
        let constraints = self.config.constraints(facing);
        let devices = Arc::clone(&self.devices);

        let requested = {
            let pending = PendingAcquire {
                state: &mut self.state,
                event_tx: &self.event_tx,
                armed: true,
            };
            let requested = devices.get_user_media(&constraints).await;
            pending.disarm();
            requested
        };

        let stream = match requested {
            Ok(stream) => stream,
            Err(e) => return Err(self.fail_acquisition(e)),
        };

        // Dropping the handle on a bind error stops the stream.
        let handle = CameraHandle::new(stream);
        if let Err(e) = self.surface.bind(handle.info()) {
            drop(handle);
            return Err(self.fail_acquisition(e));
        }

        let info = handle.info().clone();
        self.handle = Some(handle);
        self.transition(SessionState::Live);
        info!("Camera '{}' live at {}", info.label, info.resolution);

        Ok(info)
    }

    fn fail_acquisition(&mut self, error: MediaError) -> MediaError {
        warn!("Failed to access camera: {}", error);
        let _ = self.event_tx.send(CaptureEvent::AcquisitionFailed {
            error: error.to_string(),
        });
        self.transition(SessionState::Failed);
        error
    }

    /// Sample the current frame of the live stream into a new PNG image
    ///
    /// Runs synchronously on the calling thread. The native backend waits
    /// for its camera thread to deliver a frame, so async callers using it
    /// should call this from `tokio::task::spawn_blocking` or
    /// `block_in_place`.
    ///
    /// A stream that ended on its own is released and the session moves to
    /// [`SessionState::Failed`].
    pub fn capture(&mut self) -> MediaResult<CapturedImage> {
        match self.handle.as_ref().map(CameraHandle::is_live) {
            None => return Err(MediaError::CaptureNotActive),
            Some(false) => {
                self.drop_ended_stream();
                return Err(MediaError::CaptureNotActive);
            }
            Some(true) => {}
        }
        let handle = self.handle.as_mut().ok_or(MediaError::CaptureNotActive)?;

        let frame = handle.sample()?;
        let (width, height) = (frame.width, frame.height);
        let png = encode::encode_png(frame)?;
        let image = CapturedImage::from_bytes(PNG_MIME, &png);
        debug!("Captured {}x{} frame as {}", width, height, image.id);

        Ok(self.store(image))
    }

    fn drop_ended_stream(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            warn!("Camera '{}' stopped unexpectedly", handle.info().label);
            self.surface.unbind();
            handle.release();
            let _ = self.event_tx.send(CaptureEvent::AcquisitionFailed {
                error: "camera stream ended".to_string(),
            });
        }
        self.transition(SessionState::Failed);
    }

    /// Wrap an already-encoded image blob, e.g. from a file picker
    ///
    /// The bytes are kept unchanged. Blobs that are not a recognizable image
    /// yield [`MediaError::DecodeFailure`] and create no record.
    pub fn capture_from_blob(&mut self, bytes: &[u8]) -> MediaResult<CapturedImage> {
        let mime = encode::sniff_mime(bytes)?;
        let image = CapturedImage::from_bytes(mime, bytes);
        debug!("Accepted {} byte {} blob as {}", bytes.len(), mime, image.id);

        Ok(self.store(image))
    }

    fn store(&mut self, image: CapturedImage) -> CapturedImage {
        self.images.push(image.clone());
        let _ = self.event_tx.send(CaptureEvent::ImageCaptured {
            id: image.id.clone(),
        });
        image
    }

    /// Stop and unbind the live stream, if any. Always ends in `Idle`.
    pub fn release(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            self.surface.unbind();
            handle.release();
            info!("Camera '{}' released", handle.info().label);
        }
        self.transition(SessionState::Idle);
    }

    /// Remove an image by id; returns whether anything was removed
    pub fn delete(&mut self, id: &ImageId) -> bool {
        match self.images.remove(id) {
            Some(_) => {
                let _ = self
                    .event_tx
                    .send(CaptureEvent::ImageDeleted { id: id.clone() });
                debug!("Deleted image {}", id);
                true
            }
            None => false,
        }
    }

    /// Tear the session down, releasing the camera
    pub fn shutdown(&mut self) {
        self.release();
        self.images.clear();
    }

    pub fn images(&self) -> &[CapturedImage] {
        self.images.as_slice()
    }

    pub fn get(&self, id: &ImageId) -> Option<&CapturedImage> {
        self.images.get(id)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.state == SessionState::Live
    }

    /// Info about the live stream, if any
    pub fn stream_info(&self) -> Option<&StreamInfo> {
        self.handle.as_ref().map(CameraHandle::info)
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<CaptureEvent> {
        self.event_tx.subscribe()
    }

    fn transition(&mut self, to: SessionState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        debug!("Capture session {} -> {}", from, to);
        let _ = self.event_tx.send(CaptureEvent::StateChanged { from, to });
    }
}

/// Puts the session back to `Idle` when an acquisition is cancelled mid-wait
struct PendingAcquire<'a> {
    state: &'a mut SessionState,
    event_tx: &'a broadcast::Sender<CaptureEvent>,
    armed: bool,
}

impl PendingAcquire<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingAcquire<'_> {
    fn drop(&mut self) {
        if self.armed && *self.state == SessionState::Acquiring {
            *self.state = SessionState::Idle;
            debug!("Camera acquisition cancelled");
            let _ = self.event_tx.send(CaptureEvent::StateChanged {
                from: SessionState::Acquiring,
                to: SessionState::Idle,
            });
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.release();
        }
    }
}

impl fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("state", &self.state)
            .field("handle", &self.handle)
            .field("images", &self.images.len())
            .finish()
    }
}
