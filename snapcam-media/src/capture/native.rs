//! Native camera access through nokhwa
//!
//! nokhwa camera handles are not `Send` on every platform, so each stream
//! owns a dedicated thread that opens the device, answers frame requests and
//! closes the device when told to stop or when the stream is dropped.

use super::{CameraConstraints, FacingMode, MediaDevices, MediaStream, StreamInfo, VideoResolution};
use crate::error::{MediaError, MediaResult};
use crate::tracks::VideoFrame;
use async_trait::async_trait;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::{Camera, NokhwaError};
use std::sync::mpsc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

enum Command {
    Frame(mpsc::Sender<MediaResult<VideoFrame>>),
    Stop,
}

fn backend_error(error: NokhwaError) -> MediaError {
    MediaError::Backend {
        library: "nokhwa".to_string(),
        message: error.to_string(),
    }
}

fn thread_gone() -> MediaError {
    MediaError::Backend {
        library: "nokhwa".to_string(),
        message: "camera thread exited".to_string(),
    }
}

/// Hardware camera source
#[derive(Debug, Clone)]
pub struct NativeCamera {
    environment_index: u32,
    user_index: u32,
}

impl Default for NativeCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeCamera {
    /// Use camera 0 for both facing modes
    pub fn new() -> Self {
        Self {
            environment_index: 0,
            user_index: 0,
        }
    }

    /// Map each facing mode to a device index
    pub fn with_indices(environment_index: u32, user_index: u32) -> Self {
        Self {
            environment_index,
            user_index,
        }
    }

    fn index_for(&self, facing: FacingMode) -> u32 {
        match facing {
            FacingMode::Environment => self.environment_index,
            FacingMode::User => self.user_index,
        }
    }
}

#[async_trait]
impl MediaDevices for NativeCamera {
    async fn get_user_media(
        &self,
        constraints: &CameraConstraints,
    ) -> MediaResult<Box<dyn MediaStream>> {
        let index = self.index_for(constraints.facing);
        let (ready_tx, ready_rx) = oneshot::channel();
        let (command_tx, command_rx) = mpsc::channel();

        std::thread::Builder::new()
            .name(format!("snapcam-camera-{index}"))
            .spawn(move || camera_thread(index, ready_tx, command_rx))?;

        let resolution = ready_rx.await.map_err(|_| thread_gone())??;
        info!("Opened camera {} at {}", index, resolution);

        Ok(Box::new(NativeStream {
            info: StreamInfo {
                label: format!("Camera {index}"),
                facing: constraints.facing,
                resolution,
            },
            commands: command_tx,
            live: true,
        }))
    }
}

fn camera_thread(
    index: u32,
    ready: oneshot::Sender<MediaResult<VideoResolution>>,
    commands: mpsc::Receiver<Command>,
) {
    let requested =
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
    let opened = Camera::new(CameraIndex::Index(index), requested).and_then(|mut camera| {
        camera.open_stream()?;
        Ok(camera)
    });

    let mut camera = match opened {
        Ok(camera) => camera,
        Err(e) => {
            let _ = ready.send(Err(backend_error(e)));
            return;
        }
    };

    let resolution = camera.resolution();
    let resolution = VideoResolution::new(resolution.width(), resolution.height());
    if ready.send(Ok(resolution)).is_ok() {
        while let Ok(command) = commands.recv() {
            match command {
                Command::Frame(reply) => {
                    let _ = reply.send(grab_frame(&mut camera));
                }
                Command::Stop => break,
            }
        }
    }

    if let Err(e) = camera.stop_stream() {
        warn!("Failed to stop camera {}: {}", index, e);
    }
    debug!("Camera thread {} exiting", index);
}

fn grab_frame(camera: &mut Camera) -> MediaResult<VideoFrame> {
    let buffer = camera.frame().map_err(backend_error)?;
    let rgb = buffer.decode_image::<RgbFormat>().map_err(backend_error)?;
    let (width, height) = rgb.dimensions();

    Ok(VideoFrame {
        width,
        height,
        data: rgb.into_raw(),
        timestamp: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64,
    })
}

struct NativeStream {
    info: StreamInfo,
    commands: mpsc::Sender<Command>,
    live: bool,
}

impl MediaStream for NativeStream {
    fn info(&self) -> StreamInfo {
        self.info.clone()
    }

    fn current_frame(&mut self) -> MediaResult<VideoFrame> {
        if !self.live {
            return Err(MediaError::CaptureNotActive);
        }

        let (reply_tx, reply_rx) = mpsc::channel();
        self.commands
            .send(Command::Frame(reply_tx))
            .map_err(|_| thread_gone())?;
        reply_rx.recv().map_err(|_| thread_gone())?
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            let _ = self.commands.send(Command::Stop);
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

impl Drop for NativeStream {
    fn drop(&mut self) {
        self.stop();
    }
}
