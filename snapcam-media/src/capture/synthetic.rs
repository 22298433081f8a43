//! Synthetic camera for tests, demos and machines without a camera
//!
//! Streams render a moving gradient so consecutive captures differ. The
//! camera can be told to refuse acquisition the way a real device would, and
//! it counts opened and stopped streams so callers can check that nothing is
//! left running.

use super::{CameraConstraints, MediaDevices, MediaStream, StreamInfo, VideoResolution};
use crate::error::{MediaError, MediaResult};
use crate::tracks::VideoFrame;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

const DEVICE_ID: &str = "synthetic_camera_0";

/// How a synthetic acquisition should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticFailure {
    PermissionDenied,
    DeviceNotFound,
    DeviceBusy,
}

#[derive(Debug, Default)]
struct Counters {
    opened: AtomicUsize,
    stopped: AtomicUsize,
    // Streams with a serial below this have been cut off
    ended_before: AtomicUsize,
}

/// Camera that produces generated frames
#[derive(Debug, Clone)]
pub struct SyntheticCamera {
    resolution: VideoResolution,
    failure: Option<SyntheticFailure>,
    acquire_delay: Option<Duration>,
    counters: Arc<Counters>,
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self {
            resolution: VideoResolution::VGA,
            failure: None,
            acquire_delay: None,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Native resolution used when constraints don't ask for one
    pub fn with_resolution(mut self, resolution: VideoResolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Make every acquisition fail
    pub fn failing(mut self, failure: SyntheticFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Suspend for a while before handing out a stream
    pub fn with_acquire_delay(mut self, delay: Duration) -> Self {
        self.acquire_delay = Some(delay);
        self
    }

    /// End every stream handed out so far, as if the device was unplugged
    ///
    /// Ended streams report not live; they count as stopped once their
    /// owner stops them.
    pub fn disconnect(&self) {
        let opened = self.counters.opened.load(Ordering::SeqCst);
        self.counters.ended_before.store(opened, Ordering::SeqCst);
    }

    /// Streams handed out so far
    pub fn opened_streams(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Streams stopped so far
    pub fn stopped_streams(&self) -> usize {
        self.counters.stopped.load(Ordering::SeqCst)
    }

    /// Streams handed out and not yet stopped
    pub fn live_streams(&self) -> usize {
        self.opened_streams() - self.stopped_streams()
    }
}

#[async_trait]
impl MediaDevices for SyntheticCamera {
    async fn get_user_media(
        &self,
        constraints: &CameraConstraints,
    ) -> MediaResult<Box<dyn MediaStream>> {
        if let Some(delay) = self.acquire_delay {
            tokio::time::sleep(delay).await;
        }

        match self.failure {
            Some(SyntheticFailure::PermissionDenied) => {
                return Err(MediaError::PermissionDenied {
                    operation: "camera access".to_string(),
                })
            }
            Some(SyntheticFailure::DeviceNotFound) => {
                return Err(MediaError::DeviceNotFound {
                    device_id: format!("{} camera", constraints.facing),
                })
            }
            Some(SyntheticFailure::DeviceBusy) => {
                return Err(MediaError::DeviceBusy {
                    device_id: DEVICE_ID.to_string(),
                })
            }
            None => {}
        }

        let serial = self.counters.opened.fetch_add(1, Ordering::SeqCst);
        let info = StreamInfo {
            label: format!("Synthetic Camera ({})", constraints.facing),
            facing: constraints.facing,
            resolution: constraints.resolution.unwrap_or(self.resolution),
        };
        debug!("Opened synthetic stream at {}", info.resolution);

        Ok(Box::new(SyntheticStream {
            info,
            serial,
            sequence: 0,
            live: true,
            counters: self.counters.clone(),
        }))
    }
}

struct SyntheticStream {
    info: StreamInfo,
    serial: usize,
    sequence: u32,
    live: bool,
    counters: Arc<Counters>,
}

impl MediaStream for SyntheticStream {
    fn info(&self) -> StreamInfo {
        self.info.clone()
    }

    fn current_frame(&mut self) -> MediaResult<VideoFrame> {
        if !self.is_live() {
            return Err(MediaError::CaptureNotActive);
        }

        let VideoResolution { width, height } = self.info.resolution;
        let shift = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);

        let mut data = Vec::with_capacity(VideoFrame::expected_len(width, height));
        for y in 0..height {
            for x in 0..width {
                data.push((x.wrapping_add(shift) % 256) as u8);
                data.push((y % 256) as u8);
                data.push((x.wrapping_add(y).wrapping_add(shift) % 256) as u8);
            }
        }

        Ok(VideoFrame {
            width,
            height,
            data,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
        })
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.counters.stopped.fetch_add(1, Ordering::SeqCst);
            debug!("Stopped synthetic stream");
        }
    }

    fn is_live(&self) -> bool {
        self.live && self.serial >= self.counters.ended_before.load(Ordering::SeqCst)
    }
}
