//! Event system for photo booth observers
//!
//! A UI re-renders from these events instead of polling the booth.

use snapcam_core::ImageId;
use snapcam_media::{CaptureEvent, SessionState};
use snapcam_upload::Verdict;
use tokio::sync::broadcast;
use tracing::debug;

/// Events emitted by a photo booth
#[derive(Debug, Clone, PartialEq)]
pub enum BoothEvent {
    /// Camera lifecycle state changed
    CameraStateChanged {
        /// Previous state
        from: SessionState,
        /// New state
        to: SessionState,
    },
    /// The camera could not be used; only file capture is available
    CameraUnavailable {
        /// Why acquisition failed
        reason: String,
    },
    /// A photo was added
    PhotoAdded {
        /// Id of the new photo
        id: ImageId,
    },
    /// A photo was removed
    PhotoRemoved {
        /// Id of the removed photo
        id: ImageId,
    },
    /// An upload batch was dispatched
    UploadStarted {
        /// Number of photos in the batch
        count: usize,
    },
    /// An upload batch settled and the booth is ready again
    UploadFinished {
        /// Aggregate outcome
        verdict: Verdict,
    },
}

impl BoothEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            BoothEvent::CameraStateChanged { .. } => "camera_state_changed",
            BoothEvent::CameraUnavailable { .. } => "camera_unavailable",
            BoothEvent::PhotoAdded { .. } => "photo_added",
            BoothEvent::PhotoRemoved { .. } => "photo_removed",
            BoothEvent::UploadStarted { .. } => "upload_started",
            BoothEvent::UploadFinished { .. } => "upload_finished",
        }
    }

    /// Check if this is an upload-related event
    pub fn is_upload_event(&self) -> bool {
        matches!(
            self,
            BoothEvent::UploadStarted { .. } | BoothEvent::UploadFinished { .. }
        )
    }
}

impl From<CaptureEvent> for BoothEvent {
    fn from(event: CaptureEvent) -> Self {
        match event {
            CaptureEvent::StateChanged { from, to } => BoothEvent::CameraStateChanged { from, to },
            CaptureEvent::ImageCaptured { id } => BoothEvent::PhotoAdded { id },
            CaptureEvent::ImageDeleted { id } => BoothEvent::PhotoRemoved { id },
            CaptureEvent::AcquisitionFailed { error } => {
                BoothEvent::CameraUnavailable { reason: error }
            }
        }
    }
}

/// Stream of booth events for one observer
#[derive(Debug)]
pub struct EventStream {
    receiver: broadcast::Receiver<BoothEvent>,
}

impl EventStream {
    pub(crate) fn new(receiver: broadcast::Receiver<BoothEvent>) -> Self {
        Self { receiver }
    }

    /// Get the next event; `None` once the booth is gone
    ///
    /// Events missed by a slow observer are skipped.
    pub async fn next(&mut self) -> Option<BoothEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("Event observer lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Try to get the next event without waiting
    pub fn try_next(&mut self) -> Option<BoothEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    /// Drain every event currently queued
    pub fn drain(&mut self) -> Vec<BoothEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_events_map_to_booth_events() {
        let id = ImageId::from("a");
        let event = BoothEvent::from(CaptureEvent::ImageCaptured { id: id.clone() });
        assert_eq!(event, BoothEvent::PhotoAdded { id });
        assert_eq!(event.event_type(), "photo_added");
        assert!(!event.is_upload_event());

        let failed = BoothEvent::from(CaptureEvent::AcquisitionFailed {
            error: "busy".to_string(),
        });
        assert_eq!(failed.event_type(), "camera_unavailable");
    }

    #[test]
    fn test_stream_ends_when_sender_dropped() {
        let (tx, rx) = broadcast::channel(4);
        let mut stream = EventStream::new(rx);

        tx.send(BoothEvent::UploadStarted { count: 2 }).unwrap();
        drop(tx);

        assert_eq!(
            tokio_test::block_on(stream.next()),
            Some(BoothEvent::UploadStarted { count: 2 })
        );
        assert_eq!(tokio_test::block_on(stream.next()), None);
    }

    #[test]
    fn test_lagged_observer_keeps_latest() {
        let (tx, rx) = broadcast::channel(2);
        let mut stream = EventStream::new(rx);
        for count in 0..5 {
            tx.send(BoothEvent::UploadStarted { count }).unwrap();
        }

        let events = stream.drain();
        assert_eq!(
            events,
            vec![
                BoothEvent::UploadStarted { count: 3 },
                BoothEvent::UploadStarted { count: 4 },
            ]
        );
    }
}
