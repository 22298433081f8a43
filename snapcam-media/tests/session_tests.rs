//! Tests for the capture session lifecycle
//!
//! These cover acquisition, degradation when the camera is unavailable,
//! release on every exit path, and the captured image collection.

use snapcam_core::ImageId;
use snapcam_media::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn small_camera() -> SyntheticCamera {
    SyntheticCamera::new().with_resolution(VideoResolution::new(16, 12))
}

fn session_with(camera: &SyntheticCamera) -> CaptureSession {
    CaptureSession::new(
        Arc::new(camera.clone()),
        Box::new(NullSurface::new()),
        CaptureConfig::default(),
    )
    .unwrap()
}

fn png_blob() -> Vec<u8> {
    encode_png(VideoFrame {
        width: 3,
        height: 2,
        data: vec![200; VideoFrame::expected_len(3, 2)],
        timestamp: 0,
    })
    .unwrap()
}

struct BrokenSurface;

impl PreviewSurface for BrokenSurface {
    fn bind(&mut self, _stream: &StreamInfo) -> MediaResult<()> {
        Err(MediaError::BindFailed {
            reason: "no video element".to_string(),
        })
    }

    fn unbind(&mut self) {}
}

// ============================================================================
// CAMERA LIFECYCLE TESTS
// ============================================================================

#[tokio::test]
async fn test_acquire_goes_live() {
    let camera = small_camera();
    let mut session = session_with(&camera);
    assert_eq!(session.state(), SessionState::Idle);

    let info = session.acquire(FacingMode::Environment).await.unwrap();

    assert_eq!(info.resolution, VideoResolution::new(16, 12));
    assert_eq!(info.facing, FacingMode::Environment);
    assert_eq!(session.state(), SessionState::Live);
    assert_eq!(camera.live_streams(), 1);
}

#[tokio::test]
async fn test_reacquire_requires_release() {
    let camera = small_camera();
    let mut session = session_with(&camera);
    session.acquire(FacingMode::Environment).await.unwrap();

    let err = session.acquire(FacingMode::User).await.unwrap_err();
    assert!(matches!(err, MediaError::InvalidState { .. }));
    assert_eq!(session.state(), SessionState::Live);
    assert_eq!(camera.opened_streams(), 1);

    session.release();
    session.acquire(FacingMode::User).await.unwrap();
    assert_eq!(camera.opened_streams(), 2);
    assert_eq!(camera.live_streams(), 1);
}

#[tokio::test]
async fn test_release_is_idempotent() {
    let camera = small_camera();
    let mut session = session_with(&camera);

    // Never acquired
    session.release();
    assert_eq!(session.state(), SessionState::Idle);

    session.acquire(FacingMode::Environment).await.unwrap();
    session.release();
    session.release();

    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(camera.stopped_streams(), 1);
    assert_eq!(camera.live_streams(), 0);
}

#[tokio::test]
async fn test_unavailable_camera_degrades_to_blob_capture() {
    for failure in [
        SyntheticFailure::PermissionDenied,
        SyntheticFailure::DeviceNotFound,
        SyntheticFailure::DeviceBusy,
    ] {
        let camera = small_camera().failing(failure);
        let mut session = session_with(&camera);

        let err = session.acquire(FacingMode::Environment).await.unwrap_err();
        assert!(err.is_device_unavailable());
        assert_eq!(session.state(), SessionState::Failed);

        // Live capture is unavailable but blobs still work
        assert!(matches!(
            session.capture(),
            Err(MediaError::CaptureNotActive)
        ));
        session.capture_from_blob(&png_blob()).unwrap();
        assert_eq!(session.len(), 1);

        session.release();
        assert_eq!(session.state(), SessionState::Idle);
    }
}

#[tokio::test]
async fn test_bind_failure_releases_stream() {
    let camera = small_camera();
    let mut session = CaptureSession::new(
        Arc::new(camera.clone()),
        Box::new(BrokenSurface),
        CaptureConfig::default(),
    )
    .unwrap();

    let err = session.acquire(FacingMode::Environment).await.unwrap_err();

    assert!(matches!(err, MediaError::BindFailed { .. }));
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(camera.opened_streams(), 1);
    assert_eq!(camera.live_streams(), 0);
    assert!(session.stream_info().is_none());
}

#[tokio::test]
async fn test_dropping_session_releases_camera() {
    let camera = small_camera();
    {
        let mut session = session_with(&camera);
        session.acquire(FacingMode::Environment).await.unwrap();
        assert_eq!(camera.live_streams(), 1);
    }
    assert_eq!(camera.live_streams(), 0);
}

#[tokio::test]
async fn test_shutdown_releases_and_clears() {
    let camera = small_camera();
    let mut session = session_with(&camera);
    session.acquire(FacingMode::Environment).await.unwrap();
    session.capture().unwrap();

    session.shutdown();

    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.is_empty());
    assert_eq!(camera.live_streams(), 0);
}

#[tokio::test]
async fn test_state_events() {
    let camera = small_camera();
    let mut session = session_with(&camera);
    let mut events = session.subscribe();

    session.acquire(FacingMode::Environment).await.unwrap();
    session.release();

    let mut transitions = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let CaptureEvent::StateChanged { from, to } = event {
            transitions.push((from, to));
        }
    }
    assert_eq!(
        transitions,
        vec![
            (SessionState::Idle, SessionState::Acquiring),
            (SessionState::Acquiring, SessionState::Live),
            (SessionState::Live, SessionState::Idle),
        ]
    );
}

#[tokio::test]
async fn test_acquisition_failure_event() {
    let camera = small_camera().failing(SyntheticFailure::PermissionDenied);
    let mut session = session_with(&camera);
    let mut events = session.subscribe();

    let _ = session.acquire(FacingMode::Environment).await;

    let mut saw_failure = false;
    while let Ok(event) = events.try_recv() {
        if let CaptureEvent::AcquisitionFailed { error } = event {
            assert!(error.contains("Permission denied"));
            saw_failure = true;
        }
    }
    assert!(saw_failure);
}

#[tokio::test]
async fn test_cancelled_acquire_returns_to_idle() {
    let camera = small_camera().with_acquire_delay(Duration::from_millis(200));
    let mut session = session_with(&camera);
    let mut events = session.subscribe();

    let outcome = tokio::time::timeout(
        Duration::from_millis(10),
        session.acquire(FacingMode::Environment),
    )
    .await;

    assert!(outcome.is_err());
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(camera.opened_streams(), 0);

    let mut transitions = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let CaptureEvent::StateChanged { from, to } = event {
            transitions.push((from, to));
        }
    }
    assert_eq!(
        transitions,
        vec![
            (SessionState::Idle, SessionState::Acquiring),
            (SessionState::Acquiring, SessionState::Idle),
        ]
    );

    session.acquire(FacingMode::Environment).await.unwrap();
    assert_eq!(session.state(), SessionState::Live);
}

#[tokio::test]
async fn test_ended_stream_moves_to_failed() {
    let camera = small_camera();
    let mut session = session_with(&camera);
    session.acquire(FacingMode::Environment).await.unwrap();
    let mut events = session.subscribe();

    camera.disconnect();

    assert!(matches!(
        session.capture(),
        Err(MediaError::CaptureNotActive)
    ));
    assert_eq!(session.state(), SessionState::Failed);
    assert!(session.stream_info().is_none());
    assert_eq!(camera.live_streams(), 0);
    assert!(session.is_empty());

    let mut saw_failure = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, CaptureEvent::AcquisitionFailed { .. }) {
            saw_failure = true;
        }
    }
    assert!(saw_failure);

    session.acquire(FacingMode::Environment).await.unwrap();
    assert!(session.capture().is_ok());
}

// ============================================================================
// CAPTURE TESTS
// ============================================================================

#[tokio::test]
async fn test_capture_produces_png_at_native_resolution() {
    let camera = small_camera();
    let mut session = session_with(&camera);
    session.acquire(FacingMode::Environment).await.unwrap();

    let image = session.capture().unwrap();

    assert_eq!(image.mime(), PNG_MIME);
    let png = image.decode().unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (16, 12));
    assert_eq!(session.state(), SessionState::Live);
}

#[tokio::test]
async fn test_capture_from_blocking_task() {
    let camera = small_camera();
    let mut session = session_with(&camera);
    session.acquire(FacingMode::Environment).await.unwrap();

    let (session, captured) = tokio::task::spawn_blocking(move || {
        let captured = session.capture();
        (session, captured)
    })
    .await
    .unwrap();

    let image = captured.unwrap();
    assert_eq!(session.images(), &[image]);
    assert!(session.is_live());
}

#[tokio::test]
async fn test_capture_without_camera_fails() {
    let camera = small_camera();
    let mut session = session_with(&camera);

    assert!(matches!(
        session.capture(),
        Err(MediaError::CaptureNotActive)
    ));
    assert!(session.is_empty());
}

#[tokio::test]
async fn test_captures_keep_order_and_unique_ids() {
    let camera = small_camera();
    let mut session = session_with(&camera);
    session.acquire(FacingMode::Environment).await.unwrap();

    let mut captured = Vec::new();
    for i in 0..10 {
        let image = if i % 3 == 0 {
            session.capture_from_blob(&png_blob()).unwrap()
        } else {
            session.capture().unwrap()
        };
        captured.push(image.id);
    }

    let held: Vec<ImageId> = session.images().iter().map(|i| i.id.clone()).collect();
    assert_eq!(held, captured);

    let unique: HashSet<&ImageId> = held.iter().collect();
    assert_eq!(unique.len(), held.len());
}

#[tokio::test]
async fn test_blob_round_trip_is_byte_identical() {
    let camera = small_camera();
    let mut session = session_with(&camera);
    let blob = png_blob();

    let image = session.capture_from_blob(&blob).unwrap();

    assert_eq!(image.decode().unwrap(), blob);
    assert_eq!(camera.opened_streams(), 0);
}

#[tokio::test]
async fn test_malformed_blob_creates_no_record() {
    let camera = small_camera();
    let mut session = session_with(&camera);

    let err = session.capture_from_blob(b"definitely not an image").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Decode);
    assert!(session.capture_from_blob(&[]).is_err());
    assert!(session.is_empty());
}

#[tokio::test]
async fn test_delete() {
    let camera = small_camera();
    let mut session = session_with(&camera);
    let first = session.capture_from_blob(&png_blob()).unwrap();
    let second = session.capture_from_blob(&png_blob()).unwrap();

    assert!(!session.delete(&ImageId::from("missing")));
    assert_eq!(session.len(), 2);

    assert!(session.delete(&first.id));
    assert!(!session.delete(&first.id));
    assert_eq!(session.images(), &[second]);
}
