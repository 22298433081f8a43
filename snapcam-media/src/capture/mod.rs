//! Camera access seams
//!
//! The capture session never talks to hardware directly. It asks a
//! [`MediaDevices`] implementation for a [`MediaStream`], attaches the stream
//! to a [`PreviewSurface`], and stops the stream when it is done.

#[cfg(feature = "native")]
pub mod native;
pub mod synthetic;

use crate::error::{MediaError, MediaResult};
use crate::tracks::VideoFrame;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Which physical camera to prefer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear camera, facing away from the user
    #[default]
    Environment,
    /// Front camera, facing the user
    User,
}

impl FacingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::Environment => "environment",
            FacingMode::User => "user",
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacingMode {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "environment" => Ok(FacingMode::Environment),
            "user" => Ok(FacingMode::User),
            other => Err(MediaError::InvalidConfiguration {
                message: format!("unknown facing mode '{other}' (expected 'environment' or 'user')"),
            }),
        }
    }
}

/// Video resolution information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VideoResolution {
    pub width: u32,
    pub height: u32,
}

impl VideoResolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const HD: Self = Self::new(1280, 720);
    pub const FULL_HD: Self = Self::new(1920, 1080);
    pub const VGA: Self = Self::new(640, 480);

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

impl fmt::Display for VideoResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Constraints passed when asking for a camera stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraConstraints {
    pub facing: FacingMode,
    /// Preferred resolution; `None` takes whatever the device delivers
    pub resolution: Option<VideoResolution>,
}

/// Description of an acquired stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    /// Human readable device label
    pub label: String,
    pub facing: FacingMode,
    /// Native resolution frames are delivered at
    pub resolution: VideoResolution,
}

/// Capture session configuration
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub facing: FacingMode,
    pub resolution: Option<VideoResolution>,
    /// Capacity of the session event channel
    pub event_capacity: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            facing: FacingMode::Environment,
            resolution: None,
            event_capacity: 64,
        }
    }
}

impl CaptureConfig {
    /// Validate configuration
    pub fn validate(&self) -> MediaResult<()> {
        if let Some(resolution) = self.resolution {
            if resolution.width == 0 || resolution.height == 0 {
                return Err(MediaError::InvalidConfiguration {
                    message: "Invalid resolution".to_string(),
                });
            }
        }

        if self.event_capacity == 0 {
            return Err(MediaError::InvalidConfiguration {
                message: "Event capacity must be > 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn constraints(&self, facing: FacingMode) -> CameraConstraints {
        CameraConstraints {
            facing,
            resolution: self.resolution,
        }
    }
}

/// Source of camera streams
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Ask for a live stream matching the constraints
    async fn get_user_media(
        &self,
        constraints: &CameraConstraints,
    ) -> MediaResult<Box<dyn MediaStream>>;
}

/// A live camera stream
pub trait MediaStream: Send {
    fn info(&self) -> StreamInfo;
    /// Sample the frame currently shown by the stream; may block until one
    /// is available
    fn current_frame(&mut self) -> MediaResult<VideoFrame>;
    /// Stop every track of the stream. Must be idempotent.
    fn stop(&mut self);
    fn is_live(&self) -> bool;
}

/// Where a live stream is shown while the user frames the shot
pub trait PreviewSurface: Send {
    fn bind(&mut self, stream: &StreamInfo) -> MediaResult<()>;
    fn unbind(&mut self);
}

/// Headless preview surface that only remembers what is bound
#[derive(Debug, Default)]
pub struct NullSurface {
    bound: Option<StreamInfo>,
}

impl NullSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bound(&self) -> Option<&StreamInfo> {
        self.bound.as_ref()
    }
}

impl PreviewSurface for NullSurface {
    fn bind(&mut self, stream: &StreamInfo) -> MediaResult<()> {
        self.bound = Some(stream.clone());
        Ok(())
    }

    fn unbind(&mut self) {
        self.bound = None;
    }
}

/// Get the camera source for this build
///
/// With the `native` feature this opens real hardware through nokhwa,
/// otherwise a synthetic test-pattern camera is returned.
pub fn default_devices() -> Arc<dyn MediaDevices> {
    #[cfg(feature = "native")]
    {
        Arc::new(native::NativeCamera::new())
    }
    #[cfg(not(feature = "native"))]
    {
        Arc::new(synthetic::SyntheticCamera::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_mode_parse() {
        assert_eq!("environment".parse::<FacingMode>().unwrap(), FacingMode::Environment);
        assert_eq!(" User ".parse::<FacingMode>().unwrap(), FacingMode::User);
        assert!("sideways".parse::<FacingMode>().is_err());
        assert_eq!(FacingMode::default(), FacingMode::Environment);
    }

    #[test]
    fn test_capture_config_validation() {
        assert!(CaptureConfig::default().validate().is_ok());

        let zero = CaptureConfig {
            resolution: Some(VideoResolution::new(0, 480)),
            ..CaptureConfig::default()
        };
        assert!(zero.validate().is_err());

        let no_events = CaptureConfig {
            event_capacity: 0,
            ..CaptureConfig::default()
        };
        assert!(no_events.validate().is_err());
    }

    #[test]
    fn test_null_surface_tracks_binding() {
        let mut surface = NullSurface::new();
        let info = StreamInfo {
            label: "test".to_string(),
            facing: FacingMode::User,
            resolution: VideoResolution::VGA,
        };
        surface.bind(&info).unwrap();
        assert_eq!(surface.bound(), Some(&info));
        surface.unbind();
        assert!(surface.bound().is_none());
    }
}
