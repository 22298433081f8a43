//! Configuration types and defaults

use crate::error::{BoothError, BoothResult};
use snapcam_media::{CaptureConfig, FacingMode};
use snapcam_upload::UploadConfig;
use std::time::Duration;

/// Primary pointing device of the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerKind {
    /// Mouse or trackpad
    #[default]
    Fine,
    /// Touch screen
    Coarse,
}

/// How photos are taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Live camera preview with frame capture; file input still accepted
    #[default]
    LivePreview,
    /// File picker only; the camera is never opened
    FilePicker,
}

/// One-shot capability probe of the host device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceProfile {
    /// Primary pointer
    pub pointer: PointerKind,
}

impl DeviceProfile {
    /// Probe the device from `SNAPCAM_POINTER` (`fine` or `coarse`)
    pub fn detect() -> BoothResult<Self> {
        Self::detect_with(|key| std::env::var(key).ok())
    }

    /// Probe using an arbitrary variable lookup
    pub fn detect_with(lookup: impl Fn(&str) -> Option<String>) -> BoothResult<Self> {
        let pointer = match lookup("SNAPCAM_POINTER").as_deref().map(str::trim) {
            None | Some("") | Some("fine") => PointerKind::Fine,
            Some("coarse") => PointerKind::Coarse,
            Some(other) => {
                return Err(BoothError::InvalidConfiguration {
                    message: format!(
                        "unsupported SNAPCAM_POINTER '{other}' (expected 'fine' or 'coarse')"
                    ),
                })
            }
        };
        Ok(Self { pointer })
    }

    /// Touch devices take photos through the file picker
    pub fn input_mode(&self) -> InputMode {
        match self.pointer {
            PointerKind::Fine => InputMode::LivePreview,
            PointerKind::Coarse => InputMode::FilePicker,
        }
    }
}

/// Photo booth configuration
#[derive(Debug, Clone, Default)]
pub struct BoothConfig {
    /// Camera settings
    pub capture: CaptureConfig,
    /// Upload endpoint and timeouts
    pub upload: UploadConfig,
    /// Resolved once from the device profile
    pub input_mode: InputMode,
}

impl BoothConfig {
    /// Defaults for the given device
    pub fn for_device(profile: DeviceProfile) -> Self {
        Self {
            input_mode: profile.input_mode(),
            ..Self::default()
        }
    }

    /// Build configuration from environment variables.
    ///
    /// Optional:
    /// - `SNAPCAM_POINTER`: `fine` (default) or `coarse`
    /// - `SNAPCAM_FACING`: `environment` (default) or `user`
    /// - `SNAPCAM_UPLOAD_URL`: default `http://localhost:3000/api/upload`
    /// - `SNAPCAM_UPLOAD_TIMEOUT_SECS`: default 30
    /// - `SNAPCAM_CONNECT_TIMEOUT_SECS`: default 10
    pub fn from_env() -> BoothResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> BoothResult<Self> {
        let mut config = Self::for_device(DeviceProfile::detect_with(&lookup)?);

        if let Some(facing) = lookup("SNAPCAM_FACING") {
            config.capture.facing = facing.parse::<FacingMode>()?;
        }
        if let Some(url) = lookup("SNAPCAM_UPLOAD_URL") {
            config.upload.endpoint = url.trim().to_string();
        }
        if let Some(secs) = lookup("SNAPCAM_UPLOAD_TIMEOUT_SECS") {
            config.upload.request_timeout = parse_secs("SNAPCAM_UPLOAD_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = lookup("SNAPCAM_CONNECT_TIMEOUT_SECS") {
            config.upload.connect_timeout = parse_secs("SNAPCAM_CONNECT_TIMEOUT_SECS", &secs)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> BoothResult<()> {
        self.capture.validate()?;
        self.upload.validate()?;
        Ok(())
    }
}

fn parse_secs(key: &str, value: &str) -> BoothResult<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| BoothError::InvalidConfiguration {
            message: format!("{key} must be a whole number of seconds: {e}"),
        })
}
