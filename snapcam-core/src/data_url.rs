//! Self-contained `data:` URL payloads
//!
//! Captured images are stored the way a browser would hand them to an
//! `<img>` element: `data:<mime>;base64,<payload>`. Only the base64 form is
//! produced or accepted.

use crate::error::{SnapcamError, SnapcamResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// An encoded image payload in data URL form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataUrl(String);

impl DataUrl {
    /// Encode raw bytes under the given mime type
    pub fn encode(mime: &str, bytes: &[u8]) -> Self {
        Self(format!("{SCHEME}{mime}{BASE64_MARKER}{}", BASE64.encode(bytes)))
    }

    /// Parse and validate an existing data URL
    pub fn parse(url: impl Into<String>) -> SnapcamResult<Self> {
        let url = url.into();
        let (_, payload) = split(&url)?;
        BASE64.decode(payload)?;
        Ok(Self(url))
    }

    /// Mime type declared by the URL (may carry parameters)
    pub fn mime(&self) -> &str {
        split(&self.0).map(|(mime, _)| mime).unwrap_or_default()
    }

    /// Decode the payload back into the original bytes
    pub fn decode(&self) -> SnapcamResult<Vec<u8>> {
        let (_, payload) = split(&self.0)?;
        Ok(BASE64.decode(payload)?)
    }

    /// Borrow the full URL text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the textual URL in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the URL text is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn split(url: &str) -> SnapcamResult<(&str, &str)> {
    let rest = url
        .strip_prefix(SCHEME)
        .ok_or_else(|| SnapcamError::MalformedDataUrl {
            reason: "missing data: scheme".to_string(),
        })?;
    rest.split_once(BASE64_MARKER)
        .ok_or_else(|| SnapcamError::MalformedDataUrl {
            reason: "missing ;base64, marker".to_string(),
        })
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DataUrl {
    type Err = SnapcamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DataUrl {
    type Error = SnapcamError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<DataUrl> for String {
    fn from(url: DataUrl) -> Self {
        url.0
    }
}

impl AsRef<str> for DataUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let url = DataUrl::encode("image/png", b"abc");
        assert_eq!(url.as_str(), "data:image/png;base64,YWJj");
        assert_eq!(url.mime(), "image/png");
    }

    #[test]
    fn test_decode_returns_original_bytes() {
        let bytes: Vec<u8> = (0..=255).collect();
        let url = DataUrl::encode("image/jpeg", &bytes);
        assert_eq!(url.decode().unwrap(), bytes);
    }

    #[test]
    fn test_parse_accepts_browser_output() {
        let url: DataUrl = "data:image/png;base64,iVBORw0KGgo=".parse().unwrap();
        assert_eq!(url.mime(), "image/png");
        assert_eq!(
            url.decode().unwrap(),
            vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]
        );
    }

    #[test]
    fn test_parse_rejects_missing_scheme() {
        let err = DataUrl::parse("image/png;base64,AAAA").unwrap_err();
        assert!(matches!(err, SnapcamError::MalformedDataUrl { .. }));
    }

    #[test]
    fn test_parse_rejects_non_base64_form() {
        let err = DataUrl::parse("data:text/plain,hello").unwrap_err();
        assert!(matches!(err, SnapcamError::MalformedDataUrl { .. }));
    }

    #[test]
    fn test_parse_rejects_bad_payload() {
        let err = DataUrl::parse("data:image/png;base64,@@@").unwrap_err();
        assert!(matches!(err, SnapcamError::PayloadDecode { .. }));
        assert!(err.is_decode_failure());
    }

    #[test]
    fn test_serde_validates() {
        let ok: DataUrl = serde_json::from_str("\"data:image/png;base64,YWJj\"").unwrap();
        assert_eq!(ok.decode().unwrap(), b"abc");

        let bad: Result<DataUrl, _> = serde_json::from_str("\"not a data url\"");
        assert!(bad.is_err());
    }
}
