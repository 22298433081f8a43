//! Captured image records and their in-memory collection

use crate::data_url::DataUrl;
use crate::error::SnapcamResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque unique identifier of a captured image
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    /// Generate a fresh id, unique for the lifetime of the process
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name used for uploads and exports: `photo-<id>.png`
    pub fn file_name(&self) -> String {
        format!("photo-{}.png", self.0)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ImageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An identified, encoded still image held in memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedImage {
    /// Unique id
    pub id: ImageId,
    /// Encoded image payload
    pub image_data: DataUrl,
}

impl CapturedImage {
    /// Wrap an encoded payload under a freshly generated id
    pub fn new(image_data: DataUrl) -> Self {
        Self {
            id: ImageId::generate(),
            image_data,
        }
    }

    /// Encode raw image bytes and wrap them under a fresh id
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self::new(DataUrl::encode(mime, bytes))
    }

    /// File name of this image, `photo-<id>.png`
    pub fn file_name(&self) -> String {
        self.id.file_name()
    }

    /// Mime type of the stored payload
    pub fn mime(&self) -> &str {
        self.image_data.mime()
    }

    /// Decode the stored payload back into binary form
    pub fn decode(&self) -> SnapcamResult<Vec<u8>> {
        self.image_data.decode()
    }
}

/// Insertion-ordered collection of captured images
#[derive(Debug, Clone, Default)]
pub struct ImageStore {
    images: Vec<CapturedImage>,
}

impl ImageStore {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an image at the end
    pub fn push(&mut self, image: CapturedImage) {
        self.images.push(image);
    }

    /// Remove the image with the given id, if held
    pub fn remove(&mut self, id: &ImageId) -> Option<CapturedImage> {
        let index = self.images.iter().position(|image| &image.id == id)?;
        Some(self.images.remove(index))
    }

    /// Look up an image by id
    pub fn get(&self, id: &ImageId) -> Option<&CapturedImage> {
        self.images.iter().find(|image| &image.id == id)
    }

    /// Whether an image with the given id is held
    pub fn contains(&self, id: &ImageId) -> bool {
        self.get(id).is_some()
    }

    /// Images in insertion order
    pub fn as_slice(&self) -> &[CapturedImage] {
        &self.images
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, CapturedImage> {
        self.images.iter()
    }

    /// Number of images held
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether no image is held
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Drop every image
    pub fn clear(&mut self) {
        self.images.clear();
    }
}

impl<'a> IntoIterator for &'a ImageStore {
    type Item = &'a CapturedImage;
    type IntoIter = std::slice::Iter<'a, CapturedImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn image(byte: u8) -> CapturedImage {
        CapturedImage::from_bytes("image/png", &[byte])
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<ImageId> = (0..500).map(|_| ImageId::generate()).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_file_name() {
        let id = ImageId::from("42");
        assert_eq!(id.file_name(), "photo-42.png");
    }

    #[test]
    fn test_store_preserves_insertion_order() {
        let mut store = ImageStore::new();
        let images: Vec<_> = (0..5).map(image).collect();
        for image in &images {
            store.push(image.clone());
        }

        assert_eq!(store.as_slice(), images.as_slice());
    }

    #[test]
    fn test_remove_keeps_remaining_order() {
        let mut store = ImageStore::new();
        let (a, b, c) = (image(1), image(2), image(3));
        store.push(a.clone());
        store.push(b.clone());
        store.push(c.clone());

        let removed = store.remove(&b.id).unwrap();
        assert_eq!(removed, b);
        assert_eq!(store.as_slice(), &[a, c]);
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut store = ImageStore::new();
        store.push(image(1));
        store.push(image(2));
        let before = store.as_slice().to_vec();

        assert!(store.remove(&ImageId::from("missing")).is_none());
        assert_eq!(store.len(), 2);
        assert_eq!(store.as_slice(), before.as_slice());
    }

    #[test]
    fn test_serialized_shape() {
        let image = CapturedImage {
            id: ImageId::from("abc"),
            image_data: DataUrl::encode("image/png", b"abc"),
        };
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["imageData"], "data:image/png;base64,YWJj");
    }
}
