//! Tests for image records and their payload round trip through JSON

use snapcam_core::*;

#[test]
fn test_record_survives_json() {
    let original = CapturedImage::from_bytes("image/jpeg", &[0xFF, 0xD8, 0xFF, 0x00, 0x10]);

    let json = serde_json::to_string(&original).unwrap();
    let restored: CapturedImage = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, original);
    assert_eq!(restored.mime(), "image/jpeg");
    assert_eq!(restored.decode().unwrap(), vec![0xFF, 0xD8, 0xFF, 0x00, 0x10]);
}

#[test]
fn test_record_with_bad_payload_rejected_on_load() {
    let json = r#"{"id":"abc","imageData":"data:image/png;base64"}"#;
    assert!(serde_json::from_str::<CapturedImage>(json).is_err());
}

#[test]
fn test_undecodable_payload_is_decode_failure() {
    let err = DataUrl::parse("data:image/png;base64,@@@@").unwrap_err();
    assert!(err.is_decode_failure());
    assert!(matches!(err, SnapcamError::PayloadDecode { .. }));
}

#[test]
fn test_store_lookup_after_delete() {
    let mut store = ImageStore::new();
    let kept = CapturedImage::from_bytes("image/png", b"kept");
    let gone = CapturedImage::from_bytes("image/png", b"gone");
    store.push(kept.clone());
    store.push(gone.clone());

    store.remove(&gone.id);

    assert!(store.contains(&kept.id));
    assert!(store.get(&gone.id).is_none());
    assert_eq!(store.iter().map(|image| &image.id).collect::<Vec<_>>(), vec![&kept.id]);
}
