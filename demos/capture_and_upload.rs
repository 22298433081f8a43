//! Capture and Upload Demo
//!
//! Takes a few photos, deletes one, exports the rest to a temp directory and
//! uploads the queue as one batch.
//!
//! Posts to `SNAPCAM_UPLOAD_URL` when set, otherwise to an in-memory sink.
//! Build with `--features native` to use a real camera.

use snapcam::{
    init_logging, BoothConfig, BoothEvent, HttpUploadSink, MediaDevices, MemorySink, NullSurface,
    PhotoBooth, UploadSink,
};
use std::sync::Arc;

#[cfg(feature = "native")]
fn devices() -> Arc<dyn MediaDevices> {
    snapcam::default_devices()
}

#[cfg(not(feature = "native"))]
fn devices() -> Arc<dyn MediaDevices> {
    Arc::new(snapcam::SyntheticCamera::new())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    println!("📷 snapcam capture and upload demo");
    println!("==================================");

    let config = BoothConfig::from_env()?;
    let sink: Arc<dyn UploadSink> = if std::env::var("SNAPCAM_UPLOAD_URL").is_ok() {
        println!("🌐 Uploading to {}", config.upload.endpoint);
        Arc::new(HttpUploadSink::new(&config.upload)?)
    } else {
        println!("💾 SNAPCAM_UPLOAD_URL not set, uploading to memory");
        Arc::new(MemorySink::new())
    };

    let mut booth = PhotoBooth::new(config, devices(), Box::new(NullSurface::new()), sink)?;
    let mut events = booth.events();

    if booth.start().await? {
        for _ in 0..3 {
            let photo = booth.capture()?;
            println!("  ✅ Captured {}", photo.id);
        }
    } else {
        println!("⚠️  Camera unavailable, continuing without live capture");
    }

    if let Some(first) = booth.images().first().map(|photo| photo.id.clone()) {
        booth.delete(&first);
        println!("  🗑️  Deleted {}", first);
    }

    let dir = std::env::temp_dir().join("snapcam-demo");
    for photo in booth.images().to_vec() {
        let path = booth.export(&photo.id, &dir).await?;
        println!("  💾 Saved {}", path.display());
    }

    let verdict = booth.upload_all().await?;
    println!("\n{}", verdict.message());

    println!("\n📋 Events:");
    for event in events.drain() {
        match event {
            BoothEvent::UploadFinished { verdict } => {
                println!("  upload_finished ({:?})", verdict)
            }
            other => println!("  {}", other.event_type()),
        }
    }

    booth.shutdown();
    Ok(())
}
