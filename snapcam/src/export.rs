//! Local file export of captured photos

use crate::error::BoothResult;
use snapcam_core::CapturedImage;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write the decoded payload of `image` to `dir/photo-<id>.png`
///
/// The bytes written are exactly the bytes the image was created from.
pub async fn export_image(image: &CapturedImage, dir: &Path) -> BoothResult<PathBuf> {
    let bytes = image.decode()?;
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(image.file_name());
    tokio::fs::write(&path, &bytes).await?;
    info!("Exported {} ({} bytes)", path.display(), bytes.len());

    Ok(path)
}
