//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::{info, warn};

/// Ensure the image directory exists and is writable.
///
/// A missing directory is created. A directory that cannot be written to is a
/// hard error: every specialty upload would fail later anyway.
pub async fn ensure_image_dir(image_dir: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(image_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {image_dir}: {e}"))?;

    let meta = tokio::fs::metadata(image_dir).await?;
    if meta.permissions().readonly() {
        return Err(anyhow::anyhow!("image directory {image_dir} is read-only"));
    }
    if !meta.is_dir() {
        warn!(%image_dir, "image path exists but is not a directory");
        return Err(anyhow::anyhow!("{image_dir} is not a directory"));
    }
    info!(%image_dir, "image directory ready");
    Ok(())
}
