//! Writing screenshots to disk.

use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageFormat, RgbaImage};
use robot_platform::Screenshot;

/// Copy a screenshot into an `image` buffer.
pub fn to_rgba_image(shot: &Screenshot) -> Result<RgbaImage> {
    RgbaImage::from_raw(shot.width(), shot.height(), shot.image().to_vec())
        .context("screenshot buffer does not match its dimensions")
}

/// Encode as PNG at `path`.
pub fn save_png(shot: &Screenshot, path: &Path) -> Result<()> {
    let img = to_rgba_image(shot)?;
    img.save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("failed to write PNG to {}", path.display()))?;
    tracing::info!(
        "saved {}x{} screenshot to {}",
        shot.width(),
        shot.height(),
        path.display()
    );
    Ok(())
}
