// Save the composited try-on as a PNG.

use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::error::Error;
use crate::types::FrameBuffer;

/// Every export overwrites this file in the output directory.
pub const EXPORT_FILENAME: &str = "tattoo-tryon.png";

/// Encode `surface` as PNG into `dir/EXPORT_FILENAME`, creating `dir` if needed.
pub fn export_png(surface: &FrameBuffer, dir: &Path) -> Result<PathBuf, Error> {
    let path = dir.join(EXPORT_FILENAME);
    let fail = |source| Error::Export { path: path.clone(), source };

    std::fs::create_dir_all(dir).map_err(|e| fail(image::ImageError::IoError(e)))?;
    surface
        .to_rgb_image()
        .save_with_format(&path, ImageFormat::Png)
        .map_err(fail)?;

    log::info!("exported {}x{} PNG to {}", surface.width, surface.height, path.display());
    Ok(path)
}
