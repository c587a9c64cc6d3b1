//! High-level image operations.
//!
//! These functions combine calculations with backend execution: read the
//! source size, plan the cover-fit, and ask the backend for the tile.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{center_crop_offset, cover_dimensions, within_pixel_limit};
use super::params::{CoverParams, CropBox, ResampleFilter};
use image::RgbImage;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Plan a cover-fit tile without executing it.
///
/// Resize so the source covers `target`, then center-crop to exactly
/// `target`.
pub fn plan_cover(
    source: &Path,
    source_dims: (u32, u32),
    target: (u32, u32),
    filter: ResampleFilter,
) -> CoverParams {
    let (resize_width, resize_height) = cover_dimensions(source_dims, target);
    let (x, y) = center_crop_offset((resize_width, resize_height), target);

    CoverParams {
        source: source.to_path_buf(),
        resize_width,
        resize_height,
        crop: CropBox {
            x,
            y,
            width: target.0,
            height: target.1,
        },
        filter,
    }
}

/// Produce a tile of exactly `target` pixels from the image at `source`.
pub fn cover_image(
    backend: &impl ImageBackend,
    source: &Path,
    target: (u32, u32),
    filter: ResampleFilter,
) -> Result<RgbImage> {
    let source_dims = get_dimensions(backend, source)?;
    if source_dims.0 == 0 || source_dims.1 == 0 {
        return Err(BackendError::ProcessingFailed(format!(
            "{} has no pixels",
            source.display()
        )));
    }

    let params = plan_cover(source, source_dims, target, filter);
    if !within_pixel_limit(params.resize_width, params.resize_height) {
        return Err(BackendError::TooLarge {
            width: params.resize_width,
            height: params.resize_height,
        });
    }
    let tile = backend.cover(&params)?;

    if tile.dimensions() != target {
        return Err(BackendError::ProcessingFailed(format!(
            "tile for {} is {}x{}, expected {}x{}",
            source.display(),
            tile.width(),
            tile.height(),
            target.0,
            target.1
        )));
    }
    Ok(tile)
}
