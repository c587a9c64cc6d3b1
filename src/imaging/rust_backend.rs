//! Pure Rust image backend on top of the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `ImageReader` with content sniffing |
//! | Resize | `image::imageops::resize` with the configured filter |
//! | Crop | `image::imageops::crop_imm` |
//! | Encode → PNG / JPEG | `PngEncoder` / `JpegEncoder` |
//!
//! Formats are sniffed from file contents, not extensions: photo libraries
//! routinely hold JPEGs named `.JPG`, `.jpeg` or nothing at all.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{CoverParams, OutputFormat, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader, RgbImage, imageops};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn open_reader(path: &Path) -> Result<ImageReader<std::io::BufReader<std::fs::File>>, BackendError> {
    Ok(ImageReader::open(path)?.with_guessed_format()?)
}

/// Load and decode an image from disk.
pub fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    open_reader(path)?
        .decode()
        .map_err(|source| BackendError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Encode an RGB canvas to `path` in the given format.
pub fn save_image(
    img: &RgbImage,
    path: &Path,
    format: OutputFormat,
    quality: Quality,
) -> Result<(), BackendError> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    let (width, height) = img.dimensions();

    let encoded = match format {
        OutputFormat::Png => PngEncoder::new(&mut writer).write_image(
            img.as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        ),
        OutputFormat::Jpeg => JpegEncoder::new_with_quality(&mut writer, quality.value() as u8)
            .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8),
    };
    encoded.map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to encode {}: {}", path.display(), e))
    })?;
    writer.flush()?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) =
            open_reader(path)?
                .into_dimensions()
                .map_err(|source| BackendError::Decode {
                    path: path.to_path_buf(),
                    source,
                })?;
        Ok(Dimensions { width, height })
    }

    fn cover(&self, params: &CoverParams) -> Result<RgbImage, BackendError> {
        let img = load_image(&params.source)?.to_rgb8();

        let resized = if img.dimensions() == (params.resize_width, params.resize_height) {
            img
        } else {
            imageops::resize(
                &img,
                params.resize_width,
                params.resize_height,
                params.filter.filter_type(),
            )
        };

        let crop = params.crop;
        if crop.x + crop.width > resized.width() || crop.y + crop.height > resized.height() {
            return Err(BackendError::ProcessingFailed(format!(
                "crop {}x{}+{}+{} exceeds resized {}x{}",
                crop.width,
                crop.height,
                crop.x,
                crop.y,
                resized.width(),
                resized.height()
            )));
        }
        Ok(imageops::crop_imm(&resized, crop.x, crop.y, crop.width, crop.height).to_image())
    }
}
