//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the renderer needs
//! from an image library: identify (read native dimensions) and cover
//! (decode, resize, crop to an exact tile).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording [`tests::MockBackend`].

use super::params::CoverParams;
use image::RgbImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("Resizing to {width}x{height} exceeds the pixel limit")]
    TooLarge { width: u32, height: u32 },
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `Sync` so a single backend can serve every worker of a batch render.
pub trait ImageBackend: Sync {
    /// Get native image dimensions without decoding pixel data.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode the source, resize it and return the cropped tile.
    fn cover(&self, params: &CoverParams) -> Result<RgbImage, BackendError>;
}
