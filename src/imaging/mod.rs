//! Image processing in pure Rust, built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Cover tile** | `imageops::resize` + `imageops::crop_imm` |
//! | **Save** | PNG / JPEG encoders |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for collage geometry (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
pub mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{NormalizedRect, PixelRect};
pub use operations::{cover_image, get_dimensions, plan_cover};
pub use params::{CoverParams, CropBox, OutputFormat, Quality, ResampleFilter};
pub use rust_backend::{RustBackend, load_image, save_image};
