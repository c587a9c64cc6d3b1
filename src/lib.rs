//! # cxf-collage
//!
//! Renders photo-library collage descriptions (`.cxf` files) to images.
//! A `.cxf` file names a grid aspect ratio, a gutter, a background color and
//! an ordered list of photos, each placed in a normalized rectangle. The
//! renderer turns that into pixels:
//!
//! ```text
//! .cxf (XML)  →  CollageDocument  →  canvas + cover-fit tiles  →  viewer / file
//! ```
//!
//! Rendering is deterministic for a given document, scale and set of source
//! photos. Photos that no longer exist are skipped with a warning; anything
//! else that goes wrong (malformed XML, an unreadable photo) fails the
//! render. When a whole photo-library bundle is opened, failing collages fall
//! back to the library's own prerendered JPEG.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`document`] | Parses and validates `.cxf` XML into a typed [`document::CollageDocument`] |
//! | [`render`] | Canvas geometry, node placement and painting |
//! | [`imaging`] | Cover-fit math, the [`imaging::ImageBackend`] trait and the `image`-crate backend |
//! | [`viewer`] | Display sinks: platform viewer or output directory |
//! | [`bundle`] | Batch rendering of `.picasalibrary` bundles with prerendered fallbacks |
//! | [`config`] | `cxf-collage.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting for render and bundle reports |
//!
//! # Design Decisions
//!
//! ## Validate Up Front
//!
//! The XML is parsed once into plain Rust types. Every numeric attribute,
//! the `W:H` format and the `RRGGBBAA` color are checked before any pixel
//! work starts, so a render never fails halfway through because of a typo in
//! the document.
//!
//! ## Pixel-Compatible Geometry
//!
//! Gutter size comes from the authoring tool's calibration curve, evaluated
//! exactly as written, and placements truncate toward zero. Output lines up
//! pixel for pixel with images produced by the original tool.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling and encoding use the `image` crate. The binary has no
//! system image libraries to install.

pub mod bundle;
pub mod config;
pub mod document;
pub mod imaging;
pub mod output;
pub mod render;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_helpers;
