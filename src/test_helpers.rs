//! Shared test utilities for the cxf-collage test suite.
//!
//! Builds `.cxf` documents and synthetic source photos inside temp
//! directories so render tests never depend on checked-in fixtures.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! write_solid_png(&tmp.path().join("red.png"), 40, 20, [255, 0, 0]);
//! let xml = CollageXml::new("2:1")
//!     .node("red.png", [0.0, 0.0, 0.5, 1.0])
//!     .to_string();
//! let cxf = write_cxf(tmp.path(), "test.cxf", &xml);
//! ```

use image::{ImageEncoder, Rgb, RgbImage};
use std::fmt;
use std::path::{Path, PathBuf};

// =========================================================================
// Source images
// =========================================================================

/// Write a single-color PNG.
pub fn write_solid_png(path: &Path, width: u32, height: u32, color: [u8; 3]) {
    RgbImage::from_pixel(width, height, Rgb(color))
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Write a PNG whose red channel is `x % 256` and green channel `y % 256`,
/// so tests can tell which source pixels ended up in a crop.
pub fn write_gradient_png(path: &Path, width: u32, height: u32) {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
    .save_with_format(path, image::ImageFormat::Png)
    .unwrap();
}

/// Write a small valid JPEG with the given dimensions.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

// =========================================================================
// Collage documents
// =========================================================================

/// Builder for `.cxf` XML. Defaults: title "Test Album", date
/// "1993-03-20", spacing 0, white background.
pub struct CollageXml {
    format: String,
    spacing: f64,
    background: String,
    nodes: Vec<(String, [f64; 4])>,
}

impl CollageXml {
    pub fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
            spacing: 0.0,
            background: "FFFFFFFF".to_string(),
            nodes: Vec::new(),
        }
    }

    pub fn spacing(mut self, value: f64) -> Self {
        self.spacing = value;
        self
    }

    pub fn background(mut self, rgba: &str) -> Self {
        self.background = rgba.to_string();
        self
    }

    /// Add a node; `area` is `[x, y, w, h]`.
    pub fn node(mut self, src: &str, area: [f64; 4]) -> Self {
        self.nodes.push((src.to_string(), area));
        self
    }
}

impl fmt::Display for CollageXml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
        writeln!(f, r#"<collage format="{}">"#, self.format)?;
        writeln!(f, "  <albumTitle>Test Album</albumTitle>")?;
        writeln!(f, "  <albumDate>1993-03-20</albumDate>")?;
        writeln!(f, r#"  <spacing value="{}"/>"#, self.spacing)?;
        writeln!(f, r#"  <background color="{}"/>"#, self.background)?;
        for (src, [x, y, w, h]) in &self.nodes {
            writeln!(f, r#"  <node x="{x}" y="{y}" w="{w}" h="{h}">"#)?;
            writeln!(f, "    <src>{src}</src>")?;
            writeln!(f, "  </node>")?;
        }
        write!(f, "</collage>")
    }
}

/// Write `xml` to `dir/name` and return the path.
pub fn write_cxf(dir: &Path, name: &str, xml: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, xml).unwrap();
    path
}
