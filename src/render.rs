//! Collage rendering.
//!
//! Turns one [`CollageDocument`] into one RGB canvas:
//!
//! ```text
//! format "W:H" × scale        →  logical width × height
//! spacing knob                →  gutter pixels (calibration curve)
//! background RRGGBBAA         →  canvas (width + gutter) × (height + gutter)
//! each node, in order         →  cover-fit tile pasted at its slot
//! ```
//!
//! Nodes are painted strictly in document order; later nodes cover earlier
//! ones where they overlap. A node whose image file does not exist is
//! skipped with a warning. Every other failure aborts the render and is
//! returned to the caller, which decides whether a fallback applies.

use crate::document::{CollageDocument, DocumentError, GridFormat};
use crate::imaging::calculations::{placement_rect, spacing_pixels, within_pixel_limit};
use crate::imaging::{BackendError, ImageBackend, PixelRect, ResampleFilter, cover_image};
use image::{Rgb, RgbImage, imageops};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Pixels per format unit when the caller does not choose one.
pub const DEFAULT_SCALE: u32 = 10;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("Cannot use image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("Node {index} ({}) collapses to an empty {width}x{height} area", path.display())]
    EmptyPlacement {
        index: usize,
        path: PathBuf,
        width: i64,
        height: i64,
    },
    #[error("Node {index} ({}) needs a {width}x{height} tile, too large to render", path.display())]
    PlacementTooLarge {
        index: usize,
        path: PathBuf,
        width: i64,
        height: i64,
    },
    #[error("Scale must be a positive integer")]
    InvalidScale,
    #[error("Format {format} at scale {scale} is too large to render")]
    CanvasTooLarge { format: GridFormat, scale: u32 },
}

/// Caller-supplied render settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub scale: u32,
    pub filter: ResampleFilter,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            filter: ResampleFilter::default(),
        }
    }
}

/// Pixel geometry shared by every node of a collage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasGeometry {
    /// Logical width (`format width × scale`).
    pub width: u32,
    /// Logical height (`format height × scale`).
    pub height: u32,
    /// Gutter in pixels.
    pub spacing: u32,
}

impl CanvasGeometry {
    /// Compute logical size and gutter for a document at `scale`.
    pub fn for_document(document: &CollageDocument, scale: u32) -> Result<Self, RenderError> {
        if scale == 0 {
            return Err(RenderError::InvalidScale);
        }
        let too_large = || RenderError::CanvasTooLarge {
            format: document.format,
            scale,
        };

        let width = document.format.width.checked_mul(scale).ok_or_else(too_large)?;
        let height = document.format.height.checked_mul(scale).ok_or_else(too_large)?;
        let spacing = spacing_pixels(document.spacing, width);

        let geometry = Self {
            width,
            height,
            spacing,
        };
        let (canvas_width, canvas_height) = geometry.canvas_size().ok_or_else(too_large)?;
        if !within_pixel_limit(canvas_width, canvas_height) {
            return Err(too_large());
        }
        Ok(geometry)
    }

    /// Output image size: logical size plus one gutter on each axis.
    pub fn canvas_size(&self) -> Option<(u32, u32)> {
        Some((
            self.width.checked_add(self.spacing)?,
            self.height.checked_add(self.spacing)?,
        ))
    }
}

/// What happened to one node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutcome {
    Placed {
        index: usize,
        source: PathBuf,
        rect: PixelRect,
    },
    Missing {
        index: usize,
        source: PathBuf,
    },
}

/// Summary of a finished render, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub title: String,
    pub date: String,
    pub format: GridFormat,
    pub scale: u32,
    pub geometry: CanvasGeometry,
    pub nodes: Vec<NodeOutcome>,
}

impl RenderReport {
    pub fn placed_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, NodeOutcome::Placed { .. }))
            .count()
    }

    pub fn missing(&self) -> Vec<&Path> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                NodeOutcome::Missing { source, .. } => Some(source.as_path()),
                NodeOutcome::Placed { .. } => None,
            })
            .collect()
    }
}

/// A composed collage ready for a display sink.
#[derive(Debug, Clone)]
pub struct RenderedCollage {
    /// Short identifier: the `.cxf` file stem, or the album title.
    pub name: String,
    pub image: RgbImage,
    pub report: RenderReport,
}

impl RenderedCollage {
    pub fn title(&self) -> &str {
        &self.report.title
    }
}

/// Load a `.cxf` file and render it.
pub fn render_file(
    path: &Path,
    options: &RenderOptions,
    backend: &impl ImageBackend,
) -> Result<RenderedCollage, RenderError> {
    debug!(path = %path.display(), "Loading collage");
    let document = CollageDocument::from_path(path)?;
    let mut collage = render(&document, options, backend)?;
    if let Some(stem) = path.file_stem() {
        collage.name = stem.to_string_lossy().into_owned();
    }
    Ok(collage)
}

/// Render a parsed document onto a fresh canvas.
pub fn render(
    document: &CollageDocument,
    options: &RenderOptions,
    backend: &impl ImageBackend,
) -> Result<RenderedCollage, RenderError> {
    let geometry = CanvasGeometry::for_document(document, options.scale)?;
    let (canvas_width, canvas_height) =
        geometry.canvas_size().ok_or(RenderError::CanvasTooLarge {
            format: document.format,
            scale: options.scale,
        })?;

    debug!(
        title = %document.album_title,
        width = geometry.width,
        height = geometry.height,
        spacing = geometry.spacing,
        "Rendering collage"
    );

    let mut canvas = RgbImage::from_pixel(
        canvas_width,
        canvas_height,
        Rgb(document.background.rgb()),
    );
    let mut outcomes = Vec::with_capacity(document.nodes.len());

    for (index, node) in document.nodes.iter().enumerate() {
        let source = document.resolve_source(&node.src);
        if !source.is_file() {
            warn!(path = %source.display(), "Image not found, skipping node");
            outcomes.push(NodeOutcome::Missing { index, source });
            continue;
        }

        let rect = placement_rect(&node.area, (geometry.width, geometry.height), geometry.spacing);
        let target = match rect.size() {
            Some(size) if within_pixel_limit(size.0, size.1) => size,
            _ if rect.width <= 0 || rect.height <= 0 => {
                return Err(RenderError::EmptyPlacement {
                    index,
                    path: source,
                    width: rect.width,
                    height: rect.height,
                });
            }
            _ => {
                return Err(RenderError::PlacementTooLarge {
                    index,
                    path: source,
                    width: rect.width,
                    height: rect.height,
                });
            }
        };

        let tile = cover_image(backend, &source, target, options.filter).map_err(|e| {
            RenderError::Decode {
                path: source.clone(),
                source: e,
            }
        })?;
        imageops::replace(&mut canvas, &tile, rect.x, rect.y);

        debug!(
            path = %source.display(),
            x = rect.x,
            y = rect.y,
            width = target.0,
            height = target.1,
            "Placed node"
        );
        outcomes.push(NodeOutcome::Placed {
            index,
            source,
            rect,
        });
    }

    Ok(RenderedCollage {
        name: document.album_title.clone(),
        image: canvas,
        report: RenderReport {
            title: document.album_title.clone(),
            date: document.album_date.clone(),
            format: document.format,
            scale: options.scale,
            geometry,
            nodes: outcomes,
        },
    })
}
