//! Batch rendering of collage bundles.
//!
//! A bundle is a directory written by the photo library that keeps its
//! collage definitions next to prerendered copies:
//!
//! ```text
//! Holidays.picasalibrary/
//! └── Collages/
//!     ├── Beach.cxf
//!     ├── Beach.jpg      # prerendered fallback
//!     ├── Rome.cxf
//!     └── Rome.jpg
//! ```
//!
//! Collages in `Collages` are rendered in parallel on the rayon pool, one
//! batch of pool size at a time, so only that many canvases are held in
//! memory. Each batch is shown one by one in file-name order before the next
//! starts. When a collage fails to render or display, the same-named `.jpg`
//! is shown instead.

use crate::imaging::ImageBackend;
use crate::render::{RenderError, RenderOptions, RenderReport, RenderedCollage, render_file};
use crate::viewer::{DisplaySink, SinkError};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Directory extension used by the photo library for bundles.
pub const BUNDLE_EXTENSION: &str = "picasalibrary";
/// Subdirectory holding `.cxf` files and their prerendered images.
pub const COLLAGES_DIR: &str = "Collages";

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Failed to list collages: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Bundle has no Collages directory: {}", .0.display())]
    MissingCollagesDir(PathBuf),
}

/// Why a collage could not be shown from its own description.
#[derive(Error, Debug)]
pub enum CollageFailure {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Display(#[from] SinkError),
}

#[derive(Debug)]
pub enum CollageOutcome {
    /// Rendered and handed to the sink.
    Rendered {
        path: PathBuf,
        output: PathBuf,
        report: RenderReport,
    },
    /// Rendering or display failed; the prerendered image was shown instead.
    Fallback {
        path: PathBuf,
        fallback: PathBuf,
        error: CollageFailure,
    },
    /// Showing the prerendered image failed too.
    Failed {
        path: PathBuf,
        fallback: PathBuf,
        error: CollageFailure,
        fallback_error: SinkError,
    },
}

impl CollageOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Rendered { path, .. } | Self::Fallback { path, .. } | Self::Failed { path, .. } => {
                path
            }
        }
    }
}

#[derive(Debug)]
pub struct BundleReport {
    pub bundle: PathBuf,
    pub outcomes: Vec<CollageOutcome>,
}

impl BundleReport {
    pub fn rendered_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, CollageOutcome::Rendered { .. }))
            .count()
    }

    pub fn fallback_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, CollageOutcome::Fallback { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, CollageOutcome::Failed { .. }))
            .count()
    }
}

/// True for a `.picasalibrary` directory or any directory with a
/// `Collages` subdirectory.
pub fn is_bundle(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    let has_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(BUNDLE_EXTENSION));
    has_extension || path.join(COLLAGES_DIR).is_dir()
}

/// List the `.cxf` files directly inside the bundle's `Collages` directory,
/// sorted by file name.
pub fn find_collages(bundle: &Path) -> Result<Vec<PathBuf>, BundleError> {
    let collages_dir = bundle.join(COLLAGES_DIR);
    if !collages_dir.is_dir() {
        return Err(BundleError::MissingCollagesDir(bundle.to_path_buf()));
    }

    let mut collages = Vec::new();
    for entry in WalkDir::new(&collages_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let is_cxf = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("cxf"));
        if entry.file_type().is_file() && is_cxf {
            collages.push(entry.into_path());
        }
    }
    Ok(collages)
}

/// Prerendered image shown when `collage` cannot be rendered.
pub fn fallback_image(collage: &Path) -> PathBuf {
    collage.with_extension("jpg")
}

/// Render and show every collage in a bundle.
///
/// Per-collage failures never abort the batch; they are recorded in the
/// report. Only failing to list the bundle is an error.
pub fn render_bundle(
    bundle: &Path,
    options: &RenderOptions,
    backend: &impl ImageBackend,
    sink: &dyn DisplaySink,
) -> Result<BundleReport, BundleError> {
    let collages = find_collages(bundle)?;
    debug!(bundle = %bundle.display(), count = collages.len(), "Rendering bundle");

    let batch = rayon::current_num_threads().max(1);
    let mut outcomes = Vec::with_capacity(collages.len());
    for chunk in collages.chunks(batch) {
        let rendered: Vec<_> = chunk
            .par_iter()
            .map(|path| render_file(path, options, backend))
            .collect();
        for (path, result) in chunk.iter().zip(rendered) {
            outcomes.push(present(path.clone(), result, sink));
        }
    }

    Ok(BundleReport {
        bundle: bundle.to_path_buf(),
        outcomes,
    })
}

fn present(
    path: PathBuf,
    result: Result<RenderedCollage, RenderError>,
    sink: &dyn DisplaySink,
) -> CollageOutcome {
    let shown = result.map_err(CollageFailure::from).and_then(|collage| {
        let output = sink.show(&collage)?;
        Ok((output, collage.report))
    });
    match shown {
        Ok((output, report)) => CollageOutcome::Rendered {
            path,
            output,
            report,
        },
        Err(error) => show_fallback(path, error, sink),
    }
}

fn show_fallback(path: PathBuf, error: CollageFailure, sink: &dyn DisplaySink) -> CollageOutcome {
    let fallback = fallback_image(&path);
    warn!(
        collage = %path.display(),
        fallback = %fallback.display(),
        error = %error,
        "Collage failed, showing prerendered image"
    );
    match sink.open_file(&fallback) {
        Ok(_) => CollageOutcome::Fallback {
            path,
            fallback,
            error,
        },
        Err(fallback_error) => CollageOutcome::Failed {
            path,
            fallback,
            error,
            fallback_error,
        },
    }
}
