//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity (collage, node) leads with its positional index and name;
//! filesystem paths are secondary context on indented lines.
//!
//! ## Single collage
//!
//! ```text
//! Summer (2009-07-14)
//!     Format: 3:2 at scale 10 → 30 × 20
//!     Canvas: 30 × 20, spacing 0px
//!     001 beach.jpg 15 × 20 at (0, 0)
//!     002 gone.jpg not found
//!         Source: /home/me/Pictures/gone.jpg
//!     Output: /tmp/cxf-collage/summer-3f2a9c01b7de.png
//! ```
//!
//! ## Bundle
//!
//! ```text
//! Holidays.picasalibrary
//! 001 Beach.cxf → /tmp/cxf-collage/beach-0c1d2e3f4a5b.png
//! 002 Rome.cxf failed: XML error: ...
//!     [INFO] Showing prerendered image: Rome.jpg
//!
//! Rendered 1 collage, 1 fallback, 0 failed
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::bundle::{BundleReport, CollageOutcome};
use crate::render::{NodeOutcome, RenderReport};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

// ============================================================================
// Single collage
// ============================================================================

/// Format the summary of one render, optionally with where it was written.
pub fn format_render_report(report: &RenderReport, output: Option<&Path>) -> Vec<String> {
    let mut lines = Vec::new();

    if report.date.is_empty() {
        lines.push(report.title.clone());
    } else {
        lines.push(format!("{} ({})", report.title, report.date));
    }

    let geometry = &report.geometry;
    lines.push(format!(
        "{}Format: {} at scale {} → {} × {}",
        indent(1),
        report.format,
        report.scale,
        geometry.width,
        geometry.height
    ));
    if let Some((width, height)) = geometry.canvas_size() {
        lines.push(format!(
            "{}Canvas: {} × {}, spacing {}px",
            indent(1),
            width,
            height,
            geometry.spacing
        ));
    }

    for node in &report.nodes {
        match node {
            NodeOutcome::Placed {
                index,
                source,
                rect,
            } => lines.push(format!(
                "{}{} {} {} × {} at ({}, {})",
                indent(1),
                format_index(index + 1),
                file_name(source),
                rect.width,
                rect.height,
                rect.x,
                rect.y
            )),
            NodeOutcome::Missing { index, source } => {
                lines.push(format!(
                    "{}{} {} not found",
                    indent(1),
                    format_index(index + 1),
                    file_name(source)
                ));
                lines.push(format!("{}Source: {}", indent(2), source.display()));
            }
        }
    }

    if let Some(path) = output {
        lines.push(format!("{}Output: {}", indent(1), path.display()));
    }
    lines
}

pub fn print_render_report(report: &RenderReport, output: Option<&Path>) {
    for line in format_render_report(report, output) {
        println!("{}", line);
    }
}

// ============================================================================
// Bundle
// ============================================================================

/// Format the per-collage results of a bundle run plus a summary line.
pub fn format_bundle_report(report: &BundleReport) -> Vec<String> {
    let mut lines = vec![file_name(&report.bundle)];

    for (i, outcome) in report.outcomes.iter().enumerate() {
        let header = format!("{} {}", format_index(i + 1), file_name(outcome.path()));
        match outcome {
            CollageOutcome::Rendered { output, report, .. } => {
                lines.push(format!("{} → {}", header, output.display()));
                let missing = report.missing();
                if !missing.is_empty() {
                    lines.push(format!(
                        "{}{} not found",
                        indent(1),
                        plural(missing.len(), "image")
                    ));
                }
            }
            CollageOutcome::Fallback {
                fallback, error, ..
            } => {
                lines.push(format!("{} failed: {}", header, error));
                lines.push(format!(
                    "{}[INFO] Showing prerendered image: {}",
                    indent(1),
                    file_name(fallback)
                ));
            }
            CollageOutcome::Failed {
                error,
                fallback_error,
                ..
            } => {
                lines.push(format!("{} failed: {}", header, error));
                lines.push(format!(
                    "{}No prerendered image: {}",
                    indent(1),
                    fallback_error
                ));
            }
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Rendered {}, {}, {} failed",
        plural(report.rendered_count(), "collage"),
        plural(report.fallback_count(), "fallback"),
        report.failed_count()
    ));
    lines
}

pub fn print_bundle_report(report: &BundleReport) {
    for line in format_bundle_report(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::CollageFailure;
    use crate::document::{DocumentError, GridFormat};
    use crate::imaging::PixelRect;
    use crate::render::{CanvasGeometry, RenderError};
    use crate::viewer::SinkError;
    use std::path::PathBuf;

    fn report(nodes: Vec<NodeOutcome>) -> RenderReport {
        RenderReport {
            title: "Summer".to_string(),
            date: "2009-07-14".to_string(),
            format: GridFormat {
                width: 3,
                height: 2,
            },
            scale: 10,
            geometry: CanvasGeometry {
                width: 30,
                height: 20,
                spacing: 0,
            },
            nodes,
        }
    }

    #[test]
    fn format_index_padding() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "collage"), "1 collage");
        assert_eq!(plural(0, "collage"), "0 collages");
        assert_eq!(plural(3, "image"), "3 images");
    }

    #[test]
    fn render_report_header_and_geometry() {
        let lines = format_render_report(&report(Vec::new()), None);
        assert_eq!(
            lines,
            vec![
                "Summer (2009-07-14)",
                "    Format: 3:2 at scale 10 → 30 × 20",
                "    Canvas: 30 × 20, spacing 0px",
            ]
        );
    }

    #[test]
    fn render_report_without_date() {
        let mut r = report(Vec::new());
        r.date.clear();
        assert_eq!(format_render_report(&r, None)[0], "Summer");
    }

    #[test]
    fn render_report_lists_nodes_in_order() {
        let r = report(vec![
            NodeOutcome::Placed {
                index: 0,
                source: PathBuf::from("/pics/beach.jpg"),
                rect: PixelRect {
                    x: 0,
                    y: 0,
                    width: 15,
                    height: 20,
                },
            },
            NodeOutcome::Missing {
                index: 1,
                source: PathBuf::from("/pics/gone.jpg"),
            },
        ]);
        let lines = format_render_report(&r, Some(Path::new("/tmp/out.png")));

        assert_eq!(lines[3], "    001 beach.jpg 15 × 20 at (0, 0)");
        assert_eq!(lines[4], "    002 gone.jpg not found");
        assert_eq!(lines[5], "        Source: /pics/gone.jpg");
        assert_eq!(lines[6], "    Output: /tmp/out.png");
    }

    #[test]
    fn bundle_report_shows_fallbacks() {
        let bundle = BundleReport {
            bundle: PathBuf::from("/lib/Holidays.picasalibrary"),
            outcomes: vec![
                CollageOutcome::Rendered {
                    path: PathBuf::from("/lib/Collages/Beach.cxf"),
                    output: PathBuf::from("/tmp/beach.png"),
                    report: report(vec![NodeOutcome::Missing {
                        index: 0,
                        source: PathBuf::from("/pics/gone.jpg"),
                    }]),
                },
                CollageOutcome::Fallback {
                    path: PathBuf::from("/lib/Collages/Rome.cxf"),
                    fallback: PathBuf::from("/lib/Collages/Rome.jpg"),
                    error: CollageFailure::Render(RenderError::Document(
                        DocumentError::MissingElement("spacing"),
                    )),
                },
                CollageOutcome::Failed {
                    path: PathBuf::from("/lib/Collages/Paris.cxf"),
                    fallback: PathBuf::from("/lib/Collages/Paris.jpg"),
                    error: CollageFailure::Render(RenderError::InvalidScale),
                    fallback_error: SinkError::NotFound(PathBuf::from(
                        "/lib/Collages/Paris.jpg",
                    )),
                },
            ],
        };

        let lines = format_bundle_report(&bundle);

        assert_eq!(lines[0], "Holidays.picasalibrary");
        assert_eq!(lines[1], "001 Beach.cxf → /tmp/beach.png");
        assert_eq!(lines[2], "    1 image not found");
        assert_eq!(lines[3], "002 Rome.cxf failed: Missing <spacing> element");
        assert_eq!(lines[4], "    [INFO] Showing prerendered image: Rome.jpg");
        assert!(lines[5].starts_with("003 Paris.cxf failed: "));
        assert_eq!(
            lines[6],
            "    No prerendered image: Image not found: /lib/Collages/Paris.jpg"
        );
        assert_eq!(lines[7], "");
        assert_eq!(lines[8], "Rendered 1 collage, 1 fallback, 1 failed");
    }
}
