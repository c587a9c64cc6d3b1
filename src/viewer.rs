//! Display sinks for finished collages.
//!
//! Rendering produces an in-memory canvas; a [`DisplaySink`] decides what
//! happens to it next.
//!
//! - [`SystemViewer`] writes the canvas to a content-addressed file in the
//!   temp directory and opens it with the platform viewer, or with the
//!   program from `viewer.command`.
//! - [`DirectorySink`] writes `<name>.<ext>` into a directory (`--save`).
//!
//! Both also accept an existing image file, which is how batch mode shows a
//! prerendered fallback when a collage cannot be rendered.

use crate::config::CollageConfig;
use crate::imaging::{BackendError, OutputFormat, Quality, save_image};
use crate::render::RenderedCollage;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write image: {0}")]
    Encode(#[from] BackendError),
    #[error("Viewer `{command}` exited with {status}")]
    ViewerFailed { command: String, status: ExitStatus },
    #[error("Image not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Destination for rendered collages.
pub trait DisplaySink {
    /// Present a freshly rendered collage. Returns the file it was written to.
    fn show(&self, collage: &RenderedCollage) -> Result<PathBuf, SinkError>;

    /// Present an image that already exists on disk.
    fn open_file(&self, path: &Path) -> Result<PathBuf, SinkError>;
}

/// Opens images with an external program.
#[derive(Debug, Clone)]
pub struct SystemViewer {
    temp_dir: PathBuf,
    command: Vec<String>,
    format: OutputFormat,
    quality: Quality,
}

impl SystemViewer {
    pub fn from_config(config: &CollageConfig) -> Self {
        Self {
            temp_dir: std::env::temp_dir().join("cxf-collage"),
            command: config.viewer.command.clone(),
            format: config.output.format,
            quality: config.quality(),
        }
    }

    /// Write rendered images under `dir` instead of the system temp dir.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Program and arguments, without the image path.
    fn opener(&self) -> Vec<String> {
        if !self.command.is_empty() {
            return self.command.clone();
        }
        let platform: &[&str] = if cfg!(target_os = "macos") {
            &["open"]
        } else if cfg!(windows) {
            &["cmd", "/C", "start", ""]
        } else {
            &["xdg-open"]
        };
        platform.iter().map(|s| s.to_string()).collect()
    }

    fn launch(&self, path: &Path) -> Result<(), SinkError> {
        let opener = self.opener();
        let Some((program, args)) = opener.split_first() else {
            return Ok(());
        };

        debug!(program = %program, path = %path.display(), "Launching viewer");
        let status = Command::new(program).args(args).arg(path).status()?;
        if !status.success() {
            return Err(SinkError::ViewerFailed {
                command: opener.join(" "),
                status,
            });
        }
        Ok(())
    }
}

impl DisplaySink for SystemViewer {
    fn show(&self, collage: &RenderedCollage) -> Result<PathBuf, SinkError> {
        fs::create_dir_all(&self.temp_dir)?;
        let path = self.temp_dir.join(format!(
            "{}-{}.{}",
            slug(collage.title()),
            content_hash(collage),
            self.format.extension()
        ));
        if path.is_file() {
            debug!(path = %path.display(), "Reusing rendered image");
        } else {
            save_atomically(collage, &path, self.format, self.quality)?;
        }
        self.launch(&path)?;
        Ok(path)
    }

    fn open_file(&self, path: &Path) -> Result<PathBuf, SinkError> {
        if !path.is_file() {
            return Err(SinkError::NotFound(path.to_path_buf()));
        }
        self.launch(path)?;
        Ok(path.to_path_buf())
    }
}

/// Writes images into a directory instead of displaying them.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    format: OutputFormat,
    quality: Quality,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>, format: OutputFormat, quality: Quality) -> Self {
        Self {
            dir: dir.into(),
            format,
            quality,
        }
    }

    pub fn from_config(dir: impl Into<PathBuf>, config: &CollageConfig) -> Self {
        Self::new(dir, config.output.format, config.quality())
    }
}

impl DisplaySink for DirectorySink {
    fn show(&self, collage: &RenderedCollage) -> Result<PathBuf, SinkError> {
        fs::create_dir_all(&self.dir)?;
        let name = collage.name.replace(['/', '\\'], "_");
        let path = self.dir.join(format!("{}.{}", name, self.format.extension()));
        save_image(&collage.image, &path, self.format, self.quality)?;
        Ok(path)
    }

    fn open_file(&self, path: &Path) -> Result<PathBuf, SinkError> {
        let Some(file_name) = path.file_name().filter(|_| path.is_file()) else {
            return Err(SinkError::NotFound(path.to_path_buf()));
        };
        fs::create_dir_all(&self.dir)?;
        let dest = self.dir.join(file_name);
        fs::copy(path, &dest)?;
        Ok(dest)
    }
}

/// Encode next to `path` and rename into place, so a failed write never
/// leaves a truncated file under the final name.
fn save_atomically(
    collage: &RenderedCollage,
    path: &Path,
    format: OutputFormat,
    quality: Quality,
) -> Result<(), SinkError> {
    let partial = path.with_extension(format!("{}.part", format.extension()));
    if let Err(e) = save_image(&collage.image, &partial, format, quality) {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }
    fs::rename(&partial, path)?;
    Ok(())
}

/// First 12 hex digits of the SHA-256 of the canvas size and pixels.
fn content_hash(collage: &RenderedCollage) -> String {
    let (width, height) = collage.image.dimensions();
    let mut hasher = Sha256::new();
    hasher.update(width.to_le_bytes());
    hasher.update(height.to_le_bytes());
    hasher.update(collage.image.as_raw());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(12);
    hex
}

/// Lowercase ASCII slug for file names: `"Summer '09!"` → `"summer-09"`.
fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "collage".to_string()
    } else {
        trimmed.to_string()
    }
}
