//! Pure calculation functions for collage geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! Every float-to-integer conversion truncates toward zero, matching the
//! authoring tool the `.cxf` files come from.

/// A rectangle in normalized canvas fractions (nominally 0.0–1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// A node's placement on the canvas in pixels.
///
/// Signed: fractions outside 0–1 or a gutter wider than the slot produce
/// negative values, which callers must reject or clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl PixelRect {
    /// Target size of the tile, or `None` if either extent is not positive.
    pub fn size(&self) -> Option<(u32, u32)> {
        let width = u32::try_from(self.width).ok().filter(|&w| w > 0)?;
        let height = u32::try_from(self.height).ok().filter(|&h| h > 0)?;
        Some((width, height))
    }
}

/// Convert the document's spacing knob into gutter pixels.
///
/// Empirical calibration curve of the collage authoring tool:
/// `(0.0978·s² − 0.0145·s + 0.0157) · width`, truncated. The evaluation order
/// is fixed so results stay bit-identical to the reference renders.
///
/// ```
/// # use cxf_collage::imaging::calculations::spacing_pixels;
/// assert_eq!(spacing_pixels(10.0, 20), 193);
/// assert_eq!(spacing_pixels(0.0, 20), 0);
/// ```
pub fn spacing_pixels(spacing: f64, width: u32) -> u32 {
    let factor = 0.0978 * (spacing * spacing) - 0.0145 * spacing + 0.0157;
    (factor * f64::from(width)) as u32
}

/// Compute where a node lands on a canvas of the given logical size.
///
/// The gutter is added to the origin and subtracted from the extent, so each
/// cell keeps a `spacing`-wide margin on its top/left inside its nominal slot.
pub fn placement_rect(area: &NormalizedRect, logical: (u32, u32), spacing: u32) -> PixelRect {
    let width = f64::from(logical.0);
    let height = f64::from(logical.1);
    let spacing = i64::from(spacing);

    PixelRect {
        x: (area.x * width) as i64 + spacing,
        y: (area.y * height) as i64 + spacing,
        width: (area.w * width) as i64 - spacing,
        height: (area.h * height) as i64 - spacing,
    }
}

/// Calculate the size a source must be scaled to so it covers the target.
///
/// When the target is wider than the source the width is matched and the
/// height overflows; otherwise the height is matched and the width overflows.
/// The overflow axis is clamped to the target so float truncation can never
/// leave the resized image a pixel short.
///
/// # Arguments
/// * `source` - Native image dimensions (width, height)
/// * `target` - Tile dimensions (width, height)
///
/// # Returns
/// * `(width, height)` - Resize dimensions, both `>=` target, one equal
pub fn cover_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = (f64::from(source.0), f64::from(source.1));
    let (tgt_w, tgt_h) = target;

    let target_ratio = f64::from(tgt_w) / f64::from(tgt_h);
    let source_ratio = src_w / src_h;

    if target_ratio > source_ratio {
        let h = (f64::from(tgt_w) / src_w * src_h) as u32;
        (tgt_w, h.max(tgt_h))
    } else {
        let w = (f64::from(tgt_h) / src_h * src_w) as u32;
        (w.max(tgt_w), tgt_h)
    }
}

/// Largest image the renderer allocates, canvas or resized tile, in pixels.
///
/// 2^28 RGB pixels is 768 MiB.
pub const MAX_PIXELS: u64 = 1 << 28;

/// Whether a `width × height` RGB buffer stays within [`MAX_PIXELS`].
pub fn within_pixel_limit(width: u32, height: u32) -> bool {
    u64::from(width) * u64::from(height) <= MAX_PIXELS
}

/// Offsets of a centered `target` box inside `resized`.
pub fn center_crop_offset(resized: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    (
        resized.0.saturating_sub(target.0) / 2,
        resized.1.saturating_sub(target.1) / 2,
    )
}
