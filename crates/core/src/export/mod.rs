//! Static exports of a render command list.
//!
//! Both backends interpret the same `Vec<RenderCommand>` the interactive
//! hosts paint, so a report can embed the current view without a canvas.

pub mod raster;
pub mod svg;

use thiserror::Error;
use tracelens_protocol::Point;

pub use raster::{render_png, render_raster};
pub use svg::render_svg;

/// Largest edge, in pixels, a raster export may have.
pub const MAX_EXPORT_EDGE: u32 = 16_384;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export size {width}x{height} is outside 1..=16384 pixels")]
    Size { width: f64, height: f64 },
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("the data changed while the export was in flight")]
    Stale,
}

/// Output format, picked from a file extension by hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Svg,
    Png,
}

impl ExportFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "svg" => Some(ExportFormat::Svg),
            "png" => Some(ExportFormat::Png),
            _ => None,
        }
    }
}

/// Triangle for an arrow head ending at `to`.
pub(crate) fn arrow_head(from: Point, to: Point, width: f64) -> Option<[Point; 3]> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let len = dx.hypot(dy);
    if len < f64::EPSILON {
        return None;
    }
    let size = (4.0 * width).max(6.0);
    let (ux, uy) = (dx / len, dy / len);
    let base = Point::new(to.x - ux * size, to.y - uy * size);
    let (nx, ny) = (-uy * size / 2.0, ux * size / 2.0);
    Some([
        to,
        Point::new(base.x + nx, base.y + ny),
        Point::new(base.x - nx, base.y - ny),
    ])
}
