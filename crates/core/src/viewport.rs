//! The viewport state machine.
//!
//! The state is a plain [`ViewState`] value; every transition is a pure
//! function from the old value (plus the data bounds) to a new one. Hosts
//! dispatch [`ViewTransition`]s and repaint; they never patch fields.

use serde::{Deserialize, Serialize};

use crate::model::ProcessedTrace;
use crate::transform;

/// Narrowest visible time range, in milliseconds (one microsecond).
pub const MIN_TIME_RANGE: f64 = 0.001;

/// Extent of the loaded data, used to clamp every transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataBounds {
    pub start: f64,
    pub end: f64,
    /// Deepest row index present in the data.
    pub max_depth: u32,
}

impl DataBounds {
    /// Bounds over `[start, end]`, widened to at least [`MIN_TIME_RANGE`].
    pub fn new(start: f64, end: f64, max_depth: u32) -> Self {
        let (start, end) = transform::sanitize_range(start, end, MIN_TIME_RANGE);
        Self {
            start,
            end,
            max_depth,
        }
    }

    pub fn from_trace(trace: &ProcessedTrace) -> Self {
        Self::new(trace.start_time, trace.end_time, trace.max_depth)
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Largest permitted `top_depth` when `visible` rows fit on screen.
    pub fn max_top_depth(&self, visible: u32) -> f64 {
        (f64::from(self.max_depth) - f64::from(visible) + 1.0).max(0.0)
    }
}

/// The visible window: a time range and a row range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub start_time: f64,
    pub end_time: f64,
    /// First visible row; fractional while panning.
    pub top_depth: f64,
    pub visible_depth_count: u32,
}

/// Display toggles that travel with a view. In network mode these make up
/// the network-specific superset (compact layout, party filters, milestones).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFlags {
    pub show_annotations: bool,
    pub show_interactions: bool,
    pub show_milestones: bool,
    pub is_compact: bool,
    pub show_first_party: bool,
    pub show_third_party: bool,
}

impl Default for DisplayFlags {
    fn default() -> Self {
        Self {
            show_annotations: true,
            show_interactions: false,
            show_milestones: false,
            is_compact: false,
            show_first_party: true,
            show_third_party: true,
        }
    }
}

/// Every way the view can change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ViewTransition {
    ZoomIn {
        focus: Option<f64>,
    },
    ZoomOut {
        focus: Option<f64>,
    },
    /// Wheel zoom: scale the range by `factor` keeping the time under
    /// pixel `x` fixed.
    ZoomAround {
        factor: f64,
        x: f64,
        width: f64,
    },
    ZoomToRange {
        start: f64,
        end: f64,
        padding_ratio: f64,
    },
    PanByPixels {
        dx: f64,
        dy: f64,
        width: f64,
        row_height: f64,
    },
    ScrollDepth {
        step: f64,
    },
    Reset {
        content_height: f64,
        row_height: f64,
    },
    Resize {
        content_height: f64,
        row_height: f64,
    },
}

/// Rows needed to fill `content_height`, counting a partially visible
/// bottom row.
pub fn visible_depth_count(content_height: f64, row_height: f64) -> u32 {
    if !(row_height > 0.0) || !(content_height > 0.0) {
        return 1;
    }
    ((content_height / row_height).ceil() as u32).max(1)
}

impl ViewState {
    /// The whole data extent with the first row on top.
    pub fn full(bounds: &DataBounds, visible_depth_count: u32) -> Self {
        Self {
            start_time: bounds.start,
            end_time: bounds.end,
            top_depth: 0.0,
            visible_depth_count: visible_depth_count.max(1),
        }
    }

    pub fn range(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn midpoint(&self) -> f64 {
        self.start_time + self.range() / 2.0
    }

    pub fn covers_all(&self, bounds: &DataBounds) -> bool {
        self.start_time <= bounds.start && self.end_time >= bounds.end
    }

    pub fn apply(&self, transition: ViewTransition, bounds: &DataBounds) -> Self {
        let next = match transition {
            ViewTransition::ZoomIn { focus } => self.zoom_in(bounds, focus),
            ViewTransition::ZoomOut { focus } => self.zoom_out(bounds, focus),
            ViewTransition::ZoomAround { factor, x, width } => {
                self.zoom_around(bounds, factor, x, width)
            }
            ViewTransition::ZoomToRange {
                start,
                end,
                padding_ratio,
            } => self.zoom_to_range(bounds, start, end, padding_ratio),
            ViewTransition::PanByPixels {
                dx,
                dy,
                width,
                row_height,
            } => self.pan_by_pixels(bounds, dx, dy, width, row_height),
            ViewTransition::ScrollDepth { step } => self.scroll_depth(bounds, step),
            ViewTransition::Reset {
                content_height,
                row_height,
            } => Self::reset(bounds, content_height, row_height),
            ViewTransition::Resize {
                content_height,
                row_height,
            } => self.resize(bounds, content_height, row_height),
        };
        tracing::debug!(
            ?transition,
            start = next.start_time,
            end = next.end_time,
            top = next.top_depth,
            "view transition"
        );
        next
    }

    /// Halve the range around `focus` (or the current midpoint).
    pub fn zoom_in(&self, bounds: &DataBounds, focus: Option<f64>) -> Self {
        let range = (self.range() / 2.0).max(MIN_TIME_RANGE);
        self.recentered(bounds, focus.unwrap_or_else(|| self.midpoint()), range)
    }

    /// Double the range around `focus` (or the current midpoint). Snaps to
    /// the exact data bounds once the whole extent would be visible.
    pub fn zoom_out(&self, bounds: &DataBounds, focus: Option<f64>) -> Self {
        let range = self.range() * 2.0;
        if range >= bounds.span() {
            return self.with_time(bounds.start, bounds.end);
        }
        self.recentered(bounds, focus.unwrap_or_else(|| self.midpoint()), range)
    }

    /// Scale the range by `factor` while the time under pixel `x` stays
    /// under pixel `x`.
    pub fn zoom_around(&self, bounds: &DataBounds, factor: f64, x: f64, width: f64) -> Self {
        if !(width > 0.0) || !(factor > 0.0) {
            return *self;
        }
        let ratio = (x / width).clamp(0.0, 1.0);
        let anchor = transform::x_to_time(x.clamp(0.0, width), self, width);
        let range = (self.range() * factor).max(MIN_TIME_RANGE).min(bounds.span());
        if range >= bounds.span() {
            return self.with_time(bounds.start, bounds.end);
        }
        let start = anchor - ratio * range;
        let (start, end) = shift_into(start, start + range, bounds);
        self.with_time(start, end)
    }

    /// Show `[a, b]` padded by `padding_ratio` of its length on each side,
    /// clipped to the data bounds.
    pub fn zoom_to_range(&self, bounds: &DataBounds, a: f64, b: f64, padding_ratio: f64) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let pad = (hi - lo) * padding_ratio.max(0.0);
        let start = (lo - pad).max(bounds.start);
        let end = (hi + pad).min(bounds.end);
        if end - start < MIN_TIME_RANGE {
            let center = ((lo + hi) / 2.0).clamp(bounds.start, bounds.end);
            return self.recentered(bounds, center, MIN_TIME_RANGE);
        }
        self.with_time(start, end)
    }

    /// Move the view by `dx` pixels in time (positive = later) and `dy`
    /// pixels in depth (positive = deeper). The time range is shifted, never
    /// shrunk, to stay inside the data.
    pub fn pan_by_pixels(
        &self,
        bounds: &DataBounds,
        dx: f64,
        dy: f64,
        width: f64,
        row_height: f64,
    ) -> Self {
        let mut next = *self;
        if width > 0.0 {
            let dt = dx * self.range() / width;
            let (start, end) = shift_into(self.start_time + dt, self.end_time + dt, bounds);
            next = next.with_time(start, end);
        }
        if row_height > 0.0 {
            next.top_depth = clamp_top_depth(self.top_depth + dy / row_height, bounds, self.visible_depth_count);
        }
        next
    }

    /// Move the first visible row by `step` rows.
    pub fn scroll_depth(&self, bounds: &DataBounds, step: f64) -> Self {
        Self {
            top_depth: clamp_top_depth(self.top_depth + step, bounds, self.visible_depth_count),
            ..*self
        }
    }

    /// Full extent, first row on top, row count fitted to the content band.
    pub fn reset(bounds: &DataBounds, content_height: f64, row_height: f64) -> Self {
        Self::full(bounds, visible_depth_count(content_height, row_height))
    }

    /// Refit the row count after the canvas changed height.
    pub fn resize(&self, bounds: &DataBounds, content_height: f64, row_height: f64) -> Self {
        let visible = visible_depth_count(content_height, row_height);
        Self {
            visible_depth_count: visible,
            top_depth: clamp_top_depth(self.top_depth, bounds, visible),
            ..*self
        }
    }

    fn with_time(&self, start: f64, end: f64) -> Self {
        Self {
            start_time: start,
            end_time: end,
            ..*self
        }
    }

    fn recentered(&self, bounds: &DataBounds, center: f64, range: f64) -> Self {
        let range = range.min(bounds.span());
        let start = center - range / 2.0;
        let (start, end) = shift_into(start, start + range, bounds);
        self.with_time(start, end)
    }
}

/// Slide `[start, end]` into the bounds. Whatever is cut off on one side is
/// given to the other, so the span survives unless it exceeds the bounds.
fn shift_into(start: f64, end: f64, bounds: &DataBounds) -> (f64, f64) {
    let range = (end - start).min(bounds.span());
    if start < bounds.start {
        (bounds.start, bounds.start + range)
    } else if end > bounds.end {
        (bounds.end - range, bounds.end)
    } else {
        (start, end)
    }
}

fn clamp_top_depth(top: f64, bounds: &DataBounds, visible: u32) -> f64 {
    if top.is_nan() {
        return 0.0;
    }
    top.clamp(0.0, bounds.max_top_depth(visible))
}
