use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("wheel_zoom_factor must be within (0, 1), got {0}")]
    ZoomFactor(f64),
    #[error("label_full_min_px ({full}) must not be below label_ellipsis_min_px ({ellipsis})")]
    LabelThresholds { full: f64, ellipsis: f64 },
}

/// Geometry and interaction policy shared by the renderer, hit tester and
/// interaction controller.
///
/// Every field has a default, so a config file only needs to name the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Height of one call-tree row in pixels.
    pub row_height: f64,
    /// Height of the timescale band at the top of the canvas.
    pub timescale_height: f64,
    pub interaction_track_height: f64,
    pub milestone_track_height: f64,
    /// Row height of the network waterfall in expanded mode.
    pub network_row_height: f64,
    /// Row height of the network waterfall in compact mode.
    pub compact_row_height: f64,
    /// Rectangles wider than this get their full (possibly truncated) label.
    pub label_full_min_px: f64,
    /// Rectangles wider than this (but narrower than `label_full_min_px`)
    /// get an ellipsis-truncated label.
    pub label_ellipsis_min_px: f64,
    /// Average glyph advance used to fit labels without a font backend.
    pub char_width_px: f64,
    pub font_size: f64,
    /// Pointer travel (in pixels) before a press becomes a drag.
    pub drag_threshold_px: f64,
    /// Range multiplier for one wheel notch towards the user (zoom in).
    pub wheel_zoom_factor: f64,
    /// Coalescing window for live trace recomputation.
    pub debounce_ms: u64,
    /// Padding added on each side by zoom-to-range, as a share of the range.
    pub zoom_padding_ratio: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_height: 24.0,
            timescale_height: 30.0,
            interaction_track_height: 40.0,
            milestone_track_height: 20.0,
            network_row_height: 20.0,
            compact_row_height: 8.0,
            label_full_min_px: 50.0,
            label_ellipsis_min_px: 30.0,
            char_width_px: 6.5,
            font_size: 11.0,
            drag_threshold_px: 3.0,
            wheel_zoom_factor: 0.9,
            debounce_ms: 300,
            zoom_padding_ratio: 0.05,
        }
    }
}

impl LayoutConfig {
    /// Parse a (partial) JSON config and validate it.
    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        let config: LayoutConfig = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("row_height", self.row_height),
            ("timescale_height", self.timescale_height),
            ("interaction_track_height", self.interaction_track_height),
            ("milestone_track_height", self.milestone_track_height),
            ("network_row_height", self.network_row_height),
            ("compact_row_height", self.compact_row_height),
            ("char_width_px", self.char_width_px),
            ("font_size", self.font_size),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if !(self.wheel_zoom_factor > 0.0 && self.wheel_zoom_factor < 1.0) {
            return Err(ConfigError::ZoomFactor(self.wheel_zoom_factor));
        }
        if self.label_full_min_px < self.label_ellipsis_min_px {
            return Err(ConfigError::LabelThresholds {
                full: self.label_full_min_px,
                ellipsis: self.label_ellipsis_min_px,
            });
        }
        Ok(())
    }
}
