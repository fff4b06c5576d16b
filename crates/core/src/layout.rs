use tracelens_protocol::Rect;

use crate::config::LayoutConfig;
use crate::viewport::DisplayFlags;

/// Horizontal bands of the canvas, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Timescale,
    Interactions,
    Milestones,
    Content,
}

/// What the content band shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ContentKind {
    #[default]
    Flame,
    Network,
}

/// Row height of the content band for a content kind and layout mode.
pub fn row_height(kind: ContentKind, flags: &DisplayFlags, config: &LayoutConfig) -> f64 {
    match kind {
        ContentKind::Flame => config.row_height,
        ContentKind::Network if flags.is_compact => config.compact_row_height,
        ContentKind::Network => config.network_row_height,
    }
}

/// Pixel extents of every band for one canvas size and set of toggles.
///
/// The timescale is always present; the interaction and milestone tracks
/// are stacked under it when enabled; the content band takes the rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandLayout {
    pub width: f64,
    pub timescale: Rect,
    pub interactions: Option<Rect>,
    pub milestones: Option<Rect>,
    pub content: Rect,
}

impl BandLayout {
    pub fn compute(width: f64, height: f64, flags: &DisplayFlags, config: &LayoutConfig) -> Self {
        let timescale = Rect::new(0.0, 0.0, width, config.timescale_height.min(height));
        let mut y = timescale.bottom();

        let mut take = |enabled: bool, band_height: f64| {
            enabled.then(|| {
                let band = Rect::new(0.0, y, width, band_height.min((height - y).max(0.0)));
                y = band.bottom();
                band
            })
        };
        let interactions = take(flags.show_interactions, config.interaction_track_height);
        let milestones = take(flags.show_milestones, config.milestone_track_height);

        let content = Rect::new(0.0, y, width, (height - y).max(0.0));
        Self {
            width,
            timescale,
            interactions,
            milestones,
            content,
        }
    }

    /// Which band a canvas `y` falls in, if any.
    pub fn band_at(&self, y: f64) -> Option<Band> {
        let inside = |r: &Rect| y >= r.y && y < r.bottom();
        if inside(&self.timescale) {
            Some(Band::Timescale)
        } else if self.interactions.as_ref().is_some_and(inside) {
            Some(Band::Interactions)
        } else if self.milestones.as_ref().is_some_and(inside) {
            Some(Band::Milestones)
        } else if inside(&self.content) {
            Some(Band::Content)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flags_put_content_under_timescale() {
        let layout = BandLayout::compute(800.0, 400.0, &DisplayFlags::default(), &LayoutConfig::default());
        assert_eq!(layout.content, Rect::new(0.0, 30.0, 800.0, 370.0));
        assert!(layout.interactions.is_none());
        assert_eq!(layout.band_at(5.0), Some(Band::Timescale));
        assert_eq!(layout.band_at(30.0), Some(Band::Content));
        assert_eq!(layout.band_at(400.0), None);
        assert_eq!(layout.band_at(-1.0), None);
    }

    #[test]
    fn secondary_tracks_stack_in_order() {
        let flags = DisplayFlags {
            show_interactions: true,
            show_milestones: true,
            ..DisplayFlags::default()
        };
        let layout = BandLayout::compute(800.0, 400.0, &flags, &LayoutConfig::default());
        assert_eq!(layout.interactions, Some(Rect::new(0.0, 30.0, 800.0, 40.0)));
        assert_eq!(layout.milestones, Some(Rect::new(0.0, 70.0, 800.0, 20.0)));
        assert_eq!(layout.content.y, 90.0);
        assert_eq!(layout.band_at(45.0), Some(Band::Interactions));
        assert_eq!(layout.band_at(75.0), Some(Band::Milestones));
    }

    #[test]
    fn row_height_follows_mode() {
        let config = LayoutConfig::default();
        let compact = DisplayFlags {
            is_compact: true,
            ..DisplayFlags::default()
        };
        assert_eq!(row_height(ContentKind::Flame, &compact, &config), 24.0);
        assert_eq!(row_height(ContentKind::Network, &DisplayFlags::default(), &config), 20.0);
        assert_eq!(row_height(ContentKind::Network, &compact, &config), 8.0);
    }

    #[test]
    fn tiny_canvas_never_goes_negative() {
        let flags = DisplayFlags {
            show_interactions: true,
            ..DisplayFlags::default()
        };
        let layout = BandLayout::compute(100.0, 40.0, &flags, &LayoutConfig::default());
        assert_eq!(layout.content.h, 0.0);
        assert_eq!(layout.interactions.map(|r| r.h), Some(10.0));
    }
}
