use serde::{Deserialize, Serialize};

use crate::types::Color;

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,

    // Timescale
    TimescaleBackground,
    TimescaleTick,
    TimescaleText,
    Gridline,

    // Call-tree frames
    FrameBorder,
    FrameText,

    // Network waterfall
    NetworkQueueing,
    NetworkRequest,
    NetworkMainThread,
    NetworkText,

    // Interaction track
    TrackBackground,
    TrackBorder,
    InteractionWhisker,
    InteractionProcessing,
    InteractionText,

    // Milestones
    MilestoneLine,
    MilestoneText,

    // Annotations
    AnnotationHighlight,
    AnnotationHighlightBorder,
    AnnotationLink,
    AnnotationLabelBackground,
    AnnotationLabelText,

    SelectionOutline,
    HoverOutline,

    HoverCardBackground,
    HoverCardBorder,
    TextPrimary,
    TextMuted,
}

/// Fill or stroke source for a render command.
///
/// Most commands carry a semantic token; per-script and per-mime colors are
/// computed by the core and travel as concrete colors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    Theme(ThemeToken),
    Solid(Color),
}

impl From<ThemeToken> for Paint {
    fn from(token: ThemeToken) -> Self {
        Paint::Theme(token)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

/// Built-in palettes hosts can resolve tokens against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn resolve(self, token: ThemeToken) -> Color {
        use ThemeToken as T;
        match self {
            Theme::Light => match token {
                T::Background => Color::rgb8(0xff, 0xff, 0xff),
                T::TimescaleBackground | T::TrackBackground => Color::rgb8(0xf8, 0xf9, 0xfa),
                T::TimescaleTick | T::TrackBorder | T::FrameBorder => Color::rgb8(0xde, 0xe2, 0xe6),
                T::Gridline => Color::rgb8(0xde, 0xe2, 0xe6).with_alpha(0.6),
                T::TimescaleText | T::TextMuted | T::NetworkText => Color::rgb8(0x66, 0x66, 0x77),
                T::FrameText | T::TextPrimary | T::InteractionText => Color::rgb8(0x1a, 0x1a, 0x2e),
                T::NetworkQueueing => Color::rgb8(0xad, 0xb5, 0xbd),
                T::NetworkRequest => Color::rgb8(0x45, 0x7b, 0x9d),
                T::NetworkMainThread => Color::rgb8(0xe6, 0x39, 0x46),
                T::InteractionWhisker => Color::rgb8(0x6c, 0x75, 0x7d),
                T::InteractionProcessing => Color::rgb8(0x9b, 0x8a, 0xc4),
                T::MilestoneLine | T::MilestoneText => Color::rgb8(0xe6, 0x7e, 0x22),
                T::AnnotationHighlight => Color::rgb8(0xff, 0xd6, 0x0a).with_alpha(0.25),
                T::AnnotationHighlightBorder => Color::rgb8(0xe0, 0xa8, 0x00),
                T::AnnotationLink => Color::rgb8(0x7b, 0x2c, 0xbf),
                T::AnnotationLabelBackground => Color::rgb8(0x7b, 0x2c, 0xbf),
                T::AnnotationLabelText => Color::rgb8(0xff, 0xff, 0xff),
                T::SelectionOutline => Color::rgb8(0x1c, 0x7e, 0xd6),
                T::HoverOutline => Color::rgb8(0x1a, 0x1a, 0x2e),
                T::HoverCardBackground => Color::rgb8(0xff, 0xff, 0xff),
                T::HoverCardBorder => Color::rgb8(0xad, 0xb5, 0xbd),
            },
            Theme::Dark => match token {
                T::Background => Color::rgb8(0x1a, 0x1a, 0x2e),
                T::TimescaleBackground | T::TrackBackground => Color::rgb8(0x18, 0x18, 0x18),
                T::TimescaleTick | T::TrackBorder | T::FrameBorder => Color::rgb8(0x30, 0x30, 0x30),
                T::Gridline => Color::rgb8(0x30, 0x30, 0x30).with_alpha(0.6),
                T::TimescaleText | T::TextMuted | T::NetworkText => Color::rgb8(0x9e, 0x9e, 0x9e),
                T::FrameText | T::InteractionText => Color::rgb8(0x1a, 0x1a, 0x2e),
                T::TextPrimary => Color::rgb8(0xec, 0xec, 0xec),
                T::NetworkQueueing => Color::rgb8(0x61, 0x61, 0x61),
                T::NetworkRequest => Color::rgb8(0x42, 0xa5, 0xf5),
                T::NetworkMainThread => Color::rgb8(0xf4, 0x43, 0x36),
                T::InteractionWhisker => Color::rgb8(0x9e, 0x9e, 0x9e),
                T::InteractionProcessing => Color::rgb8(0x95, 0x75, 0xcd),
                T::MilestoneLine | T::MilestoneText => Color::rgb8(0xff, 0xd6, 0x00),
                T::AnnotationHighlight => Color::rgb8(0xff, 0xd6, 0x00).with_alpha(0.2),
                T::AnnotationHighlightBorder => Color::rgb8(0xff, 0xd6, 0x00),
                T::AnnotationLink => Color::rgb8(0xce, 0x93, 0xd8),
                T::AnnotationLabelBackground => Color::rgb8(0xab, 0x47, 0xbc),
                T::AnnotationLabelText => Color::rgb8(0xff, 0xff, 0xff),
                T::SelectionOutline => Color::rgb8(0x44, 0x8a, 0xff),
                T::HoverOutline => Color::rgb8(0xec, 0xec, 0xec),
                T::HoverCardBackground => Color::rgb8(0x25, 0x25, 0x3a),
                T::HoverCardBorder => Color::rgb8(0x61, 0x61, 0x61),
            },
        }
    }

    /// Concrete color for any paint.
    pub fn paint(self, paint: Paint) -> Color {
        match paint {
            Paint::Theme(token) => self.resolve(token),
            Paint::Solid(color) => color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_paint_bypasses_the_palette() {
        let red = Color::rgb8(255, 0, 0);
        assert_eq!(Theme::Dark.paint(red.into()), red);
        assert_ne!(
            Theme::Light.paint(ThemeToken::Background.into()),
            Theme::Dark.paint(ThemeToken::Background.into())
        );
    }
}
