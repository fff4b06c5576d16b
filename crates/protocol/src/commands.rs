use serde::{Deserialize, Serialize};

use crate::theme::Paint;
use crate::types::{Point, Rect};

/// A single, stateless render instruction.
///
/// The core emits a `Vec<RenderCommand>` per repaint. Renderers consume
/// this list sequentially; each command carries all the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Fill the whole surface.
    Clear { paint: Paint },

    /// Draw a filled rectangle. `label` is the full entity name (tooltips,
    /// SVG titles); visible text is emitted separately as `DrawText`.
    DrawRect {
        rect: Rect,
        paint: Paint,
        border: Option<Paint>,
        label: Option<String>,
        frame_id: Option<u64>,
    },

    /// Draw a text string. `position` is the left/center/right anchor on
    /// the text baseline's vertical center.
    DrawText {
        position: Point,
        text: String,
        paint: Paint,
        font_size: f64,
        align: TextAlign,
    },

    /// Draw a line segment.
    DrawLine {
        from: Point,
        to: Point,
        paint: Paint,
        width: f64,
    },

    /// Draw a line segment with an arrow head at `to`.
    DrawArrow {
        from: Point,
        to: Point,
        paint: Paint,
        width: f64,
    },

    /// Restrict subsequent drawing to a rectangular region.
    SetClip { rect: Rect },

    /// Remove the active clip region.
    ClearClip,

    /// Begin a logical group (a track or band).
    BeginGroup { id: String, label: Option<String> },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeToken;
    use crate::types::Color;

    #[test]
    fn commands_serialize_as_tagged_json() {
        let cmds = vec![
            RenderCommand::Clear {
                paint: ThemeToken::Background.into(),
            },
            RenderCommand::DrawRect {
                rect: Rect::new(1.0, 2.0, 3.0, 4.0),
                paint: Color::rgb8(255, 0, 0).into(),
                border: None,
                label: Some("main".into()),
                frame_id: Some(7),
            },
        ];
        let json = serde_json::to_string(&cmds).expect("commands serialize");
        assert!(json.contains("\"DrawRect\""));
        assert!(json.contains("\"frame_id\":7"));
        let back: Vec<RenderCommand> = serde_json::from_str(&json).expect("commands deserialize");
        assert_eq!(back, cmds);
    }
}
