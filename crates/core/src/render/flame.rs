use tracelens_protocol::{Paint, Point, Rect, RenderCommand, TextAlign, ThemeToken};

use super::label::{LABEL_PADDING, fit_label};
use super::{Scene, in_time_view};
use crate::hit_test::Hit;
use crate::model::{FrameNode, ProcessedTrace};
use crate::selection::Selection;
use crate::transform;
use crate::viewport::ViewState;

/// Entities narrower than this are drawn as one-pixel marks.
pub const MIN_RECT_PX: f64 = 0.5;
const CONTEXT_ALPHA: f32 = 0.35;

/// Unclipped pixel rectangle of a frame's row slot.
pub fn frame_rect(frame: &FrameNode, view: &ViewState, width: f64, row_height: f64, content: Rect) -> Rect {
    let x = transform::time_to_x(frame.start, view, width);
    let w = transform::duration_to_px(frame.duration().max(0.0), view, width);
    let y = transform::depth_to_y(f64::from(frame.row), view, row_height, content.y);
    Rect::new(x, y, w, row_height)
}

pub fn render_flame(scene: &Scene, trace: &ProcessedTrace, content: Rect) -> Vec<RenderCommand> {
    let row_height = scene.row_height();
    let width = scene.width;
    let mut commands = Vec::with_capacity(trace.frames.len().min(4096) + 2);
    commands.push(RenderCommand::BeginGroup {
        id: "flame".into(),
        label: Some("Call tree".into()),
    });

    for frame in &trace.frames {
        if !in_time_view(frame.start, frame.end, &scene.view) {
            continue;
        }
        let slot = frame_rect(frame, &scene.view, width, row_height, content);
        if slot.bottom() <= content.y || slot.y >= content.bottom() {
            continue;
        }

        let selected = scene.is_selected(Selection::Frame(frame.id));
        let fill = if frame.included {
            frame.color
        } else {
            frame.color.with_alpha(CONTEXT_ALPHA)
        };

        if slot.w < MIN_RECT_PX {
            let paint: Paint = if selected {
                ThemeToken::SelectionOutline.into()
            } else {
                fill.into()
            };
            commands.push(RenderCommand::DrawLine {
                from: Point::new(slot.x, slot.y),
                to: Point::new(slot.x, slot.y + row_height - 1.0),
                paint,
                width: 1.0,
            });
            continue;
        }

        // Only the on-screen part, so labels sit in the visible span.
        let x0 = slot.x.max(-1.0);
        let x1 = slot.right().min(width + 1.0);
        let rect = Rect::new(x0, slot.y, x1 - x0, row_height - 1.0);
        let border = if selected {
            ThemeToken::SelectionOutline
        } else if scene.is_hovered(Hit::Frame(frame.id)) {
            ThemeToken::HoverOutline
        } else {
            ThemeToken::FrameBorder
        };
        commands.push(RenderCommand::DrawRect {
            rect,
            paint: fill.into(),
            border: Some(border.into()),
            label: Some(frame.name.clone()),
            frame_id: Some(frame.id),
        });

        if let Some(text) = fit_label(&frame.name, rect.w, scene.config) {
            commands.push(RenderCommand::DrawText {
                position: Point::new(rect.x + LABEL_PADDING, rect.y + rect.h / 2.0),
                text,
                paint: ThemeToken::FrameText.into(),
                font_size: scene.config.font_size,
                align: TextAlign::Left,
            });
        }
    }

    commands.push(RenderCommand::EndGroup);
    commands
}
