use tracelens_protocol::{Paint, Point, Rect, RenderCommand, TextAlign, ThemeToken};

use super::flame::frame_rect;
use super::label::text_width;
use super::{Scene, in_time_view};
use crate::hit_test::Hit;
use crate::model::{Annotation, FrameNode};
use crate::selection::Selection;
use crate::transform;

pub const CHIP_HEIGHT: f64 = 16.0;
const CHIP_PADDING: f64 = 4.0;

/// The clickable label box of an annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Chip {
    pub index: usize,
    pub rect: Rect,
    pub text: String,
}

fn frame_slot(scene: &Scene, frame: &FrameNode, content: Rect) -> Option<Rect> {
    if !in_time_view(frame.start, frame.end, &scene.view) {
        return None;
    }
    let slot = frame_rect(frame, &scene.view, scene.width, scene.row_height(), content);
    (slot.bottom() > content.y && slot.y < content.bottom()).then_some(slot)
}

fn chip_at(index: usize, x: f64, y: f64, text: &str, scene: &Scene) -> Chip {
    let w = text_width(text, scene.config) + 2.0 * CHIP_PADDING;
    Chip {
        index,
        rect: Rect::new(x, y, w, CHIP_HEIGHT),
        text: text.to_string(),
    }
}

/// Label boxes of highlights (pinned to the top of the content band) and of
/// frame labels (just above their frame), in annotation order.
pub fn annotation_chips(scene: &Scene, content: Rect) -> Vec<Chip> {
    let trace = scene.data.content.trace();
    let mut chips = Vec::new();
    for (index, annotation) in scene.data.annotations.iter().enumerate() {
        match annotation {
            Annotation::Highlight {
                start_time,
                end_time,
                label,
            } => {
                if label.is_empty() || !in_time_view(*start_time, *end_time, &scene.view) {
                    continue;
                }
                let x = transform::time_to_x(*start_time, &scene.view, scene.width).max(0.0);
                chips.push(chip_at(index, x, content.y, label, scene));
            }
            Annotation::Label { frame_id, label } => {
                let Some(slot) = trace
                    .and_then(|t| t.frame(*frame_id))
                    .and_then(|f| frame_slot(scene, f, content))
                else {
                    continue;
                };
                let y = (slot.y - CHIP_HEIGHT).max(content.y);
                chips.push(chip_at(index, slot.x.max(0.0), y, label, scene));
            }
            Annotation::Link { .. } => {}
        }
    }
    chips
}

/// Arrow from the end of the source frame to the start of the target frame.
pub fn link_endpoints(scene: &Scene, annotation: &Annotation, content: Rect) -> Option<(Point, Point)> {
    let Annotation::Link {
        from_frame_id,
        to_frame_id,
    } = annotation
    else {
        return None;
    };
    let trace = scene.data.content.trace()?;
    let row_height = scene.row_height();
    let point = |frame: &FrameNode, time: f64| {
        let slot = frame_rect(frame, &scene.view, scene.width, row_height, content);
        Point::new(
            transform::time_to_x(time, &scene.view, scene.width),
            slot.y + row_height / 2.0,
        )
    };
    let from = trace.frame(*from_frame_id)?;
    let to = trace.frame(*to_frame_id)?;
    Some((point(from, from.end), point(to, to.start)))
}

fn outline(scene: &Scene, index: usize, normal: ThemeToken) -> Paint {
    if scene.is_selected(Selection::Annotation(index)) {
        ThemeToken::SelectionOutline.into()
    } else if scene.is_hovered(Hit::Annotation(index)) {
        ThemeToken::HoverOutline.into()
    } else {
        normal.into()
    }
}

pub fn render_annotations(scene: &Scene, content: Rect) -> Vec<RenderCommand> {
    let annotations = scene.data.annotations;
    let mut commands = Vec::with_capacity(annotations.len() * 3 + 2);
    commands.push(RenderCommand::BeginGroup {
        id: "annotations".into(),
        label: Some("Annotations".into()),
    });

    for (index, annotation) in annotations.iter().enumerate() {
        match annotation {
            Annotation::Highlight {
                start_time,
                end_time,
                label,
            } => {
                if !in_time_view(*start_time, *end_time, &scene.view) {
                    continue;
                }
                let x0 = transform::time_to_x(*start_time, &scene.view, scene.width).max(-1.0);
                let x1 = transform::time_to_x(*end_time, &scene.view, scene.width).min(scene.width + 1.0);
                commands.push(RenderCommand::DrawRect {
                    rect: Rect::new(x0, content.y, (x1 - x0).max(1.0), content.h),
                    paint: ThemeToken::AnnotationHighlight.into(),
                    border: Some(outline(scene, index, ThemeToken::AnnotationHighlightBorder)),
                    label: Some(label.clone()),
                    frame_id: None,
                });
            }
            Annotation::Link { .. } => {
                if let Some((from, to)) = link_endpoints(scene, annotation, content) {
                    let selected = scene.is_selected(Selection::Annotation(index));
                    commands.push(RenderCommand::DrawArrow {
                        from,
                        to,
                        paint: outline(scene, index, ThemeToken::AnnotationLink),
                        width: if selected { 2.5 } else { 1.5 },
                    });
                }
            }
            Annotation::Label { .. } => {}
        }
    }

    for chip in annotation_chips(scene, content) {
        commands.push(RenderCommand::DrawRect {
            rect: chip.rect,
            paint: ThemeToken::AnnotationLabelBackground.into(),
            border: Some(outline(scene, chip.index, ThemeToken::AnnotationLabelBackground)),
            label: None,
            frame_id: None,
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(chip.rect.x + CHIP_PADDING, chip.rect.y + CHIP_HEIGHT / 2.0),
            text: chip.text,
            paint: ThemeToken::AnnotationLabelText.into(),
            font_size: scene.config.font_size,
            align: TextAlign::Left,
        });
    }

    commands.push(RenderCommand::EndGroup);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::render::test_support::sample_trace;
    use crate::render::{Content, SceneData};
    use crate::viewport::{DisplayFlags, ViewState};

    fn annotations() -> Vec<Annotation> {
        vec![
            Annotation::Highlight {
                start_time: 200.0,
                end_time: 400.0,
                label: "Long task".into(),
            },
            Annotation::Link {
                from_frame_id: 2,
                to_frame_id: 3,
            },
            Annotation::Label {
                frame_id: 2,
                label: "slow".into(),
            },
            Annotation::Label {
                frame_id: 99,
                label: "missing".into(),
            },
        ]
    }

    fn with_scene<R>(f: impl FnOnce(&Scene) -> R) -> R {
        let trace = sample_trace();
        let anns = annotations();
        let config = LayoutConfig::default();
        let mut data = SceneData::new(Content::Flame(&trace));
        data.annotations = &anns;
        let scene = Scene {
            width: 1000.0,
            height: 400.0,
            view: ViewState {
                start_time: 0.0,
                end_time: 1000.0,
                top_depth: 0.0,
                visible_depth_count: 16,
            },
            data,
            flags: DisplayFlags::default(),
            selection: Some(Selection::Annotation(0)),
            hover: None,
            config: &config,
        };
        f(&scene)
    }

    const CONTENT: Rect = Rect {
        x: 0.0,
        y: 30.0,
        w: 1000.0,
        h: 370.0,
    };

    #[test]
    fn chips_for_highlights_and_labels() {
        let chips = with_scene(|s| annotation_chips(s, CONTENT));
        assert_eq!(chips.len(), 2);
        assert_eq!(chips[0].index, 0);
        assert_eq!((chips[0].rect.x, chips[0].rect.y), (200.0, 30.0));
        // Frame 2 sits on row 1 (y = 54); its chip sits right above it.
        assert_eq!(chips[1].index, 2);
        assert_eq!((chips[1].rect.x, chips[1].rect.y), (100.0, 38.0));
    }

    #[test]
    fn link_runs_from_end_to_start() {
        let ends = with_scene(|s| link_endpoints(s, &s.data.annotations[1], CONTENT));
        assert_eq!(ends, Some((Point::new(300.0, 66.0), Point::new(120.0, 90.0))));
    }

    #[test]
    fn selected_highlight_is_outlined() {
        let cmds = with_scene(|s| render_annotations(s, CONTENT));
        let band = cmds.iter().find_map(|c| match c {
            RenderCommand::DrawRect {
                rect,
                border,
                label: Some(_),
                ..
            } => Some((*rect, *border)),
            _ => None,
        });
        assert_eq!(
            band,
            Some((
                Rect::new(200.0, 30.0, 200.0, 370.0),
                Some(ThemeToken::SelectionOutline.into())
            ))
        );
        assert!(cmds.iter().any(|c| matches!(c, RenderCommand::DrawArrow { .. })));
    }
}
