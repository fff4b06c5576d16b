use tracelens_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken};

use super::label::text_width;
use super::timescale::format_duration;
use super::{Content, Hover, Scene, SceneData};
use crate::hit_test::Hit;
use crate::model::Annotation;

const POINTER_OFFSET: f64 = 12.0;
const LINE_HEIGHT: f64 = 16.0;
const PADDING: f64 = 8.0;

/// Title and detail lines describing a hovered entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverCard {
    pub title: String,
    pub lines: Vec<String>,
}

pub fn hover_card(hit: &Hit, data: &SceneData) -> Option<HoverCard> {
    match *hit {
        Hit::Frame(id) => {
            let frame = data.content.trace()?.frame(id)?;
            let mut lines = vec![format!("Duration: {}", format_duration(frame.duration()))];
            if let Some(script) = &frame.source_script {
                lines.push(script.clone());
            }
            if let Some(category) = &frame.category {
                lines.push(format!("Category: {category}"));
            }
            if !frame.included {
                lines.push("Outside the selected range".into());
            }
            Some(HoverCard {
                title: frame.name.clone(),
                lines,
            })
        }
        Hit::Request(idx) => {
            let Content::Network(network) = data.content else {
                return None;
            };
            let req = network.requests.get(idx)?;
            let seg = &req.segments;
            let party = if req.is_first_party { "first party" } else { "third party" };
            let mime = if req.mime_type.is_empty() {
                "unknown type"
            } else {
                req.mime_type.as_str()
            };
            Some(HoverCard {
                title: req.short_name().to_string(),
                lines: vec![
                    req.url.clone(),
                    format!("{mime} ({party})"),
                    format!("Duration: {}", format_duration(req.dur.max(0.0))),
                    format!("Queueing: {}", format_duration(seg.queueing)),
                    format!("Request + waiting: {}", format_duration(seg.request_plus_waiting)),
                    format!("Download: {}", format_duration(seg.download)),
                    format!("Waiting on main thread: {}", format_duration(seg.waiting_on_main_thread)),
                ],
            })
        }
        Hit::Interaction(idx) => {
            let event = data.interactions.get(idx)?;
            Some(HoverCard {
                title: event.name.clone(),
                lines: vec![
                    format!("Duration: {}", format_duration(event.dur.max(0.0))),
                    format!("Input delay: {}", format_duration(event.input_delay)),
                    format!(
                        "Processing: {}",
                        format_duration((event.processing_end - event.processing_start).max(0.0))
                    ),
                    format!("Presentation delay: {}", format_duration(event.presentation_delay)),
                ],
            })
        }
        Hit::Annotation(idx) => {
            let annotation = data.annotations.get(idx)?;
            let frame_name = |id: u64| {
                data.content
                    .trace()
                    .and_then(|t| t.frame(id))
                    .map_or_else(|| format!("#{id}"), |f| f.name.clone())
            };
            Some(match annotation {
                Annotation::Highlight {
                    start_time,
                    end_time,
                    label,
                } => HoverCard {
                    title: label.clone(),
                    lines: vec![format!("Duration: {}", format_duration(end_time - start_time))],
                },
                Annotation::Link {
                    from_frame_id,
                    to_frame_id,
                } => HoverCard {
                    title: "Link".into(),
                    lines: vec![format!("{} → {}", frame_name(*from_frame_id), frame_name(*to_frame_id))],
                },
                Annotation::Label { frame_id, label } => HoverCard {
                    title: label.clone(),
                    lines: vec![frame_name(*frame_id)],
                },
            })
        }
        Hit::Milestone(idx) => {
            let milestone = data.milestones.get(idx)?;
            let origin = data.content.trace().map_or(0.0, |t| t.start_time);
            Some(HoverCard {
                title: milestone.name.clone(),
                lines: vec![format!("At {}", format_duration(milestone.ts - origin))],
            })
        }
    }
}

/// Card rectangle next to the pointer, flipped to stay on the canvas.
pub fn card_rect(card: &HoverCard, pointer: Point, scene: &Scene) -> Rect {
    let widest = card
        .lines
        .iter()
        .chain(std::iter::once(&card.title))
        .map(|line| text_width(line, scene.config))
        .fold(0.0, f64::max);
    let w = widest + 2.0 * PADDING;
    let h = (card.lines.len() + 1) as f64 * LINE_HEIGHT + PADDING;

    let mut x = pointer.x + POINTER_OFFSET;
    if x + w > scene.width {
        x = pointer.x - POINTER_OFFSET - w;
    }
    let mut y = pointer.y + POINTER_OFFSET;
    if y + h > scene.height {
        y = pointer.y - POINTER_OFFSET - h;
    }
    Rect::new(x.max(0.0), y.max(0.0), w, h)
}

pub fn render_hover_card(scene: &Scene, hover: &Hover) -> Vec<RenderCommand> {
    let Some(card) = hover_card(&hover.hit, &scene.data) else {
        return Vec::new();
    };
    let rect = card_rect(&card, hover.position, scene);
    let mut commands = Vec::with_capacity(card.lines.len() + 4);
    commands.push(RenderCommand::BeginGroup {
        id: "hover".into(),
        label: None,
    });
    commands.push(RenderCommand::DrawRect {
        rect,
        paint: ThemeToken::HoverCardBackground.into(),
        border: Some(ThemeToken::HoverCardBorder.into()),
        label: None,
        frame_id: None,
    });
    let line = |i: usize| Point::new(rect.x + PADDING, rect.y + PADDING / 2.0 + (i as f64 + 0.5) * LINE_HEIGHT);
    commands.push(RenderCommand::DrawText {
        position: line(0),
        text: card.title,
        paint: ThemeToken::TextPrimary.into(),
        font_size: scene.config.font_size,
        align: TextAlign::Left,
    });
    for (i, text) in card.lines.into_iter().enumerate() {
        commands.push(RenderCommand::DrawText {
            position: line(i + 1),
            text,
            paint: ThemeToken::TextMuted.into(),
            font_size: scene.config.font_size,
            align: TextAlign::Left,
        });
    }
    commands.push(RenderCommand::EndGroup);
    commands
}
