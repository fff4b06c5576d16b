use tracelens_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken};

use super::label::fit_label;
use super::{Scene, in_time_view};
use crate::hit_test::Hit;
use crate::model::InteractionEvent;
use crate::selection::Selection;
use crate::stacking::{self, LaneAssignment};
use crate::transform;

const WHISKER_CAP_PX: f64 = 6.0;

/// Lanes for overlapping interactions within the track.
pub fn interaction_lanes(interactions: &[InteractionEvent]) -> LaneAssignment {
    stacking::assign_lanes(interactions)
}

/// Vertical slot of `lane` inside the track band.
pub fn lane_slot(band: Rect, lane: u32, lane_count: u32) -> Rect {
    let h = band.h / f64::from(lane_count.max(1));
    Rect::new(band.x, band.y + f64::from(lane) * h, band.w, h)
}

pub fn render_interactions(scene: &Scene, band: Rect) -> Vec<RenderCommand> {
    let interactions = scene.data.interactions;
    let view = &scene.view;
    let width = scene.width;
    let lanes = interaction_lanes(interactions);
    let mut commands = Vec::with_capacity(interactions.len() * 5 + 3);

    commands.push(RenderCommand::BeginGroup {
        id: "interactions".into(),
        label: Some("Interactions".into()),
    });
    commands.push(RenderCommand::DrawRect {
        rect: band,
        paint: ThemeToken::TrackBackground.into(),
        border: Some(ThemeToken::TrackBorder.into()),
        label: None,
        frame_id: None,
    });

    for (idx, event) in interactions.iter().enumerate() {
        if !in_time_view(event.ts, event.end(), view) {
            continue;
        }
        let lane = lanes.lanes.get(idx).copied().unwrap_or(0);
        let slot = lane_slot(band, lane, lanes.lane_count());
        let mid_y = slot.y + slot.h / 2.0;
        let x = |t: f64| transform::time_to_x(t, view, width);

        let event_end = event.end().max(event.ts);
        let start = x(event.ts);
        let end = x(event_end);
        let processing_start = event.processing_start.max(event.ts).min(event_end);
        let box_start = x(processing_start);
        let box_end = x(event.processing_end.max(processing_start).min(event_end));

        let whisker = |commands: &mut Vec<RenderCommand>, from: f64, to: f64| {
            if to <= from {
                return;
            }
            commands.push(RenderCommand::DrawLine {
                from: Point::new(from, mid_y),
                to: Point::new(to, mid_y),
                paint: ThemeToken::InteractionWhisker.into(),
                width: 1.0,
            });
            // Cap at the far end.
            let cap = (WHISKER_CAP_PX / 2.0).min(slot.h / 2.0);
            let cap_x = if from == start { from } else { to };
            commands.push(RenderCommand::DrawLine {
                from: Point::new(cap_x, mid_y - cap),
                to: Point::new(cap_x, mid_y + cap),
                paint: ThemeToken::InteractionWhisker.into(),
                width: 1.0,
            });
        };
        whisker(&mut commands, start, box_start);
        whisker(&mut commands, box_end, end);

        let border = if scene.is_selected(Selection::Interaction(idx)) {
            ThemeToken::SelectionOutline
        } else if scene.is_hovered(Hit::Interaction(idx)) {
            ThemeToken::HoverOutline
        } else {
            ThemeToken::TrackBorder
        };
        let box_h = (slot.h - 4.0).max(1.0);
        let rect = Rect::new(box_start, mid_y - box_h / 2.0, (box_end - box_start).max(1.0), box_h);
        commands.push(RenderCommand::DrawRect {
            rect,
            paint: ThemeToken::InteractionProcessing.into(),
            border: Some(border.into()),
            label: Some(event.name.clone()),
            frame_id: None,
        });
        if let Some(text) = fit_label(&event.name, rect.w, scene.config) {
            commands.push(RenderCommand::DrawText {
                position: Point::new(rect.x + rect.w / 2.0, mid_y),
                text,
                paint: ThemeToken::InteractionText.into(),
                font_size: scene.config.font_size,
                align: TextAlign::Center,
            });
        }
    }

    commands.push(RenderCommand::EndGroup);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::model::ProcessedTrace;
    use crate::render::{Content, SceneData};
    use crate::viewport::{DisplayFlags, ViewState};

    fn event(name: &str, ts: f64, dur: f64) -> InteractionEvent {
        InteractionEvent {
            name: name.into(),
            ts,
            dur,
            input_delay: dur * 0.1,
            processing_start: ts + dur * 0.1,
            processing_end: ts + dur * 0.8,
            presentation_delay: dur * 0.2,
        }
    }

    fn render_events(events: &[InteractionEvent]) -> Vec<RenderCommand> {
        let trace = ProcessedTrace::default();
        let config = LayoutConfig::default();
        let mut data = SceneData::new(Content::Flame(&trace));
        data.interactions = events;
        let scene = Scene {
            width: 1000.0,
            height: 400.0,
            view: ViewState {
                start_time: 0.0,
                end_time: 1000.0,
                top_depth: 0.0,
                visible_depth_count: 10,
            },
            data,
            flags: DisplayFlags::default(),
            selection: Some(Selection::Interaction(1)),
            hover: None,
            config: &config,
        };
        render_interactions(&scene, Rect::new(0.0, 30.0, 1000.0, 40.0))
    }

    fn boxes(cmds: &[RenderCommand]) -> Vec<(String, Rect, Option<tracelens_protocol::Paint>)> {
        cmds.iter()
            .filter_map(|c| match c {
                RenderCommand::DrawRect {
                    rect,
                    label: Some(name),
                    border,
                    ..
                } => Some((name.clone(), *rect, *border)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn processing_box_between_whiskers() {
        let cmds = render_events(&[event("click", 100.0, 200.0)]);
        let b = boxes(&cmds);
        assert_eq!(b.len(), 1);
        assert!((b[0].1.x - 120.0).abs() < 1e-9);
        assert!((b[0].1.right() - 260.0).abs() < 1e-9);
        let whiskers = cmds
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawLine { from, to, .. } if from.y == to.y))
            .count();
        assert_eq!(whiskers, 2);
    }

    #[test]
    fn overlapping_events_split_the_track() {
        let cmds = render_events(&[event("click", 100.0, 200.0), event("keydown", 150.0, 100.0)]);
        let b = boxes(&cmds);
        assert_eq!(b.len(), 2);
        assert!(b[1].1.y > b[0].1.y);
        assert!(b[1].1.bottom() <= 70.0);
        assert_eq!(b[1].2, Some(ThemeToken::SelectionOutline.into()));
    }

    #[test]
    fn lane_slots_divide_the_band() {
        let band = Rect::new(0.0, 30.0, 100.0, 40.0);
        assert_eq!(lane_slot(band, 0, 0), band);
        assert_eq!(lane_slot(band, 1, 2), Rect::new(0.0, 50.0, 100.0, 20.0));
    }
}
