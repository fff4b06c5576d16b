use tracelens_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken};

use super::Scene;
use super::label::text_width;
use crate::transform;

/// Minimum gap between two milestone labels before the later one is dropped.
const LABEL_GAP_PX: f64 = 4.0;

/// Vertical markers through the milestone band and the content below it,
/// with short labels in the band.
pub fn render_milestones(scene: &Scene, band: Rect, content: Rect) -> Vec<RenderCommand> {
    let milestones = scene.data.milestones;
    let view = &scene.view;
    let mut commands = Vec::with_capacity(milestones.len() * 2 + 3);
    commands.push(RenderCommand::BeginGroup {
        id: "milestones".into(),
        label: Some("Milestones".into()),
    });
    commands.push(RenderCommand::DrawRect {
        rect: band,
        paint: ThemeToken::TrackBackground.into(),
        border: Some(ThemeToken::TrackBorder.into()),
        label: None,
        frame_id: None,
    });

    let mut last_label_end = f64::NEG_INFINITY;
    for milestone in milestones {
        if milestone.ts < view.start_time || milestone.ts > view.end_time {
            continue;
        }
        let x = transform::time_to_x(milestone.ts, view, scene.width);
        commands.push(RenderCommand::DrawLine {
            from: Point::new(x, band.y),
            to: Point::new(x, content.bottom()),
            paint: ThemeToken::MilestoneLine.into(),
            width: 1.0,
        });

        let text = milestone.short_label();
        let text_x = x + 2.0;
        if text_x >= last_label_end + LABEL_GAP_PX {
            commands.push(RenderCommand::DrawText {
                position: Point::new(text_x, band.y + band.h / 2.0),
                text: text.to_string(),
                paint: ThemeToken::MilestoneText.into(),
                font_size: scene.config.font_size,
                align: TextAlign::Left,
            });
            last_label_end = text_x + text_width(text, scene.config);
        }
    }

    commands.push(RenderCommand::EndGroup);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::model::{Milestone, ProcessedTrace};
    use crate::render::{Content, SceneData};
    use crate::viewport::{DisplayFlags, ViewState};

    #[test]
    fn crowded_labels_are_skipped() {
        let milestones = [
            Milestone {
                name: "firstPaint".into(),
                ts: 100.0,
            },
            Milestone {
                name: "firstContentfulPaint".into(),
                ts: 101.0,
            },
            Milestone {
                name: "loadEventEnd".into(),
                ts: 600.0,
            },
            Milestone {
                name: "navigationStart".into(),
                ts: 2_000.0,
            },
        ];
        let trace = ProcessedTrace::default();
        let config = LayoutConfig::default();
        let mut data = SceneData::new(Content::Flame(&trace));
        data.milestones = &milestones;
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
            selection: None,
            hover: None,
            config: &config,
        };
        let cmds = render_milestones(&scene, Rect::new(0.0, 30.0, 1000.0, 20.0), Rect::new(0.0, 50.0, 1000.0, 350.0));

        let lines = cmds.iter().filter(|c| matches!(c, RenderCommand::DrawLine { .. })).count();
        assert_eq!(lines, 3);
        let labels: Vec<&str> = cmds
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, ["FP", "L"]);
    }
}
