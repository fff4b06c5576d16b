use tracelens_protocol::{Color, Point, Rect, RenderCommand, TextAlign, ThemeToken};

use super::flame::MIN_RECT_PX;
use super::label::{LABEL_PADDING, fit_label};
use super::{Scene, in_time_view};
use crate::hit_test::Hit;
use crate::model::{NetworkRequest, ResourceKind};
use crate::selection::Selection;
use crate::transform;
use crate::viewport::ViewState;
use crate::waterfall::ProcessedNetwork;

/// Download-segment color per resource family.
pub fn resource_color(kind: ResourceKind) -> Color {
    match kind {
        ResourceKind::Document => Color::rgb8(0x45, 0x7b, 0x9d),
        ResourceKind::Script => Color::rgb8(0xe9, 0xc4, 0x6a),
        ResourceKind::Stylesheet => Color::rgb8(0x9b, 0x8a, 0xc4),
        ResourceKind::Image => Color::rgb8(0x2a, 0x9d, 0x8f),
        ResourceKind::Font => Color::rgb8(0xe7, 0x6f, 0x51),
        ResourceKind::Media => Color::rgb8(0x84, 0xa5, 0x9d),
        ResourceKind::Data => Color::rgb8(0x6d, 0x9d, 0xc5),
        ResourceKind::Other => Color::rgb8(0xad, 0xb5, 0xbd),
    }
}

/// Pixel slot of a request on `row`.
pub fn request_rect(
    request: &NetworkRequest,
    row: u32,
    view: &ViewState,
    width: f64,
    row_height: f64,
    content: Rect,
) -> Rect {
    let x = transform::time_to_x(request.ts, view, width);
    let w = transform::duration_to_px(request.dur.max(0.0), view, width);
    let y = transform::depth_to_y(f64::from(row), view, row_height, content.y);
    Rect::new(x, y, w, row_height)
}

pub fn render_network(scene: &Scene, network: &ProcessedNetwork, content: Rect) -> Vec<RenderCommand> {
    let row_height = scene.row_height();
    let width = scene.width;
    let layout = network.layout(&scene.flags);
    let mut commands = Vec::with_capacity(network.requests.len() * 4 + 2);
    commands.push(RenderCommand::BeginGroup {
        id: "network".into(),
        label: Some("Network".into()),
    });

    let bar_height = if scene.flags.is_compact {
        row_height - 1.0
    } else {
        (row_height - 4.0).max(1.0)
    };

    for (idx, request) in network.requests.iter().enumerate() {
        let Some(row) = layout.row(idx) else {
            continue;
        };
        if !in_time_view(request.ts, request.end(), &scene.view) {
            continue;
        }
        let slot = request_rect(request, row, &scene.view, width, row_height, content);
        if slot.bottom() <= content.y || slot.y >= content.bottom() {
            continue;
        }
        let selected = scene.is_selected(Selection::Request(idx));
        let mid_y = slot.y + row_height / 2.0;
        let bar_y = mid_y - bar_height / 2.0;
        let kind_color = resource_color(request.resource_kind());

        if slot.w < MIN_RECT_PX {
            commands.push(RenderCommand::DrawLine {
                from: Point::new(slot.x, bar_y),
                to: Point::new(slot.x, bar_y + bar_height),
                paint: kind_color.into(),
                width: 1.0,
            });
            continue;
        }

        // Invisible hit target spanning the whole request, carrying the URL.
        let border = if selected {
            Some(ThemeToken::SelectionOutline.into())
        } else if scene.is_hovered(Hit::Request(idx)) {
            Some(ThemeToken::HoverOutline.into())
        } else {
            None
        };
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(slot.x, bar_y, slot.w, bar_height),
            paint: Color::rgba(0.0, 0.0, 0.0, 0.0).into(),
            border,
            label: Some(request.url.clone()),
            frame_id: None,
        });

        let seg = &request.segments;
        let px = |ms: f64| transform::duration_to_px(ms, &scene.view, width);
        let mut x = slot.x;

        // Queueing: thin whisker.
        let q = px(seg.queueing);
        if q > 0.0 {
            commands.push(RenderCommand::DrawLine {
                from: Point::new(x, mid_y),
                to: Point::new(x + q, mid_y),
                paint: ThemeToken::NetworkQueueing.into(),
                width: 1.0,
            });
        }
        x += q;

        let r = px(seg.request_plus_waiting);
        if r > 0.0 {
            commands.push(RenderCommand::DrawRect {
                rect: Rect::new(x, bar_y, r, bar_height),
                paint: ThemeToken::NetworkRequest.into(),
                border: None,
                label: None,
                frame_id: None,
            });
        }
        x += r;

        let d = px(seg.download);
        if d > 0.0 {
            commands.push(RenderCommand::DrawRect {
                rect: Rect::new(x, bar_y, d, bar_height),
                paint: kind_color.into(),
                border: None,
                label: None,
                frame_id: None,
            });
        }
        x += d;

        let m = px(seg.waiting_on_main_thread);
        if m > 0.0 {
            commands.push(RenderCommand::DrawLine {
                from: Point::new(x, mid_y),
                to: Point::new(x + m, mid_y),
                paint: ThemeToken::NetworkMainThread.into(),
                width: 1.0,
            });
        }

        if !scene.flags.is_compact {
            let x0 = slot.x.max(0.0);
            let visible = slot.right().min(width) - x0;
            if let Some(text) = fit_label(request.short_name(), visible, scene.config) {
                commands.push(RenderCommand::DrawText {
                    position: Point::new(x0 + LABEL_PADDING, mid_y),
                    text,
                    paint: ThemeToken::NetworkText.into(),
                    font_size: scene.config.font_size,
                    align: TextAlign::Left,
                });
            }
        }
    }

    commands.push(RenderCommand::EndGroup);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::model::RawNetworkRequest;
    use crate::render::{Content, SceneData};
    use crate::viewport::DisplayFlags;
    use crate::waterfall::process_network_data;

    fn raw(url: &str, ts: f64, dur: f64, first_party: bool) -> RawNetworkRequest {
        RawNetworkRequest {
            url: url.into(),
            ts,
            dur,
            mime_type: "text/css".into(),
            is_first_party: first_party,
            request_sent: Some(ts + dur * 0.1),
            response_received: Some(ts + dur * 0.5),
            finished: Some(ts + dur * 0.9),
        }
    }

    fn render_with(network: &ProcessedNetwork, flags: DisplayFlags) -> Vec<RenderCommand> {
        let config = LayoutConfig::default();
        let scene = Scene {
            width: 1000.0,
            height: 400.0,
            view: ViewState {
                start_time: 0.0,
                end_time: 1000.0,
                top_depth: 0.0,
                visible_depth_count: 19,
            },
            data: SceneData::new(Content::Network(network)),
            flags,
            selection: None,
            hover: None,
            config: &config,
        };
        render_network(&scene, network, Rect::new(0.0, 30.0, 1000.0, 370.0))
    }

    fn hit_targets(cmds: &[RenderCommand]) -> Vec<(String, Rect)> {
        cmds.iter()
            .filter_map(|c| match c {
                RenderCommand::DrawRect {
                    rect,
                    label: Some(url),
                    ..
                } => Some((url.clone(), *rect)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn segments_tile_the_request() {
        let net = process_network_data(&[raw("https://a.test/site.css", 100.0, 400.0, true)]);
        let cmds = render_with(&net, DisplayFlags::default());
        let lines: Vec<(f64, f64)> = cmds
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawLine { from, to, .. } => Some((from.x, to.x)),
                _ => None,
            })
            .collect();
        assert_eq!(lines.len(), 2);
        assert!((lines[0].0 - 100.0).abs() < 1e-9);
        assert!((lines[0].1 - 140.0).abs() < 1e-9);
        assert!((lines[1].1 - 500.0).abs() < 1e-9);
        assert!(cmds.iter().any(|c| matches!(
            c,
            RenderCommand::DrawText { text, .. } if text == "site.css"
        )));
    }

    #[test]
    fn rows_follow_lanes_and_filters() {
        let net = process_network_data(&[
            raw("a", 0.0, 100.0, true),
            raw("b", 50.0, 100.0, false),
            raw("c", 60.0, 100.0, true),
        ]);
        let cmds = render_with(&net, DisplayFlags::default());
        let ys: Vec<f64> = hit_targets(&cmds).iter().map(|t| t.1.y).collect();
        assert_eq!(ys, vec![32.0, 52.0, 72.0]);

        let compact = DisplayFlags {
            is_compact: true,
            show_third_party: false,
            ..DisplayFlags::default()
        };
        let cmds = render_with(&net, compact);
        let targets = hit_targets(&cmds);
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[1].1.y, 38.5);
        assert!(!cmds.iter().any(|c| matches!(c, RenderCommand::DrawText { .. })));
    }
}
