//! End-to-end viewport scenarios driven through the public API.

use tracelens_core::processor::{self, RawTraceEvent};
use tracelens_core::stacking::{LaneAssignment, TimeSpan, assign_lanes};
use tracelens_core::{
    ClickOutcome, Content, Controller, LayoutConfig, ProcessedTrace, SceneData, Selection, TraceSession, render,
};
use tracelens_protocol::RenderCommand;

struct Span(f64, f64);

impl TimeSpan for Span {
    fn span_start(&self) -> f64 {
        self.0
    }
    fn span_end(&self) -> f64 {
        self.1
    }
}

/// A nested chain `depth` frames deep over `[0, 1000]` ms.
fn chain(depth: usize) -> Vec<RawTraceEvent> {
    (0..depth)
        .map(|d| {
            let inset = d as f64 * 10_000.0;
            RawTraceEvent::complete("FunctionCall", inset, 1_000_000.0 - 2.0 * inset)
        })
        .collect()
}

/// Root over `[0, 1000]` with child `F` over `[100, 300]`.
fn root_and_f() -> ProcessedTrace {
    processor::process_trace(&[
        RawTraceEvent::complete("FunctionCall", 0.0, 1_000_000.0),
        RawTraceEvent::complete("FunctionCall", 100_000.0, 200_000.0)
            .with_args(serde_json::json!({ "data": { "functionName": "F" } })),
    ])
}

#[test]
fn full_reset() {
    let trace = processor::process_trace(&chain(6));
    assert_eq!((trace.start_time, trace.end_time, trace.max_depth), (0.0, 1000.0, 5));

    let data = SceneData::new(Content::Flame(&trace));
    let mut c = Controller::new(LayoutConfig::default(), 800.0, 400.0, &data);
    c.wheel(-1.0, 100.0, &data);
    c.scroll_depth(3.0, &data);
    c.reset(&data);

    let v = c.view();
    assert_eq!((v.start_time, v.end_time, v.top_depth), (0.0, 1000.0, 0.0));
    assert_eq!(v.visible_depth_count, 16);
}

#[test]
fn wheel_zoom_keeps_cursor_time() {
    let trace = root_and_f();
    let data = SceneData::new(Content::Flame(&trace));
    let mut c = Controller::new(LayoutConfig::default(), 1000.0, 400.0, &data);
    c.wheel(-100.0, 250.0, &data);

    let v = *c.view();
    assert!((v.range() - 900.0).abs() < 1e-9);
    let x = tracelens_core::transform::time_to_x(250.0, &v, 1000.0);
    assert!((x - 250.0).abs() < 1e-9);
}

#[test]
fn stacking_reuses_freed_lanes() {
    let spans = [Span(0.0, 10.0), Span(5.0, 15.0), Span(12.0, 20.0)];
    let LaneAssignment { lanes, max_lane } = assign_lanes(&spans);
    assert_eq!(lanes, vec![0, 1, 0]);
    assert_eq!(max_lane, 1);
}

#[test]
fn second_click_zooms_to_frame() {
    let trace = root_and_f();
    let data = SceneData::new(Content::Flame(&trace));
    let mut c = Controller::new(LayoutConfig::default(), 1000.0, 400.0, &data);

    // Row 1 spans y = 54..78 below the 30px timescale.
    let first = c.click(200.0, 60.0, &data);
    let Some(Selection::Frame(id)) = c.selection() else {
        panic!("expected a frame selection, got {first:?}");
    };
    assert_eq!(trace.frame(id).map(|f| f.name.as_str()), Some("F"));

    let second = c.click(200.0, 60.0, &data);
    assert_eq!(
        second,
        ClickOutcome::ZoomTo {
            start: 100.0,
            end: 300.0
        }
    );
    let v = c.view();
    assert!((v.start_time - 90.0).abs() < 1e-9);
    assert!((v.end_time - 310.0).abs() < 1e-9);
    assert_eq!(c.selection(), Some(Selection::Frame(id)));
}

#[test]
fn empty_trace_draws_only_the_timescale() {
    let trace = processor::process_trace_bytes(b"not json", &Default::default());
    assert!(trace.is_empty());
    assert_eq!(trace.max_depth, 0);

    let data = SceneData::new(Content::Flame(&trace));
    let c = Controller::new(LayoutConfig::default(), 600.0, 300.0, &data);
    let commands = render(&c.scene(data));
    assert!(matches!(commands.first(), Some(RenderCommand::Clear { .. })));
    assert!(
        commands
            .iter()
            .all(|cmd| !matches!(cmd, RenderCommand::DrawRect { frame_id: Some(_), .. }))
    );
    assert!(commands.iter().any(|cmd| matches!(
        cmd,
        RenderCommand::BeginGroup { id, .. } if id == "timescale"
    )));
}

#[test]
fn render_is_idempotent() {
    let trace = root_and_f();
    let data = SceneData::new(Content::Flame(&trace));
    let c = Controller::new(LayoutConfig::default(), 640.0, 240.0, &data);
    assert_eq!(render(&c.scene(data)), render(&c.scene(data)));
}

#[test]
fn session_drives_the_controller() {
    let mut session = TraceSession::new(std::time::Duration::from_millis(300));
    session.load_events(chain(3));
    let mut c = Controller::new(LayoutConfig::default(), 800.0, 300.0, &session.data());
    assert_eq!(c.view().end_time, 1000.0);

    session.load_events(chain(2).into_iter().map(|e| RawTraceEvent { ts: e.ts + 1_000_000.0, ..e }).collect());
    c.reset(&session.data());
    assert_eq!((c.view().start_time, c.view().end_time), (1000.0, 2000.0));
    assert_eq!(c.selection(), None);
}
