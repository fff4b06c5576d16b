use tracelens_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken};

use crate::config::LayoutConfig;
use crate::transform;
use crate::viewport::ViewState;

const MAX_LABELS: f64 = 10.0;
const TICK_HEIGHT: f64 = 8.0;
/// Regular labels closer than this to a forced edge label are dropped.
const EDGE_LABEL_GAP_PX: f64 = 60.0;

/// Smallest 1/2/5×10ⁿ interval that puts at most [`MAX_LABELS`] ticks in
/// `range`. The next smaller step would exceed the cap, so at least four
/// intervals always fit.
pub fn nice_interval(range: f64) -> f64 {
    if !(range > 0.0) || !range.is_finite() {
        return 1.0;
    }
    let raw = range / MAX_LABELS;
    let magnitude = 10f64.powf(raw.log10().floor());
    [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|step| step * magnitude)
        .find(|&interval| interval >= raw)
        .unwrap_or(10.0 * magnitude)
}

/// Tick times inside `[start, end]` on the `interval` grid.
pub fn tick_times(start: f64, end: f64, interval: f64) -> Vec<f64> {
    if !(interval > 0.0) || !(end >= start) {
        return Vec::new();
    }
    let first = (start / interval).ceil() as i64;
    let last = (end / interval).floor() as i64;
    (first..=last).map(|k| k as f64 * interval).collect()
}

/// `ms` as a label, with as many decimals as `interval` needs.
pub fn format_time(ms: f64, interval: f64) -> String {
    let (value, step, unit) = if interval >= 1_000.0 {
        (ms / 1_000.0, interval / 1_000.0, "s")
    } else if interval >= 1.0 {
        (ms, interval, "ms")
    } else {
        (ms * 1_000.0, interval * 1_000.0, "µs")
    };
    let decimals = (-step.log10().floor()).max(0.0) as usize;
    format!("{value:.decimals$} {unit}")
}

/// Human-readable duration for hover cards.
pub fn format_duration(ms: f64) -> String {
    let abs = ms.abs();
    if abs >= 1_000.0 {
        format!("{:.2} s", ms / 1_000.0)
    } else if abs >= 1.0 {
        format!("{ms:.2} ms")
    } else {
        format!("{:.0} µs", ms * 1_000.0)
    }
}

/// Timescale band plus gridlines down to `grid_bottom`.
///
/// Labels are relative to `origin` (the start of the data). The first and
/// last visible instants are always labelled, even off the tick grid.
pub fn render_timescale(
    band: Rect,
    grid_bottom: f64,
    view: &ViewState,
    origin: f64,
    config: &LayoutConfig,
) -> Vec<RenderCommand> {
    let width = band.w;
    let mut commands = Vec::with_capacity(48);
    commands.push(RenderCommand::BeginGroup {
        id: "timescale".into(),
        label: None,
    });
    commands.push(RenderCommand::DrawRect {
        rect: band,
        paint: ThemeToken::TimescaleBackground.into(),
        border: None,
        label: None,
        frame_id: None,
    });

    let interval = nice_interval(view.range());
    let text_y = band.y + (band.h - TICK_HEIGHT) / 2.0;
    let label = |commands: &mut Vec<RenderCommand>, x: f64, t: f64, align: TextAlign| {
        commands.push(RenderCommand::DrawText {
            position: Point::new(x, text_y),
            text: format_time(t - origin, interval),
            paint: ThemeToken::TimescaleText.into(),
            font_size: config.font_size,
            align,
        });
    };

    for t in tick_times(view.start_time, view.end_time, interval) {
        let x = transform::time_to_x(t, view, width);
        commands.push(RenderCommand::DrawLine {
            from: Point::new(x, band.bottom() - TICK_HEIGHT),
            to: Point::new(x, band.bottom()),
            paint: ThemeToken::TimescaleTick.into(),
            width: 1.0,
        });
        if grid_bottom > band.bottom() {
            commands.push(RenderCommand::DrawLine {
                from: Point::new(x, band.bottom()),
                to: Point::new(x, grid_bottom),
                paint: ThemeToken::Gridline.into(),
                width: 0.5,
            });
        }
        if x >= EDGE_LABEL_GAP_PX && x <= width - EDGE_LABEL_GAP_PX {
            label(&mut commands, x, t, TextAlign::Center);
        }
    }

    label(&mut commands, band.x + 2.0, view.start_time, TextAlign::Left);
    label(&mut commands, band.right() - 2.0, view.end_time, TextAlign::Right);

    commands.push(RenderCommand::EndGroup);
    commands
}
