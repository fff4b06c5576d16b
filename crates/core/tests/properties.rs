//! Property-based invariants for the transform, stacking and viewport.
//!
//! 1. `x_to_time(time_to_x(t)) == t` within 1e-6 relative error.
//! 2. Entities sharing a lane never overlap in time.
//! 3. Zooming never leaves the data bounds nor drops below `MIN_TIME_RANGE`.
//! 4. Panning keeps time and depth inside their clamps.

use proptest::prelude::*;
use tracelens_core::stacking::{TimeSpan, assign_lanes, overlaps};
use tracelens_core::transform::{time_to_x, x_to_time};
use tracelens_core::viewport::{DataBounds, MIN_TIME_RANGE, ViewState};

#[derive(Debug, Clone)]
struct Span(f64, f64);

impl TimeSpan for Span {
    fn span_start(&self) -> f64 {
        self.0
    }
    fn span_end(&self) -> f64 {
        self.1
    }
}

fn span_strategy() -> impl Strategy<Value = Span> {
    (0.0f64..1_000.0, -5.0f64..200.0).prop_map(|(start, dur)| Span(start, start + dur))
}

fn bounds_strategy() -> impl Strategy<Value = DataBounds> {
    (-1_000.0f64..1_000.0, 1.0f64..100_000.0, 0u32..60)
        .prop_map(|(start, span, depth)| DataBounds::new(start, start + span, depth))
}

#[derive(Debug, Clone, Copy)]
enum Zoom {
    In(Option<f64>),
    Out(Option<f64>),
    Wheel { factor: f64, ratio: f64 },
}

fn zoom_strategy() -> impl Strategy<Value = Zoom> {
    prop_oneof![
        proptest::option::of(0.0f64..1.0).prop_map(Zoom::In),
        proptest::option::of(0.0f64..1.0).prop_map(Zoom::Out),
        (0.5f64..2.0, 0.0f64..1.0).prop_map(|(factor, ratio)| Zoom::Wheel { factor, ratio }),
    ]
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Round-trip transform
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn time_round_trips_through_pixels(
        start in -1.0e6f64..1.0e6,
        range in 0.001f64..1.0e6,
        width in 1.0f64..8_000.0,
        frac in 0.0f64..=1.0,
    ) {
        let view = ViewState { start_time: start, end_time: start + range, top_depth: 0.0, visible_depth_count: 10 };
        let t = start + frac * range;
        let back = x_to_time(time_to_x(t, &view, width), &view, width);
        let tolerance = 1e-6 * t.abs().max(1.0);
        prop_assert!((back - t).abs() <= tolerance, "t={} back={} view={:?} width={}", t, back, view, width);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Stacking correctness
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn lanes_never_hold_overlapping_spans(spans in prop::collection::vec(span_strategy(), 0..80)) {
        let assignment = assign_lanes(&spans);
        prop_assert_eq!(assignment.lanes.len(), spans.len());
        for (i, a) in spans.iter().enumerate() {
            prop_assert!(assignment.lanes[i] <= assignment.max_lane);
            for (j, b) in spans.iter().enumerate().skip(i + 1) {
                if assignment.lanes[i] == assignment.lanes[j] {
                    prop_assert!(!overlaps(a, b), "{:?} and {:?} share lane {}", a, b, assignment.lanes[i]);
                }
            }
        }
    }

    #[test]
    fn lane_count_never_exceeds_entity_count(spans in prop::collection::vec(span_strategy(), 1..40)) {
        let assignment = assign_lanes(&spans);
        prop_assert!(assignment.lane_count() as usize <= spans.len());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Zoom bounds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn zoom_stays_within_bounds(
        bounds in bounds_strategy(),
        steps in prop::collection::vec(zoom_strategy(), 1..60),
    ) {
        let eps = 1e-9 * bounds.span().max(1.0);
        let at = |ratio: f64| bounds.start + ratio * bounds.span();
        let mut view = ViewState::full(&bounds, 10);
        for step in steps {
            view = match step {
                Zoom::In(focus) => view.zoom_in(&bounds, focus.map(at)),
                Zoom::Out(focus) => view.zoom_out(&bounds, focus.map(at)),
                Zoom::Wheel { factor, ratio } => view.zoom_around(&bounds, factor, ratio * 1_000.0, 1_000.0),
            };
            prop_assert!(view.start_time >= bounds.start - eps, "{:?} vs {:?}", view, bounds);
            prop_assert!(view.end_time <= bounds.end + eps, "{:?} vs {:?}", view, bounds);
            prop_assert!(view.range() <= bounds.span() + eps);
            prop_assert!(view.range() >= MIN_TIME_RANGE - 1e-9);
        }
    }

    #[test]
    fn repeated_zoom_out_reaches_exact_bounds(bounds in bounds_strategy(), focus in 0.0f64..1.0) {
        let mut view = ViewState::full(&bounds, 10);
        for _ in 0..12 {
            view = view.zoom_in(&bounds, Some(bounds.start + focus * bounds.span()));
        }
        for _ in 0..64 {
            view = view.zoom_out(&bounds, None);
        }
        prop_assert_eq!((view.start_time, view.end_time), (bounds.start, bounds.end));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Pan clamping
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn pan_stays_clamped(
        bounds in bounds_strategy(),
        visible in 1u32..40,
        zoom_steps in 0usize..8,
        pans in prop::collection::vec((-5_000.0f64..5_000.0, -500.0f64..500.0), 1..40),
    ) {
        let eps = 1e-9 * bounds.span().max(1.0);
        let mut view = ViewState::full(&bounds, visible);
        for _ in 0..zoom_steps {
            view = view.zoom_in(&bounds, None);
        }
        let range = view.range();
        for (dx, dy) in pans {
            view = view.pan_by_pixels(&bounds, dx, dy, 800.0, 24.0);
            prop_assert!(view.start_time >= bounds.start - eps);
            prop_assert!(view.end_time <= bounds.end + eps);
            prop_assert!((view.range() - range).abs() <= eps, "pan changed the range");
            prop_assert!(view.top_depth >= 0.0);
            prop_assert!(view.top_depth <= (f64::from(bounds.max_depth) - f64::from(visible) + 1.0).max(0.0));
        }
    }
}
