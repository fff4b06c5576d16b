//! Mapping between domain space (time in ms, row depth) and canvas pixels.
//!
//! Every function is a pure function of its inputs; there is no cached
//! scale anywhere else in the crate.

use crate::viewport::ViewState;

/// Time → x pixel within a canvas `width` pixels wide.
pub fn time_to_x(time: f64, view: &ViewState, width: f64) -> f64 {
    (time - view.start_time) / view.range() * width
}

/// Exact inverse of [`time_to_x`].
pub fn x_to_time(x: f64, view: &ViewState, width: f64) -> f64 {
    view.start_time + x / width * view.range()
}

/// Duration → pixel width at the current zoom.
pub fn duration_to_px(duration: f64, view: &ViewState, width: f64) -> f64 {
    duration / view.range() * width
}

/// Row depth → y of the row's top edge. `y_offset` is the top of the
/// content band.
pub fn depth_to_y(depth: f64, view: &ViewState, row_height: f64, y_offset: f64) -> f64 {
    (depth - view.top_depth) * row_height + y_offset
}

/// Inverse of [`depth_to_y`], floored to the row containing `y`.
pub fn y_to_depth(y: f64, view: &ViewState, row_height: f64, y_offset: f64) -> i64 {
    ((y - y_offset) / row_height + view.top_depth).floor() as i64
}

/// Ensure a data extent is usable as a view range: finite and strictly
/// increasing by at least `min_range`.
pub fn sanitize_range(start: f64, end: f64, min_range: f64) -> (f64, f64) {
    let start = if start.is_finite() { start } else { 0.0 };
    let end = if end.is_finite() { end } else { start };
    if end - start < min_range {
        (start, start + min_range)
    } else {
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(start: f64, end: f64, top: f64) -> ViewState {
        ViewState {
            start_time: start,
            end_time: end,
            top_depth: top,
            visible_depth_count: 10,
        }
    }

    #[test]
    fn time_mapping() {
        let v = view(100.0, 300.0, 0.0);
        assert_eq!(time_to_x(100.0, &v, 800.0), 0.0);
        assert_eq!(time_to_x(300.0, &v, 800.0), 800.0);
        assert_eq!(time_to_x(200.0, &v, 800.0), 400.0);
        assert_eq!(x_to_time(400.0, &v, 800.0), 200.0);
        assert_eq!(duration_to_px(50.0, &v, 800.0), 200.0);
    }

    #[test]
    fn depth_mapping_floors() {
        let v = view(0.0, 1.0, 2.0);
        assert_eq!(depth_to_y(2.0, &v, 24.0, 30.0), 30.0);
        assert_eq!(depth_to_y(4.0, &v, 24.0, 30.0), 78.0);
        assert_eq!(y_to_depth(30.0, &v, 24.0, 30.0), 2);
        assert_eq!(y_to_depth(53.9, &v, 24.0, 30.0), 2);
        assert_eq!(y_to_depth(54.0, &v, 24.0, 30.0), 3);
        assert_eq!(y_to_depth(10.0, &v, 24.0, 30.0), 1);
    }

    #[test]
    fn sanitize_degenerate_ranges() {
        assert_eq!(sanitize_range(5.0, 5.0, 0.5), (5.0, 5.5));
        assert_eq!(sanitize_range(f64::INFINITY, f64::NEG_INFINITY, 1.0), (0.0, 1.0));
        assert_eq!(sanitize_range(0.0, 10.0, 1.0), (0.0, 10.0));
    }
}
