use crate::config::LayoutConfig;

/// Horizontal padding inside a labelled rectangle, per side.
pub const LABEL_PADDING: f64 = 3.0;

/// Text to draw inside a box `width_px` wide, or `None` when the box is too
/// narrow for legible text.
///
/// Boxes wider than `label_full_min_px` get the full label, cut with an
/// ellipsis only if it overflows; boxes between the two thresholds always
/// get an ellipsis-truncated label unless the name is a single character.
/// Nothing is ever clipped mid-glyph.
pub fn fit_label(text: &str, width_px: f64, config: &LayoutConfig) -> Option<String> {
    if !(width_px > config.label_ellipsis_min_px) || text.is_empty() {
        return None;
    }
    let room = ((width_px - 2.0 * LABEL_PADDING) / config.char_width_px).floor();
    if room < 2.0 {
        return None;
    }
    let room = room as usize;
    let len = text.chars().count();

    if width_px > config.label_full_min_px && len <= room {
        return Some(text.to_string());
    }
    let keep = (room - 1).min(len.saturating_sub(1)).max(1);
    if keep >= len {
        return Some(text.to_string());
    }
    let truncated: String = text.chars().take(keep).collect();
    Some(format!("{truncated}…"))
}

/// Approximate pixel width of `text`.
pub fn text_width(text: &str, config: &LayoutConfig) -> f64 {
    text.chars().count() as f64 * config.char_width_px
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds() {
        let cfg = LayoutConfig::default();
        assert_eq!(fit_label("main", 60.0, &cfg).as_deref(), Some("main"));
        assert_eq!(fit_label("main", 30.0, &cfg), None);
        assert_eq!(fit_label("main", 12.0, &cfg), None);

        let mid = fit_label("main", 40.0, &cfg).expect("mid box gets a label");
        assert!(mid.ends_with('…'));
        assert!(mid.chars().count() <= 5);
    }

    #[test]
    fn single_char_names_are_never_lengthened() {
        let cfg = LayoutConfig::default();
        assert_eq!(fit_label("a", 40.0, &cfg).as_deref(), Some("a"));
        assert_eq!(fit_label("a", 200.0, &cfg).as_deref(), Some("a"));
    }

    #[test]
    fn wide_boxes_truncate_only_on_overflow() {
        let cfg = LayoutConfig::default();
        let long = "a_really_long_function_name_that_overflows";
        let fitted = fit_label(long, 80.0, &cfg).expect("wide box gets a label");
        assert!(fitted.ends_with('…'));
        assert!(text_width(&fitted, &cfg) <= 80.0 - 2.0 * LABEL_PADDING);
        assert_eq!(fit_label("", 200.0, &cfg), None);
    }
}
