//! Selection state and the two-step click affordance.
//!
//! Frames, requests, interactions and annotations share one [`Selection`]
//! slot, so selecting any of them clears the others. Clicking the entity
//! that is already selected dives into it: the view zooms to its extent.

use serde::{Deserialize, Serialize};

use crate::hit_test::Hit;
use crate::model::Annotation;
use crate::render::{Content, SceneData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selection {
    Frame(u64),
    Request(usize),
    Interaction(usize),
    Annotation(usize),
}

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    /// A new entity became the selection.
    Selected(Selection),
    /// The selected entity was clicked again; zoom to `[start, end]`.
    ZoomTo { start: f64, end: f64 },
    /// The click hit nothing selectable and the selection was dropped.
    Cleared,
    /// Nothing changed.
    Ignored,
}

impl Selection {
    /// Selection for a hit. Milestones are hover-only.
    pub fn from_hit(hit: Hit) -> Option<Self> {
        match hit {
            Hit::Frame(id) => Some(Selection::Frame(id)),
            Hit::Request(idx) => Some(Selection::Request(idx)),
            Hit::Interaction(idx) => Some(Selection::Interaction(idx)),
            Hit::Annotation(idx) => Some(Selection::Annotation(idx)),
            Hit::Milestone(_) => None,
        }
    }

    /// Time extent of the selected entity, if it still exists.
    pub fn extent(&self, data: &SceneData) -> Option<(f64, f64)> {
        match *self {
            Selection::Frame(id) => data.content.trace()?.frame(id).map(|f| (f.start, f.end)),
            Selection::Request(idx) => match data.content {
                Content::Network(network) => network.requests.get(idx).map(|r| (r.ts, r.end())),
                Content::Flame(_) => None,
            },
            Selection::Interaction(idx) => data.interactions.get(idx).map(|e| (e.ts, e.end())),
            Selection::Annotation(idx) => match data.annotations.get(idx)? {
                Annotation::Highlight {
                    start_time,
                    end_time,
                    ..
                } => Some((*start_time, *end_time)),
                Annotation::Label { frame_id, .. } => {
                    data.content.trace()?.frame(*frame_id).map(|f| (f.start, f.end))
                }
                Annotation::Link {
                    from_frame_id,
                    to_frame_id,
                } => {
                    let trace = data.content.trace()?;
                    let from = trace.frame(*from_frame_id)?;
                    let to = trace.frame(*to_frame_id)?;
                    Some((from.start.min(to.start), from.end.max(to.end)))
                }
            },
        }
    }

    /// Midpoint of the extent, used as the zoom focus.
    pub fn focus_time(&self, data: &SceneData) -> Option<f64> {
        self.extent(data).map(|(start, end)| (start + end) / 2.0)
    }
}

/// Apply a click that resolved to `hit` to the `current` selection.
pub fn click(current: &mut Option<Selection>, hit: Option<Hit>, data: &SceneData) -> ClickOutcome {
    let Some(target) = hit.and_then(Selection::from_hit) else {
        // Milestones and empty space: only empty space clears.
        if hit.is_none() && current.take().is_some() {
            return ClickOutcome::Cleared;
        }
        return ClickOutcome::Ignored;
    };

    if *current == Some(target) {
        return match target.extent(data) {
            Some((start, end)) => ClickOutcome::ZoomTo { start, end },
            None => ClickOutcome::Ignored,
        };
    }
    *current = Some(target);
    ClickOutcome::Selected(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_support::sample_trace;

    #[test]
    fn first_click_selects_second_zooms() {
        let trace = sample_trace();
        let data = SceneData::new(Content::Flame(&trace));
        let mut selection = None;

        let first = click(&mut selection, Some(Hit::Frame(2)), &data);
        assert_eq!(first, ClickOutcome::Selected(Selection::Frame(2)));
        let second = click(&mut selection, Some(Hit::Frame(2)), &data);
        assert_eq!(
            second,
            ClickOutcome::ZoomTo {
                start: 100.0,
                end: 300.0
            }
        );
        assert_eq!(selection, Some(Selection::Frame(2)));
    }

    #[test]
    fn categories_are_mutually_exclusive() {
        let trace = sample_trace();
        let annotations = [Annotation::Highlight {
            start_time: 10.0,
            end_time: 20.0,
            label: "x".into(),
        }];
        let mut data = SceneData::new(Content::Flame(&trace));
        data.annotations = &annotations;
        let mut selection = Some(Selection::Frame(2));

        let outcome = click(&mut selection, Some(Hit::Annotation(0)), &data);
        assert_eq!(outcome, ClickOutcome::Selected(Selection::Annotation(0)));
        assert_eq!(selection, Some(Selection::Annotation(0)));
        assert_eq!(
            click(&mut selection, Some(Hit::Annotation(0)), &data),
            ClickOutcome::ZoomTo {
                start: 10.0,
                end: 20.0
            }
        );
    }

    #[test]
    fn empty_space_clears_and_milestones_are_ignored() {
        let trace = sample_trace();
        let data = SceneData::new(Content::Flame(&trace));
        let mut selection = Some(Selection::Frame(1));
        assert_eq!(click(&mut selection, Some(Hit::Milestone(0)), &data), ClickOutcome::Ignored);
        assert_eq!(selection, Some(Selection::Frame(1)));
        assert_eq!(click(&mut selection, None, &data), ClickOutcome::Cleared);
        assert_eq!(selection, None);
        assert_eq!(click(&mut selection, None, &data), ClickOutcome::Ignored);
    }

    #[test]
    fn stale_selection_has_no_extent() {
        let trace = sample_trace();
        let data = SceneData::new(Content::Flame(&trace));
        assert_eq!(Selection::Frame(99).extent(&data), None);
        assert_eq!(Selection::Request(0).extent(&data), None);
        assert_eq!(Selection::Frame(2).focus_time(&data), Some(200.0));
    }
}
