//! Interaction controller: raw pointer, wheel and key input → viewport
//! transitions, hover and selection.
//!
//! Input is in canvas-local logical pixels. The controller owns the view,
//! the display toggles, the selection and the drag latch; the data it
//! reads is borrowed per call as a [`SceneData`].

use tracelens_protocol::Point;

use crate::config::LayoutConfig;
use crate::hit_test::{self, Hit};
use crate::layout::{self, BandLayout};
use crate::render::{Hover, Scene, SceneData};
use crate::selection::{self, ClickOutcome, Selection};
use crate::viewport::{DataBounds, DisplayFlags, ViewState, ViewTransition};

/// Drag latch: `Idle → Dragging { has_moved } → Idle`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        origin: Point,
        last: Point,
        /// Set once the pointer travels past the drag threshold; until then
        /// the press may still turn out to be a click.
        has_moved: bool,
    },
}

/// Display toggles exposed to hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Annotations,
    Interactions,
    Milestones,
    Compact,
    FirstParty,
    ThirdParty,
}

#[derive(Debug, Clone)]
pub struct Controller {
    config: LayoutConfig,
    width: f64,
    height: f64,
    view: ViewState,
    flags: DisplayFlags,
    selection: Option<Selection>,
    hover: Option<Hover>,
    drag: DragState,
    /// The next click ends a drag and must not select.
    suppress_click: bool,
}

impl Controller {
    /// A controller showing the full extent of `data`.
    pub fn new(config: LayoutConfig, width: f64, height: f64, data: &SceneData) -> Self {
        let mut controller = Self {
            config,
            width,
            height,
            view: ViewState::full(&DataBounds::new(0.0, 0.0, 0), 1),
            flags: DisplayFlags::default(),
            selection: None,
            hover: None,
            drag: DragState::Idle,
            suppress_click: false,
        };
        controller.reset(data);
        controller
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn flags(&self) -> &DisplayFlags {
        &self.flags
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn hover(&self) -> Option<Hover> {
        self.hover
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Snapshot for rendering and hit testing.
    pub fn scene<'a>(&'a self, data: SceneData<'a>) -> Scene<'a> {
        Scene {
            width: self.width,
            height: self.height,
            view: self.view,
            data,
            flags: self.flags,
            selection: self.selection,
            hover: self.hover,
            config: &self.config,
        }
    }

    fn bands(&self) -> BandLayout {
        BandLayout::compute(self.width, self.height, &self.flags, &self.config)
    }

    fn row_height(&self, data: &SceneData) -> f64 {
        layout::row_height(data.content.kind(), &self.flags, &self.config)
    }

    /// Apply one transition against the bounds of `data`.
    pub fn dispatch(&mut self, transition: ViewTransition, data: &SceneData) {
        let bounds = data.content.bounds(&self.flags);
        self.view = self.view.apply(transition, &bounds);
    }

    /// Full extent, top row first, row count refitted. Also used when a new
    /// trace replaces the old one, so it drops selection and hover.
    pub fn reset(&mut self, data: &SceneData) {
        self.selection = None;
        self.hover = None;
        self.drag = DragState::Idle;
        self.suppress_click = false;
        let transition = ViewTransition::Reset {
            content_height: self.bands().content.h,
            row_height: self.row_height(data),
        };
        self.dispatch(transition, data);
    }

    pub fn resize(&mut self, width: f64, height: f64, data: &SceneData) {
        self.width = width;
        self.height = height;
        self.refit(data);
    }

    fn refit(&mut self, data: &SceneData) {
        let transition = ViewTransition::Resize {
            content_height: self.bands().content.h,
            row_height: self.row_height(data),
        };
        self.dispatch(transition, data);
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        tracing::trace!(x, y, "pointer down");
        let p = Point::new(x, y);
        self.drag = DragState::Dragging {
            origin: p,
            last: p,
            has_moved: false,
        };
        self.suppress_click = false;
    }

    /// Pan while dragging, otherwise update the hover target. Returns whether
    /// a repaint is needed.
    pub fn pointer_move(&mut self, x: f64, y: f64, data: &SceneData) -> bool {
        let p = Point::new(x, y);
        match self.drag {
            DragState::Dragging {
                origin,
                last,
                has_moved,
            } => {
                let moved = has_moved || p.distance(&origin) > self.config.drag_threshold_px;
                if !moved {
                    return false;
                }
                // The first real move pans by everything since the press.
                let anchor = if has_moved { last } else { origin };
                self.drag = DragState::Dragging {
                    origin,
                    last: p,
                    has_moved: true,
                };
                self.hover = None;
                let transition = ViewTransition::PanByPixels {
                    dx: anchor.x - p.x,
                    dy: anchor.y - p.y,
                    width: self.width,
                    row_height: self.row_height(data),
                };
                self.dispatch(transition, data);
                true
            }
            DragState::Idle => {
                let hover = hit_test::resolve_at(&self.scene(*data), x, y).map(|hit| Hover {
                    position: p,
                    hit,
                });
                let changed = hover.map(|h| h.hit) != self.hover.map(|h| h.hit);
                let repaint = changed || hover.is_some();
                self.hover = hover;
                repaint
            }
        }
    }

    /// End a press. A press that turned into a drag suppresses the click
    /// that follows it.
    pub fn pointer_up(&mut self, x: f64, y: f64) {
        tracing::trace!(x, y, "pointer up");
        if let DragState::Dragging { has_moved, .. } = self.drag {
            self.suppress_click = has_moved;
        }
        self.drag = DragState::Idle;
    }

    pub fn pointer_leave(&mut self) {
        self.hover = None;
        self.drag = DragState::Idle;
    }

    /// Select what is under the pointer; a second click on the selection
    /// zooms to it.
    pub fn click(&mut self, x: f64, y: f64, data: &SceneData) -> ClickOutcome {
        if std::mem::take(&mut self.suppress_click) {
            return ClickOutcome::Ignored;
        }
        let hit = hit_test::resolve_at(&self.scene(*data), x, y);
        let outcome = selection::click(&mut self.selection, hit, data);
        tracing::trace!(x, y, ?hit, ?outcome, "click");
        if let ClickOutcome::ZoomTo { start, end } = outcome {
            let transition = ViewTransition::ZoomToRange {
                start,
                end,
                padding_ratio: self.config.zoom_padding_ratio,
            };
            self.dispatch(transition, data);
        }
        outcome
    }

    /// Wheel zoom around the pointer: negative `delta_y` (towards the user)
    /// zooms in.
    pub fn wheel(&mut self, delta_y: f64, x: f64, data: &SceneData) {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        let factor = if delta_y < 0.0 {
            self.config.wheel_zoom_factor
        } else {
            1.0 / self.config.wheel_zoom_factor
        };
        let transition = ViewTransition::ZoomAround {
            factor,
            x,
            width: self.width,
        };
        self.dispatch(transition, data);
    }

    /// Halve the range, centered on the selection when there is one.
    pub fn zoom_in(&mut self, data: &SceneData) {
        let focus = self.selection.and_then(|s| s.focus_time(data));
        self.dispatch(ViewTransition::ZoomIn { focus }, data);
    }

    pub fn zoom_out(&mut self, data: &SceneData) {
        let focus = self.selection.and_then(|s| s.focus_time(data));
        self.dispatch(ViewTransition::ZoomOut { focus }, data);
    }

    /// Keyboard pan: positive `dx` shows later time, positive `dy` deeper rows.
    pub fn pan(&mut self, dx: f64, dy: f64, data: &SceneData) {
        let transition = ViewTransition::PanByPixels {
            dx,
            dy,
            width: self.width,
            row_height: self.row_height(data),
        };
        self.dispatch(transition, data);
    }

    pub fn scroll_depth(&mut self, step: f64, data: &SceneData) {
        self.dispatch(ViewTransition::ScrollDepth { step }, data);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Drop selection and hover that point into the annotation or interaction
    /// lists. Call after either list is replaced: their indices no longer
    /// name the same entities.
    pub fn forget_overlay_refs(&mut self) {
        if matches!(self.selection, Some(Selection::Annotation(_) | Selection::Interaction(_))) {
            self.selection = None;
        }
        if self
            .hover
            .is_some_and(|h| matches!(h.hit, Hit::Annotation(_) | Hit::Interaction(_)))
        {
            self.hover = None;
        }
    }

    /// Flip a toggle and refit the rows, since band sizes, row heights and
    /// network bounds may change with it.
    pub fn toggle(&mut self, toggle: Toggle, data: &SceneData) {
        let flags = &mut self.flags;
        match toggle {
            Toggle::Annotations => flags.show_annotations = !flags.show_annotations,
            Toggle::Interactions => flags.show_interactions = !flags.show_interactions,
            Toggle::Milestones => flags.show_milestones = !flags.show_milestones,
            Toggle::Compact => flags.is_compact = !flags.is_compact,
            Toggle::FirstParty => flags.show_first_party = !flags.show_first_party,
            Toggle::ThirdParty => flags.show_third_party = !flags.show_third_party,
        }
        if matches!(self.selection, Some(Selection::Request(_)))
            && matches!(toggle, Toggle::FirstParty | Toggle::ThirdParty)
        {
            self.selection = None;
        }
        self.hover = None;
        self.refit(data);
    }

    /// The entity under the pointer, without touching hover state.
    pub fn hit_at(&self, x: f64, y: f64, data: &SceneData) -> Option<Hit> {
        hit_test::resolve_at(&self.scene(*data), x, y)
    }
}
