//! Renderer: a pure function from a [`Scene`] snapshot to render commands.
//!
//! Paint order is fixed: clear, timescale, primary content (clipped to the
//! content band), interaction track, milestone track, annotations, and the
//! hover card on top of everything.

pub mod annotations;
pub mod flame;
pub mod hover;
pub mod interactions;
pub mod label;
pub mod milestones;
pub mod timescale;
pub mod waterfall;

use tracelens_protocol::{Point, RenderCommand, ThemeToken};

use crate::config::LayoutConfig;
use crate::hit_test::Hit;
use crate::layout::{self, BandLayout, ContentKind};
use crate::model::{Annotation, InteractionEvent, Milestone, ProcessedTrace};
use crate::selection::Selection;
use crate::viewport::{DataBounds, DisplayFlags, ViewState};
use crate::waterfall::ProcessedNetwork;

/// What the content band shows.
#[derive(Debug, Clone, Copy)]
pub enum Content<'a> {
    Flame(&'a ProcessedTrace),
    Network(&'a ProcessedNetwork),
}

impl Content<'_> {
    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Flame(_) => ContentKind::Flame,
            Content::Network(_) => ContentKind::Network,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Content::Flame(trace) => trace.is_empty(),
            Content::Network(network) => network.is_empty(),
        }
    }

    /// Viewport clamping bounds for this content.
    pub fn bounds(&self, flags: &DisplayFlags) -> DataBounds {
        match self {
            Content::Flame(trace) => DataBounds::from_trace(trace),
            Content::Network(network) => network.bounds(flags),
        }
    }

    pub fn trace(&self) -> Option<&ProcessedTrace> {
        match self {
            Content::Flame(trace) => Some(*trace),
            Content::Network(_) => None,
        }
    }
}

/// Everything the renderer and hit tester read, borrowed for one pass.
#[derive(Debug, Clone, Copy)]
pub struct SceneData<'a> {
    pub content: Content<'a>,
    pub interactions: &'a [InteractionEvent],
    pub annotations: &'a [Annotation],
    pub milestones: &'a [Milestone],
}

impl<'a> SceneData<'a> {
    pub fn new(content: Content<'a>) -> Self {
        Self {
            content,
            interactions: &[],
            annotations: &[],
            milestones: &[],
        }
    }
}

/// The entity under the pointer and where the pointer is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hover {
    pub position: Point,
    pub hit: Hit,
}

/// A complete snapshot of what to paint. Rendering the same scene twice
/// yields the same commands.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub width: f64,
    pub height: f64,
    pub view: ViewState,
    pub data: SceneData<'a>,
    pub flags: DisplayFlags,
    pub selection: Option<Selection>,
    pub hover: Option<Hover>,
    pub config: &'a LayoutConfig,
}

impl Scene<'_> {
    pub fn layout(&self) -> BandLayout {
        BandLayout::compute(self.width, self.height, &self.flags, self.config)
    }

    pub fn row_height(&self) -> f64 {
        layout::row_height(self.data.content.kind(), &self.flags, self.config)
    }

    pub fn bounds(&self) -> DataBounds {
        self.data.content.bounds(&self.flags)
    }

    pub fn is_selected(&self, candidate: Selection) -> bool {
        self.selection == Some(candidate)
    }

    pub fn is_hovered(&self, candidate: Hit) -> bool {
        self.hover.is_some_and(|h| h.hit == candidate)
    }
}

pub fn render(scene: &Scene) -> Vec<RenderCommand> {
    let bands = scene.layout();
    let mut commands = vec![RenderCommand::Clear {
        paint: ThemeToken::Background.into(),
    }];
    if !(scene.width > 0.0) || !(scene.height > 0.0) || !(scene.view.range() > 0.0) {
        return commands;
    }

    let origin = scene.bounds().start;
    commands.extend(timescale::render_timescale(
        bands.timescale,
        scene.height,
        &scene.view,
        origin,
        scene.config,
    ));
    if scene.data.content.is_empty() {
        return commands;
    }

    commands.push(RenderCommand::SetClip { rect: bands.content });
    match scene.data.content {
        Content::Flame(trace) => commands.extend(flame::render_flame(scene, trace, bands.content)),
        Content::Network(network) => {
            commands.extend(waterfall::render_network(scene, network, bands.content));
        }
    }
    commands.push(RenderCommand::ClearClip);

    if let Some(band) = bands.interactions {
        commands.extend(interactions::render_interactions(scene, band));
    }
    if let Some(band) = bands.milestones {
        commands.extend(milestones::render_milestones(scene, band, bands.content));
    }
    if scene.flags.show_annotations {
        commands.push(RenderCommand::SetClip { rect: bands.content });
        commands.extend(annotations::render_annotations(scene, bands.content));
        commands.push(RenderCommand::ClearClip);
    }
    if let Some(hover) = scene.hover {
        commands.extend(hover::render_hover_card(scene, &hover));
    }
    commands
}

/// Half-open visibility test of `[start, end]` against the view.
pub(crate) fn in_time_view(start: f64, end: f64, view: &ViewState) -> bool {
    end >= view.start_time && start <= view.end_time
}
