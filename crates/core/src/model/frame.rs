use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracelens_protocol::Color;

use super::Milestone;

/// One call/activity interval of the processed call tree.
///
/// Times are milliseconds on the trace clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameNode {
    /// Stable identity assigned in walk order.
    pub id: u64,
    pub name: String,
    pub start: f64,
    pub end: f64,
    /// Number of materialized ancestors.
    pub depth: u32,
    /// Visual row. Equals `depth` unless overlapping frames share a depth and
    /// had to be split into sub-rows.
    pub row: u32,
    pub color: Color,
    pub parent: Option<u64>,
    pub children: Vec<u64>,
    pub source_script: Option<String>,
    pub category: Option<String>,
    /// `false` for context frames that straddle a range-limited walk.
    pub included: bool,
}

impl FrameNode {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> f64 {
        self.start + self.duration() / 2.0
    }
}

/// The derived, immutable result of walking one trace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessedTrace {
    pub start_time: f64,
    pub end_time: f64,
    /// Deepest visual row in use (`0` for an empty trace).
    pub max_depth: u32,
    pub frames: Vec<FrameNode>,
    /// Frame id → index into `frames`.
    pub frame_map: HashMap<u64, usize>,
    /// Script URL → color, first-seen order, scoped to this trace.
    pub source_script_colors: HashMap<String, Color>,
    /// Page-load milestones found alongside the call tree, in time order.
    pub milestones: Vec<Milestone>,
}

impl ProcessedTrace {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn frame(&self, id: u64) -> Option<&FrameNode> {
        self.frame_map.get(&id).and_then(|&idx| self.frames.get(idx))
    }

    /// Direct children of the given frame.
    pub fn children(&self, id: u64) -> impl Iterator<Item = &FrameNode> {
        self.frame(id)
            .into_iter()
            .flat_map(|f| f.children.iter())
            .filter_map(|child| self.frame(*child))
    }

    pub fn roots(&self) -> impl Iterator<Item = &FrameNode> {
        self.frames.iter().filter(|f| f.parent.is_none())
    }
}
