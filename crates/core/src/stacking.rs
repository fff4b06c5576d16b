//! Greedy lane assignment for time-ranged entities.
//!
//! Entities are visited in start order; each goes to the lowest lane whose
//! most recent occupant has already ended. Fully overlapping input simply
//! yields one lane per entity.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::model::{FrameNode, InteractionEvent, NetworkRequest};

/// Anything occupying a closed time interval.
pub trait TimeSpan {
    fn span_start(&self) -> f64;
    fn span_end(&self) -> f64;
}

impl TimeSpan for NetworkRequest {
    fn span_start(&self) -> f64 {
        self.ts
    }
    fn span_end(&self) -> f64 {
        self.end()
    }
}

impl TimeSpan for FrameNode {
    fn span_start(&self) -> f64 {
        self.start
    }
    fn span_end(&self) -> f64 {
        self.end
    }
}

impl TimeSpan for InteractionEvent {
    fn span_start(&self) -> f64 {
        self.ts
    }
    fn span_end(&self) -> f64 {
        self.end()
    }
}

impl<T: TimeSpan + ?Sized> TimeSpan for &T {
    fn span_start(&self) -> f64 {
        (**self).span_start()
    }
    fn span_end(&self) -> f64 {
        (**self).span_end()
    }
}

/// Lane per input entity, index-aligned with the input slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneAssignment {
    pub lanes: Vec<u32>,
    /// Highest lane handed out (`0` when the input is empty).
    pub max_lane: u32,
}

impl LaneAssignment {
    pub fn lane_count(&self) -> u32 {
        if self.lanes.is_empty() {
            0
        } else {
            self.max_lane + 1
        }
    }
}

/// Assign every entity the smallest lane in which it does not overlap the
/// lane's previous occupant. Ties on start keep input order.
///
/// Negative-duration entities are treated as instantaneous.
pub fn assign_lanes<T: TimeSpan>(items: &[T]) -> LaneAssignment {
    let mut order: Vec<usize> = (0..items.len()).collect();
    // Stable sort: equal starts stay in input order.
    order.sort_by(|&a, &b| items[a].span_start().total_cmp(&items[b].span_start()));

    // Occupied lanes keyed by their occupant's end; lanes whose occupant has
    // ended wait in `free`. Starts only grow, so a freed lane stays free.
    let mut busy: BinaryHeap<Reverse<(LaneEnd, u32)>> = BinaryHeap::new();
    let mut free: BinaryHeap<Reverse<u32>> = BinaryHeap::new();
    let mut lane_count = 0u32;
    let mut lanes = vec![0u32; items.len()];

    for idx in order {
        let start = items[idx].span_start();
        let end = items[idx].span_end().max(start);

        while let Some(Reverse((LaneEnd(lane_end), lane))) = busy.peek().copied()
            && lane_end <= start
        {
            busy.pop();
            free.push(Reverse(lane));
        }
        let lane = match free.pop() {
            Some(Reverse(lane)) => lane,
            None => {
                lane_count += 1;
                lane_count - 1
            }
        };
        busy.push(Reverse((LaneEnd(end), lane)));
        lanes[idx] = lane;
    }

    LaneAssignment {
        max_lane: lane_count.saturating_sub(1),
        lanes,
    }
}

/// `f64` ordered by `total_cmp`, for the lane heap.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LaneEnd(f64);

impl Eq for LaneEnd {}

impl PartialOrd for LaneEnd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LaneEnd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Visual rows for call-tree frames.
///
/// Frames are grouped by `depth`; any frames that overlap within one depth
/// are split into sub-rows, and deeper depths shift down accordingly. For a
/// well-nested tree the result is exactly each frame's depth.
pub fn stack_by_depth(frames: &[FrameNode]) -> Vec<u32> {
    let Some(max_depth) = frames.iter().map(|f| f.depth).max() else {
        return Vec::new();
    };

    let mut by_depth: Vec<Vec<usize>> = vec![Vec::new(); max_depth as usize + 1];
    for (idx, frame) in frames.iter().enumerate() {
        by_depth[frame.depth as usize].push(idx);
    }

    let mut rows = vec![0u32; frames.len()];
    let mut row_base = 0u32;
    for members in &by_depth {
        let spans: Vec<&FrameNode> = members.iter().map(|&i| &frames[i]).collect();
        let assignment = assign_lanes(&spans);
        for (&idx, &lane) in members.iter().zip(&assignment.lanes) {
            rows[idx] = row_base + lane;
        }
        // An empty depth still occupies one row so depths stay aligned.
        row_base += assignment.lane_count().max(1);
    }
    rows
}

/// Whether two closed intervals share more than an endpoint.
pub fn overlaps(a: &impl TimeSpan, b: &impl TimeSpan) -> bool {
    let a_end = a.span_end().max(a.span_start());
    let b_end = b.span_end().max(b.span_start());
    a.span_start() < b_end && b.span_start() < a_end
}
