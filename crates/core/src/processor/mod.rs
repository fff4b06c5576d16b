//! Trace processor: raw Chrome trace events → [`ProcessedTrace`].
//!
//! The main thread's events are arranged into a containment tree, walked
//! depth-first, and every entry accepted by the inclusion predicate becomes
//! a [`FrameNode`]. Skipped entries are still traversed so their children
//! attach to the nearest materialized ancestor.

mod events;
mod tree;

use std::collections::HashMap;

use tracelens_protocol::Color;

pub use events::{ParseError, RawTraceEvent, parse_trace_events, select_main_thread};
pub use tree::{EntryTree, EntryVisitor, TraceEntry, walk_entries};

use crate::model::{FrameNode, Milestone, ProcessedTrace};
use crate::stacking;

/// Colors handed out to source scripts in first-seen order.
const SCRIPT_PALETTE: [Color; 12] = [
    Color::rgb8(0xf4, 0xa2, 0x61),
    Color::rgb8(0x2a, 0x9d, 0x8f),
    Color::rgb8(0xe9, 0xc4, 0x6a),
    Color::rgb8(0x8a, 0xb1, 0x7d),
    Color::rgb8(0xe7, 0x6f, 0x51),
    Color::rgb8(0x6d, 0x9d, 0xc5),
    Color::rgb8(0xb5, 0x83, 0x8d),
    Color::rgb8(0x9b, 0x8a, 0xc4),
    Color::rgb8(0xc9, 0xad, 0xa7),
    Color::rgb8(0x84, 0xa5, 0x9d),
    Color::rgb8(0xd4, 0xa3, 0x73),
    Color::rgb8(0x7f, 0xb7, 0xbe),
];

/// Frames with no script attribution.
pub const UNATTRIBUTED_COLOR: Color = Color::rgb8(0xad, 0xb5, 0xbd);

const MILESTONE_NAMES: [&str; 8] = [
    "navigationStart",
    "firstPaint",
    "firstContentfulPaint",
    "largestContentfulPaint::Candidate",
    "domContentLoadedEventEnd",
    "loadEventEnd",
    "MarkDOMContent",
    "MarkLoad",
];

/// Which entries become frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FrameFilter {
    /// Script execution only: profile calls, function calls, microtasks,
    /// animation frames, timers and friends.
    #[default]
    CallFrames,
    /// Every duration event on the main thread.
    All,
}

impl FrameFilter {
    fn accepts(self, entry: &TraceEntry) -> bool {
        match self {
            FrameFilter::CallFrames => is_call_frame(&entry.name),
            FrameFilter::All => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessOptions {
    /// Limit the walk to `[start, end]` (ms). Frames straddling an edge are
    /// kept as context with `included = false`.
    pub range: Option<(f64, f64)>,
    pub filter: FrameFilter,
}

/// Trace event names treated as script call frames.
pub fn is_call_frame(name: &str) -> bool {
    matches!(
        name,
        "ProfileCall"
            | "FunctionCall"
            | "RunMicrotasks"
            | "V8.RunMicrotasks"
            | "FireAnimationFrame"
            | "TimerFire"
            | "EvaluateScript"
            | "EventDispatch"
            | "v8.callFunction"
            | "XHRReadyStateChange"
    )
}

/// Process with the default options.
pub fn process_trace(events: &[RawTraceEvent]) -> ProcessedTrace {
    process_trace_with(events, &ProcessOptions::default())
}

pub fn process_trace_with(events: &[RawTraceEvent], options: &ProcessOptions) -> ProcessedTrace {
    let milestones = extract_milestones(events);
    let Some(thread) = select_main_thread(events) else {
        return ProcessedTrace {
            milestones,
            ..ProcessedTrace::default()
        };
    };

    let tree = EntryTree::build(events, thread);
    let mut builder = FrameBuilder::new(options);
    walk_entries(&tree, &mut builder);
    let mut trace = builder.finish();
    trace.milestones = milestones;

    tracing::debug!(
        pid = thread.0,
        tid = thread.1,
        entries = tree.len(),
        frames = trace.frames.len(),
        max_depth = trace.max_depth,
        scripts = trace.source_script_colors.len(),
        "processed trace"
    );
    trace
}

/// Parse and process raw trace JSON, surfacing parse failures.
pub fn load_trace(data: &[u8], options: &ProcessOptions) -> Result<ProcessedTrace, ParseError> {
    let events = parse_trace_events(data)?;
    Ok(process_trace_with(&events, options))
}

/// Like [`load_trace`], but malformed input degrades to an empty trace.
pub fn process_trace_bytes(data: &[u8], options: &ProcessOptions) -> ProcessedTrace {
    load_trace(data, options).unwrap_or_else(|err| {
        tracing::warn!(%err, "malformed trace, showing empty view");
        ProcessedTrace::default()
    })
}

/// Page-load milestones in time order.
pub fn extract_milestones(events: &[RawTraceEvent]) -> Vec<Milestone> {
    let mut milestones: Vec<Milestone> = events
        .iter()
        .filter(|e| e.ph != "E" && MILESTONE_NAMES.contains(&e.name.as_str()))
        .map(|e| Milestone {
            name: e.name.clone(),
            ts: e.ts / 1_000.0,
        })
        .collect();
    milestones.sort_by(|a, b| a.ts.total_cmp(&b.ts));
    milestones
}

/// Accumulates frames during the walk.
struct FrameBuilder<'a> {
    options: &'a ProcessOptions,
    next_id: u64,
    frames: Vec<FrameNode>,
    /// Requested range with `lo <= hi`.
    range: Option<(f64, f64)>,
    /// Indices into `frames` of the materialized ancestors of the current entry.
    ancestors: Vec<usize>,
    /// Per open entry: whether it pushed onto `ancestors`.
    pushed: Vec<bool>,
    colors: HashMap<String, Color>,
}

impl<'a> FrameBuilder<'a> {
    fn new(options: &'a ProcessOptions) -> Self {
        Self {
            options,
            next_id: 1,
            frames: Vec::new(),
            range: options.range.map(|(a, b)| (a.min(b), a.max(b))),
            ancestors: Vec::new(),
            pushed: Vec::new(),
            colors: HashMap::new(),
        }
    }

    /// Whether an entry overlaps the range, and whether it lies inside it.
    fn in_range(&self, entry: &TraceEntry) -> Option<bool> {
        match self.range {
            None => Some(true),
            Some((lo, hi)) => {
                if entry.end < lo || entry.start > hi {
                    None
                } else {
                    Some(entry.start >= lo && entry.end <= hi)
                }
            }
        }
    }

    fn color_for(&mut self, script: Option<&str>) -> Color {
        let Some(script) = script else {
            return UNATTRIBUTED_COLOR;
        };
        let next = SCRIPT_PALETTE[self.colors.len() % SCRIPT_PALETTE.len()];
        *self.colors.entry(script.to_string()).or_insert(next)
    }

    fn finish(mut self) -> ProcessedTrace {
        let rows = stacking::stack_by_depth(&self.frames);
        for (frame, row) in self.frames.iter_mut().zip(rows) {
            frame.row = row;
        }

        let (start_time, end_time) = match self.range {
            Some(range) => range,
            None => self.frames.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), f| {
                (lo.min(f.start), hi.max(f.end))
            }),
        };
        let (start_time, end_time) = if start_time.is_finite() && end_time.is_finite() {
            (start_time, end_time)
        } else {
            (0.0, 0.0)
        };

        let frame_map = self.frames.iter().enumerate().map(|(i, f)| (f.id, i)).collect();
        ProcessedTrace {
            start_time,
            end_time,
            max_depth: self.frames.iter().map(|f| f.row).max().unwrap_or(0),
            frames: self.frames,
            frame_map,
            source_script_colors: self.colors,
            milestones: Vec::new(),
        }
    }
}

impl EntryVisitor for FrameBuilder<'_> {
    fn enter(&mut self, _index: usize, entry: &TraceEntry) {
        let inside = match self.in_range(entry) {
            Some(inside) if self.options.filter.accepts(entry) => inside,
            _ => {
                self.pushed.push(false);
                return;
            }
        };

        let id = self.next_id;
        self.next_id += 1;

        let source_script = entry
            .data_str(&["url"])
            .or_else(|| entry.data_str(&["callFrame", "url"]))
            .or_else(|| entry.data_str(&["scriptName"]))
            .map(str::to_string);
        let name = entry
            .data_str(&["functionName"])
            .or_else(|| entry.data_str(&["callFrame", "functionName"]))
            .unwrap_or(&entry.name);
        let name = if name.is_empty() { "(anonymous)" } else { name }.to_string();
        let color = self.color_for(source_script.as_deref());

        let parent = match self.ancestors.last() {
            Some(&idx) => {
                let p = &mut self.frames[idx];
                p.children.push(id);
                Some(p.id)
            }
            None => None,
        };

        self.frames.push(FrameNode {
            id,
            name,
            start: entry.start,
            end: entry.end,
            depth: self.ancestors.len() as u32,
            row: 0,
            color,
            parent,
            children: Vec::new(),
            source_script,
            category: (!entry.cat.is_empty()).then(|| entry.cat.clone()),
            included: inside,
        });
        self.ancestors.push(self.frames.len() - 1);
        self.pushed.push(true);
    }

    fn exit(&mut self, _index: usize, _entry: &TraceEntry) {
        if self.pushed.pop() == Some(true) {
            self.ancestors.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, ts_ms: f64, dur_ms: f64, url: &str) -> RawTraceEvent {
        RawTraceEvent::complete(name, ts_ms * 1_000.0, dur_ms * 1_000.0)
            .with_args(json!({"data": {"functionName": format!("fn_{ts_ms}"), "url": url}}))
    }

    fn sample() -> Vec<RawTraceEvent> {
        vec![
            RawTraceEvent::complete("RunTask", 0.0, 200_000.0),
            call("FunctionCall", 10.0, 100.0, "https://a.test/app.js"),
            RawTraceEvent::complete("Layout", 20.0 * 1_000.0, 50_000.0),
            call("ProfileCall", 30.0, 10.0, "https://cdn.test/lib.js"),
            call("ProfileCall", 150.0, 20.0, "https://a.test/app.js"),
        ]
    }

    #[test]
    fn skipped_entries_pass_children_through() {
        let trace = process_trace(&sample());
        assert_eq!(trace.frames.len(), 3);
        let root = &trace.frames[0];
        assert_eq!(root.name, "fn_10");
        assert_eq!(root.depth, 0);
        // ProfileCall under Layout (skipped) attaches to the FunctionCall.
        let nested = &trace.frames[1];
        assert_eq!(nested.depth, 1);
        assert_eq!(nested.parent, Some(root.id));
        assert_eq!(root.children, vec![nested.id]);
        assert_eq!(trace.frames[2].depth, 0);
        assert_eq!(trace.max_depth, 1);
        assert_eq!((trace.start_time, trace.end_time), (10.0, 170.0));
    }

    #[test]
    fn ids_are_monotonic_and_mapped() {
        let trace = process_trace(&sample());
        let ids: Vec<u64> = trace.frames.iter().map(|f| f.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        for (i, f) in trace.frames.iter().enumerate() {
            assert_eq!(trace.frame_map.get(&f.id), Some(&i));
        }
    }

    #[test]
    fn colors_are_per_script_first_seen() {
        let trace = process_trace(&sample());
        assert_eq!(trace.source_script_colors.len(), 2);
        assert_eq!(trace.frames[0].color, SCRIPT_PALETTE[0]);
        assert_eq!(trace.frames[1].color, SCRIPT_PALETTE[1]);
        assert_eq!(trace.frames[2].color, trace.frames[0].color);
    }

    #[test]
    fn all_filter_materializes_everything() {
        let options = ProcessOptions {
            filter: FrameFilter::All,
            ..ProcessOptions::default()
        };
        let trace = process_trace_with(&sample(), &options);
        assert_eq!(trace.frames.len(), 5);
        assert_eq!(trace.max_depth, 3);
        assert_eq!(trace.frames[0].color, UNATTRIBUTED_COLOR);
    }

    #[test]
    fn range_walk_marks_context_frames() {
        let options = ProcessOptions {
            range: Some((25.0, 60.0)),
            ..ProcessOptions::default()
        };
        let trace = process_trace_with(&sample(), &options);
        assert_eq!(trace.frames.len(), 2);
        assert!(!trace.frames[0].included);
        assert!(trace.frames[1].included);
        assert_eq!((trace.start_time, trace.end_time), (25.0, 60.0));
    }

    #[test]
    fn reversed_range_is_normalized() {
        let options = ProcessOptions {
            range: Some((60.0, 25.0)),
            ..ProcessOptions::default()
        };
        let trace = process_trace_with(&sample(), &options);
        assert_eq!(trace.frames.len(), 2);
        assert!(trace.frames[1].included);
        assert_eq!((trace.start_time, trace.end_time), (25.0, 60.0));
    }

    #[test]
    fn wide_parent_links_every_child() {
        const CHILDREN: usize = 50_000;
        let mut events = Vec::with_capacity(CHILDREN + 1);
        events.push(RawTraceEvent::complete("FunctionCall", 0.0, (CHILDREN as f64 + 1.0) * 10.0));
        events.extend((0..CHILDREN).map(|i| RawTraceEvent::complete("FunctionCall", i as f64 * 10.0 + 1.0, 5.0)));

        let started = std::time::Instant::now();
        let trace = process_trace(&events);
        let elapsed = started.elapsed();

        assert_eq!(trace.frames.len(), CHILDREN + 1);
        let root = &trace.frames[0];
        assert_eq!(root.children.len(), CHILDREN);
        assert!(trace.frames[1..].iter().all(|f| f.parent == Some(root.id) && f.depth == 1));
        assert_eq!(trace.max_depth, 1);
        assert!(elapsed < std::time::Duration::from_secs(5), "ingest took {elapsed:?}");
    }

    #[test]
    fn empty_and_malformed_input_degrade() {
        let empty = process_trace(&[]);
        assert!(empty.is_empty());
        assert_eq!(empty.max_depth, 0);

        let bad = process_trace_bytes(b"{not json", &ProcessOptions::default());
        assert!(bad.is_empty());
        assert_eq!(bad.max_depth, 0);
        assert!(load_trace(b"{not json", &ProcessOptions::default()).is_err());
    }

    #[test]
    fn overlapping_siblings_split_into_rows() {
        let events = vec![
            call("FunctionCall", 0.0, 10.0, ""),
            call("FunctionCall", 5.0, 10.0, ""),
        ];
        let trace = process_trace(&events);
        assert_eq!(trace.frames[0].depth, 0);
        assert_eq!(trace.frames[1].depth, 0);
        assert_eq!(trace.frames[0].row, 0);
        assert_eq!(trace.frames[1].row, 1);
        assert_eq!(trace.max_depth, 1);
    }

    #[test]
    fn milestones_sorted_in_ms() {
        let json = br#"[
            {"name":"firstContentfulPaint","ph":"I","ts":5000,"pid":1,"tid":1},
            {"name":"navigationStart","ph":"R","ts":1000,"pid":1,"tid":1},
            {"name":"FunctionCall","ph":"X","ts":0,"dur":10,"pid":1,"tid":1}
        ]"#;
        let trace = process_trace_bytes(json, &ProcessOptions::default());
        let names: Vec<&str> = trace.milestones.iter().map(|m| m.short_label()).collect();
        assert_eq!(names, ["Nav", "FCP"]);
        assert_eq!(trace.milestones[0].ts, 1.0);
    }
}
