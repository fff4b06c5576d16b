use super::events::RawTraceEvent;

const US_PER_MS: f64 = 1_000.0;

/// One duration event of the selected thread, in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub name: String,
    pub cat: String,
    pub start: f64,
    pub end: f64,
    pub args: Option<serde_json::Value>,
    /// Indices into [`EntryTree::entries`], in start order.
    pub children: Vec<usize>,
}

impl TraceEntry {
    /// `args.data.<key>` as a non-empty string.
    pub fn data_str(&self, path: &[&str]) -> Option<&str> {
        let mut value = self.args.as_ref()?.get("data")?;
        for key in path {
            value = value.get(key)?;
        }
        value.as_str().filter(|s| !s.is_empty())
    }
}

/// Containment tree over one thread's duration events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryTree {
    pub entries: Vec<TraceEntry>,
    pub roots: Vec<usize>,
}

/// Callback pair driven by [`walk_entries`].
pub trait EntryVisitor {
    fn enter(&mut self, index: usize, entry: &TraceEntry);
    fn exit(&mut self, index: usize, entry: &TraceEntry);
}

impl EntryTree {
    /// Build the tree for `thread` from `X` events and matched `B`/`E` pairs.
    ///
    /// An entry nests under the innermost open entry that fully contains
    /// it; an entry that straddles its predecessor's end becomes a sibling.
    pub fn build(events: &[RawTraceEvent], thread: (u64, u64)) -> Self {
        let mut spans: Vec<TraceEntry> = Vec::new();
        let mut open: Vec<usize> = Vec::new();

        for event in events.iter().filter(|e| e.thread_key() == thread) {
            let ts = event.ts / US_PER_MS;
            match event.ph.as_str() {
                "X" => spans.push(entry_for(event, ts, ts + event.dur.unwrap_or(0.0) / US_PER_MS)),
                "B" => {
                    open.push(spans.len());
                    spans.push(entry_for(event, ts, ts));
                }
                "E" => {
                    if let Some(idx) = open.pop() {
                        spans[idx].end = ts.max(spans[idx].start);
                    }
                }
                _ => {}
            }
        }

        // Outer entries first: by start, then longest first.
        spans.sort_by(|a, b| a.start.total_cmp(&b.start).then_with(|| b.end.total_cmp(&a.end)));

        let mut tree = EntryTree {
            entries: spans,
            roots: Vec::new(),
        };
        let mut stack: Vec<usize> = Vec::new();
        for idx in 0..tree.entries.len() {
            let end = tree.entries[idx].end;
            // Sorted by start, so containment only depends on the end.
            while let Some(&top) = stack.last() {
                if tree.entries[top].end < end {
                    stack.pop();
                } else {
                    break;
                }
            }
            match stack.last() {
                Some(&parent) => tree.entries[parent].children.push(idx),
                None => tree.roots.push(idx),
            }
            stack.push(idx);
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn entry_for(event: &RawTraceEvent, start: f64, end: f64) -> TraceEntry {
    TraceEntry {
        name: event.name.clone(),
        cat: event.cat.clone(),
        start,
        end: end.max(start),
        args: event.args.clone(),
        children: Vec::new(),
    }
}

/// Depth-first walk calling `enter` before and `exit` after each subtree.
///
/// Iterative, so pathological nesting depth cannot overflow the stack.
pub fn walk_entries<V: EntryVisitor>(tree: &EntryTree, visitor: &mut V) {
    let mut stack: Vec<(usize, bool)> = tree.roots.iter().rev().map(|&r| (r, false)).collect();
    while let Some((idx, exiting)) = stack.pop() {
        let Some(entry) = tree.entries.get(idx) else {
            continue;
        };
        if exiting {
            visitor.exit(idx, entry);
            continue;
        }
        visitor.enter(idx, entry);
        stack.push((idx, true));
        stack.extend(entry.children.iter().rev().map(|&c| (c, false)));
    }
}
