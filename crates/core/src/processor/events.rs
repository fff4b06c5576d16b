use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Raw Chrome trace event as found in DevTools JSON exports.
///
/// `ts` and `dur` are microseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTraceEvent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cat: String,
    #[serde(default)]
    pub ph: String,
    #[serde(default)]
    pub ts: f64,
    #[serde(default)]
    pub dur: Option<f64>,
    #[serde(default)]
    pub pid: u64,
    #[serde(default)]
    pub tid: u64,
    #[serde(default)]
    pub args: Option<serde_json::Value>,
}

impl RawTraceEvent {
    /// Complete (`X`) event with a known duration.
    pub fn complete(name: &str, ts: f64, dur: f64) -> Self {
        Self {
            name: name.to_string(),
            cat: String::new(),
            ph: "X".to_string(),
            ts,
            dur: Some(dur),
            pid: 1,
            tid: 1,
            args: None,
        }
    }

    pub fn with_args(mut self, args: serde_json::Value) -> Self {
        self.args = Some(args);
        self
    }

    pub fn thread_key(&self) -> (u64, u64) {
        (self.pid, self.tid)
    }

    fn is_duration_event(&self) -> bool {
        matches!(self.ph.as_str(), "X" | "B")
    }
}

/// Top-level Chrome trace JSON, in either the array or the object format.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TraceFile {
    Object {
        #[serde(rename = "traceEvents")]
        trace_events: Vec<RawTraceEvent>,
    },
    Array(Vec<RawTraceEvent>),
}

/// Parse a Chrome DevTools trace (object or array form) into its events.
pub fn parse_trace_events(data: &[u8]) -> Result<Vec<RawTraceEvent>, ParseError> {
    let file: TraceFile = serde_json::from_slice(data)?;
    Ok(match file {
        TraceFile::Object { trace_events } => trace_events,
        TraceFile::Array(events) => events,
    })
}

/// The renderer main thread: the thread named `CrRendererMain` when thread
/// metadata is present, otherwise the thread with the most duration events.
pub fn select_main_thread(events: &[RawTraceEvent]) -> Option<(u64, u64)> {
    let named = events.iter().find(|e| {
        e.ph == "M"
            && e.name == "thread_name"
            && e.args
                .as_ref()
                .and_then(|a| a.get("name"))
                .and_then(|n| n.as_str())
                == Some("CrRendererMain")
    });
    if let Some(event) = named {
        return Some(event.thread_key());
    }

    let mut counts: HashMap<(u64, u64), usize> = HashMap::new();
    for event in events.iter().filter(|e| e.is_duration_event()) {
        *counts.entry(event.thread_key()).or_default() += 1;
    }
    // Ties resolve to the lowest (pid, tid).
    counts
        .into_iter()
        .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
        .map(|(key, _)| key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_object_and_array_forms() {
        let obj = br#"{"traceEvents":[{"name":"a","ph":"X","ts":0,"dur":10,"pid":1,"tid":1}]}"#;
        let arr = br#"[{"name":"a","ph":"X","ts":0,"dur":10,"pid":1,"tid":1}]"#;
        assert_eq!(parse_trace_events(obj).map(|e| e.len()).ok(), Some(1));
        assert_eq!(parse_trace_events(arr).map(|e| e.len()).ok(), Some(1));
        assert!(parse_trace_events(b"{\"nope\":1}").is_err());
    }

    #[test]
    fn main_thread_prefers_metadata() {
        let json = br#"[
            {"name":"thread_name","ph":"M","pid":1,"tid":7,"args":{"name":"CrRendererMain"}},
            {"name":"a","ph":"X","ts":0,"dur":1,"pid":1,"tid":2},
            {"name":"b","ph":"X","ts":0,"dur":1,"pid":1,"tid":2}
        ]"#;
        let events = parse_trace_events(json).expect("valid trace json");
        assert_eq!(select_main_thread(&events), Some((1, 7)));
    }

    #[test]
    fn main_thread_falls_back_to_busiest() {
        let json = br#"[
            {"name":"a","ph":"X","ts":0,"dur":1,"pid":1,"tid":2},
            {"name":"b","ph":"X","ts":0,"dur":1,"pid":1,"tid":3},
            {"name":"c","ph":"B","ts":0,"pid":1,"tid":3}
        ]"#;
        let events = parse_trace_events(json).expect("valid trace json");
        assert_eq!(select_main_thread(&events), Some((1, 3)));
        assert_eq!(select_main_thread(&[]), None);
    }
}
