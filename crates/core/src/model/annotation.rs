use serde::{Deserialize, Serialize};

/// An overlay attached by the analysis step. Read-only for the core; the
/// position in the input slice is its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Annotation {
    /// A labelled time range spanning every row.
    Highlight {
        start_time: f64,
        end_time: f64,
        label: String,
    },
    /// An arrow from the end of one frame to the start of another.
    Link { from_frame_id: u64, to_frame_id: u64 },
    /// A text callout above a frame.
    Label { frame_id: u64, label: String },
}

impl Annotation {
    pub fn text(&self) -> Option<&str> {
        match self {
            Annotation::Highlight { label, .. } | Annotation::Label { label, .. } => Some(label),
            Annotation::Link { .. } => None,
        }
    }
}
