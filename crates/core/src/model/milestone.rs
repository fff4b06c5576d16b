use serde::{Deserialize, Serialize};

/// A named, instantaneous page-load event drawn as a vertical marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,
    pub ts: f64,
}

impl Milestone {
    /// Short label used in the milestone track ("FCP", "LCP", ...).
    pub fn short_label(&self) -> &str {
        match self.name.as_str() {
            "navigationStart" => "Nav",
            "firstPaint" => "FP",
            "firstContentfulPaint" => "FCP",
            "largestContentfulPaint::Candidate" => "LCP",
            "domContentLoadedEventEnd" | "MarkDOMContent" => "DCL",
            "loadEventEnd" | "MarkLoad" => "L",
            other => other,
        }
    }
}
