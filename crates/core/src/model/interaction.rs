use serde::{Deserialize, Serialize};

/// An input-responsiveness event (click, key press, tap).
///
/// `ts` is when the input happened; processing runs from
/// `processing_start` to `processing_end`, and the next frame is presented
/// at `ts + dur`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub name: String,
    pub ts: f64,
    pub dur: f64,
    pub input_delay: f64,
    pub processing_start: f64,
    pub processing_end: f64,
    pub presentation_delay: f64,
}

impl InteractionEvent {
    pub fn end(&self) -> f64 {
        self.ts + self.dur.max(0.0)
    }

    pub fn midpoint(&self) -> f64 {
        (self.ts + self.end()) / 2.0
    }
}
