pub mod annotation;
pub mod frame;
pub mod interaction;
pub mod milestone;
pub mod network;

pub use annotation::Annotation;
pub use frame::{FrameNode, ProcessedTrace};
pub use interaction::InteractionEvent;
pub use milestone::Milestone;
pub use network::{NetworkRequest, NetworkSegments, RawNetworkRequest, ResourceKind};

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("{what}: invalid JSON: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

fn parse_array<T: DeserializeOwned>(what: &'static str, data: &[u8]) -> Result<Vec<T>, InputError> {
    serde_json::from_slice(data).map_err(|source| InputError::Json { what, source })
}

/// Parse a JSON array of raw network request records.
pub fn parse_network_requests(data: &[u8]) -> Result<Vec<RawNetworkRequest>, InputError> {
    parse_array("network requests", data)
}

/// Parse a JSON array of annotations.
pub fn parse_annotations(data: &[u8]) -> Result<Vec<Annotation>, InputError> {
    parse_array("annotations", data)
}

/// Parse a JSON array of interaction events.
pub fn parse_interactions(data: &[u8]) -> Result<Vec<InteractionEvent>, InputError> {
    parse_array("interactions", data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_interactions() {
        let json = br#"[{"name":"click","ts":100,"dur":120,"input_delay":10,
            "processing_start":110,"processing_end":180,"presentation_delay":40}]"#;
        let events = parse_interactions(json).expect("valid interactions");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].end(), 220.0);
    }

    #[test]
    fn network_defaults() {
        let json = br#"[{"url":"https://a.test/","ts":0,"dur":5}]"#;
        let reqs = parse_network_requests(json).expect("valid requests");
        assert!(reqs[0].is_first_party);
        assert!(reqs[0].request_sent.is_none());
    }

    #[test]
    fn reports_what_failed() {
        let err = parse_annotations(b"{").expect_err("malformed");
        assert!(err.to_string().starts_with("annotations:"));
    }
}
