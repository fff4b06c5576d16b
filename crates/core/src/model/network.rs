use serde::{Deserialize, Serialize};

/// A network request as handed over by the ingestion layer, before its
/// timing phases are split into drawable segments.
///
/// All timestamps are absolute milliseconds on the trace clock. Missing
/// phase timestamps collapse the corresponding segment to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNetworkRequest {
    pub url: String,
    pub ts: f64,
    pub dur: f64,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default = "default_first_party")]
    pub is_first_party: bool,
    /// When the request left the browser (end of queueing).
    #[serde(default)]
    pub request_sent: Option<f64>,
    /// When response headers arrived (end of request + server wait).
    #[serde(default)]
    pub response_received: Option<f64>,
    /// When the last byte arrived (end of download).
    #[serde(default)]
    pub finished: Option<f64>,
}

fn default_first_party() -> bool {
    true
}

/// The four drawable phases of a request, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSegments {
    pub queueing: f64,
    pub request_plus_waiting: f64,
    pub download: f64,
    pub waiting_on_main_thread: f64,
}

impl NetworkSegments {
    /// Split `[ts, ts + dur]` at the raw phase timestamps.
    ///
    /// Phase boundaries are clamped into the request's extent and forced to
    /// be monotonic, so every segment is non-negative and the four always
    /// sum to the (non-negative) duration.
    pub fn derive(raw: &RawNetworkRequest) -> Self {
        let dur = raw.dur.max(0.0);
        let start = raw.ts;
        let end = start + dur;

        let clamp = |t: Option<f64>, floor: f64| t.unwrap_or(floor).clamp(floor, end);
        let sent = clamp(raw.request_sent, start);
        let received = clamp(raw.response_received, sent);
        let finished = clamp(raw.finished, received);

        Self {
            queueing: sent - start,
            request_plus_waiting: received - sent,
            download: finished - received,
            waiting_on_main_thread: end - finished,
        }
    }

    pub fn total(&self) -> f64 {
        self.queueing + self.request_plus_waiting + self.download + self.waiting_on_main_thread
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRequest {
    pub url: String,
    pub ts: f64,
    pub dur: f64,
    pub mime_type: String,
    pub is_first_party: bool,
    pub segments: NetworkSegments,
}

impl NetworkRequest {
    pub fn from_raw(raw: &RawNetworkRequest) -> Self {
        Self {
            url: raw.url.clone(),
            ts: raw.ts,
            dur: raw.dur,
            mime_type: raw.mime_type.clone(),
            is_first_party: raw.is_first_party,
            segments: NetworkSegments::derive(raw),
        }
    }

    pub fn end(&self) -> f64 {
        self.ts + self.dur.max(0.0)
    }

    /// Last path segment of the URL, for labels.
    pub fn short_name(&self) -> &str {
        let trimmed = self.url.split(['?', '#']).next().unwrap_or(&self.url);
        let trimmed = trimmed.trim_end_matches('/');
        match trimmed.rsplit('/').next() {
            Some(last) if !last.is_empty() => last,
            _ => &self.url,
        }
    }

    pub fn resource_kind(&self) -> ResourceKind {
        ResourceKind::from_mime(&self.mime_type)
    }
}

/// Coarse resource family used for coloring the download segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Document,
    Script,
    Stylesheet,
    Image,
    Font,
    Media,
    Data,
    Other,
}

impl ResourceKind {
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.to_ascii_lowercase();
        if mime.starts_with("text/html") {
            Self::Document
        } else if mime.contains("javascript") || mime.contains("ecmascript") {
            Self::Script
        } else if mime.starts_with("text/css") {
            Self::Stylesheet
        } else if mime.starts_with("image/") {
            Self::Image
        } else if mime.starts_with("font/") || mime.contains("font") {
            Self::Font
        } else if mime.starts_with("video/") || mime.starts_with("audio/") {
            Self::Media
        } else if mime.contains("json") || mime.contains("xml") {
            Self::Data
        } else {
            Self::Other
        }
    }
}
