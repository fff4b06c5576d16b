//! Network waterfall data: derived segments plus lane assignment.

use serde::{Deserialize, Serialize};

use crate::model::{NetworkRequest, RawNetworkRequest};
use crate::stacking::{self, LaneAssignment};
use crate::viewport::{DataBounds, DisplayFlags};

/// Requests with their lanes, as consumed by the renderer and hit tester.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedNetwork {
    pub requests: Vec<NetworkRequest>,
    /// Lane per request over the full, unfiltered set.
    pub lanes: Vec<u32>,
    /// Highest lane in use.
    pub max_depth: u32,
    pub start_time: f64,
    pub end_time: f64,
}

/// Rows for the requests that pass the current filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkLayout {
    /// Row per request, index-aligned with [`ProcessedNetwork::requests`];
    /// `None` for filtered-out requests.
    pub rows: Vec<Option<u32>>,
    pub max_row: u32,
}

impl NetworkLayout {
    pub fn row(&self, index: usize) -> Option<u32> {
        self.rows.get(index).copied().flatten()
    }
}

/// Derive segments and lanes for every request.
pub fn process_network_data(raw: &[RawNetworkRequest]) -> ProcessedNetwork {
    let requests: Vec<NetworkRequest> = raw.iter().map(NetworkRequest::from_raw).collect();
    let LaneAssignment { lanes, max_lane } = stacking::assign_lanes(&requests);

    let start_time = requests.iter().map(|r| r.ts).fold(f64::INFINITY, f64::min);
    let end_time = requests.iter().map(NetworkRequest::end).fold(f64::NEG_INFINITY, f64::max);
    let (start_time, end_time) = if requests.is_empty() {
        (0.0, 0.0)
    } else {
        (start_time, end_time)
    };

    tracing::debug!(requests = requests.len(), lanes = max_lane + 1, "processed network data");
    ProcessedNetwork {
        requests,
        lanes,
        max_depth: max_lane,
        start_time,
        end_time,
    }
}

impl ProcessedNetwork {
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn is_visible(request: &NetworkRequest, flags: &DisplayFlags) -> bool {
        if request.is_first_party {
            flags.show_first_party
        } else {
            flags.show_third_party
        }
    }

    /// Rows under the given flags.
    ///
    /// Expanded mode keeps the lanes of the full set so rows do not jump
    /// when a filter is toggled; compact mode re-stacks only what is shown.
    pub fn layout(&self, flags: &DisplayFlags) -> NetworkLayout {
        let visible: Vec<usize> = (0..self.requests.len())
            .filter(|&i| Self::is_visible(&self.requests[i], flags))
            .collect();
        let mut rows = vec![None; self.requests.len()];

        if flags.is_compact {
            let subset: Vec<&NetworkRequest> = visible.iter().map(|&i| &self.requests[i]).collect();
            let assignment = stacking::assign_lanes(&subset);
            for (&idx, &lane) in visible.iter().zip(&assignment.lanes) {
                rows[idx] = Some(lane);
            }
            return NetworkLayout {
                rows,
                max_row: assignment.max_lane,
            };
        }

        let mut max_row = 0;
        for &idx in &visible {
            let lane = self.lanes.get(idx).copied().unwrap_or(0);
            rows[idx] = Some(lane);
            max_row = max_row.max(lane);
        }
        NetworkLayout { rows, max_row }
    }

    /// Clamping bounds for the viewport under the given flags.
    pub fn bounds(&self, flags: &DisplayFlags) -> DataBounds {
        DataBounds::new(self.start_time, self.end_time, self.layout(flags).max_row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(url: &str, ts: f64, dur: f64, first_party: bool) -> RawNetworkRequest {
        RawNetworkRequest {
            url: url.into(),
            ts,
            dur,
            mime_type: String::new(),
            is_first_party: first_party,
            request_sent: None,
            response_received: None,
            finished: None,
        }
    }

    fn sample() -> ProcessedNetwork {
        process_network_data(&[
            raw("a", 0.0, 10.0, true),
            raw("b", 5.0, 10.0, false),
            raw("c", 12.0, 8.0, true),
            raw("d", 6.0, 20.0, true),
        ])
    }

    #[test]
    fn lanes_and_bounds() {
        let net = sample();
        assert_eq!(net.lanes, vec![0, 1, 0, 2]);
        assert_eq!(net.max_depth, 2);
        assert_eq!((net.start_time, net.end_time), (0.0, 26.0));
    }

    #[test]
    fn expanded_filter_keeps_lanes() {
        let net = sample();
        let flags = DisplayFlags {
            show_third_party: false,
            ..DisplayFlags::default()
        };
        let layout = net.layout(&flags);
        assert_eq!(layout.rows, vec![Some(0), None, Some(0), Some(2)]);
        assert_eq!(layout.max_row, 2);
    }

    #[test]
    fn compact_restacks_visible_requests() {
        let net = sample();
        let flags = DisplayFlags {
            show_third_party: false,
            is_compact: true,
            ..DisplayFlags::default()
        };
        let layout = net.layout(&flags);
        assert_eq!(layout.rows, vec![Some(0), None, Some(0), Some(1)]);
        assert_eq!(layout.max_row, 1);
        assert_eq!(net.bounds(&flags).max_depth, 1);
    }

    #[test]
    fn empty_input() {
        let net = process_network_data(&[]);
        assert!(net.is_empty());
        assert_eq!(net.max_depth, 0);
        assert_eq!(net.layout(&DisplayFlags::default()).max_row, 0);
    }
}
