//! Ownership of the loaded data across trace switches and live updates.
//!
//! A [`TraceSession`] holds everything the renderer reads. Live event
//! batches are buffered and folded in once the debounce window closes.
//! Loading new data bumps the session [`Epoch`], which drops any pending
//! recompute and turns outstanding [`ExportTicket`]s stale.

use std::time::Duration;

use crate::debounce::{Debouncer, Epoch};
use crate::export::ExportError;
use crate::layout::ContentKind;
use crate::model::{Annotation, InteractionEvent, ProcessedTrace, RawNetworkRequest};
use crate::processor::{self, ProcessOptions, RawTraceEvent};
use crate::render::{Content, SceneData};
use crate::waterfall::{self, ProcessedNetwork};

/// Proof that an export was started against a particular data generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportTicket {
    epoch: Epoch,
}

impl ExportTicket {
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }
}

#[derive(Debug)]
pub struct TraceSession {
    options: ProcessOptions,
    mode: ContentKind,
    epoch: Epoch,
    debounce: Debouncer,
    events: Vec<RawTraceEvent>,
    pending: Vec<RawTraceEvent>,
    trace: ProcessedTrace,
    network: ProcessedNetwork,
    annotations: Vec<Annotation>,
    interactions: Vec<InteractionEvent>,
}

impl TraceSession {
    pub fn new(debounce_window: Duration) -> Self {
        Self {
            options: ProcessOptions::default(),
            mode: ContentKind::default(),
            epoch: Epoch::default(),
            debounce: Debouncer::new(debounce_window),
            events: Vec::new(),
            pending: Vec::new(),
            trace: ProcessedTrace::default(),
            network: ProcessedNetwork::default(),
            annotations: Vec::new(),
            interactions: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: ProcessOptions) -> Self {
        self.options = options;
        self
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn mode(&self) -> ContentKind {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ContentKind) {
        self.mode = mode;
    }

    pub fn trace(&self) -> &ProcessedTrace {
        &self.trace
    }

    pub fn network(&self) -> &ProcessedNetwork {
        &self.network
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn interactions(&self) -> &[InteractionEvent] {
        &self.interactions
    }

    /// Everything the renderer and hit tester need for the current mode.
    pub fn data(&self) -> SceneData<'_> {
        let content = match self.mode {
            ContentKind::Flame => Content::Flame(&self.trace),
            ContentKind::Network => Content::Network(&self.network),
        };
        SceneData {
            content,
            interactions: &self.interactions,
            annotations: &self.annotations,
            milestones: &self.trace.milestones,
        }
    }

    /// Replace the trace. Invalidates pending live updates and exports.
    pub fn load_events(&mut self, events: Vec<RawTraceEvent>) {
        self.invalidate();
        self.trace = processor::process_trace_with(&events, &self.options);
        self.events = events;
    }

    /// Replace the trace with an already processed one.
    pub fn load_trace(&mut self, trace: ProcessedTrace) {
        self.invalidate();
        self.events.clear();
        self.trace = trace;
    }

    pub fn load_network(&mut self, raw: &[RawNetworkRequest]) {
        self.invalidate();
        self.network = waterfall::process_network_data(raw);
    }

    /// Replace the annotations. Hosts should follow with
    /// [`Controller::forget_overlay_refs`](crate::Controller::forget_overlay_refs).
    pub fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
    }

    /// Replace the interactions; see [`Self::set_annotations`].
    pub fn set_interactions(&mut self, interactions: Vec<InteractionEvent>) {
        self.interactions = interactions;
    }

    /// Re-walk the loaded events under new options, e.g. a range selection.
    pub fn set_options(&mut self, options: ProcessOptions) {
        self.options = options;
        self.recompute();
    }

    /// Queue a live batch. The trace is rebuilt on the first [`poll`]
    /// at least one debounce window after the latest batch.
    ///
    /// [`poll`]: TraceSession::poll
    pub fn push_events(&mut self, batch: impl IntoIterator<Item = RawTraceEvent>, now: Duration) {
        let before = self.pending.len();
        self.pending.extend(batch);
        if self.pending.len() > before {
            self.debounce.touch(now);
        }
    }

    pub fn has_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Fold buffered events in if the window has closed. Returns `true`
    /// when the trace changed and the host should repaint.
    pub fn poll(&mut self, now: Duration) -> bool {
        if !self.debounce.poll(now) {
            return false;
        }
        self.events.append(&mut self.pending);
        self.recompute();
        true
    }

    /// Drop all data, as when the view is torn down.
    pub fn close(&mut self) {
        self.invalidate();
        self.events.clear();
        self.trace = ProcessedTrace::default();
        self.network = ProcessedNetwork::default();
        self.annotations.clear();
        self.interactions.clear();
    }

    pub fn begin_export(&self) -> ExportTicket {
        ExportTicket { epoch: self.epoch }
    }

    pub fn is_current(&self, ticket: ExportTicket) -> bool {
        ticket.epoch == self.epoch
    }

    /// Hand back an export result only if no new data arrived meanwhile.
    pub fn finish_export<T>(&self, ticket: ExportTicket, output: T) -> Result<T, ExportError> {
        if self.is_current(ticket) {
            Ok(output)
        } else {
            tracing::debug!(
                started = ticket.epoch.get(),
                current = self.epoch.get(),
                "discarding stale export"
            );
            Err(ExportError::Stale)
        }
    }

    fn invalidate(&mut self) {
        if self.debounce.is_pending() {
            tracing::debug!(dropped = self.pending.len(), "cancelling pending recompute");
        }
        self.debounce.cancel();
        self.pending.clear();
        self.epoch = self.epoch.next();
    }

    fn recompute(&mut self) {
        self.trace = processor::process_trace_with(&self.events, &self.options);
    }
}
