use std::fmt::Display;
use std::time::Duration;

use serde::Serialize;
use tracelens_core::export;
use tracelens_core::model;
use tracelens_core::processor;
use tracelens_core::{ClickOutcome, ContentKind, Controller, LayoutConfig, Selection, Toggle, TraceSession, render};
use tracelens_protocol::Theme;
use wasm_bindgen::prelude::*;

fn js_err(err: impl Display) -> JsError {
    JsError::new(&err.to_string())
}

fn to_json(value: &impl Serialize) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(js_err)
}

fn theme(dark: bool) -> Theme {
    if dark { Theme::Dark } else { Theme::Light }
}

/// Host clock in milliseconds (e.g. `performance.now()`).
fn host_time(now_ms: f64) -> Duration {
    Duration::from_secs_f64(now_ms.max(0.0) / 1_000.0)
}

/// One interactive trace view. The page owns it; dropping it drops the data
/// and any pending live update with it.
#[wasm_bindgen]
pub struct TraceView {
    session: TraceSession,
    controller: Controller,
}

#[wasm_bindgen]
impl TraceView {
    /// Create an empty view. `config_json` may override any layout field.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, config_json: Option<String>) -> Result<TraceView, JsError> {
        let config = match config_json {
            Some(json) => LayoutConfig::from_json(json.as_bytes()).map_err(js_err)?,
            None => LayoutConfig::default(),
        };
        let session = TraceSession::new(Duration::from_millis(config.debounce_ms));
        let controller = Controller::new(config, width, height, &session.data());
        Ok(TraceView { session, controller })
    }

    /// Replace the trace with Chrome trace JSON.
    pub fn load_trace(&mut self, data: &[u8]) -> Result<(), JsError> {
        let events = processor::parse_trace_events(data).map_err(js_err)?;
        self.session.load_events(events);
        self.controller.reset(&self.session.data());
        Ok(())
    }

    /// Queue live trace events (a JSON array); they are folded in by `poll`.
    pub fn push_events(&mut self, data: &[u8], now_ms: f64) -> Result<(), JsError> {
        let events = processor::parse_trace_events(data).map_err(js_err)?;
        self.session.push_events(events, host_time(now_ms));
        Ok(())
    }

    /// Apply queued live events once they have settled. Returns `true` when
    /// the page should repaint.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        let data = self.session.data();
        let following = self.controller.view().covers_all(&data.content.bounds(self.controller.flags()));
        if !self.session.poll(host_time(now_ms)) {
            return false;
        }
        let data = self.session.data();
        if following {
            self.controller.reset(&data);
        } else {
            let (width, height) = self.controller.size();
            self.controller.resize(width, height, &data);
        }
        true
    }

    pub fn load_network(&mut self, data: &[u8]) -> Result<(), JsError> {
        let raw = model::parse_network_requests(data).map_err(js_err)?;
        self.session.load_network(&raw);
        if self.session.mode() == ContentKind::Network {
            self.controller.reset(&self.session.data());
        }
        Ok(())
    }

    pub fn set_annotations(&mut self, data: &[u8]) -> Result<(), JsError> {
        self.session.set_annotations(model::parse_annotations(data).map_err(js_err)?);
        self.controller.forget_overlay_refs();
        Ok(())
    }

    pub fn set_interactions(&mut self, data: &[u8]) -> Result<(), JsError> {
        self.session.set_interactions(model::parse_interactions(data).map_err(js_err)?);
        self.controller.forget_overlay_refs();
        Ok(())
    }

    /// `"flame"` or `"network"`.
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsError> {
        let mode = match mode {
            "flame" => ContentKind::Flame,
            "network" => ContentKind::Network,
            _ => return Err(JsError::new(&format!("unknown mode: {mode}"))),
        };
        self.session.set_mode(mode);
        self.controller.reset(&self.session.data());
        Ok(())
    }

    /// Drop all data, e.g. before the canvas is unmounted.
    pub fn close(&mut self) {
        self.session.close();
        self.controller.reset(&self.session.data());
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.controller.resize(width, height, &self.session.data());
    }

    /// Render commands for the current state, as JSON.
    pub fn render(&self) -> Result<String, JsError> {
        to_json(&render(&self.controller.scene(self.session.data())))
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.controller.pointer_down(x, y);
    }

    /// Returns `true` when the page should repaint.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.controller.pointer_move(x, y, &self.session.data())
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) {
        self.controller.pointer_up(x, y);
    }

    pub fn pointer_leave(&mut self) {
        self.controller.pointer_leave();
    }

    pub fn wheel(&mut self, delta_y: f64, x: f64) {
        self.controller.wheel(delta_y, x, &self.session.data());
    }

    /// Returns `true` when the click changed the selection or the view.
    pub fn click(&mut self, x: f64, y: f64) -> bool {
        let outcome = self.controller.click(x, y, &self.session.data());
        !matches!(outcome, ClickOutcome::Ignored)
    }

    pub fn zoom_in(&mut self) {
        self.controller.zoom_in(&self.session.data());
    }

    pub fn zoom_out(&mut self) {
        self.controller.zoom_out(&self.session.data());
    }

    pub fn reset(&mut self) {
        self.controller.reset(&self.session.data());
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.controller.pan(dx, dy, &self.session.data());
    }

    pub fn scroll_depth(&mut self, step: f64) {
        self.controller.scroll_depth(step, &self.session.data());
    }

    pub fn clear_selection(&mut self) {
        self.controller.clear_selection();
    }

    /// One of `annotations`, `interactions`, `milestones`, `compact`,
    /// `first-party`, `third-party`.
    pub fn toggle(&mut self, name: &str) -> Result<(), JsError> {
        let toggle = match name {
            "annotations" => Toggle::Annotations,
            "interactions" => Toggle::Interactions,
            "milestones" => Toggle::Milestones,
            "compact" => Toggle::Compact,
            "first-party" => Toggle::FirstParty,
            "third-party" => Toggle::ThirdParty,
            _ => return Err(JsError::new(&format!("unknown toggle: {name}"))),
        };
        self.controller.toggle(toggle, &self.session.data());
        Ok(())
    }

    /// Current selection as JSON (`null` when nothing is selected).
    pub fn selection(&self) -> Result<String, JsError> {
        to_json(&self.controller.selection())
    }

    /// Current view range and row window as JSON.
    pub fn view_state(&self) -> Result<String, JsError> {
        to_json(self.controller.view())
    }

    /// Hover card for the entity under the pointer, as JSON.
    pub fn hover_card(&self) -> Result<String, JsError> {
        let data = self.session.data();
        let card = self
            .controller
            .hover()
            .and_then(|hover| tracelens_core::render::hover::hover_card(&hover.hit, &data));
        to_json(&card.map(|c| (c.title, c.lines)))
    }

    pub fn export_svg(&self, dark: bool) -> Result<String, JsError> {
        let ticket = self.session.begin_export();
        let (width, height) = self.controller.size();
        let commands = render(&self.controller.scene(self.session.data()));
        let svg = export::render_svg(&commands, width, height, theme(dark));
        self.session.finish_export(ticket, svg).map_err(js_err)
    }

    pub fn export_png(&self, dark: bool) -> Result<Vec<u8>, JsError> {
        let ticket = self.session.begin_export();
        let (width, height) = self.controller.size();
        let commands = render(&self.controller.scene(self.session.data()));
        let png = export::render_png(&commands, width, height, theme(dark)).map_err(js_err)?;
        tracing::debug!(bytes = png.len(), "png export ready");
        self.session.finish_export(ticket, png).map_err(js_err)
    }

    /// Id of the selected frame, if a frame is selected.
    pub fn selected_frame_id(&self) -> Option<u64> {
        match self.controller.selection() {
            Some(Selection::Frame(id)) => Some(id),
            _ => None,
        }
    }
}
