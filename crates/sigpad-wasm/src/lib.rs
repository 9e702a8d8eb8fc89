//! WASM bridge for sigpad: exposes the signing board and the capture canvas
//! to the browser signing screen.
//!
//! Compiled via `wasm-pack build --target web`. Every call that can fail
//! returns a JSON string, `{"ok":true,...}` or
//! `{"ok":false,"error":"<code>","message":"<operator text>"}`, so the page
//! script never has to catch exceptions.

mod console;
mod listeners;
mod storage;

use listeners::WindowHost;
use serde_json::{Value, json};
use sigpad_capture::{CaptureSurface, PointerKind, PointerSample, StrokeEvent};
use sigpad_core::submit::{SigningEndpoint, SubmissionRecord, to_json};
use sigpad_core::{InputGate, PlacementId, SignError, SigningConfig};
use sigpad_editor::board::SigningBoard;
use sigpad_editor::controller::Outcome;
use sigpad_editor::hit::HitTarget;
use sigpad_editor::input::{InputEvent, Modality};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use storage::LocalStorage;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, ImageData};

/// State shared between the pad and its window listeners.
pub(crate) struct PadState {
    board: SigningBoard<LocalStorage>,
    /// Page callback invoked with the outcome JSON after every visible change.
    on_change: Option<js_sys::Function>,
    frame_pending: bool,
}

/// The placement overlay on top of the rendered page.
#[wasm_bindgen]
pub struct SignaturePad {
    state: Rc<RefCell<PadState>>,
    host: WindowHost,
}

#[wasm_bindgen]
impl SignaturePad {
    /// `overlay` is the element covering the rendered page; every `x`/`y`
    /// passed in is in pixels relative to its top-left corner.
    /// `config_json` may be empty for the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(overlay: Element, config_json: &str) -> Result<SignaturePad, JsValue> {
        console::console_error_panic_hook_setup();
        let config = parse_config(config_json).map_err(|e| JsValue::from_str(&error_json(&e)))?;
        let state = Rc::new(RefCell::new(PadState {
            board: SigningBoard::new(config, LocalStorage),
            on_change: None,
            frame_pending: false,
        }));
        let host = WindowHost::new(Rc::downgrade(&state), overlay);
        Ok(Self { state, host })
    }

    /// Register the callback that re-renders the overlay.
    pub fn set_on_change(&mut self, callback: js_sys::Function) {
        self.state.borrow_mut().on_change = Some(callback);
    }

    // ─── Document ────────────────────────────────────────────────────────

    /// The page renderer loaded a page of `width` x `height` points.
    pub fn set_page_natural_size(&mut self, width: f64, height: f64) -> bool {
        self.state.borrow_mut().board.set_page_natural_size(width, height)
    }

    /// The overlay's layout width changed.
    pub fn set_container_width(&mut self, width: f64) -> bool {
        self.state.borrow_mut().board.set_container_width(width)
    }

    pub fn is_ready(&self) -> bool {
        self.state.borrow().board.is_ready()
    }

    /// `{"scale":..,"renderWidth":..,"renderHeight":..}` or `null`.
    pub fn get_metrics_json(&self) -> String {
        match self.state.borrow().board.metrics() {
            Some(m) => json!({
                "scale": m.scale,
                "renderWidth": m.render_size.width,
                "renderHeight": m.render_size.height,
            })
            .to_string(),
            None => "null".to_string(),
        }
    }

    // ─── Signatures ──────────────────────────────────────────────────────

    /// Export the capture canvas and place the result centered on the page.
    pub fn finish_capture(&mut self, canvas: &SignatureCanvas) -> String {
        let result = self.state.borrow_mut().board.finish_capture(&canvas.surface);
        self.notify_if(result.is_ok(), "placed");
        match result {
            Ok(id) => ok_json(json!({ "id": id.to_string() })),
            Err(e) => error_json(&e),
        }
    }

    /// Place the remembered signature. `"id":null` means the operator has to
    /// draw one.
    pub fn place_cached(&mut self) -> String {
        let result = self.state.borrow_mut().board.place_cached();
        self.notify_if(matches!(result, Ok(Some(_))), "placed");
        match result {
            Ok(id) => ok_json(json!({ "id": id.map(|id| id.to_string()) })),
            Err(e) => error_json(&e),
        }
    }

    pub fn has_cached_signature(&mut self) -> bool {
        self.state.borrow_mut().board.has_cached_signature()
    }

    pub fn forget_cached_signature(&mut self) {
        self.state.borrow_mut().board.cache_mut().clear();
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let Some(id) = PlacementId::parse(id) else {
            return false;
        };
        let removed = self.state.borrow_mut().board.remove(id);
        self.notify_if(removed, "removed");
        removed
    }

    pub fn delete_selected(&mut self) -> bool {
        let removed = self.state.borrow_mut().board.delete_selected();
        self.notify_if(removed, "removed");
        removed
    }

    /// Select a placement by id; an empty string clears the selection.
    pub fn select(&mut self, id: &str) -> bool {
        let target = if id.is_empty() {
            None
        } else {
            match PlacementId::parse(id) {
                Some(id) => Some(id),
                None => return false,
            }
        };
        let changed = self.state.borrow_mut().board.select(target);
        self.notify_if(changed, "selected");
        changed
    }

    /// Selected placement id, or empty string.
    pub fn get_selected_id(&self) -> String {
        self.state
            .borrow()
            .board
            .store()
            .selected()
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.state.borrow_mut().board.clear();
        self.notify_if(true, "cleared");
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    /// What lies under an overlay pixel, as JSON or `null`.
    pub fn hit_test(&self, x: f64, y: f64) -> String {
        match self.state.borrow().board.hit_test(x, y) {
            Some(target) => hit_json(&target).to_string(),
            None => "null".to_string(),
        }
    }

    /// `pointerdown` on the overlay.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> String {
        self.start(InputEvent::start(x, y, Modality::Pointer))
    }

    /// `touchstart` on the overlay (first changed touch).
    pub fn touch_start(&mut self, x: f64, y: f64) -> String {
        self.start(InputEvent::start(x, y, Modality::Touch))
    }

    /// Abort the running gesture, e.g. when the screen is hidden.
    pub fn cancel_gesture(&mut self) -> String {
        let outcome = self.state.borrow_mut().board.cancel_gesture();
        let notify = self.state.borrow().on_change.clone();
        notify_change(notify.as_ref(), &outcome);
        outcome_json(&outcome).to_string()
    }

    /// Pixel-space layout of every placement, for rendering.
    pub fn views_json(&self) -> String {
        serde_json::to_string(&self.state.borrow().board.views())
            .unwrap_or_else(|_| "[]".to_string())
    }

    // ─── Submission ──────────────────────────────────────────────────────

    /// `{"ok":true,"records":[...]}` in the stamping service's coordinates.
    pub fn submission_json(&self) -> String {
        match self.state.borrow().board.submission() {
            Ok(records) => ok_json(json!({ "records": records })),
            Err(e) => error_json(&e),
        }
    }

    /// Hand the records to `send`, a JS function taking the records JSON.
    /// A thrown exception is reported as an endpoint error.
    pub fn submit(&self, send: js_sys::Function) -> String {
        // Built first so the page function runs with the board unborrowed.
        let records = match self.state.borrow().board.submission() {
            Ok(records) => records,
            Err(e) => return error_json(&e),
        };
        let mut endpoint = JsEndpoint(send);
        match endpoint.submit(&records) {
            Ok(()) => ok_json(json!({ "submitted": records.len() })),
            Err(e) => error_json(&e),
        }
    }
}

impl SignaturePad {
    fn start(&mut self, event: InputEvent) -> String {
        let (result, touched) = {
            let mut pad = self.state.borrow_mut();
            let before = (pad.board.store().len(), pad.board.store().selected());
            let result = pad.board.pointer_down(&event, &self.host);
            let after = (pad.board.store().len(), pad.board.store().selected());
            (result, before != after)
        };
        match result {
            Ok(outcome) => {
                // A delete-button tap or a background tap changes the store
                // without starting a session.
                if outcome == Outcome::Ignored {
                    self.notify_if(touched, "selected");
                } else {
                    let notify = self.state.borrow().on_change.clone();
                    notify_change(notify.as_ref(), &outcome);
                }
                outcome_json(&outcome).to_string()
            }
            Err(e) => error_json(&e),
        }
    }

    fn notify_if(&self, changed: bool, what: &str) {
        if !changed {
            return;
        }
        let notify = self.state.borrow().on_change.clone();
        if let Some(f) = notify {
            call_on_change(&f, &json!({ "kind": what }));
        }
    }
}

/// Forward a window-listener event to the board, then tell the page.
pub(crate) fn route_event(state: &Weak<RefCell<PadState>>, event: &InputEvent) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let (outcome, notify) = {
        let Ok(mut pad) = state.try_borrow_mut() else {
            log::warn!("pad: dropped {event:?}, board busy");
            return;
        };
        let outcome = pad.board.pointer_event(event);
        if outcome == Outcome::Deferred && !pad.frame_pending {
            pad.frame_pending = schedule_frame(Rc::downgrade(&state));
        }
        (outcome, pad.on_change.clone())
    };
    notify_change(notify.as_ref(), &outcome);
}

/// Apply coalesced moves on the next animation frame.
fn schedule_frame(state: Weak<RefCell<PadState>>) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let callback = Closure::once_into_js(move || {
        let Some(state) = state.upgrade() else {
            return;
        };
        let (outcome, notify) = {
            let Ok(mut pad) = state.try_borrow_mut() else {
                return;
            };
            pad.frame_pending = false;
            (pad.board.flush_frame(), pad.on_change.clone())
        };
        notify_change(notify.as_ref(), &outcome);
    });
    match window.request_animation_frame(callback.unchecked_ref()) {
        Ok(_) => true,
        Err(e) => {
            log::warn!("pad: requestAnimationFrame failed: {e:?}");
            false
        }
    }
}

fn notify_change(callback: Option<&js_sys::Function>, outcome: &Outcome) {
    if matches!(outcome, Outcome::Ignored | Outcome::Deferred) {
        return;
    }
    if let Some(f) = callback {
        call_on_change(f, &outcome_json(outcome));
    }
}

fn call_on_change(f: &js_sys::Function, payload: &Value) {
    if let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_str(&payload.to_string())) {
        log::warn!("pad: onChange threw: {e:?}");
    }
}

/// Signing endpoint backed by a page function.
struct JsEndpoint(js_sys::Function);

impl SigningEndpoint for JsEndpoint {
    fn submit(&mut self, records: &[SubmissionRecord]) -> Result<(), SignError> {
        let body = to_json(records)?;
        self.0
            .call1(&JsValue::NULL, &JsValue::from_str(&body))
            .map(|_| ())
            .map_err(|e| SignError::Endpoint(format!("{e:?}")))
    }
}

// ─── Capture canvas ──────────────────────────────────────────────────────

/// The freehand drawing canvas.
#[wasm_bindgen]
pub struct SignatureCanvas {
    surface: CaptureSurface,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

#[wasm_bindgen]
impl SignatureCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config_json: &str) -> Result<SignatureCanvas, JsValue> {
        console::console_error_panic_hook_setup();
        let config = parse_config(config_json).map_err(|e| JsValue::from_str(&error_json(&e)))?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let surface = CaptureSurface::new(canvas.width(), canvas.height(), &config);
        Ok(Self {
            surface,
            canvas,
            ctx,
        })
    }

    /// Restrict drawing to pens (palm rejection on tablets).
    pub fn set_pen_only(&mut self, pen_only: bool) {
        self.surface.set_gate(if pen_only {
            InputGate::PenOnly
        } else {
            InputGate::Any
        });
    }

    /// `pointerdown` on the canvas. Returns the stroke event name.
    pub fn pointer_down(
        &mut self,
        pointer_id: i32,
        pointer_type: &str,
        x: f64,
        y: f64,
        pressure: f32,
    ) -> String {
        let sample = sample(pointer_id, pointer_type, x, y, pressure);
        let event = self.surface.pointer_down(sample);
        if event == StrokeEvent::Started
            && let Err(e) = self.canvas.set_pointer_capture(pointer_id)
        {
            log::warn!("canvas: setPointerCapture failed: {e:?}");
        }
        self.after(&event)
    }

    pub fn pointer_move(
        &mut self,
        pointer_id: i32,
        pointer_type: &str,
        x: f64,
        y: f64,
        pressure: f32,
    ) -> String {
        let event = self
            .surface
            .pointer_move(sample(pointer_id, pointer_type, x, y, pressure));
        self.after(&event)
    }

    /// `pointerup` / `pointercancel`.
    pub fn pointer_up(&mut self, pointer_id: i32) -> String {
        let event = self.surface.pointer_up(pointer_id);
        self.release(pointer_id, &event);
        self.after(&event)
    }

    /// `pointerleave` without capture.
    pub fn pointer_leave(&mut self, pointer_id: i32) -> String {
        let event = self.surface.pointer_leave(pointer_id);
        self.release(pointer_id, &event);
        self.after(&event)
    }

    pub fn is_empty(&self) -> bool {
        self.surface.stroke_count() == 0
    }

    pub fn clear(&mut self) {
        self.surface.clear();
        self.redraw();
    }

    /// The canvas element was resized; drawing starts over.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.surface.resize(width, height);
        self.redraw();
    }
}

impl SignatureCanvas {
    fn release(&self, pointer_id: i32, event: &StrokeEvent) {
        if *event == StrokeEvent::Ended
            && let Err(e) = self.canvas.release_pointer_capture(pointer_id)
        {
            log::debug!("canvas: releasePointerCapture failed: {e:?}");
        }
    }

    fn after(&self, event: &StrokeEvent) -> String {
        if matches!(event, StrokeEvent::Started | StrokeEvent::Extended) {
            self.redraw();
        }
        stroke_event_name(event).to_string()
    }

    /// Blit the raster onto the canvas.
    fn redraw(&self) {
        let (w, h) = self.surface.dimensions();
        let image = ImageData::new_with_u8_clamped_array_and_sh(Clamped(self.surface.pixels()), w, h);
        let drawn = image.and_then(|img| self.ctx.put_image_data(&img, 0.0, 0.0));
        if let Err(e) = drawn {
            log::warn!("canvas: putImageData failed: {e:?}");
        }
    }
}

fn sample(pointer_id: i32, pointer_type: &str, x: f64, y: f64, pressure: f32) -> PointerSample {
    PointerSample {
        pointer_id,
        kind: PointerKind::from_dom(pointer_type),
        x,
        y,
        pressure,
    }
}

// ─── JSON helpers ────────────────────────────────────────────────────────

fn parse_config(json: &str) -> Result<SigningConfig, SignError> {
    if json.trim().is_empty() {
        Ok(SigningConfig::default())
    } else {
        SigningConfig::from_json(json)
    }
}

fn ok_json(mut fields: Value) -> String {
    if let Value::Object(map) = &mut fields {
        map.insert("ok".to_string(), Value::Bool(true));
    }
    fields.to_string()
}

fn error_json(e: &SignError) -> String {
    log::info!("pad: {e}");
    json!({
        "ok": false,
        "error": e.code(),
        "message": e.user_message(),
    })
    .to_string()
}

fn hit_json(target: &HitTarget) -> Value {
    match target {
        HitTarget::Body(id) => json!({ "kind": "body", "id": id.to_string() }),
        HitTarget::ResizeHandle(id, corner) => {
            json!({ "kind": "handle", "id": id.to_string(), "corner": corner })
        }
        HitTarget::DeleteButton(id) => json!({ "kind": "delete", "id": id.to_string() }),
    }
}

fn outcome_json(outcome: &Outcome) -> Value {
    match outcome {
        Outcome::Ignored => json!({ "kind": "ignored" }),
        Outcome::Deferred => json!({ "kind": "deferred" }),
        Outcome::Started { id, mode } => json!({
            "kind": "started",
            "id": id.to_string(),
            "mode": format!("{mode:?}").to_lowercase(),
        }),
        Outcome::Updated { id, position, size } => json!({
            "kind": "updated",
            "id": id.to_string(),
            "x": position.x,
            "y": position.y,
            "width": size.width,
            "height": size.height,
        }),
        Outcome::Ended { id } => json!({ "kind": "ended", "id": id.to_string() }),
        Outcome::Cancelled { id } => json!({ "kind": "cancelled", "id": id.to_string() }),
    }
}

fn stroke_event_name(event: &StrokeEvent) -> &'static str {
    match event {
        StrokeEvent::Started => "started",
        StrokeEvent::Extended => "extended",
        StrokeEvent::Ended => "ended",
        StrokeEvent::Rejected { .. } => "rejected",
        StrokeEvent::Ignored => "ignored",
    }
}

// ─── Logging and panics ──────────────────────────────────────────────────

/// Route Rust logs to the browser console at `level` (`"warn"`, `"debug"`, ...).
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    console::init(console::parse_level(level));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sigpad_core::{Corner, Point, Size};

    #[test]
    fn error_json_carries_code_and_message() {
        let v: Value = serde_json::from_str(&error_json(&SignError::NoPlacements)).unwrap();
        assert_eq!(v["ok"], false);
        assert_eq!(v["error"], "noPlacements");
        assert_eq!(v["message"], SignError::NoPlacements.user_message());
    }

    #[test]
    fn ok_json_adds_flag() {
        let v: Value = serde_json::from_str(&ok_json(json!({ "id": "sig_1" }))).unwrap();
        assert_eq!(v, json!({ "ok": true, "id": "sig_1" }));
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(parse_config("  ").unwrap(), SigningConfig::default());
        assert!(parse_config("{").is_err());
    }

    #[test]
    fn outcome_and_hit_shapes() {
        let id = PlacementId::parse("sig_7").unwrap();
        let v = outcome_json(&Outcome::Updated {
            id,
            position: Point::new(1.0, 2.0),
            size: Size::new(3.0, 4.0),
        });
        assert_eq!(v["kind"], "updated");
        assert_eq!(v["x"], 1.0);
        assert_eq!(v["height"], 4.0);

        let v = hit_json(&HitTarget::ResizeHandle(id, Corner::BottomLeft));
        assert_eq!(v, json!({ "kind": "handle", "id": "sig_7", "corner": "bottomLeft" }));
    }
}
