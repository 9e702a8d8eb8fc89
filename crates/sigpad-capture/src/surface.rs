//! Freehand capture surface.
//!
//! Records pointer strokes straight into an RGBA raster. The state machine is
//! `Idle → Drawing → Idle`; while drawing, the surface owns exactly one
//! pointer and ignores every other pointer until that one is released.
//!
//! Strokes are rasterized by stamping anti-aliased discs along each segment,
//! with the disc diameter following the reported pressure.

use crate::export::CapturedSignature;
use crate::trim::{TrimmedImage, trim};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use sigpad_core::{InputGate, Point, SignError, SigningConfig};

/// Device class reported with a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointerKind {
    Mouse,
    Pen,
    Touch,
}

impl PointerKind {
    /// Parse a DOM `pointerType` string. Unknown types are treated as mouse.
    pub fn from_dom(s: &str) -> Self {
        match s {
            "pen" => PointerKind::Pen,
            "touch" => PointerKind::Touch,
            _ => PointerKind::Mouse,
        }
    }
}

/// One pointer event, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub pointer_id: i32,
    pub kind: PointerKind,
    pub x: f64,
    pub y: f64,
    /// 0.0 .. 1.0; 0.0 when the device does not report pressure.
    pub pressure: f32,
}

/// What a pointer event did to the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrokeEvent {
    /// A stroke began; the host should capture the pointer.
    Started,
    /// The current stroke grew.
    Extended,
    /// The stroke finished; the host should release pointer capture.
    Ended,
    /// The input gate refused this device.
    Rejected { reason: String },
    /// Nothing happened (idle move, foreign pointer, ...).
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CaptureState {
    Idle,
    Drawing {
        pointer_id: i32,
        last: Point,
        last_width: f32,
    },
}

pub struct CaptureSurface {
    buffer: RgbaImage,
    state: CaptureState,
    gate: InputGate,
    ink: Rgba<u8>,
    stroke_width: f32,
    min_stroke_width: f32,
    max_stroke_width: f32,
    trim_padding: u32,
    strokes: usize,
}

impl CaptureSurface {
    pub fn new(width: u32, height: u32, config: &SigningConfig) -> Self {
        let [r, g, b] = config.ink_rgb().unwrap_or([0, 0, 0]);
        Self {
            buffer: RgbaImage::new(width, height),
            state: CaptureState::Idle,
            gate: config.input_gate,
            ink: Rgba([r, g, b, 255]),
            stroke_width: config.stroke_width,
            min_stroke_width: config.min_stroke_width,
            max_stroke_width: config.max_stroke_width,
            trim_padding: config.trim_padding,
            strokes: 0,
        }
    }

    pub fn set_gate(&mut self, gate: InputGate) {
        self.gate = gate;
    }

    pub fn gate(&self) -> InputGate {
        self.gate
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, CaptureState::Drawing { .. })
    }

    /// Number of strokes drawn since the last clear.
    pub fn stroke_count(&self) -> usize {
        self.strokes
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Raw RGBA bytes, row-major, for blitting to a canvas.
    pub fn pixels(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    pub fn buffer(&self) -> &RgbaImage {
        &self.buffer
    }

    // ─── Pointer events ──────────────────────────────────────────────────

    pub fn pointer_down(&mut self, sample: PointerSample) -> StrokeEvent {
        if self.is_drawing() {
            return StrokeEvent::Ignored;
        }
        if self.gate == InputGate::PenOnly && sample.kind != PointerKind::Pen {
            let reason = format!("pen-only mode: ignoring {:?} input", sample.kind);
            log::warn!("capture: {reason}");
            return StrokeEvent::Rejected { reason };
        }

        let at = Point::new(sample.x, sample.y);
        let width = self.width_for(sample.pressure);
        self.stamp(at, width);
        self.state = CaptureState::Drawing {
            pointer_id: sample.pointer_id,
            last: at,
            last_width: width,
        };
        self.strokes += 1;
        log::trace!("capture: stroke {} started by pointer {}", self.strokes, sample.pointer_id);
        StrokeEvent::Started
    }

    pub fn pointer_move(&mut self, sample: PointerSample) -> StrokeEvent {
        let CaptureState::Drawing {
            pointer_id,
            last,
            last_width,
        } = self.state
        else {
            return StrokeEvent::Ignored;
        };
        if pointer_id != sample.pointer_id {
            return StrokeEvent::Ignored;
        }
        let at = Point::new(sample.x, sample.y);
        let width = self.width_for(sample.pressure);
        self.segment(last, last_width, at, width);
        self.state = CaptureState::Drawing {
            pointer_id,
            last: at,
            last_width: width,
        };
        StrokeEvent::Extended
    }

    pub fn pointer_up(&mut self, pointer_id: i32) -> StrokeEvent {
        self.end_stroke(pointer_id)
    }

    /// The pointer left the surface (or the platform cancelled it).
    pub fn pointer_leave(&mut self, pointer_id: i32) -> StrokeEvent {
        self.end_stroke(pointer_id)
    }

    fn end_stroke(&mut self, pointer_id: i32) -> StrokeEvent {
        match self.state {
            CaptureState::Drawing { pointer_id: owner, .. } if owner == pointer_id => {
                self.state = CaptureState::Idle;
                StrokeEvent::Ended
            }
            _ => StrokeEvent::Ignored,
        }
    }

    /// Erase everything and return to idle.
    pub fn clear(&mut self) {
        for px in self.buffer.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
        self.state = CaptureState::Idle;
        self.strokes = 0;
    }

    /// Resize the drawing buffer. Existing ink is discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.buffer = RgbaImage::new(width, height);
        self.state = CaptureState::Idle;
        self.strokes = 0;
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Crop to the ink. `None` when nothing has been drawn.
    /// The surface itself is left untouched.
    pub fn trim(&self) -> Option<TrimmedImage> {
        trim(&self.buffer, self.trim_padding)
    }

    /// Trim and encode as PNG.
    ///
    /// # Errors
    /// `EmptyCapture` on a blank surface; `Encode` if PNG encoding fails.
    pub fn export(&self) -> Result<CapturedSignature, SignError> {
        let trimmed = self.trim().ok_or(SignError::EmptyCapture)?;
        CapturedSignature::from_trimmed(&trimmed)
    }

    // ─── Rasterization ───────────────────────────────────────────────────

    fn width_for(&self, pressure: f32) -> f32 {
        if pressure.is_finite() && pressure > 0.0 {
            let p = pressure.min(1.0);
            self.min_stroke_width + (self.max_stroke_width - self.min_stroke_width) * p
        } else {
            self.stroke_width
        }
    }

    fn segment(&mut self, from: Point, from_width: f32, to: Point, to_width: f32) {
        let len = (to - from).hypot();
        let radius = f64::from(from_width.min(to_width)) / 2.0;
        let step = (radius * 0.5).max(0.5);
        let steps = (len / step).ceil().max(1.0) as u32;
        for i in 1..=steps {
            let t = f64::from(i) / f64::from(steps);
            let at = from.lerp(to, t);
            let width = from_width + (to_width - from_width) * t as f32;
            self.stamp(at, width);
        }
    }

    /// Paint an anti-aliased disc of diameter `width` centred on `at`.
    fn stamp(&mut self, at: Point, width: f32) {
        let (w, h) = self.buffer.dimensions();
        if w == 0 || h == 0 {
            return;
        }
        let r = (f64::from(width) / 2.0).max(0.5);
        let x0 = (at.x - r - 1.0).floor().max(0.0) as u32;
        let y0 = (at.y - r - 1.0).floor().max(0.0) as u32;
        let x1 = ((at.x + r + 1.0).ceil().max(0.0) as u32).min(w - 1);
        let y1 = ((at.y + r + 1.0).ceil().max(0.0) as u32).min(h - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = f64::from(x) + 0.5 - at.x;
                let dy = f64::from(y) + 0.5 - at.y;
                let coverage = (r + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let alpha = (coverage * 255.0).round() as u8;
                let px = self.buffer.get_pixel_mut(x, y);
                if alpha > px[3] {
                    *px = Rgba([self.ink[0], self.ink[1], self.ink[2], alpha]);
                }
            }
        }
    }
}
