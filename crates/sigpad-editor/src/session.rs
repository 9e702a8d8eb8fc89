//! Interaction sessions: the transient geometry of one drag or resize.
//!
//! A session snapshots everything it needs at start (origin, start position,
//! anchor, aspect, scale) and recomputes the target's geometry from those
//! snapshots on every move. Nothing accumulates between moves, so there is no
//! drift no matter how many events arrive.

use crate::input::Modality;
use sigpad_core::geometry::pixel_delta_to_document;
use sigpad_core::{Corner, Placement, PlacementId, Point, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Drag,
    Resize,
}

/// Translate-only gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    /// Pointer position at start, in pixels.
    pub origin_px: Point,
    /// Placement position at start, in points.
    pub start_position: Point,
    pub size: Size,
}

impl DragGesture {
    pub fn geometry_at(&self, px: Point, scale: f64) -> (Point, Size) {
        let delta = pixel_delta_to_document(px - self.origin_px, scale);
        (self.start_position + delta, self.size)
    }
}

/// Aspect-locked resize around a fixed anchor corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeGesture {
    /// The grabbed corner.
    pub handle: Corner,
    /// Document position of the opposite corner; never moves.
    pub anchor: Point,
    /// Width over height at start.
    pub aspect: f64,
    /// Document position of the grabbed corner at start.
    pub handle_start: Point,
    pub origin_px: Point,
    /// Smaller side may not shrink below this, in points.
    pub min_side: f64,
}

impl ResizeGesture {
    pub fn begin(placement: &Placement, handle: Corner, origin_px: Point, min_side: f64) -> Self {
        Self {
            handle,
            anchor: placement.corner(handle.opposite()),
            aspect: placement.aspect(),
            handle_start: placement.corner(handle),
            origin_px,
            min_side,
        }
    }

    pub fn geometry_at(&self, px: Point, scale: f64) -> (Point, Size) {
        let delta = pixel_delta_to_document(px - self.origin_px, scale);
        let handle = self.handle_start + delta;
        let outward = self.handle.outward();

        // Extent from the anchor, positive while the handle stays on its side.
        let cand_w = (handle.x - self.anchor.x) * outward.x;
        let cand_h = (handle.y - self.anchor.y) * outward.y;

        // The axis that moved more decides; the other follows the aspect.
        let (w, h) = if delta.x.abs() >= delta.y.abs() {
            let w = cand_w.max(0.0);
            (w, w / self.aspect)
        } else {
            let h = cand_h.max(0.0);
            (h * self.aspect, h)
        };
        let size = clamp_to_min_side(w, h, self.aspect, self.min_side);
        let position = self.handle.opposite().origin_from(self.anchor, size);
        (position, size)
    }
}

/// Grow `w` x `h` to the smallest aspect-preserving size whose smaller side
/// is `min_side`, if it is below that.
pub fn clamp_to_min_side(w: f64, h: f64, aspect: f64, min_side: f64) -> Size {
    let (min_w, min_h) = if aspect >= 1.0 {
        (min_side * aspect, min_side)
    } else {
        (min_side, min_side / aspect)
    };
    if !(w >= min_w && h >= min_h) {
        Size::new(min_w, min_h)
    } else {
        Size::new(w, h)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Drag(DragGesture),
    Resize(ResizeGesture),
}

/// One active drag or resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionSession {
    pub target: PlacementId,
    /// Event family that started the session; the other family is ignored.
    pub modality: Modality,
    /// Pixels per point, frozen for the session's lifetime.
    pub scale: f64,
    pub gesture: Gesture,
}

impl InteractionSession {
    pub fn drag(placement: &Placement, origin_px: Point, modality: Modality, scale: f64) -> Self {
        Self {
            target: placement.id,
            modality,
            scale,
            gesture: Gesture::Drag(DragGesture {
                origin_px,
                start_position: placement.position,
                size: placement.size,
            }),
        }
    }

    pub fn resize(
        placement: &Placement,
        handle: Corner,
        origin_px: Point,
        modality: Modality,
        scale: f64,
        min_side: f64,
    ) -> Self {
        Self {
            target: placement.id,
            modality,
            scale,
            gesture: Gesture::Resize(ResizeGesture::begin(placement, handle, origin_px, min_side)),
        }
    }

    pub fn mode(&self) -> SessionMode {
        match self.gesture {
            Gesture::Drag(_) => SessionMode::Drag,
            Gesture::Resize(_) => SessionMode::Resize,
        }
    }

    /// Target geometry for the pointer at `px`.
    pub fn geometry_at(&self, px: Point) -> (Point, Size) {
        match &self.gesture {
            Gesture::Drag(g) => g.geometry_at(px, self.scale),
            Gesture::Resize(g) => g.geometry_at(px, self.scale),
        }
    }
}
