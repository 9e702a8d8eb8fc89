//! Input abstraction layer.
//!
//! Browsers deliver one physical touch as both a unified pointer event and a
//! raw touch event. Every event here carries the family it came from
//! (`Modality`) so an interaction session can ignore the duplicate family.

use serde::{Deserialize, Serialize};
use sigpad_core::Point;

/// Event family an input came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Modality {
    /// Unified pointer events (mouse, pen, and touch via `pointer*`).
    Pointer,
    /// Raw `touch*` events.
    Touch,
}

impl Modality {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "pointer" => Some(Modality::Pointer),
            "touch" => Some(Modality::Touch),
            _ => None,
        }
    }
}

/// A normalized gesture event, positions in page pixels (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed / touch started.
    Start { x: f64, y: f64, modality: Modality },

    /// Pointer / touch moved.
    Move { x: f64, y: f64, modality: Modality },

    /// Pointer released / touch ended.
    End { x: f64, y: f64, modality: Modality },

    /// The platform aborted the gesture (pointercancel, touchcancel, blur).
    Cancel { modality: Modality },
}

impl InputEvent {
    pub fn start(x: f64, y: f64, modality: Modality) -> Self {
        Self::Start { x, y, modality }
    }

    pub fn moved(x: f64, y: f64, modality: Modality) -> Self {
        Self::Move { x, y, modality }
    }

    pub fn end(x: f64, y: f64, modality: Modality) -> Self {
        Self::End { x, y, modality }
    }

    pub fn cancel(modality: Modality) -> Self {
        Self::Cancel { modality }
    }

    pub fn modality(&self) -> Modality {
        match self {
            Self::Start { modality, .. }
            | Self::Move { modality, .. }
            | Self::End { modality, .. }
            | Self::Cancel { modality } => *modality,
        }
    }

    /// Extract position; `None` for cancel and for non-finite coordinates.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::Start { x, y, .. } | Self::Move { x, y, .. } | Self::End { x, y, .. }
                if x.is_finite() && y.is_finite() =>
            {
                Some(Point::new(*x, *y))
            }
            _ => None,
        }
    }
}
