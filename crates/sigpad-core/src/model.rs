use crate::geometry::Corner;
use crate::id::PlacementId;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque handle to an encoded signature raster (a `data:` URL).
///
/// Cloning is cheap; several placements share the same payload.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(Arc<str>);

impl ImageRef {
    pub fn new(data: impl Into<Arc<str>>) -> Self {
        ImageRef(data.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Payloads are kilobytes of base64; show only the head.
        let head: String = self.0.chars().take(32).collect();
        write!(f, "ImageRef({head}… {} bytes)", self.0.len())
    }
}

/// One signature stamped on the document.
///
/// `position` is the bottom-left corner in document points.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub id: PlacementId,
    pub page_index: usize,
    pub position: Point,
    pub size: Size,
    pub image: ImageRef,
}

impl Placement {
    /// Width over height.
    pub fn aspect(&self) -> f64 {
        self.size.width / self.size.height
    }

    /// Document-space location of a corner.
    pub fn corner(&self, corner: Corner) -> Point {
        corner.of(self.position, self.size)
    }

    /// Document-space bounds (y up, so `y0` is the bottom edge).
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    pub fn contains(&self, p: Point) -> bool {
        self.bounds().contains(p)
    }
}
