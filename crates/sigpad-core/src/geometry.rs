//! Document-space geometry helpers.
//!
//! Two coordinate systems meet here:
//!
//! - **Document space** (points): origin at the page's bottom-left, y up.
//!   Everything stored in the placement store lives here.
//! - **Pixel space**: origin at the rendered page's top-left, y down.
//!   Pointer events arrive in this space.

use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Tolerance used when comparing document-space coordinates.
pub const EPSILON: f64 = 1e-6;

/// A corner of a placement, named as seen on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// The diagonally opposite corner.
    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    /// Unit direction pointing away from the opposite corner, in document
    /// space (`+x` right, `+y` up).
    pub fn outward(self) -> Vec2 {
        match self {
            Corner::TopLeft => Vec2::new(-1.0, 1.0),
            Corner::TopRight => Vec2::new(1.0, 1.0),
            Corner::BottomLeft => Vec2::new(-1.0, -1.0),
            Corner::BottomRight => Vec2::new(1.0, -1.0),
        }
    }

    /// Document-space location of this corner for a box whose bottom-left is
    /// `origin`.
    pub fn of(self, origin: Point, size: Size) -> Point {
        match self {
            Corner::BottomLeft => origin,
            Corner::BottomRight => Point::new(origin.x + size.width, origin.y),
            Corner::TopLeft => Point::new(origin.x, origin.y + size.height),
            Corner::TopRight => Point::new(origin.x + size.width, origin.y + size.height),
        }
    }

    /// Bottom-left origin of a `size` box that keeps this corner at `at`.
    pub fn origin_from(self, at: Point, size: Size) -> Point {
        match self {
            Corner::BottomLeft => at,
            Corner::BottomRight => Point::new(at.x - size.width, at.y),
            Corner::TopLeft => Point::new(at.x, at.y - size.height),
            Corner::TopRight => Point::new(at.x - size.width, at.y - size.height),
        }
    }
}

/// Convert a pixel-space movement into a document-space movement.
///
/// Divides by `scale` (pixels per point) and flips the vertical axis.
pub fn pixel_delta_to_document(delta: Vec2, scale: f64) -> Vec2 {
    Vec2::new(delta.x / scale, -delta.y / scale)
}

/// Whether two document points coincide within [`EPSILON`].
pub fn approx_eq(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

/// `true` when both dimensions are finite and strictly positive.
pub fn is_valid_extent(width: f64, height: f64) -> bool {
    width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_round_trip_through_origin() {
        let origin = Point::new(100.0, 100.0);
        let size = Size::new(150.0, 100.0);
        for corner in Corner::ALL {
            let at = corner.of(origin, size);
            assert!(approx_eq(corner.origin_from(at, size), origin), "{corner:?}");
        }
    }

    #[test]
    fn top_right_is_diagonal_of_bottom_left() {
        let origin = Point::new(100.0, 100.0);
        let size = Size::new(150.0, 100.0);
        assert_eq!(Corner::BottomLeft.opposite(), Corner::TopRight);
        assert_eq!(Corner::TopRight.of(origin, size), Point::new(250.0, 200.0));
    }

    #[test]
    fn pixel_delta_flips_y() {
        let d = pixel_delta_to_document(Vec2::new(50.0, -30.0), 2.0);
        assert_eq!(d, Vec2::new(25.0, 15.0));
    }

    #[test]
    fn extent_validation() {
        assert!(is_valid_extent(1.0, 1.0));
        assert!(!is_valid_extent(0.0, 1.0));
        assert!(!is_valid_extent(1.0, -2.0));
        assert!(!is_valid_extent(f64::NAN, 1.0));
        assert!(!is_valid_extent(f64::INFINITY, 1.0));
    }
}
