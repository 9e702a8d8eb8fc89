//! Hit testing: pixel position → placement / affordance lookup.
//!
//! Affordances (delete button, resize handles) exist only on the selected
//! placement and are checked first. Bodies are checked topmost-first.

use serde::Serialize;
use sigpad_core::{Corner, Placement, PlacementId, PlacementStore, Point, SigningConfig, ViewportMetrics};

/// What a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// The signature image itself (drag).
    Body(PlacementId),
    /// A corner handle (resize).
    ResizeHandle(PlacementId, Corner),
    /// The delete button.
    DeleteButton(PlacementId),
}

impl HitTarget {
    pub fn placement(&self) -> PlacementId {
        match self {
            HitTarget::Body(id) | HitTarget::ResizeHandle(id, _) | HitTarget::DeleteButton(id) => {
                *id
            }
        }
    }
}

/// A placement laid out in page pixels, for the host to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementView {
    pub id: PlacementId,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub selected: bool,
    pub image: String,
}

/// Pixel rectangle of a placement: `(left, top, width, height)`.
pub fn pixel_rect(p: &Placement, metrics: &ViewportMetrics) -> (f64, f64, f64, f64) {
    let top_left = metrics.to_pixels(p.corner(Corner::TopLeft));
    (
        top_left.x,
        top_left.y,
        metrics.len_to_pixels(p.size.width),
        metrics.len_to_pixels(p.size.height),
    )
}

/// Pixel center of a corner handle.
pub fn handle_center(p: &Placement, corner: Corner, metrics: &ViewportMetrics) -> Point {
    metrics.to_pixels(p.corner(corner))
}

/// Pixel center of the delete button: one button-height above the top-right corner.
pub fn delete_button_center(p: &Placement, metrics: &ViewportMetrics, button_size: f64) -> Point {
    let tr = metrics.to_pixels(p.corner(Corner::TopRight));
    Point::new(tr.x, tr.y - button_size)
}

fn in_square(px: Point, center: Point, side: f64) -> bool {
    let half = side / 2.0;
    (px.x - center.x).abs() <= half && (px.y - center.y).abs() <= half
}

/// Find what lies under pixel position `px`. `None` means background.
pub fn hit_test(
    store: &PlacementStore,
    metrics: &ViewportMetrics,
    config: &SigningConfig,
    px: Point,
) -> Option<HitTarget> {
    if let Some(selected) = store.selected_placement() {
        let button = delete_button_center(selected, metrics, config.delete_button_size);
        if in_square(px, button, config.delete_button_size) {
            return Some(HitTarget::DeleteButton(selected.id));
        }
        for corner in Corner::ALL {
            if in_square(px, handle_center(selected, corner, metrics), config.handle_size) {
                return Some(HitTarget::ResizeHandle(selected.id, corner));
            }
        }
    }

    let doc = metrics.to_document(px);
    store
        .iter()
        .rev()
        .find(|p| p.contains(doc))
        .map(|p| HitTarget::Body(p.id))
}

/// Pixel-space views of every placement, back to front.
pub fn placement_views(store: &PlacementStore, metrics: &ViewportMetrics) -> Vec<PlacementView> {
    let selected = store.selected();
    store
        .iter()
        .map(|p| {
            let (left, top, width, height) = pixel_rect(p, metrics);
            PlacementView {
                id: p.id,
                left,
                top,
                width,
                height,
                selected: selected == Some(p.id),
                image: p.image.as_str().to_string(),
            }
        })
        .collect()
}
