//! Placement store: the single source of truth for what is on the page.
//!
//! Ordered back-to-front (the last placement paints on top). Interaction
//! sessions write derived geometry back through [`PlacementStore::set_geometry`];
//! everything else is add / remove / select.

use crate::error::SignError;
use crate::geometry::is_valid_extent;
use crate::id::PlacementId;
use crate::model::{ImageRef, Placement};
use kurbo::{Point, Size};

#[derive(Debug, Clone)]
pub struct PlacementStore {
    placements: Vec<Placement>,
    selected: Option<PlacementId>,
    /// Width in points given to newly added placements.
    default_width: f64,
}

impl Default for PlacementStore {
    fn default() -> Self {
        Self::new(150.0)
    }
}

impl PlacementStore {
    pub fn new(default_width: f64) -> Self {
        Self {
            placements: Vec::new(),
            selected: None,
            default_width,
        }
    }

    /// Add a signature centered on a page of `page_size` points.
    ///
    /// The placement gets the store's default width and a height that keeps
    /// the image's aspect ratio, and becomes the selection.
    ///
    /// # Errors
    /// `InvalidImageDimensions` if either natural dimension is zero, negative
    /// or non-finite, or if the aspect ratio is so extreme that the derived
    /// size or centered position is not a finite, positive geometry.
    pub fn add(
        &mut self,
        image: ImageRef,
        natural_width: f64,
        natural_height: f64,
        page_size: Size,
    ) -> Result<&Placement, SignError> {
        if !is_valid_extent(natural_width, natural_height) {
            log::warn!("rejecting signature with dimensions {natural_width}x{natural_height}");
            return Err(SignError::InvalidImageDimensions {
                width: natural_width,
                height: natural_height,
            });
        }
        let width = self.default_width;
        let height = width * natural_height / natural_width;
        let position = Point::new(
            (page_size.width - width) / 2.0,
            (page_size.height - height) / 2.0,
        );
        if !is_valid_extent(width, height) || !position.is_finite() {
            log::warn!(
                "rejecting signature with dimensions {natural_width}x{natural_height}: \
                 derived size {width}x{height}"
            );
            return Err(SignError::InvalidImageDimensions {
                width: natural_width,
                height: natural_height,
            });
        }
        let placement = Placement {
            id: PlacementId::generate(),
            page_index: 0,
            position,
            size: Size::new(width, height),
            image,
        };
        log::debug!(
            "added {} at ({}, {}) size {}x{}",
            placement.id,
            position.x,
            position.y,
            width,
            height
        );
        self.selected = Some(placement.id);
        self.placements.push(placement);
        Ok(&self.placements[self.placements.len() - 1])
    }

    /// Remove a placement. Clears the selection if it pointed at it.
    pub fn remove(&mut self, id: PlacementId) -> Option<Placement> {
        let pos = self.placements.iter().position(|p| p.id == id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        log::debug!("removed {id}");
        Some(self.placements.remove(pos))
    }

    /// Select a placement, or clear the selection with `None`.
    /// Returns `false` (and leaves the selection alone) for unknown IDs.
    pub fn select(&mut self, id: Option<PlacementId>) -> bool {
        match id {
            Some(id) if self.get(id).is_none() => false,
            other => {
                self.selected = other;
                true
            }
        }
    }

    pub fn selected(&self) -> Option<PlacementId> {
        self.selected
    }

    pub fn selected_placement(&self) -> Option<&Placement> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: PlacementId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.id == id)
    }

    /// Write new position and size for a placement.
    ///
    /// # Errors
    /// `UnknownPlacement` if the ID is gone, `InvalidImageDimensions` if the
    /// size is degenerate.
    pub fn set_geometry(
        &mut self,
        id: PlacementId,
        position: Point,
        size: Size,
    ) -> Result<(), SignError> {
        if !is_valid_extent(size.width, size.height) || !position.is_finite() {
            return Err(SignError::InvalidImageDimensions {
                width: size.width,
                height: size.height,
            });
        }
        let placement = self
            .placements
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(SignError::UnknownPlacement(id))?;
        placement.position = position;
        placement.size = size;
        Ok(())
    }

    /// Back-to-front iteration.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Placement> {
        self.placements.iter()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Drop every placement (end of the signing session).
    pub fn clear(&mut self) {
        self.placements.clear();
        self.selected = None;
    }
}
