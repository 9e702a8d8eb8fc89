//! Signing board: the one object a host screen talks to.
//!
//! Ties together the viewport tracker, the placement store, the interaction
//! controller and the signature cache, and exposes the operations the
//! signing screen needs:
//!
//! - **Document**: page natural size and container width come in from the
//!   page renderer and layout observer.
//! - **Signatures**: place a freshly captured signature, or re-use the cached
//!   one; remove, select, clear.
//! - **Gestures**: pointer / touch events are hit-tested (or targeted by the
//!   host) and routed to the controller.
//! - **Submission**: the placement list is turned into stamping records.

use crate::controller::{InteractionController, Outcome};
use crate::hit::{HitTarget, PlacementView, hit_test, placement_views};
use crate::input::InputEvent;
use crate::listeners::ListenerHost;
use sigpad_capture::{CaptureSurface, CapturedSignature};
use sigpad_core::submit::{self, SigningEndpoint, SubmissionRecord};
use sigpad_core::{
    ImageRef, KeyValueStorage, PlacementId, PlacementStore, SignError, SignatureCache,
    SigningConfig, Size, ViewportMetrics, ViewportTracker,
};

pub struct SigningBoard<S: KeyValueStorage> {
    config: SigningConfig,
    viewport: ViewportTracker,
    store: PlacementStore,
    controller: InteractionController,
    cache: SignatureCache<S>,
}

impl<S: KeyValueStorage> SigningBoard<S> {
    pub fn new(config: SigningConfig, storage: S) -> Self {
        let cache = SignatureCache::new(storage, config.cache_key.clone());
        Self {
            viewport: ViewportTracker::new(),
            store: PlacementStore::new(config.default_width),
            controller: InteractionController::new(&config),
            cache,
            config,
        }
    }

    pub fn config(&self) -> &SigningConfig {
        &self.config
    }

    pub fn store(&self) -> &PlacementStore {
        &self.store
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn cache_mut(&mut self) -> &mut SignatureCache<S> {
        &mut self.cache
    }

    // ─── Document ────────────────────────────────────────────────────────

    /// The page renderer reported the page's natural size in points.
    pub fn set_page_natural_size(&mut self, width: f64, height: f64) -> bool {
        self.viewport.set_page_natural_size(Size::new(width, height))
    }

    /// The layout observer reported a new container width in pixels.
    /// A running gesture keeps the scale it started with.
    pub fn set_container_width(&mut self, width: f64) -> bool {
        self.viewport.set_container_width(width)
    }

    pub fn metrics(&self) -> Option<ViewportMetrics> {
        self.viewport.metrics()
    }

    pub fn is_ready(&self) -> bool {
        self.viewport.is_ready()
    }

    // ─── Signatures ──────────────────────────────────────────────────────

    /// Place an image of `natural_width` x `natural_height` pixels centered
    /// on the page.
    ///
    /// # Errors
    /// `ViewportNotReady` before the page has reported its size;
    /// `InvalidImageDimensions` for unusable dimensions, in which case the
    /// cached signature is dropped as well.
    pub fn place_signature(
        &mut self,
        image: ImageRef,
        natural_width: f64,
        natural_height: f64,
    ) -> Result<PlacementId, SignError> {
        let metrics = self.viewport.require()?;
        match self
            .store
            .add(image, natural_width, natural_height, metrics.page_natural_size)
        {
            Ok(p) => Ok(p.id),
            Err(e) => {
                if e.needs_recapture() {
                    self.cache.clear();
                }
                Err(e)
            }
        }
    }

    /// Export the capture surface, remember it as the last signature, and
    /// place it.
    ///
    /// The viewport is checked first so a not-ready page never costs the
    /// operator their drawing.
    pub fn finish_capture(&mut self, surface: &CaptureSurface) -> Result<PlacementId, SignError> {
        self.viewport.require()?;
        let captured = surface.export()?;
        self.place_captured(captured)
    }

    pub fn place_captured(&mut self, captured: CapturedSignature) -> Result<PlacementId, SignError> {
        let width = f64::from(captured.width);
        let height = f64::from(captured.height);
        let id = self.place_signature(captured.image.clone(), width, height)?;
        self.cache.save(&captured.image, width, height);
        Ok(id)
    }

    /// Place the last cached signature. `Ok(None)` when there is no usable
    /// cached signature and the operator has to draw one.
    pub fn place_cached(&mut self) -> Result<Option<PlacementId>, SignError> {
        self.viewport.require()?;
        let Some(cached) = self.cache.load() else {
            return Ok(None);
        };
        self.place_signature(cached.image, cached.width, cached.height)
            .map(Some)
    }

    pub fn has_cached_signature(&mut self) -> bool {
        self.cache.load().is_some()
    }

    pub fn remove(&mut self, id: PlacementId) -> bool {
        if self.controller.session().is_some_and(|s| s.target == id) {
            self.controller.cancel();
        }
        self.store.remove(id).is_some()
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.store.selected() {
            Some(id) => self.remove(id),
            None => false,
        }
    }

    pub fn select(&mut self, id: Option<PlacementId>) -> bool {
        self.store.select(id)
    }

    /// End of the signing session: drop every placement.
    pub fn clear(&mut self) {
        self.controller.cancel();
        self.store.clear();
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    /// What lies under a pixel position, if the viewport is ready.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<HitTarget> {
        let metrics = self.viewport.metrics()?;
        hit_test(&self.store, &metrics, &self.config, sigpad_core::Point::new(x, y))
    }

    /// Start a gesture, hit-testing the start position to find the target.
    /// A start on a delete button removes that placement.
    pub fn pointer_down(
        &mut self,
        event: &InputEvent,
        host: &dyn ListenerHost,
    ) -> Result<Outcome, SignError> {
        let target = match event.position() {
            Some(p) => self.hit_test(p.x, p.y),
            None => None,
        };
        self.pointer_down_on(event, target, host)
    }

    /// Start a gesture on a target the host already knows (DOM hosts know
    /// which element was pressed).
    pub fn pointer_down_on(
        &mut self,
        event: &InputEvent,
        target: Option<HitTarget>,
        host: &dyn ListenerHost,
    ) -> Result<Outcome, SignError> {
        if let Some(HitTarget::DeleteButton(id)) = target {
            if !self.controller.is_active() && matches!(event, InputEvent::Start { .. }) {
                self.remove(id);
            }
            return Ok(Outcome::Ignored);
        }
        self.controller
            .begin(event, target, &mut self.store, self.viewport.metrics(), host)
    }

    /// Route a move / end / cancel event (from the window listeners).
    pub fn pointer_event(&mut self, event: &InputEvent) -> Outcome {
        self.controller.handle(event, &mut self.store)
    }

    /// Apply coalesced moves. Call from the animation-frame callback.
    pub fn flush_frame(&mut self) -> Outcome {
        self.controller.flush_frame(&mut self.store)
    }

    /// Abort any running gesture (window blur, screen unmount).
    pub fn cancel_gesture(&mut self) -> Outcome {
        self.controller.cancel()
    }

    /// Pixel-space layout for rendering; empty until the viewport is ready.
    pub fn views(&self) -> Vec<PlacementView> {
        match self.viewport.metrics() {
            Some(metrics) => placement_views(&self.store, &metrics),
            None => Vec::new(),
        }
    }

    // ─── Submission ──────────────────────────────────────────────────────

    pub fn submission(&self) -> Result<Vec<SubmissionRecord>, SignError> {
        submit::build_submission(&self.store)
    }

    pub fn submit(&self, endpoint: &mut dyn SigningEndpoint) -> Result<usize, SignError> {
        submit::submit(&self.store, endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modality;
    use crate::listeners::NoWindow;
    use sigpad_core::MemoryStorage;

    fn board() -> SigningBoard<MemoryStorage> {
        SigningBoard::new(SigningConfig::default(), MemoryStorage::new())
    }

    fn ready_board() -> SigningBoard<MemoryStorage> {
        let mut b = board();
        b.set_page_natural_size(612.0, 792.0);
        b.set_container_width(612.0);
        b
    }

    #[test]
    fn placing_before_ready_is_blocked() {
        let mut b = board();
        assert_eq!(
            b.place_signature(ImageRef::new("data:a"), 10.0, 10.0),
            Err(SignError::ViewportNotReady)
        );
        b.set_container_width(800.0);
        assert_eq!(
            b.place_signature(ImageRef::new("data:a"), 10.0, 10.0),
            Err(SignError::ViewportNotReady)
        );
        assert!(b.store().is_empty());
    }

    #[test]
    fn invalid_dimensions_clear_cache() {
        let mut b = ready_board();
        b.cache_mut().save(&ImageRef::new("data:a"), 40.0, 20.0);
        let err = b
            .place_signature(ImageRef::new("data:a"), f64::NAN, 20.0)
            .unwrap_err();
        assert!(err.needs_recapture());
        assert!(!b.has_cached_signature());
    }

    #[test]
    fn cached_signature_is_reused() {
        let mut b = ready_board();
        assert_eq!(b.place_cached(), Ok(None));
        b.cache_mut().save(&ImageRef::new("data:a"), 300.0, 100.0);
        let id = b.place_cached().unwrap().unwrap();
        let p = b.store().get(id).unwrap();
        assert_eq!(p.size, Size::new(150.0, 50.0));
    }

    #[test]
    fn delete_button_removes_without_session() {
        let mut b = ready_board();
        let id = b.place_signature(ImageRef::new("data:a"), 3.0, 2.0).unwrap();
        let out = b
            .pointer_down_on(
                &InputEvent::start(0.0, 0.0, Modality::Pointer),
                Some(HitTarget::DeleteButton(id)),
                &NoWindow,
            )
            .unwrap();
        assert_eq!(out, Outcome::Ignored);
        assert!(b.store().is_empty());
        assert!(!b.controller().is_active());
    }

    #[test]
    fn removing_dragged_placement_cancels_session() {
        let mut b = ready_board();
        let id = b.place_signature(ImageRef::new("data:a"), 3.0, 2.0).unwrap();
        b.pointer_down_on(
            &InputEvent::start(0.0, 0.0, Modality::Pointer),
            Some(HitTarget::Body(id)),
            &NoWindow,
        )
        .unwrap();
        assert!(b.controller().is_active());
        assert!(b.delete_selected());
        assert!(!b.controller().is_active());
    }

    #[test]
    fn empty_board_does_not_submit() {
        let b = ready_board();
        assert_eq!(b.submission(), Err(SignError::NoPlacements));
    }

    #[test]
    fn views_empty_until_ready() {
        let mut b = board();
        assert!(b.views().is_empty());
        b.set_page_natural_size(612.0, 792.0);
        b.set_container_width(306.0);
        b.place_signature(ImageRef::new("data:a"), 3.0, 2.0).unwrap();
        let views = b.views();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].width, 75.0);
    }
}
