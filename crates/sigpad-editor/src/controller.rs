//! Interaction controller: input events → placement geometry.
//!
//! Holds at most one [`InteractionSession`] together with the listener guard
//! that keeps the window listeners alive for it. Session geometry stays in
//! here; only the derived position/size is written into the store.
//!
//! ## Event routing
//!
//! | Event | No session | Session active |
//! |-------|------------|----------------|
//! | Start on body | start drag | ignored |
//! | Start on handle | start resize | ignored |
//! | Start on delete button | ignored | ignored |
//! | Move / End / Cancel, same family | ignored | apply / finish |
//! | Any event, other family | ignored | ignored |

use crate::hit::HitTarget;
use crate::input::{InputEvent, Modality};
use crate::listeners::{ListenerGuard, ListenerHost};
use crate::session::{InteractionSession, SessionMode};
use sigpad_core::{PlacementId, PlacementStore, Point, SignError, SigningConfig, Size, ViewportMetrics};

/// What an event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Ignored,
    Started {
        id: PlacementId,
        mode: SessionMode,
    },
    /// A move was stashed until the next frame.
    Deferred,
    Updated {
        id: PlacementId,
        position: Point,
        size: Size,
    },
    Ended {
        id: PlacementId,
    },
    Cancelled {
        id: PlacementId,
    },
}

#[derive(Debug)]
struct ActiveSession {
    session: InteractionSession,
    listeners: ListenerGuard,
    /// Latest unapplied pointer position (frame coalescing).
    pending: Option<Point>,
}

#[derive(Debug)]
pub struct InteractionController {
    active: Option<ActiveSession>,
    coalesce_moves: bool,
    /// Sizing rules (minimum side) read at resize start.
    sizing: SigningConfig,
}

impl InteractionController {
    pub fn new(config: &SigningConfig) -> Self {
        Self {
            active: None,
            coalesce_moves: config.coalesce_moves,
            sizing: config.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn session(&self) -> Option<&InteractionSession> {
        self.active.as_ref().map(|a| &a.session)
    }

    /// Modality of the running session, if any.
    pub fn modality(&self) -> Option<Modality> {
        self.session().map(|s| s.modality)
    }

    fn min_side(&self, size: Size) -> f64 {
        self.sizing.min_side_for(size.width, size.height)
    }

    /// Try to start a session from a `Start` event on `target`.
    ///
    /// A start on the background clears the selection; a start on a body or
    /// handle selects that placement.
    ///
    /// # Errors
    /// `ViewportNotReady` when no scale is available yet;
    /// `UnknownPlacement` when the target is no longer in the store.
    pub fn begin(
        &mut self,
        event: &InputEvent,
        target: Option<HitTarget>,
        store: &mut PlacementStore,
        metrics: Option<ViewportMetrics>,
        host: &dyn ListenerHost,
    ) -> Result<Outcome, SignError> {
        let InputEvent::Start { modality, .. } = *event else {
            return Ok(Outcome::Ignored);
        };
        let Some(origin) = event.position() else {
            return Ok(Outcome::Ignored);
        };
        if let Some(active) = &self.active {
            log::debug!(
                "controller: ignoring {modality:?} start during {:?} session",
                active.session.modality
            );
            return Ok(Outcome::Ignored);
        }

        let Some(target) = target else {
            store.select(None);
            return Ok(Outcome::Ignored);
        };
        if let HitTarget::DeleteButton(_) = target {
            return Ok(Outcome::Ignored);
        }

        let id = target.placement();
        let placement = store.get(id).ok_or(SignError::UnknownPlacement(id))?.clone();
        let metrics = metrics.ok_or(SignError::ViewportNotReady)?;
        store.select(Some(id));

        let session = match target {
            HitTarget::Body(_) => {
                InteractionSession::drag(&placement, origin, modality, metrics.scale)
            }
            HitTarget::ResizeHandle(_, corner) => InteractionSession::resize(
                &placement,
                corner,
                origin,
                modality,
                metrics.scale,
                self.min_side(placement.size),
            ),
            HitTarget::DeleteButton(_) => return Ok(Outcome::Ignored),
        };

        let listeners = match ListenerGuard::attach(host, modality) {
            Ok(guard) => guard,
            Err(e) => {
                log::warn!("controller: could not attach window listeners: {e}");
                return Ok(Outcome::Ignored);
            }
        };

        let mode = session.mode();
        log::debug!("controller: {mode:?} {id} started via {modality:?}");
        self.active = Some(ActiveSession {
            session,
            listeners,
            pending: None,
        });
        Ok(Outcome::Started { id, mode })
    }

    /// Route a move / end / cancel event to the active session.
    pub fn handle(&mut self, event: &InputEvent, store: &mut PlacementStore) -> Outcome {
        let Some(active) = self.active.as_mut() else {
            return Outcome::Ignored;
        };
        if event.modality() != active.session.modality {
            return Outcome::Ignored;
        }

        match event {
            InputEvent::Start { .. } => Outcome::Ignored,
            InputEvent::Move { .. } => {
                let Some(px) = event.position() else {
                    return Outcome::Ignored;
                };
                if self.coalesce_moves {
                    active.pending = Some(px);
                    return Outcome::Deferred;
                }
                self.apply(px, store)
            }
            InputEvent::End { .. } => {
                if let Some(px) = event.position() {
                    active.pending = Some(px);
                }
                self.flush_frame(store);
                self.finish(false)
            }
            InputEvent::Cancel { .. } => {
                self.flush_frame(store);
                self.finish(true)
            }
        }
    }

    /// Apply a stashed move, if any. Call once per animation frame.
    pub fn flush_frame(&mut self, store: &mut PlacementStore) -> Outcome {
        let Some(px) = self.active.as_mut().and_then(|a| a.pending.take()) else {
            return Outcome::Ignored;
        };
        self.apply(px, store)
    }

    /// Abort the running session from outside (blur, target removed,
    /// unmount). Geometry already applied is kept.
    pub fn cancel(&mut self) -> Outcome {
        if self.active.is_none() {
            return Outcome::Ignored;
        }
        self.finish(true)
    }

    fn apply(&mut self, px: Point, store: &mut PlacementStore) -> Outcome {
        let Some(active) = self.active.as_ref() else {
            return Outcome::Ignored;
        };
        let id = active.session.target;
        let (position, size) = active.session.geometry_at(px);
        log::trace!(
            "controller: {id} -> ({}, {}) {}x{}",
            position.x,
            position.y,
            size.width,
            size.height
        );
        match store.set_geometry(id, position, size) {
            Ok(()) => Outcome::Updated { id, position, size },
            Err(e) => {
                log::warn!("controller: dropping session, {e}");
                self.finish(true)
            }
        }
    }

    fn finish(&mut self, cancelled: bool) -> Outcome {
        let Some(mut active) = self.active.take() else {
            return Outcome::Ignored;
        };
        active.listeners.release();
        let id = active.session.target;
        log::debug!(
            "controller: {:?} {id} {}",
            active.session.mode(),
            if cancelled { "cancelled" } else { "ended" }
        );
        if cancelled {
            Outcome::Cancelled { id }
        } else {
            Outcome::Ended { id }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listeners::testing::RecordingHost;
    use sigpad_core::{Corner, ImageRef};

    struct Fixture {
        store: PlacementStore,
        metrics: ViewportMetrics,
        controller: InteractionController,
        host: RecordingHost,
        id: PlacementId,
    }

    fn fixture(config: SigningConfig) -> Fixture {
        let metrics = ViewportMetrics::compute(Size::new(400.0, 600.0), 800.0).unwrap();
        let mut store = PlacementStore::new(config.default_width);
        let id = store
            .add(ImageRef::new("data:a"), 300.0, 200.0, metrics.page_natural_size)
            .unwrap()
            .id;
        store
            .set_geometry(id, Point::new(100.0, 100.0), Size::new(150.0, 100.0))
            .unwrap();
        Fixture {
            store,
            metrics,
            controller: InteractionController::new(&config),
            host: RecordingHost::default(),
            id,
        }
    }

    impl Fixture {
        fn begin(&mut self, event: InputEvent, target: Option<HitTarget>) -> Result<Outcome, SignError> {
            self.controller
                .begin(&event, target, &mut self.store, Some(self.metrics), &self.host)
        }

        fn position(&self) -> Point {
            self.store.get(self.id).unwrap().position
        }
    }

    #[test]
    fn drag_at_scale_two_halves_pixel_delta() {
        let mut f = fixture(SigningConfig::default());
        let out = f
            .begin(InputEvent::start(300.0, 800.0, Modality::Pointer), Some(HitTarget::Body(f.id)))
            .unwrap();
        assert_eq!(out, Outcome::Started { id: f.id, mode: SessionMode::Drag });

        f.controller
            .handle(&InputEvent::moved(350.0, 770.0, Modality::Pointer), &mut f.store);
        assert_eq!(f.position(), Point::new(125.0, 115.0));

        let out = f
            .controller
            .handle(&InputEvent::end(350.0, 770.0, Modality::Pointer), &mut f.store);
        assert_eq!(out, Outcome::Ended { id: f.id });
        assert_eq!(f.position(), Point::new(125.0, 115.0));
        assert_eq!(f.host.live(), 0);
    }

    #[test]
    fn zero_movement_drag_leaves_position() {
        let mut f = fixture(SigningConfig::default());
        f.begin(InputEvent::start(10.0, 10.0, Modality::Touch), Some(HitTarget::Body(f.id)))
            .unwrap();
        f.controller
            .handle(&InputEvent::end(10.0, 10.0, Modality::Touch), &mut f.store);
        assert_eq!(f.position(), Point::new(100.0, 100.0));
    }

    #[test]
    fn other_modality_is_ignored() {
        let mut f = fixture(SigningConfig::default());
        f.begin(InputEvent::start(0.0, 0.0, Modality::Touch), Some(HitTarget::Body(f.id)))
            .unwrap();

        let out = f
            .controller
            .handle(&InputEvent::moved(100.0, 0.0, Modality::Pointer), &mut f.store);
        assert_eq!(out, Outcome::Ignored);
        assert_eq!(f.position(), Point::new(100.0, 100.0));

        // A pointerup synthesized for the same touch must not end the session.
        let out = f
            .controller
            .handle(&InputEvent::end(100.0, 0.0, Modality::Pointer), &mut f.store);
        assert_eq!(out, Outcome::Ignored);
        assert!(f.controller.is_active());

        let out = f
            .controller
            .handle(&InputEvent::moved(20.0, 0.0, Modality::Touch), &mut f.store);
        assert!(matches!(out, Outcome::Updated { .. }));
        assert_eq!(f.position(), Point::new(110.0, 100.0));
    }

    #[test]
    fn second_start_is_ignored_while_active() {
        let mut f = fixture(SigningConfig::default());
        f.begin(InputEvent::start(0.0, 0.0, Modality::Pointer), Some(HitTarget::Body(f.id)))
            .unwrap();
        let out = f
            .begin(
                InputEvent::start(0.0, 0.0, Modality::Touch),
                Some(HitTarget::ResizeHandle(f.id, Corner::TopLeft)),
            )
            .unwrap();
        assert_eq!(out, Outcome::Ignored);
        assert_eq!(f.controller.session().unwrap().mode(), SessionMode::Drag);
        assert_eq!(f.host.attached(), 1);
    }

    #[test]
    fn delete_button_never_starts_drag() {
        let mut f = fixture(SigningConfig::default());
        let out = f
            .begin(InputEvent::start(0.0, 0.0, Modality::Pointer), Some(HitTarget::DeleteButton(f.id)))
            .unwrap();
        assert_eq!(out, Outcome::Ignored);
        assert!(!f.controller.is_active());
        assert_eq!(f.host.attached(), 0);
    }

    #[test]
    fn not_ready_viewport_blocks_start() {
        let mut f = fixture(SigningConfig::default());
        let err = f
            .controller
            .begin(
                &InputEvent::start(0.0, 0.0, Modality::Pointer),
                Some(HitTarget::Body(f.id)),
                &mut f.store,
                None,
                &f.host,
            )
            .unwrap_err();
        assert_eq!(err, SignError::ViewportNotReady);
        assert!(!f.controller.is_active());
        assert_eq!(f.host.attached(), 0);
    }

    #[test]
    fn background_start_clears_selection() {
        let mut f = fixture(SigningConfig::default());
        assert_eq!(f.store.selected(), Some(f.id));
        f.begin(InputEvent::start(0.0, 0.0, Modality::Pointer), None).unwrap();
        assert_eq!(f.store.selected(), None);
    }

    #[test]
    fn resize_keeps_anchor() {
        let mut f = fixture(SigningConfig::default());
        f.store.select(None);
        let out = f
            .begin(
                InputEvent::start(200.0, 1000.0, Modality::Pointer),
                Some(HitTarget::ResizeHandle(f.id, Corner::BottomLeft)),
            )
            .unwrap();
        assert_eq!(out, Outcome::Started { id: f.id, mode: SessionMode::Resize });
        assert_eq!(f.store.selected(), Some(f.id));

        // 60px right at scale 2 = 30pt inward: width 120, height 80.
        f.controller
            .handle(&InputEvent::moved(260.0, 1002.0, Modality::Pointer), &mut f.store);
        let p = f.store.get(f.id).unwrap();
        assert!((p.size.width - 120.0).abs() < 1e-9);
        assert!((p.size.height - 80.0).abs() < 1e-9);
        assert!((p.position.x - 130.0).abs() < 1e-9);
        assert!((p.position.y - 120.0).abs() < 1e-9);
    }

    #[test]
    fn cancel_detaches_and_keeps_geometry() {
        let mut f = fixture(SigningConfig::default());
        f.begin(InputEvent::start(0.0, 0.0, Modality::Pointer), Some(HitTarget::Body(f.id)))
            .unwrap();
        f.controller
            .handle(&InputEvent::moved(20.0, 0.0, Modality::Pointer), &mut f.store);
        let out = f
            .controller
            .handle(&InputEvent::cancel(Modality::Pointer), &mut f.store);
        assert_eq!(out, Outcome::Cancelled { id: f.id });
        assert_eq!(f.position(), Point::new(110.0, 100.0));
        assert_eq!(f.host.live(), 0);
    }

    #[test]
    fn dropping_controller_detaches() {
        let mut f = fixture(SigningConfig::default());
        f.begin(InputEvent::start(0.0, 0.0, Modality::Pointer), Some(HitTarget::Body(f.id)))
            .unwrap();
        assert_eq!(f.host.live(), 1);
        let host = f.host.clone();
        drop(f);
        assert_eq!(host.live(), 0);
        assert_eq!(host.detached(), 1);
    }

    #[test]
    fn coalesced_moves_apply_on_frame() {
        let config = SigningConfig {
            coalesce_moves: true,
            ..SigningConfig::default()
        };
        let mut f = fixture(config);
        f.begin(InputEvent::start(0.0, 0.0, Modality::Pointer), Some(HitTarget::Body(f.id)))
            .unwrap();
        for x in [2.0, 4.0, 6.0] {
            let out = f
                .controller
                .handle(&InputEvent::moved(x, 0.0, Modality::Pointer), &mut f.store);
            assert_eq!(out, Outcome::Deferred);
        }
        assert_eq!(f.position(), Point::new(100.0, 100.0));
        assert!(matches!(f.controller.flush_frame(&mut f.store), Outcome::Updated { .. }));
        assert_eq!(f.position(), Point::new(103.0, 100.0));
        assert_eq!(f.controller.flush_frame(&mut f.store), Outcome::Ignored);
    }

    #[test]
    fn removed_target_ends_session() {
        let mut f = fixture(SigningConfig::default());
        f.begin(InputEvent::start(0.0, 0.0, Modality::Pointer), Some(HitTarget::Body(f.id)))
            .unwrap();
        f.store.remove(f.id);
        let out = f
            .controller
            .handle(&InputEvent::moved(5.0, 5.0, Modality::Pointer), &mut f.store);
        assert_eq!(out, Outcome::Cancelled { id: f.id });
        assert_eq!(f.host.live(), 0);
    }
}
