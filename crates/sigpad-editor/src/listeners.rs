//! Window-level listener lifecycle.
//!
//! While a drag or resize is active, move/end listeners live on the window,
//! not on the placement element, so the gesture survives the pointer leaving
//! the element. Attaching yields exactly one [`Teardown`]; a [`ListenerGuard`]
//! owns it and runs it exactly once, on whichever exit path comes first:
//! normal end, cancel, or drop (unmount).

use crate::input::Modality;
use std::fmt;

/// Detaches the listeners one `attach` call installed.
pub struct Teardown(Box<dyn FnOnce() -> Result<(), String>>);

impl Teardown {
    pub fn new(f: impl FnOnce() -> Result<(), String> + 'static) -> Self {
        Teardown(Box::new(f))
    }

    /// A teardown with nothing to detach.
    pub fn noop() -> Self {
        Teardown::new(|| Ok(()))
    }

    fn run(self) -> Result<(), String> {
        (self.0)()
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Teardown")
    }
}

/// The environment that owns the window's event listeners.
pub trait ListenerHost {
    /// Install move/end/cancel listeners for `modality` on the window.
    fn attach(&self, modality: Modality) -> Result<Teardown, String>;
}

/// Host with no window (tests, headless use). Attaching always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWindow;

impl ListenerHost for NoWindow {
    fn attach(&self, _modality: Modality) -> Result<Teardown, String> {
        Ok(Teardown::noop())
    }
}

/// Owns one teardown and guarantees it runs at most once.
#[derive(Debug)]
pub struct ListenerGuard {
    teardown: Option<Teardown>,
    modality: Modality,
}

impl ListenerGuard {
    pub fn attach(host: &dyn ListenerHost, modality: Modality) -> Result<Self, String> {
        let teardown = host.attach(modality)?;
        log::debug!("listeners: attached {modality:?}");
        Ok(Self {
            teardown: Some(teardown),
            modality,
        })
    }

    pub fn is_attached(&self) -> bool {
        self.teardown.is_some()
    }

    /// Detach now. Later calls (and the eventual drop) are no-ops.
    /// Failures are logged only; there is nothing the operator can do.
    pub fn release(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            match teardown.run() {
                Ok(()) => log::debug!("listeners: detached {:?}", self.modality),
                Err(e) => log::warn!("listeners: detach {:?} failed: {e}", self.modality),
            }
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.release();
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingHost;
    use super::*;

    #[test]
    fn release_runs_teardown_once() {
        let host = RecordingHost::default();
        let mut guard = ListenerGuard::attach(&host, Modality::Pointer).unwrap();
        assert_eq!(host.live(), 1);
        guard.release();
        guard.release();
        drop(guard);
        assert_eq!(host.attached(), 1);
        assert_eq!(host.detached(), 1);
    }

    #[test]
    fn drop_detaches() {
        let host = RecordingHost::default();
        {
            let _guard = ListenerGuard::attach(&host, Modality::Touch).unwrap();
            assert_eq!(host.live(), 1);
        }
        assert_eq!(host.live(), 0);
    }

    #[test]
    fn failed_detach_is_swallowed() {
        let host = RecordingHost {
            fail_detach: true,
            ..RecordingHost::default()
        };
        let mut guard = ListenerGuard::attach(&host, Modality::Pointer).unwrap();
        guard.release();
        assert!(!guard.is_attached());
        assert_eq!(host.detached(), 1);
    }
}
