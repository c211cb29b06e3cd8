//! Single-slot observer notification.

use crate::error::{Error, Result};
use crate::lifecycle::RuntimeHandle;
use log::debug;
use parking_lot::Mutex;
use std::os::raw::{c_int, c_void};
use std::sync::Arc;

/// Target of the bridge's one-way notification.
pub trait Observer: Send + Sync {
    /// Called once per [`ObserverSlot::notify_hello`].
    ///
    /// # Errors
    /// A failure is logged by the slot and otherwise ignored.
    fn on_hello(&self) -> Result<()>;
}

/// Holds at most one observer.
#[derive(Default)]
pub struct ObserverSlot {
    current: Mutex<Option<Arc<dyn Observer>>>,
}

impl ObserverSlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `observer`, releasing any previous one. Returns whether one was replaced.
    pub fn set(&self, observer: Arc<dyn Observer>) -> bool {
        let previous = self.current.lock().replace(observer);
        previous.is_some()
    }

    /// Release the installed observer. Returns whether one was installed.
    pub fn unset(&self) -> bool {
        let previous = self.current.lock().take();
        previous.is_some()
    }

    /// Whether an observer is installed.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.current.lock().is_some()
    }

    /// Notify the installed observer, if any. Returns whether it was notified successfully.
    pub fn notify_hello(&self) -> bool {
        let Some(observer) = self.current.lock().clone() else {
            return false;
        };
        match observer.on_hello() {
            Ok(()) => true,
            Err(err) => {
                debug!("observer notification skipped: {err}");
                false
            }
        }
    }
}

/// Host callback invoked with the runtime handle and the observer target.
/// A non-zero return reports a dispatch failure.
pub type NotifyFn = unsafe extern "C" fn(runtime: *mut c_void, target: *mut c_void) -> c_int;

/// Host callback that drops the host's reference to the observer target.
pub type ReleaseFn = unsafe extern "C" fn(runtime: *mut c_void, target: *mut c_void);

/// Observer living on the host side of the native boundary.
///
/// Carries the runtime handle it needs to call back into the host, captured when the
/// observer was installed.
pub struct ForeignObserver {
    runtime: Option<RuntimeHandle>,
    target: *mut c_void,
    notify: NotifyFn,
    release: Option<ReleaseFn>,
}

// The host owns `target` and promises it may be used from any thread until `release` runs.
unsafe impl Send for ForeignObserver {}
unsafe impl Sync for ForeignObserver {}

impl ForeignObserver {
    /// Wrap a host observer.
    ///
    /// # Safety
    /// `notify` and `release` must be safe to call with `target` and the runtime pointer
    /// from any thread until `release` has run.
    #[must_use]
    pub const unsafe fn new(
        runtime: Option<RuntimeHandle>,
        target: *mut c_void,
        notify: NotifyFn,
        release: Option<ReleaseFn>,
    ) -> Self {
        Self {
            runtime,
            target,
            notify,
            release,
        }
    }
}

impl Observer for ForeignObserver {
    fn on_hello(&self) -> Result<()> {
        let runtime = self.runtime.ok_or(Error::RuntimeUnavailable)?;
        let status = unsafe { (self.notify)(runtime.as_ptr(), self.target) };
        if status != 0 {
            return Err(Error::ObserverDispatch(status));
        }
        Ok(())
    }
}

impl Drop for ForeignObserver {
    fn drop(&mut self) {
        if let Some(release) = self.release {
            let runtime = self
                .runtime
                .map_or(std::ptr::null_mut(), RuntimeHandle::as_ptr);
            unsafe { release(runtime, self.target) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl Observer for Counter {
        fn on_hello(&self) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    impl Observer for Failing {
        fn on_hello(&self) -> Result<()> {
            Err(Error::ObserverDispatch(-1))
        }
    }

    #[test]
    fn empty_slot_is_a_no_op() {
        let slot = ObserverSlot::new();
        assert!(!slot.notify_hello());
        assert!(!slot.unset());
    }

    #[test]
    fn replaced_observer_is_released() {
        let slot = ObserverSlot::new();
        let first = Arc::new(Counter::default());
        let second = Arc::new(Counter::default());

        assert!(!slot.set(first.clone()));
        assert!(slot.set(second.clone()));
        assert_eq!(Arc::strong_count(&first), 1);

        assert!(slot.notify_hello());
        assert_eq!(first.0.load(Ordering::SeqCst), 0);
        assert_eq!(second.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispatch_failure_is_swallowed() {
        let slot = ObserverSlot::new();
        slot.set(Arc::new(Failing));
        assert!(!slot.notify_hello());
        assert!(slot.is_set());
    }

    unsafe extern "C" fn never_called(_: *mut c_void, _: *mut c_void) -> c_int {
        0
    }

    #[test]
    fn foreign_observer_without_runtime_is_inert() {
        let observer =
            unsafe { ForeignObserver::new(None, std::ptr::null_mut(), never_called, None) };
        assert_eq!(observer.on_hello(), Err(Error::RuntimeUnavailable));
    }
}
