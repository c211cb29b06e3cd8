//! Load-time capture of the host runtime handle.

use crate::error::{Error, Result};
use log::{LevelFilter, warn};
use simple_logger::SimpleLogger;
use std::os::raw::c_void;
use std::ptr::NonNull;
use std::sync::OnceLock;

static RUNTIME: OnceLock<RuntimeHandle> = OnceLock::new();

/// Opaque pointer to the hosting runtime, passed back to host callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeHandle(NonNull<c_void>);

// The host guarantees the runtime pointer is valid process-wide until unload.
unsafe impl Send for RuntimeHandle {}
unsafe impl Sync for RuntimeHandle {}

impl RuntimeHandle {
    /// Wrap a raw runtime pointer.
    ///
    /// # Errors
    /// Returns [`Error::RuntimeUnavailable`] for a null pointer.
    pub fn new(raw: *mut c_void) -> Result<Self> {
        NonNull::new(raw).map(Self).ok_or(Error::RuntimeUnavailable)
    }

    /// The raw pointer.
    #[must_use]
    pub const fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// Capture the runtime handle handed to the library at load time.
///
/// The first capture wins and stays live until the library is unloaded.
///
/// # Errors
/// Returns [`Error::RuntimeUnavailable`] for a null pointer.
pub fn capture_runtime(raw: *mut c_void) -> Result<RuntimeHandle> {
    let handle = RuntimeHandle::new(raw)?;
    let captured = *RUNTIME.get_or_init(|| handle);
    if captured != handle {
        warn!("runtime handle already captured; ignoring {:p}", handle.as_ptr());
    }
    Ok(captured)
}

/// The captured runtime handle, if the load hook has run.
#[must_use]
pub fn runtime() -> Option<RuntimeHandle> {
    RUNTIME.get().copied()
}

/// Level used when `RUST_LOG` is unset. Keeps the `say_hello` greeting visible.
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Install the default logger unless the host already installed one.
///
/// The level comes from `RUST_LOG` and defaults to [`DEFAULT_LOG_LEVEL`].
pub fn init_logging() {
    let _ = SimpleLogger::new()
        .with_level(DEFAULT_LOG_LEVEL)
        .env()
        .init();
}
