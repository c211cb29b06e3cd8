//! Session-managed Opus encoders and decoders behind a narrow native-call boundary.
//!
//! [`OpusBridge`] owns every codec instance it creates. Instances are addressed either by
//! generation-tagged [`Handle`]s or by caller-chosen session keys, and the [`ffi`] module
//! exposes the same operations as a C ABI for managed-runtime hosts.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]

#[allow(missing_docs)]
mod bindings;

pub mod bridge;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod ffi;
pub mod handle;
pub mod lifecycle;
pub mod marshal;
pub mod observer;
pub mod registry;
pub mod session;
pub mod types;

pub use bridge::OpusBridge;
pub use config::{BridgeConfig, CollisionPolicy, SessionProfile};
pub use constants::{
    MAX_FRAME_SAMPLES_48KHZ, MAX_PACKET_DURATION_MS, MAX_PACKET_SIZE, max_frame_samples_for,
    max_pcm_samples,
};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{Error, Result, Status};
pub use handle::{CodecKind, Handle, INVALID_HANDLE};
pub use observer::{ForeignObserver, Observer, ObserverSlot};
pub use registry::CodecRegistry;
pub use session::KeyedSessions;
pub use types::{Application, Bitrate, Channels, FrameSize, SampleRate};

/// Returns the runtime libopus version string from the linked C library.
#[must_use]
pub fn runtime_version() -> &'static str {
    unsafe {
        let ptr = crate::bindings::opus_get_version_string();
        if ptr.is_null() {
            return "";
        }
        std::ffi::CStr::from_ptr(ptr).to_str().unwrap_or("")
    }
}

/// Returns a human-readable string for a libopus error code (via runtime library).
#[must_use]
pub fn strerror(code: i32) -> &'static str {
    unsafe {
        let ptr = crate::bindings::opus_strerror(code);
        if ptr.is_null() {
            return "";
        }
        std::ffi::CStr::from_ptr(ptr).to_str().unwrap_or("")
    }
}
