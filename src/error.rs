//! Error types for codec and session operations

use crate::bindings::{
    OPUS_ALLOC_FAIL, OPUS_BAD_ARG, OPUS_BUFFER_TOO_SMALL, OPUS_INTERNAL_ERROR, OPUS_INVALID_PACKET,
    OPUS_INVALID_STATE, OPUS_UNIMPLEMENTED,
};
use crate::handle::CodecKind;
use std::fmt;

/// Convenient result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// libopus status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Bad argument passed to a function.
    BadArg,
    /// Provided buffer was too small.
    BufferTooSmall,
    /// Internal libopus error.
    InternalError,
    /// Packet is invalid or unsupported.
    InvalidPacket,
    /// Feature not implemented.
    Unimplemented,
    /// Invalid state.
    InvalidState,
    /// Memory allocation failure.
    AllocFail,
    /// Unknown error code.
    Unknown(i32),
}

impl Status {
    /// Map a libopus error code to [`Status`].
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            OPUS_BAD_ARG => Self::BadArg,
            OPUS_BUFFER_TOO_SMALL => Self::BufferTooSmall,
            OPUS_INTERNAL_ERROR => Self::InternalError,
            OPUS_INVALID_PACKET => Self::InvalidPacket,
            OPUS_UNIMPLEMENTED => Self::Unimplemented,
            OPUS_INVALID_STATE => Self::InvalidState,
            OPUS_ALLOC_FAIL => Self::AllocFail,
            _ => Self::Unknown(code),
        }
    }

    /// Convert [`Status`] back to libopus code.
    #[must_use]
    pub const fn to_code(self) -> i32 {
        match self {
            Self::BadArg => OPUS_BAD_ARG,
            Self::BufferTooSmall => OPUS_BUFFER_TOO_SMALL,
            Self::InternalError => OPUS_INTERNAL_ERROR,
            Self::InvalidPacket => OPUS_INVALID_PACKET,
            Self::Unimplemented => OPUS_UNIMPLEMENTED,
            Self::InvalidState => OPUS_INVALID_STATE,
            Self::AllocFail => OPUS_ALLOC_FAIL,
            Self::Unknown(code) => code,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.to_code();
        match crate::strerror(code) {
            "" => write!(f, "opus error {code}"),
            text => write!(f, "{text} ({code})"),
        }
    }
}

/// Errors surfaced by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// libopus refused to create an encoder or decoder.
    #[error("codec creation failed: {0}")]
    CodecCreation(Status),
    /// libopus rejected the requested bitrate.
    #[error("bitrate {bitrate} rejected: {status}")]
    ParameterRejected {
        /// Raw bitrate value that was requested.
        bitrate: i32,
        /// Status reported by libopus.
        status: Status,
    },
    /// A control query failed.
    #[error("codec control request failed: {0}")]
    Control(Status),
    /// Encoding a frame failed.
    #[error("encode failed: {0}")]
    Encode(Status),
    /// Decoding a packet failed.
    #[error("decode failed: {0}")]
    Decode(Status),
    /// No session is registered under the key.
    #[error("unknown session key {0:?}")]
    UnknownSessionKey(String),
    /// A session is already live under the key.
    #[error("session key {0:?} is already in use")]
    SessionKeyInUse(String),
    /// The handle was never issued, was already released, or names the other codec kind.
    #[error("stale or unknown {kind} handle {handle}")]
    StaleHandle {
        /// Kind the caller asked for.
        kind: CodecKind,
        /// Raw handle value received.
        handle: i64,
    },
    /// Sample rate not supported by Opus.
    #[error("unsupported sample rate {0} Hz")]
    InvalidSampleRate(i32),
    /// Channel count not supported by this bridge.
    #[error("unsupported channel count {0}")]
    InvalidChannels(i32),
    /// Unknown application profile.
    #[error("unsupported application profile {0}")]
    InvalidApplication(i32),
    /// A caller-supplied pointer or string could not be read.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The host observer reported a failure.
    #[error("observer dispatch failed with status {0}")]
    ObserverDispatch(i32),
    /// The host runtime handle was never captured.
    #[error("host runtime handle has not been captured")]
    RuntimeUnavailable,
}
