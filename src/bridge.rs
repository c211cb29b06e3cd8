//! The session manager exposed to the host.

use crate::config::BridgeConfig;
use crate::error::{Error, Result};
use crate::handle::{CodecKind, Handle};
use crate::observer::{Observer, ObserverSlot};
use crate::registry::CodecRegistry;
use crate::session::KeyedSessions;
use crate::types::{Application, Bitrate, Channels, SampleRate};
use log::info;
use std::sync::Arc;

/// Owns the codec registry, the keyed sessions and the observer slot.
///
/// Every operation takes `&self`; the bridge can be shared across host threads.
pub struct OpusBridge {
    config: BridgeConfig,
    registry: Arc<CodecRegistry>,
    sessions: KeyedSessions,
    observer: ObserverSlot,
}

impl Default for OpusBridge {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

impl OpusBridge {
    /// Create a bridge with no live instances and no observer.
    #[must_use]
    pub fn new(config: BridgeConfig) -> Self {
        let registry = Arc::new(CodecRegistry::new());
        let sessions = KeyedSessions::new(Arc::clone(&registry), config.profile, config.collision);
        Self {
            config,
            registry,
            sessions,
            observer: ObserverSlot::new(),
        }
    }

    /// Configuration the bridge was built with.
    #[must_use]
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Handle-addressed registry.
    #[must_use]
    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    /// Key-addressed sessions.
    #[must_use]
    pub const fn sessions(&self) -> &KeyedSessions {
        &self.sessions
    }

    /// Create an encoder from raw host parameters.
    ///
    /// # Errors
    /// Returns a validation error for unsupported parameters, otherwise the registry error.
    pub fn create_encoder(
        &self,
        sample_rate: i32,
        channels: i32,
        application: i32,
        bitrate_bps: i32,
    ) -> Result<Handle> {
        self.registry.create_encoder(
            SampleRate::try_from(sample_rate)?,
            Channels::try_from(channels)?,
            Application::try_from(application)?,
            Bitrate::from_raw(bitrate_bps),
        )
    }

    /// Create a decoder from raw host parameters.
    ///
    /// # Errors
    /// Returns a validation error for unsupported parameters, otherwise the registry error.
    pub fn create_decoder(&self, sample_rate: i32, channels: i32) -> Result<Handle> {
        self.registry
            .create_decoder(SampleRate::try_from(sample_rate)?, Channels::try_from(channels)?)
    }

    /// Destroy the encoder behind a raw handle.
    ///
    /// # Errors
    /// Returns [`Error::StaleHandle`] for unknown or already-released handles.
    pub fn release_encoder(&self, handle: i64) -> Result<()> {
        self.registry.release_encoder(resolve(CodecKind::Encoder, handle)?)
    }

    /// Destroy the decoder behind a raw handle.
    ///
    /// # Errors
    /// Returns [`Error::StaleHandle`] for unknown or already-released handles.
    pub fn release_decoder(&self, handle: i64) -> Result<()> {
        self.registry.release_decoder(resolve(CodecKind::Decoder, handle)?)
    }

    /// Encode one frame with the encoder behind a raw handle.
    ///
    /// # Errors
    /// Returns [`Error::StaleHandle`] or [`Error::Encode`].
    pub fn encode(&self, handle: i64, pcm: &[i16]) -> Result<Vec<u8>> {
        self.registry.encode(resolve(CodecKind::Encoder, handle)?, pcm)
    }

    /// Encode one frame with the encoder behind a raw handle directly into `out`.
    ///
    /// # Errors
    /// Returns [`Error::StaleHandle`] or [`Error::Encode`].
    pub fn encode_into(&self, handle: i64, pcm: &[i16], out: &mut [u8]) -> Result<usize> {
        self.registry.encode_into(resolve(CodecKind::Encoder, handle)?, pcm, out)
    }

    /// Decode one packet with the decoder behind a raw handle.
    ///
    /// # Errors
    /// Returns [`Error::StaleHandle`] or [`Error::Decode`].
    pub fn decode(&self, handle: i64, packet: &[u8]) -> Result<Vec<i16>> {
        self.registry.decode(resolve(CodecKind::Decoder, handle)?, packet)
    }

    /// Start an encoder session under `key` with the configured profile.
    ///
    /// # Errors
    /// See [`KeyedSessions::init_encoder`].
    pub fn init_encoder(&self, key: &str) -> Result<()> {
        self.sessions.init_encoder(key)
    }

    /// Start a decoder session under `key` with the configured profile.
    ///
    /// # Errors
    /// See [`KeyedSessions::init_decoder`].
    pub fn init_decoder(&self, key: &str) -> Result<()> {
        self.sessions.init_decoder(key)
    }

    /// End the encoder session under `key`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownSessionKey`].
    pub fn close_encoder(&self, key: &str) -> Result<()> {
        self.sessions.close_encoder(key)
    }

    /// End the decoder session under `key`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownSessionKey`].
    pub fn close_decoder(&self, key: &str) -> Result<()> {
        self.sessions.close_decoder(key)
    }

    /// Encode one frame in the session under `key`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownSessionKey`] or [`Error::Encode`].
    pub fn encode_keyed(&self, key: &str, pcm: &[i16]) -> Result<Vec<u8>> {
        self.sessions.encode(key, pcm)
    }

    /// Encode one frame in the session under `key` directly into `out`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownSessionKey`] or [`Error::Encode`].
    pub fn encode_keyed_into(&self, key: &str, pcm: &[i16], out: &mut [u8]) -> Result<usize> {
        self.sessions.encode_into(key, pcm, out)
    }

    /// Decode one packet in the session under `key`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownSessionKey`] or [`Error::Decode`].
    pub fn decode_keyed(&self, key: &str, packet: &[u8]) -> Result<Vec<i16>> {
        self.sessions.decode(key, packet)
    }

    /// Install the observer, releasing any previous one.
    pub fn set_observer(&self, observer: Arc<dyn Observer>) {
        if self.observer.set(observer) {
            info!("previous observer released");
        }
    }

    /// Release the installed observer.
    pub fn unset_observer(&self) {
        self.observer.unset();
    }

    /// Log a greeting and notify the observer once. Returns whether it was notified.
    pub fn say_hello(&self) -> bool {
        info!(
            "hello from opus-bridge (libopus {}, {} live codec instance(s))",
            crate::runtime_version(),
            self.registry.live_instances()
        );
        self.observer.notify_hello()
    }
}

fn resolve(kind: CodecKind, raw: i64) -> Result<Handle> {
    Handle::from_raw(raw)
        .filter(|handle| handle.kind() == kind)
        .ok_or(Error::StaleHandle { kind, handle: raw })
}
