//! Key-addressed sessions on top of the handle registry.
//!
//! Encoder keys and decoder keys live in separate namespaces. Keys are copied into owned
//! strings, so nothing here borrows caller memory past the call.

use crate::config::{CollisionPolicy, SessionProfile};
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::registry::CodecRegistry;
use log::{debug, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps session keys to codec handles created with a fixed [`SessionProfile`].
pub struct KeyedSessions {
    registry: Arc<CodecRegistry>,
    profile: SessionProfile,
    collision: CollisionPolicy,
    encoders: Mutex<HashMap<String, Handle>>,
    decoders: Mutex<HashMap<String, Handle>>,
}

impl KeyedSessions {
    /// Create an empty session map backed by `registry`.
    #[must_use]
    pub fn new(
        registry: Arc<CodecRegistry>,
        profile: SessionProfile,
        collision: CollisionPolicy,
    ) -> Self {
        Self {
            registry,
            profile,
            collision,
            encoders: Mutex::new(HashMap::new()),
            decoders: Mutex::new(HashMap::new()),
        }
    }

    /// Profile every session is created with.
    #[must_use]
    pub const fn profile(&self) -> &SessionProfile {
        &self.profile
    }

    /// Start an encoder session under `key`.
    ///
    /// # Errors
    /// Returns [`Error::SessionKeyInUse`] under [`CollisionPolicy::Reject`], or the
    /// creation error. A failed replacement leaves the existing session untouched.
    pub fn init_encoder(&self, key: &str) -> Result<()> {
        let mut sessions = self.encoders.lock();
        self.check_collision(&sessions, key)?;

        let profile = self.profile;
        let handle = self.registry.create_encoder(
            profile.sample_rate,
            profile.channels,
            profile.application,
            profile.bitrate,
        )?;

        if let Some(previous) = sessions.insert(key.to_owned(), handle) {
            debug!("encoder session {key:?} replaced {previous}");
            self.registry.release_encoder(previous)?;
        }
        Ok(())
    }

    /// Start a decoder session under `key`.
    ///
    /// # Errors
    /// Same as [`Self::init_encoder`].
    pub fn init_decoder(&self, key: &str) -> Result<()> {
        let mut sessions = self.decoders.lock();
        self.check_collision(&sessions, key)?;

        let handle = self
            .registry
            .create_decoder(self.profile.sample_rate, self.profile.channels)?;

        if let Some(previous) = sessions.insert(key.to_owned(), handle) {
            debug!("decoder session {key:?} replaced {previous}");
            self.registry.release_decoder(previous)?;
        }
        Ok(())
    }

    /// End the encoder session under `key`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownSessionKey`] if no such session exists.
    pub fn close_encoder(&self, key: &str) -> Result<()> {
        let handle = self
            .encoders
            .lock()
            .remove(key)
            .ok_or_else(|| Error::UnknownSessionKey(key.to_owned()))?;
        self.registry.release_encoder(handle)
    }

    /// End the decoder session under `key`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownSessionKey`] if no such session exists.
    pub fn close_decoder(&self, key: &str) -> Result<()> {
        let handle = self
            .decoders
            .lock()
            .remove(key)
            .ok_or_else(|| Error::UnknownSessionKey(key.to_owned()))?;
        self.registry.release_decoder(handle)
    }

    /// Encode one frame in the session under `key`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownSessionKey`] or [`Error::Encode`].
    pub fn encode(&self, key: &str, pcm: &[i16]) -> Result<Vec<u8>> {
        let handle = lookup(&self.encoders, key)?;
        self.registry.encode(handle, pcm).map_err(|err| closed(err, key))
    }

    /// Encode one frame in the session under `key` directly into `out`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownSessionKey`] or [`Error::Encode`].
    pub fn encode_into(&self, key: &str, pcm: &[i16], out: &mut [u8]) -> Result<usize> {
        let handle = lookup(&self.encoders, key)?;
        self.registry
            .encode_into(handle, pcm, out)
            .map_err(|err| closed(err, key))
    }

    /// Decode one packet in the session under `key`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownSessionKey`] or [`Error::Decode`].
    pub fn decode(&self, key: &str, packet: &[u8]) -> Result<Vec<i16>> {
        let handle = lookup(&self.decoders, key)?;
        self.registry.decode(handle, packet).map_err(|err| closed(err, key))
    }

    /// Number of live encoder sessions.
    #[must_use]
    pub fn encoder_sessions(&self) -> usize {
        self.encoders.lock().len()
    }

    /// Number of live decoder sessions.
    #[must_use]
    pub fn decoder_sessions(&self) -> usize {
        self.decoders.lock().len()
    }

    fn check_collision(&self, sessions: &HashMap<String, Handle>, key: &str) -> Result<()> {
        if self.collision == CollisionPolicy::Reject && sessions.contains_key(key) {
            return Err(Error::SessionKeyInUse(key.to_owned()));
        }
        Ok(())
    }
}

impl Drop for KeyedSessions {
    fn drop(&mut self) {
        for (key, handle) in self.encoders.get_mut().drain() {
            if let Err(err) = self.registry.release_encoder(handle) {
                warn!("encoder session {key:?} not released: {err}");
            }
        }
        for (key, handle) in self.decoders.get_mut().drain() {
            if let Err(err) = self.registry.release_decoder(handle) {
                warn!("decoder session {key:?} not released: {err}");
            }
        }
    }
}

// The session was closed or replaced between lookup and the codec call.
fn closed(err: Error, key: &str) -> Error {
    match err {
        Error::StaleHandle { .. } => Error::UnknownSessionKey(key.to_owned()),
        other => other,
    }
}

fn lookup(sessions: &Mutex<HashMap<String, Handle>>, key: &str) -> Result<Handle> {
    sessions
        .lock()
        .get(key)
        .copied()
        .ok_or_else(|| Error::UnknownSessionKey(key.to_owned()))
}
