//! Handle-addressed registry of live encoders and decoders.

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{Error, Result, Status};
use crate::handle::{CodecKind, Handle, SlotTable};
use crate::marshal;
use crate::types::{Application, Bitrate, Channels, SampleRate};
use log::{debug, warn};
use parking_lot::Mutex;
use std::sync::Arc;

/// Encoder shared between the registry and in-flight calls.
pub type SharedEncoder = Arc<Mutex<Encoder>>;
/// Decoder shared between the registry and in-flight calls.
pub type SharedDecoder = Arc<Mutex<Decoder>>;

/// Owns every codec instance created through it.
///
/// Each table is guarded by its own lock, held only for create, release and lookup.
/// Encode and decode run under the per-instance lock, so calls on distinct instances
/// proceed in parallel while calls on the same instance are serialized.
pub struct CodecRegistry {
    encoders: Mutex<SlotTable<SharedEncoder>>,
    decoders: Mutex<SlotTable<SharedDecoder>>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            encoders: Mutex::new(SlotTable::new(CodecKind::Encoder)),
            decoders: Mutex::new(SlotTable::new(CodecKind::Decoder)),
        }
    }

    /// Create an encoder, apply `bitrate` and register it.
    ///
    /// Nothing is registered unless both steps succeed.
    ///
    /// # Errors
    /// Returns [`Error::CodecCreation`] or [`Error::ParameterRejected`].
    pub fn create_encoder(
        &self,
        sample_rate: SampleRate,
        channels: Channels,
        application: Application,
        bitrate: Bitrate,
    ) -> Result<Handle> {
        let encoder = Encoder::with_bitrate(sample_rate, channels, application, bitrate)
            .inspect_err(|err| {
                warn!("encoder {sample_rate:?}/{channels:?}/{application:?} not created: {err}");
            })?;
        let handle = self
            .encoders
            .lock()
            .insert(Arc::new(Mutex::new(encoder)))
            .ok_or(Error::CodecCreation(Status::AllocFail))?;
        debug!("created {handle} ({sample_rate:?}, {channels:?}, {bitrate:?})");
        Ok(handle)
    }

    /// Create and register a decoder.
    ///
    /// # Errors
    /// Returns [`Error::CodecCreation`].
    pub fn create_decoder(&self, sample_rate: SampleRate, channels: Channels) -> Result<Handle> {
        let decoder = Decoder::new(sample_rate, channels).inspect_err(|err| {
            warn!("decoder {sample_rate:?}/{channels:?} not created: {err}");
        })?;
        let handle = self
            .decoders
            .lock()
            .insert(Arc::new(Mutex::new(decoder)))
            .ok_or(Error::CodecCreation(Status::AllocFail))?;
        debug!("created {handle} ({sample_rate:?}, {channels:?})");
        Ok(handle)
    }

    /// Destroy the encoder behind `handle`.
    ///
    /// # Errors
    /// Returns [`Error::StaleHandle`] if the handle is unknown or already released.
    pub fn release_encoder(&self, handle: Handle) -> Result<()> {
        let encoder = self
            .encoders
            .lock()
            .remove(handle)
            .ok_or_else(|| stale(CodecKind::Encoder, handle))?;
        drop(encoder);
        debug!("released {handle}");
        Ok(())
    }

    /// Destroy the decoder behind `handle`.
    ///
    /// # Errors
    /// Returns [`Error::StaleHandle`] if the handle is unknown or already released.
    pub fn release_decoder(&self, handle: Handle) -> Result<()> {
        let decoder = self
            .decoders
            .lock()
            .remove(handle)
            .ok_or_else(|| stale(CodecKind::Decoder, handle))?;
        drop(decoder);
        debug!("released {handle}");
        Ok(())
    }

    /// Resolve `handle` to its encoder.
    ///
    /// # Errors
    /// Returns [`Error::StaleHandle`] if the handle is not live.
    pub fn encoder(&self, handle: Handle) -> Result<SharedEncoder> {
        self.encoders
            .lock()
            .get(handle)
            .cloned()
            .ok_or_else(|| stale(CodecKind::Encoder, handle))
    }

    /// Resolve `handle` to its decoder.
    ///
    /// # Errors
    /// Returns [`Error::StaleHandle`] if the handle is not live.
    pub fn decoder(&self, handle: Handle) -> Result<SharedDecoder> {
        self.decoders
            .lock()
            .get(handle)
            .cloned()
            .ok_or_else(|| stale(CodecKind::Decoder, handle))
    }

    /// Encode one frame with the encoder behind `handle`.
    ///
    /// # Errors
    /// Returns [`Error::StaleHandle`] or [`Error::Encode`].
    pub fn encode(&self, handle: Handle, pcm: &[i16]) -> Result<Vec<u8>> {
        let encoder = self.encoder(handle)?;
        let mut encoder = encoder.lock();
        marshal::encode_frame(&mut encoder, pcm)
    }

    /// Encode one frame with the encoder behind `handle` into `out`.
    ///
    /// # Errors
    /// Returns [`Error::StaleHandle`] or [`Error::Encode`].
    pub fn encode_into(&self, handle: Handle, pcm: &[i16], out: &mut [u8]) -> Result<usize> {
        let encoder = self.encoder(handle)?;
        let mut encoder = encoder.lock();
        marshal::encode_frame_into(&mut encoder, pcm, out)
    }

    /// Decode one packet with the decoder behind `handle`.
    ///
    /// # Errors
    /// Returns [`Error::StaleHandle`] or [`Error::Decode`].
    pub fn decode(&self, handle: Handle, packet: &[u8]) -> Result<Vec<i16>> {
        let decoder = self.decoder(handle)?;
        let mut decoder = decoder.lock();
        marshal::decode_packet(&mut decoder, packet)
    }

    /// Number of live encoders.
    #[must_use]
    pub fn live_encoders(&self) -> usize {
        self.encoders.lock().len()
    }

    /// Number of live decoders.
    #[must_use]
    pub fn live_decoders(&self) -> usize {
        self.decoders.lock().len()
    }

    /// Number of live codec instances of either kind.
    #[must_use]
    pub fn live_instances(&self) -> usize {
        self.live_encoders() + self.live_decoders()
    }
}

impl Drop for CodecRegistry {
    fn drop(&mut self) {
        let live = self.live_instances();
        if live > 0 {
            debug!("dropping registry with {live} live codec instance(s)");
        }
    }
}

fn stale(kind: CodecKind, handle: Handle) -> Error {
    Error::StaleHandle {
        kind,
        handle: handle.to_raw(),
    }
}
