//! Opus encoder implementation with safe wrappers

use crate::bindings::{
    OPUS_GET_BITRATE_REQUEST, OPUS_OK, OPUS_SET_BITRATE_REQUEST, OpusEncoder, opus_encode,
    opus_encoder_create, opus_encoder_ctl, opus_encoder_destroy,
};
use crate::constants::max_frame_samples_for;
use crate::error::{Error, Result, Status};
use crate::types::{Application, Bitrate, Channels, SampleRate};

/// Safe wrapper around a libopus `OpusEncoder`.
///
/// The raw state is destroyed exactly once, when the wrapper is dropped.
pub struct Encoder {
    raw: *mut OpusEncoder,
    sample_rate: SampleRate,
    channels: Channels,
    application: Application,
}

unsafe impl Send for Encoder {}
unsafe impl Sync for Encoder {}

impl Encoder {
    /// Create a new encoder.
    ///
    /// # Errors
    /// Returns [`Error::CodecCreation`] if libopus rejects the parameters or allocation fails.
    pub fn new(
        sample_rate: SampleRate,
        channels: Channels,
        application: Application,
    ) -> Result<Self> {
        let mut error = 0i32;
        let encoder = unsafe {
            opus_encoder_create(
                sample_rate.as_i32(),
                channels.as_i32(),
                application.as_i32(),
                std::ptr::addr_of_mut!(error),
            )
        };

        if error != OPUS_OK {
            return Err(Error::CodecCreation(Status::from_code(error)));
        }

        if encoder.is_null() {
            return Err(Error::CodecCreation(Status::AllocFail));
        }

        Ok(Self {
            raw: encoder,
            sample_rate,
            channels,
            application,
        })
    }

    /// Create an encoder and apply `bitrate` in one step.
    ///
    /// If libopus rejects the bitrate the encoder is destroyed before returning,
    /// so a failed call never leaves a live instance behind.
    ///
    /// # Errors
    /// Returns [`Error::CodecCreation`] or [`Error::ParameterRejected`].
    pub fn with_bitrate(
        sample_rate: SampleRate,
        channels: Channels,
        application: Application,
        bitrate: Bitrate,
    ) -> Result<Self> {
        let mut encoder = Self::new(sample_rate, channels, application)?;
        encoder.set_bitrate(bitrate)?;
        Ok(encoder)
    }

    /// Encode interleaved 16-bit PCM into an Opus packet.
    ///
    /// Returns the number of bytes written to `output`.
    ///
    /// # Errors
    /// Returns [`Error::Encode`] with [`Status::BadArg`] for empty or misaligned input,
    /// frames longer than the 120 ms maximum, or an empty output buffer, and with the
    /// libopus status when the library itself fails.
    pub fn encode(&mut self, input: &[i16], output: &mut [u8]) -> Result<usize> {
        if self.raw.is_null() {
            return Err(Error::Encode(Status::InvalidState));
        }

        if input.is_empty() || !input.len().is_multiple_of(self.channels.as_usize()) {
            return Err(Error::Encode(Status::BadArg));
        }

        let frame_size = input.len() / self.channels.as_usize();
        // Oversized frames are rejected here rather than truncated
        if frame_size > max_frame_samples_for(self.sample_rate) {
            return Err(Error::Encode(Status::BadArg));
        }

        if output.is_empty() {
            return Err(Error::Encode(Status::BadArg));
        }

        let frame_size_i32 = i32::try_from(frame_size).map_err(|_| Error::Encode(Status::BadArg))?;
        let out_len_i32 =
            i32::try_from(output.len()).map_err(|_| Error::Encode(Status::BadArg))?;
        let result = unsafe {
            opus_encode(
                self.raw,
                input.as_ptr(),
                frame_size_i32,
                output.as_mut_ptr(),
                out_len_i32,
            )
        };

        if result < 0 {
            return Err(Error::Encode(Status::from_code(result)));
        }

        usize::try_from(result).map_err(|_| Error::Encode(Status::InternalError))
    }

    /// Set target bitrate.
    ///
    /// # Errors
    /// Returns [`Error::ParameterRejected`] when libopus refuses the value.
    pub fn set_bitrate(&mut self, bitrate: Bitrate) -> Result<()> {
        let rejected = |status| Error::ParameterRejected {
            bitrate: bitrate.value(),
            status,
        };
        if self.raw.is_null() {
            return Err(rejected(Status::InvalidState));
        }

        let result =
            unsafe { opus_encoder_ctl(self.raw, OPUS_SET_BITRATE_REQUEST, bitrate.value()) };

        if result != OPUS_OK {
            return Err(rejected(Status::from_code(result)));
        }

        Ok(())
    }

    /// Query the current bitrate.
    ///
    /// # Errors
    /// Returns [`Error::Control`] if the query fails.
    pub fn bitrate(&mut self) -> Result<Bitrate> {
        if self.raw.is_null() {
            return Err(Error::Control(Status::InvalidState));
        }

        let mut bitrate = 0i32;
        let result = unsafe { opus_encoder_ctl(self.raw, OPUS_GET_BITRATE_REQUEST, &mut bitrate) };

        if result != OPUS_OK {
            return Err(Error::Control(Status::from_code(result)));
        }

        Ok(Bitrate::from_raw(bitrate))
    }

    /// The encoder's configured sample rate.
    #[must_use]
    pub const fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// The encoder's channel configuration.
    #[must_use]
    pub const fn channels(&self) -> Channels {
        self.channels
    }

    /// The application profile the encoder was created with.
    #[must_use]
    pub const fn application(&self) -> Application {
        self.application
    }
}

impl Drop for Encoder {
    fn drop(&mut self) {
        unsafe {
            opus_encoder_destroy(self.raw);
        }
    }
}
