//! Opus decoder implementation with safe wrappers

use crate::bindings::{OPUS_OK, OpusDecoder, opus_decode, opus_decoder_create, opus_decoder_destroy};
use crate::constants::max_frame_samples_for;
use crate::error::{Error, Result, Status};
use crate::types::{Channels, SampleRate};
use std::ptr;

/// Safe wrapper around a libopus `OpusDecoder`.
pub struct Decoder {
    raw: *mut OpusDecoder,
    sample_rate: SampleRate,
    channels: Channels,
}

unsafe impl Send for Decoder {}
unsafe impl Sync for Decoder {}

impl Decoder {
    /// Create a new decoder for a given sample rate and channel layout.
    ///
    /// # Errors
    /// Returns [`Error::CodecCreation`] if libopus rejects the parameters or allocation fails.
    pub fn new(sample_rate: SampleRate, channels: Channels) -> Result<Self> {
        let mut error = 0i32;
        let decoder = unsafe {
            opus_decoder_create(
                sample_rate.as_i32(),
                channels.as_i32(),
                std::ptr::addr_of_mut!(error),
            )
        };

        if error != OPUS_OK {
            return Err(Error::CodecCreation(Status::from_code(error)));
        }

        if decoder.is_null() {
            return Err(Error::CodecCreation(Status::AllocFail));
        }

        Ok(Self {
            raw: decoder,
            sample_rate,
            channels,
        })
    }

    /// Decode a packet into interleaved 16-bit PCM.
    ///
    /// - `input`: Opus packet bytes. An empty slice asks libopus for loss concealment.
    /// - `output`: Interleaved output buffer sized to `frame_size * channels`.
    /// - `fec`: Decode in-band FEC data if available.
    ///
    /// Returns the number of samples decoded per channel.
    ///
    /// # Errors
    /// Returns [`Error::Decode`] with [`Status::BadArg`] for invalid buffer sizes, or with
    /// the libopus status when the library itself fails.
    pub fn decode(&mut self, input: &[u8], output: &mut [i16], fec: bool) -> Result<usize> {
        if self.raw.is_null() {
            return Err(Error::Decode(Status::InvalidState));
        }

        if output.is_empty() || !output.len().is_multiple_of(self.channels.as_usize()) {
            return Err(Error::Decode(Status::BadArg));
        }
        let frame_size = output.len() / self.channels.as_usize();
        if frame_size > max_frame_samples_for(self.sample_rate) {
            return Err(Error::Decode(Status::BadArg));
        }

        let input_len_i32 = i32::try_from(input.len()).map_err(|_| Error::Decode(Status::BadArg))?;
        let frame_size_i32 =
            i32::try_from(frame_size).map_err(|_| Error::Decode(Status::BadArg))?;

        let result = unsafe {
            opus_decode(
                self.raw,
                if input.is_empty() {
                    ptr::null()
                } else {
                    input.as_ptr()
                },
                input_len_i32,
                output.as_mut_ptr(),
                frame_size_i32,
                i32::from(fec),
            )
        };

        if result < 0 {
            return Err(Error::Decode(Status::from_code(result)));
        }

        usize::try_from(result).map_err(|_| Error::Decode(Status::InternalError))
    }

    /// The decoder's configured sample rate.
    #[must_use]
    pub const fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// The decoder's channel configuration.
    #[must_use]
    pub const fn channels(&self) -> Channels {
        self.channels
    }
}

impl Drop for Decoder {
    fn drop(&mut self) {
        unsafe {
            opus_decoder_destroy(self.raw);
        }
    }
}
