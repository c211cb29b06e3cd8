//! Crate-wide constants and small helpers

use crate::types::{Channels, SampleRate};

/// Maximum samples per channel in a single Opus frame at 48 kHz.
///
/// 120 ms at 48 kHz = 0.120 * 48000 = 5760 samples.
pub const MAX_FRAME_SAMPLES_48KHZ: usize = 5760;

/// Maximum packet duration in milliseconds.
pub const MAX_PACKET_DURATION_MS: usize = 120;

/// Capacity of the encoded packet buffer handed to `opus_encode`.
///
/// Same output buffer size the libopus `opus_demo` tool allocates. The encoder fits
/// any frame duration, 120 ms included, into the capacity it is given.
pub const MAX_PACKET_SIZE: usize = 3 * 1276;

/// Compute the maximum samples per channel for a frame at the given `sample_rate`.
#[must_use]
pub const fn max_frame_samples_for(sample_rate: SampleRate) -> usize {
    // Scale linearly from the 48 kHz base.
    (MAX_FRAME_SAMPLES_48KHZ * (sample_rate as usize)) / 48_000
}

/// Capacity of an interleaved PCM buffer holding the longest frame.
#[must_use]
pub const fn max_pcm_samples(sample_rate: SampleRate, channels: Channels) -> usize {
    max_frame_samples_for(sample_rate) * channels.as_usize()
}
