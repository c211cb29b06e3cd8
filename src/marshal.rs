//! Conversion between caller buffers and the shapes libopus expects.
//!
//! Both directions use a fixed-capacity scratch buffer sized for the worst case and
//! hand back exactly the number of bytes or samples the codec reported.

use crate::constants::{MAX_PACKET_SIZE, max_pcm_samples};
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{Error, Result, Status};

/// Encode one interleaved PCM frame into an owned packet.
///
/// # Errors
/// Returns [`Error::Encode`] on invalid input or when libopus reports a failure.
pub fn encode_frame(encoder: &mut Encoder, pcm: &[i16]) -> Result<Vec<u8>> {
    let mut packet = vec![0u8; MAX_PACKET_SIZE];
    let len = encode_frame_into(encoder, pcm, &mut packet)?;
    packet.truncate(len);
    Ok(packet)
}

/// Encode one interleaved PCM frame directly into `out` and return the packet length.
///
/// At most [`MAX_PACKET_SIZE`] bytes of `out` are used. A shorter `out` caps the size
/// of this packet, so the frame is never encoded without being delivered.
///
/// # Errors
/// Returns [`Error::Encode`] on invalid input, an empty `out`, or a libopus failure.
pub fn encode_frame_into(encoder: &mut Encoder, pcm: &[i16], out: &mut [u8]) -> Result<usize> {
    let capacity = out.len().min(MAX_PACKET_SIZE);
    encoder.encode(pcm, &mut out[..capacity])
}

/// Decode one packet into owned interleaved PCM.
///
/// The packet is never treated as lost, so an empty packet is an error rather than a
/// request for loss concealment.
///
/// # Errors
/// Returns [`Error::Decode`] on an empty or corrupt packet.
pub fn decode_packet(decoder: &mut Decoder, packet: &[u8]) -> Result<Vec<i16>> {
    if packet.is_empty() {
        return Err(Error::Decode(Status::BadArg));
    }

    let channels = decoder.channels();
    let mut pcm = vec![0i16; max_pcm_samples(decoder.sample_rate(), channels)];
    let frames = decoder.decode(packet, &mut pcm, false)?;
    pcm.truncate(frames * channels.as_usize());
    Ok(pcm)
}

/// Read little-endian 16-bit PCM. A trailing odd byte is ignored.
#[must_use]
pub fn pcm_from_le_bytes(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Write samples as little-endian 16-bit PCM.
#[must_use]
pub fn pcm_to_le_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}
