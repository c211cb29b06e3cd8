use opus_bridge::error::{Error, Status};
use opus_bridge::{
    Application, Bitrate, Channels, CodecRegistry, Decoder, Encoder, SampleRate, max_pcm_samples,
};

#[test]
fn test_silent_frame_round_trip() {
    let registry = CodecRegistry::new();
    let encoder = registry
        .create_encoder(
            SampleRate::Hz48000,
            Channels::Mono,
            Application::Voip,
            Bitrate::Custom(32_000),
        )
        .unwrap();
    let decoder = registry
        .create_decoder(SampleRate::Hz48000, Channels::Mono)
        .unwrap();

    let frame_size = 960; // 20ms
    let packet = registry.encode(encoder, &vec![0i16; frame_size]).unwrap();
    assert!(!packet.is_empty());

    let pcm = registry.decode(decoder, &packet).unwrap();
    assert_eq!(pcm.len(), frame_size);
    // Lossy, so only require the output to stay close to silence
    assert!(pcm.iter().all(|s| s.unsigned_abs() < 64));
}

#[test]
fn test_stereo_round_trip_keeps_interleaving() {
    let registry = CodecRegistry::new();
    let encoder = registry
        .create_encoder(
            SampleRate::Hz48000,
            Channels::Stereo,
            Application::Audio,
            Bitrate::Auto,
        )
        .unwrap();
    let decoder = registry
        .create_decoder(SampleRate::Hz48000, Channels::Stereo)
        .unwrap();

    let frame_size = 480; // 10ms
    let packet = registry
        .encode(encoder, &vec![0i16; frame_size * 2])
        .unwrap();
    let pcm = registry.decode(decoder, &packet).unwrap();
    assert_eq!(pcm.len(), frame_size * 2);
}

#[test]
fn test_wideband_voice_round_trip() {
    let mut encoder =
        Encoder::with_bitrate(SampleRate::Hz16000, Channels::Mono, Application::Voip, Bitrate::Max)
            .unwrap();
    let mut decoder = Decoder::new(SampleRate::Hz16000, Channels::Mono).unwrap();

    let pcm_in: Vec<i16> = (0..320)
        .map(|i| ((f32::from(i as i16) * 0.2).sin() * 4000.0) as i16)
        .collect();
    let packet = opus_bridge::marshal::encode_frame(&mut encoder, &pcm_in).unwrap();
    let pcm_out = opus_bridge::marshal::decode_packet(&mut decoder, &packet).unwrap();
    assert_eq!(pcm_out.len(), pcm_in.len());
    assert!(pcm_out.len() <= max_pcm_samples(SampleRate::Hz16000, Channels::Mono));
}

#[test]
fn test_corrupt_packet_is_a_decode_failure() {
    let mut decoder = Decoder::new(SampleRate::Hz48000, Channels::Mono).unwrap();
    // code 3 packet with a frame count of zero
    let result = opus_bridge::marshal::decode_packet(&mut decoder, &[0x03, 0x00]);
    assert_eq!(result, Err(Error::Decode(Status::InvalidPacket)));
}

#[test]
fn test_buffer_empty() {
    let mut encoder = Encoder::new(SampleRate::Hz48000, Channels::Mono, Application::Voip).unwrap();
    let pcm = vec![0i16; 960];
    let mut empty_buf = [0u8; 0];

    // The wrapper should catch this and return BadArg before calling libopus
    let result = encoder.encode(&pcm, &mut empty_buf);
    assert_eq!(result, Err(Error::Encode(Status::BadArg)));
}

#[test]
fn test_error_text_comes_from_libopus() {
    let text = Error::Encode(Status::BadArg).to_string();
    assert!(text.starts_with("encode failed: "));
    assert!(text.ends_with("(-1)"));
    assert!(!opus_bridge::strerror(-1).is_empty());
    assert!(!opus_bridge::runtime_version().is_empty());
}
