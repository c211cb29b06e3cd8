use opus_bridge::error::{Error, Status};
use opus_bridge::{
    Application, Bitrate, BridgeConfig, Channels, CodecKind, CodecRegistry, CollisionPolicy,
    INVALID_HANDLE, KeyedSessions, OpusBridge, SampleRate, SessionProfile, max_frame_samples_for,
};
use std::sync::Arc;

const VOIP: i32 = Application::Voip as i32;

#[test]
fn create_release_leaves_nothing_live() {
    let bridge = OpusBridge::new(BridgeConfig::default());
    for rate in [8_000, 12_000, 16_000, 24_000, 48_000] {
        for channels in [1, 2] {
            let encoder = bridge.create_encoder(rate, channels, VOIP, 24_000).unwrap();
            let decoder = bridge.create_decoder(rate, channels).unwrap();
            assert_eq!(bridge.registry().live_instances(), 2);

            bridge.release_encoder(encoder.to_raw()).unwrap();
            bridge.release_decoder(decoder.to_raw()).unwrap();
            assert_eq!(bridge.registry().live_instances(), 0);
        }
    }
}

#[test]
fn double_release_is_an_error() {
    let bridge = OpusBridge::default();
    let handle = bridge.create_encoder(48_000, 1, VOIP, 32_000).unwrap().to_raw();

    assert_eq!(bridge.release_encoder(handle), Ok(()));
    assert_eq!(
        bridge.release_encoder(handle),
        Err(Error::StaleHandle {
            kind: CodecKind::Encoder,
            handle
        })
    );
}

#[test]
fn stale_handle_is_rejected_after_slot_reuse() {
    let bridge = OpusBridge::default();
    let first = bridge.create_decoder(48_000, 1).unwrap();
    bridge.release_decoder(first.to_raw()).unwrap();
    let second = bridge.create_decoder(48_000, 1).unwrap();

    assert_ne!(first, second);
    assert!(matches!(
        bridge.decode(first.to_raw(), &[0xF8, 0xFF, 0xFE]),
        Err(Error::StaleHandle { .. })
    ));
    assert_eq!(bridge.registry().live_decoders(), 1);
}

#[test]
fn handles_do_not_cross_kinds() {
    let bridge = OpusBridge::default();
    let encoder = bridge.create_encoder(48_000, 1, VOIP, 32_000).unwrap();

    assert!(matches!(
        bridge.release_decoder(encoder.to_raw()),
        Err(Error::StaleHandle {
            kind: CodecKind::Decoder,
            ..
        })
    ));
    assert!(matches!(
        bridge.decode(encoder.to_raw(), &[0xF8]),
        Err(Error::StaleHandle { .. })
    ));
    assert_eq!(bridge.registry().live_encoders(), 1);
}

#[test]
fn sentinel_and_garbage_handles_are_rejected() {
    let bridge = OpusBridge::default();
    for raw in [INVALID_HANDLE, -1, 12_345_678_901] {
        assert!(matches!(
            bridge.encode(raw, &[0; 960]),
            Err(Error::StaleHandle { .. })
        ));
        assert!(bridge.release_encoder(raw).is_err());
    }
}

#[test]
fn invalid_parameters_register_nothing() {
    let bridge = OpusBridge::default();
    assert_eq!(
        bridge.create_encoder(44_100, 1, VOIP, 32_000),
        Err(Error::InvalidSampleRate(44_100))
    );
    assert_eq!(
        bridge.create_encoder(48_000, 3, VOIP, 32_000),
        Err(Error::InvalidChannels(3))
    );
    assert_eq!(
        bridge.create_encoder(48_000, 1, 1234, 32_000),
        Err(Error::InvalidApplication(1234))
    );
    assert_eq!(
        bridge.create_decoder(22_050, 1),
        Err(Error::InvalidSampleRate(22_050))
    );
    assert_eq!(bridge.registry().live_instances(), 0);
}

#[test]
fn rejected_bitrate_fails_creation_atomically() {
    let bridge = OpusBridge::default();
    assert_eq!(
        bridge.create_encoder(48_000, 1, VOIP, -5),
        Err(Error::ParameterRejected {
            bitrate: -5,
            status: Status::BadArg
        })
    );
    assert_eq!(bridge.registry().live_encoders(), 0);
}

#[test]
fn maximum_frame_encodes_and_one_more_sample_fails() {
    let bridge = OpusBridge::default();
    let handle = bridge.create_encoder(48_000, 1, VOIP, 32_000).unwrap().to_raw();
    let max = max_frame_samples_for(SampleRate::Hz48000);

    let packet = bridge.encode(handle, &vec![0i16; max]).unwrap();
    assert!(!packet.is_empty());

    assert_eq!(
        bridge.encode(handle, &vec![0i16; max + 1]),
        Err(Error::Encode(Status::BadArg))
    );
}

#[test]
fn dropping_sessions_destroys_their_instances() {
    let registry = Arc::new(CodecRegistry::new());
    let sessions = KeyedSessions::new(
        Arc::clone(&registry),
        SessionProfile::default(),
        CollisionPolicy::Replace,
    );
    let handle = registry
        .create_encoder(SampleRate::Hz48000, Channels::Stereo, Application::Voip, Bitrate::Auto)
        .unwrap();
    for key in ["left-open", "also-open"] {
        sessions.init_encoder(key).unwrap();
        sessions.init_decoder(key).unwrap();
    }
    assert_eq!(registry.live_instances(), 5);

    drop(sessions);
    assert_eq!(registry.live_instances(), 1);
    registry.release_encoder(handle).unwrap();
    assert_eq!(registry.live_instances(), 0);
}
