use opus_bridge::error::{Error, Status};
use opus_bridge::{BridgeConfig, CollisionPolicy, OpusBridge, SessionProfile};

fn bridge(collision: CollisionPolicy) -> OpusBridge {
    OpusBridge::new(BridgeConfig::default().with_collision(collision))
}

#[test]
fn keyed_round_trip_uses_profile() {
    let config = BridgeConfig::default().with_profile(SessionProfile::MUSIC_STEREO);
    let bridge = OpusBridge::new(config);
    bridge.init_encoder("call-1").unwrap();
    bridge.init_decoder("call-1").unwrap();

    let frame = vec![0i16; SessionProfile::MUSIC_STEREO.frame_samples()];
    let packet = bridge.encode_keyed("call-1", &frame).unwrap();
    let pcm = bridge.decode_keyed("call-1", &packet).unwrap();
    assert_eq!(pcm.len(), frame.len());

    bridge.close_encoder("call-1").unwrap();
    bridge.close_decoder("call-1").unwrap();
    assert_eq!(bridge.registry().live_instances(), 0);
}

#[test]
fn replace_policy_releases_previous_instance() {
    let bridge = bridge(CollisionPolicy::Replace);
    bridge.init_encoder("A").unwrap();
    bridge.init_encoder("A").unwrap();

    assert_eq!(bridge.sessions().encoder_sessions(), 1);
    assert_eq!(bridge.registry().live_encoders(), 1);

    bridge.close_encoder("A").unwrap();
    assert_eq!(bridge.registry().live_encoders(), 0);
}

#[test]
fn reject_policy_keeps_first_instance() {
    let bridge = bridge(CollisionPolicy::Reject);
    bridge.init_decoder("A").unwrap();
    assert_eq!(
        bridge.init_decoder("A"),
        Err(Error::SessionKeyInUse("A".to_owned()))
    );

    assert_eq!(bridge.registry().live_decoders(), 1);
    bridge.close_decoder("A").unwrap();
    assert_eq!(bridge.registry().live_decoders(), 0);
}

#[test]
fn encoder_and_decoder_keys_are_independent() {
    let bridge = bridge(CollisionPolicy::Reject);
    bridge.init_encoder("shared").unwrap();
    bridge.init_decoder("shared").unwrap();

    assert_eq!(
        bridge.decode_keyed("missing", &[0xF8, 0xFF, 0xFE]),
        Err(Error::UnknownSessionKey("missing".to_owned()))
    );
    bridge.close_encoder("shared").unwrap();
    assert_eq!(
        bridge.encode_keyed("shared", &[0; 960]),
        Err(Error::UnknownSessionKey("shared".to_owned()))
    );
    assert_eq!(bridge.sessions().decoder_sessions(), 1);
}

#[test]
fn unknown_key_is_an_error_not_a_crash() {
    let bridge = OpusBridge::default();
    assert_eq!(
        bridge.encode_keyed("missing-key", &[0; 960]),
        Err(Error::UnknownSessionKey("missing-key".to_owned()))
    );
    assert_eq!(
        bridge.close_encoder("missing-key"),
        Err(Error::UnknownSessionKey("missing-key".to_owned()))
    );
    assert_eq!(
        bridge.close_decoder("missing-key"),
        Err(Error::UnknownSessionKey("missing-key".to_owned()))
    );
}

#[test]
fn keyed_encode_rejects_oversized_frame() {
    let bridge = OpusBridge::default();
    bridge.init_encoder("k").unwrap();
    assert_eq!(
        bridge.encode_keyed("k", &vec![0; 5761]),
        Err(Error::Encode(Status::BadArg))
    );
}

#[test]
fn key_is_copied_from_caller_storage() {
    let bridge = OpusBridge::default();
    let mut key = String::from("transient");
    bridge.init_encoder(&key).unwrap();
    key.clear();
    key.push_str("overwritten");

    assert!(bridge.encode_keyed("transient", &[0; 960]).is_ok());
    assert!(bridge.encode_keyed(&key, &[0; 960]).is_err());
}
