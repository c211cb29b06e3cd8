use opus_bridge::marshal::{pcm_from_le_bytes, pcm_to_le_bytes};
use opus_bridge::{BridgeConfig, OpusBridge, SessionProfile};
use std::fs;

fn tone(samples: usize) -> Vec<i16> {
    (0..samples)
        .map(|i| ((i as f32 * 0.06).sin() * 6000.0) as i16)
        .collect()
}

#[test]
fn pcm_file_encode_decode_loop() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input_path = dir.path().join("input.pcm");
    let output_path = dir.path().join("output.pcm");

    let profile = SessionProfile::VOICE_WIDEBAND;
    let frame = profile.frame_samples();
    let frames = 25;
    // half a frame of trailing audio is dropped like the fixed-frame loop does
    let input = pcm_to_le_bytes(&tone(frame * frames + frame / 2));
    fs::write(&input_path, input).expect("write input");

    let bridge = OpusBridge::new(BridgeConfig::default().with_profile(profile));
    bridge.init_encoder("file").expect("init encoder");
    bridge.init_decoder("file").expect("init decoder");

    let input = pcm_from_le_bytes(&fs::read(&input_path).expect("read input"));
    let mut decoded = Vec::with_capacity(input.len());
    for chunk in input.chunks_exact(frame) {
        let packet = bridge.encode_keyed("file", chunk).expect("encode");
        decoded.extend(bridge.decode_keyed("file", &packet).expect("decode"));
    }
    fs::write(&output_path, pcm_to_le_bytes(&decoded)).expect("write output");

    let written = fs::read(&output_path).expect("read output");
    assert_eq!(written.len(), frame * frames * 2);
    assert_eq!(pcm_from_le_bytes(&written), decoded);

    let energy: i64 = decoded.iter().map(|s| i64::from(*s).abs()).sum();
    assert!(energy > 0, "decoded tone should not be silent");
}
