//! Basic example demonstrating the bridge's handle and keyed APIs.
//!
//! With two arguments, `basic_bridge <input.pcm> <output.pcm>` runs a file-to-file loop
//! over 48 kHz mono little-endian 16-bit PCM.

use opus_bridge::marshal::{pcm_from_le_bytes, pcm_to_le_bytes};
use opus_bridge::{Application, BridgeConfig, OpusBridge, SessionProfile};
use simple_logger::SimpleLogger;
use std::sync::Arc;

struct PrintingObserver;

impl opus_bridge::Observer for PrintingObserver {
    fn on_hello(&self) -> opus_bridge::Result<()> {
        println!("✓ Observer notified");
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::new().env().init()?;
    println!("Opus Bridge Basic Example");
    println!("=========================");

    let profile = SessionProfile::VOICE_FULLBAND;
    let bridge = OpusBridge::new(BridgeConfig::default().with_profile(profile));

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [input, output] = args.as_slice() {
        return convert_file(&bridge, profile.frame_samples(), input, output);
    }

    let encoder = bridge.create_encoder(48_000, 1, Application::Voip as i32, 32_000)?;
    let decoder = bridge.create_decoder(48_000, 1)?;
    println!("✓ Created {encoder} and {decoder}");

    // Generate some test audio data (sine wave)
    let frequency = 440.0; // A4 note
    let sample_rate = 48000.0;
    let num_samples = profile.frame_samples();
    let input_pcm: Vec<i16> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate;
            let sample = (frequency * 2.0 * std::f32::consts::PI * t).sin();
            (sample * i16::MAX as f32 * 0.1) as i16 // 10% volume
        })
        .collect();

    let packet = bridge.encode(encoder.to_raw(), &input_pcm)?;
    println!(
        "✓ Encoded {} bytes (compression ratio: {:.2})",
        packet.len(),
        input_pcm.len() as f32 * 2.0 / packet.len() as f32
    );

    let decoded = bridge.decode(decoder.to_raw(), &packet)?;
    let sum_squared_error: f32 = input_pcm
        .iter()
        .zip(&decoded)
        .map(|(a, b)| {
            let error = f32::from(*a) - f32::from(*b);
            error * error
        })
        .sum();
    println!(
        "✓ Decoded {} samples, RMS reconstruction error: {:.2}",
        decoded.len(),
        (sum_squared_error / num_samples as f32).sqrt()
    );

    bridge.release_encoder(encoder.to_raw())?;
    bridge.release_decoder(decoder.to_raw())?;
    if let Err(err) = bridge.release_encoder(encoder.to_raw()) {
        println!("✓ Second release rejected: {err}");
    }

    bridge.init_encoder("demo")?;
    let keyed = bridge.encode_keyed("demo", &input_pcm)?;
    println!("✓ Keyed session encoded {} bytes", keyed.len());
    bridge.close_encoder("demo")?;

    bridge.set_observer(Arc::new(PrintingObserver));
    bridge.say_hello();

    println!(
        "\nExample completed with {} live codec instance(s)",
        bridge.registry().live_instances()
    );
    Ok(())
}

fn convert_file(
    bridge: &OpusBridge,
    frame: usize,
    input: &str,
    output: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    bridge.init_encoder("file")?;
    bridge.init_decoder("file")?;

    let pcm = pcm_from_le_bytes(&std::fs::read(input)?);
    let mut decoded = Vec::with_capacity(pcm.len());
    let mut encoded_bytes = 0;
    for chunk in pcm.chunks_exact(frame) {
        let packet = bridge.encode_keyed("file", chunk)?;
        encoded_bytes += packet.len();
        decoded.extend(bridge.decode_keyed("file", &packet)?);
    }
    std::fs::write(output, pcm_to_le_bytes(&decoded))?;

    println!(
        "✓ {} frames, {} encoded bytes, {} samples written to {output}",
        pcm.len() / frame,
        encoded_bytes,
        decoded.len()
    );
    Ok(())
}
