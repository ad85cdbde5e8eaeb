//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::f64::consts::TAU;

use vocostream::{FrameSequence, ParameterFrame, RealtimeSynthesizer, SynthesizerConfig};

/// Formant centers and bandwidths in Hz.
const FORMANTS: [(f64, f64); 3] = [(700.0, 110.0), (1220.0, 160.0), (2600.0, 220.0)];

/// Builds `count` vowel-like frames for `config`.
///
/// f0 carries a slow vibrato around 120 Hz with a short unvoiced stretch
/// every 17 frames. The envelope has three formant peaks over a falling
/// tilt, and aperiodicity rises towards Nyquist.
pub fn vowel_frames(count: usize, config: &SynthesizerConfig) -> FrameSequence {
    let bins = config.bins();
    let nyquist = config.sample_rate as f64 / 2.0;
    let bin_hz = config.sample_rate as f64 / config.fft_size as f64;

    let frames = (0..count)
        .map(|i| {
            let f0 = if (10..13).contains(&(i % 17)) {
                0.0
            } else {
                120.0 + 15.0 * (TAU * i as f64 / 40.0).sin()
            };
            let loudness = 1.0 + 0.5 * (TAU * i as f64 / 23.0).cos();
            let envelope = (0..bins)
                .map(|k| {
                    let hz = k as f64 * bin_hz;
                    let peaks: f64 = FORMANTS
                        .iter()
                        .map(|&(center, width)| 50.0 * (-((hz - center) / width).powi(2)).exp())
                        .sum();
                    1e-4 * loudness * (1.0 + peaks) / (1.0 + hz / 1000.0)
                })
                .collect();
            let aperiodicity = (0..bins)
                .map(|k| (0.05 + 0.9 * k as f64 * bin_hz / nyquist).min(1.0))
                .collect();
            ParameterFrame::new(f0, envelope, aperiodicity)
        })
        .collect();

    FrameSequence::from_frames(frames).expect("generated frames are consistent")
}

/// Feeds `frames` one at a time, draining after each append, then finishes
/// the stream and returns everything rendered.
pub fn stream_all(synth: &mut RealtimeSynthesizer, frames: &FrameSequence) -> Vec<f64> {
    let mut out = Vec::new();
    for frame in frames.iter() {
        while !synth
            .append(frame.f0, frame.spectral_envelope, frame.aperiodicity)
            .expect("valid frame")
        {
            assert!(
                synth.drain_into(&mut out) > 0,
                "full ring with nothing to render"
            );
        }
        synth.drain_into(&mut out);
    }
    synth.finish();
    synth.drain_into(&mut out);
    out
}

/// Asserts two signals have equal length and agree sample by sample.
pub fn assert_close(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "sample {}: got {}, expected {}",
            i,
            a,
            e
        );
    }
}

/// Root-mean-square level.
pub fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt()
}
