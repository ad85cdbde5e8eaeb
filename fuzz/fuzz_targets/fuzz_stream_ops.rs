#![no_main]

use libfuzzer_sys::fuzz_target;
use vocostream::{RealtimeSynthesizer, SynthError, SynthesizerConfig};

// Byte 0 picks the pointer count, byte 1 the extra ring slots; every
// following byte is one operation.
fuzz_target!(|data: &[u8]| {
    let [pointers, extra, ops @ ..] = data else {
        return;
    };
    let pointers = (*pointers as usize % 6) + 1;
    let buffer_size = pointers + (*extra as usize % 4);
    let config = SynthesizerConfig::new(8000, 4.0, 16, buffer_size, pointers);
    let Ok(mut synth) = RealtimeSynthesizer::new(config) else {
        return;
    };

    let bins = synth.config().bins();
    let hop = synth.frame_shift() as u64;
    let mut envelope = vec![1e-3; bins];
    let aperiodicity = vec![0.3; bins];

    for &op in ops {
        let locked = synth.is_locked();
        match op % 8 {
            0..=2 => {
                let f0 = if op & 0x80 == 0 { 80.0 + op as f64 } else { 0.0 };
                envelope[op as usize % bins] = (op as f64) * 1e-4;
                match synth.append(f0, &envelope, &aperiodicity) {
                    Ok(accepted) => assert!(!(locked && accepted)),
                    Err(SynthError::StreamFinished) => assert!(synth.is_finished()),
                    Err(SynthError::Poisoned) => assert!(synth.is_poisoned()),
                    Err(err) => panic!("valid frame rejected: {}", err),
                }
            }
            3 | 4 => {
                let before = synth.emitted_samples();
                if let Some(chunk) = synth.render() {
                    assert_eq!(chunk.len() as u64, hop);
                    assert!(chunk.iter().all(|s| s.is_finite()));
                }
                assert!(synth.emitted_samples() - before <= hop);
            }
            5 => {
                let mut out = Vec::new();
                synth.drain_into(&mut out);
            }
            6 => synth.finish(),
            _ => {
                if op & 0x40 != 0 {
                    let _ = synth.append(f64::NAN, &envelope, &aperiodicity);
                    if synth.is_poisoned() {
                        assert!(synth.render().is_none());
                    }
                } else {
                    synth.refresh();
                }
            }
        }
        assert!(synth.pending_frames() <= buffer_size);
        assert!(!synth.is_locked());
    }
});
