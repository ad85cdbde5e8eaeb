#![no_main]

use libfuzzer_sys::fuzz_target;
use vocostream::SynthesizerConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = SynthesizerConfig::from_json(text) else {
        return;
    };
    // Keep allocations bounded
    if config.fft_size > 1 << 14 || config.buffer_size > 1 << 10 {
        return;
    }
    if config.validate().is_ok() && config.segment_len() <= 1 << 16 {
        assert!(vocostream::RealtimeSynthesizer::new(config).is_ok());
    }
});
