//! Synthesizer configuration.
//!
//! A [`SynthesizerConfig`] is fixed for the lifetime of a synthesis session.
//! It can be built in code with the `with_*` setters or read from JSON;
//! missing JSON fields fall back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::error::{SynthError, SynthResult};

/// Default sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Default frame period in milliseconds.
pub const DEFAULT_FRAME_PERIOD: f64 = 5.0;

/// Default FFT size (1025 envelope bins).
pub const DEFAULT_FFT_SIZE: usize = 2048;

/// Default ring buffer capacity in frames.
pub const DEFAULT_BUFFER_SIZE: usize = 64;

/// Default number of render pointers.
pub const DEFAULT_NUMBER_OF_POINTERS: usize = 8;

/// Largest FFT size accepted.
pub const MAX_FFT_SIZE: usize = 1 << 20;

/// Largest segment (`number_of_pointers * frame_shift`) accepted, in samples.
pub const MAX_SEGMENT_LEN: usize = 1 << 20;

/// Largest number of samples a session may keep in its ring and accumulator.
pub const MAX_SESSION_SAMPLES: usize = 1 << 27;

/// Construction parameters of a synthesis session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SynthesizerConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Spacing between consecutive frames in milliseconds.
    pub frame_period: f64,
    /// Transform size; frames carry `fft_size / 2 + 1` bins.
    pub fft_size: usize,
    /// Ring buffer capacity in frames.
    pub buffer_size: usize,
    /// Number of staggered render pointers (window length in frames).
    pub number_of_pointers: usize,
    /// Seed for the aperiodic noise source.
    pub seed: u32,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            frame_period: DEFAULT_FRAME_PERIOD,
            fft_size: DEFAULT_FFT_SIZE,
            buffer_size: DEFAULT_BUFFER_SIZE,
            number_of_pointers: DEFAULT_NUMBER_OF_POINTERS,
            seed: 0,
        }
    }
}

impl SynthesizerConfig {
    /// Creates a configuration with every construction parameter given explicitly.
    pub fn new(
        sample_rate: u32,
        frame_period: f64,
        fft_size: usize,
        buffer_size: usize,
        number_of_pointers: usize,
    ) -> Self {
        Self {
            sample_rate,
            frame_period,
            fft_size,
            buffer_size,
            number_of_pointers,
            seed: 0,
        }
    }

    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> SynthResult<Self> {
        serde_json::from_str(json).map_err(|e| SynthError::invalid_param("config", e.to_string()))
    }

    /// Sets the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Sets the frame period in milliseconds.
    pub fn with_frame_period(mut self, frame_period: f64) -> Self {
        self.frame_period = frame_period;
        self
    }

    /// Sets the FFT size.
    pub fn with_fft_size(mut self, fft_size: usize) -> Self {
        self.fft_size = fft_size;
        self
    }

    /// Sets the ring buffer capacity.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Sets the number of render pointers.
    pub fn with_number_of_pointers(mut self, number_of_pointers: usize) -> Self {
        self.number_of_pointers = number_of_pointers;
        self
    }

    /// Sets the noise seed.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Checks every construction parameter.
    pub fn validate(&self) -> SynthResult<()> {
        if self.sample_rate == 0 {
            return Err(SynthError::InvalidSampleRate {
                rate: self.sample_rate,
            });
        }
        if !self.frame_period.is_finite() || self.frame_period <= 0.0 {
            return Err(SynthError::InvalidFramePeriod {
                period: self.frame_period,
            });
        }
        if self.fft_size < 2 || self.fft_size % 2 != 0 || self.fft_size > MAX_FFT_SIZE {
            return Err(SynthError::InvalidFftSize {
                size: self.fft_size,
            });
        }
        if self.number_of_pointers == 0 {
            return Err(SynthError::invalid_param(
                "number_of_pointers",
                "must be at least 1",
            ));
        }
        if self.buffer_size < self.number_of_pointers {
            return Err(SynthError::InvalidBufferSize {
                buffer_size: self.buffer_size,
                pointers: self.number_of_pointers,
            });
        }
        if self.frame_shift() == 0 {
            return Err(SynthError::invalid_param(
                "frame_period",
                format!(
                    "{} ms is shorter than one sample at {} Hz",
                    self.frame_period, self.sample_rate
                ),
            ));
        }
        let segment_len = self
            .frame_shift()
            .checked_mul(self.number_of_pointers)
            .filter(|&len| len <= MAX_SEGMENT_LEN)
            .ok_or_else(|| {
                SynthError::invalid_param(
                    "frame_period",
                    format!(
                        "{} ms over {} pointers exceeds {} samples per segment",
                        self.frame_period, self.number_of_pointers, MAX_SEGMENT_LEN
                    ),
                )
            })?;
        // Ring slots hold a segment plus both spectra; the accumulator holds
        // buffer_size + number_of_pointers blocks of one frame shift
        let ring = (segment_len + 2 * self.bins()).checked_mul(self.buffer_size);
        let blocks = self
            .buffer_size
            .checked_add(self.number_of_pointers)
            .and_then(|blocks| blocks.checked_mul(self.frame_shift()));
        let session = ring
            .zip(blocks)
            .and_then(|(ring, blocks)| ring.checked_add(blocks))
            .filter(|&total| total <= MAX_SESSION_SAMPLES);
        if session.is_none() {
            return Err(SynthError::invalid_param(
                "buffer_size",
                format!(
                    "{} frames need more than {} samples of storage",
                    self.buffer_size, MAX_SESSION_SAMPLES
                ),
            ));
        }
        Ok(())
    }

    /// Number of samples between consecutive frames.
    pub fn frame_shift(&self) -> usize {
        frame_shift_samples(self.frame_period, self.sample_rate)
    }

    /// Number of bins per envelope / aperiodicity vector.
    pub fn bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Length of one frame's windowed segment in samples.
    pub fn segment_len(&self) -> usize {
        self.number_of_pointers.saturating_mul(self.frame_shift())
    }

    /// Number of frame periods a frame's segment starts before the frame time.
    pub fn lead(&self) -> usize {
        self.number_of_pointers / 2
    }
}

/// Converts a frame period in milliseconds to a whole number of samples.
pub fn frame_shift_samples(frame_period: f64, sample_rate: u32) -> usize {
    let shift = (frame_period * sample_rate as f64 / 1000.0).round();
    if shift.is_finite() && shift > 0.0 {
        shift as usize
    } else {
        0
    }
}

/// Recovers the FFT size from an envelope length of `fft_size / 2 + 1` bins.
pub fn fft_size_from_bins(bins: usize) -> SynthResult<usize> {
    if bins < 2 {
        return Err(SynthError::invalid_param(
            "bins",
            format!("at least 2 bins are required, got {}", bins),
        ));
    }
    Ok((bins - 1) * 2)
}

/// FFT size large enough to resolve one period of the lowest expected f0.
///
/// Returns `2^(1 + floor(log2(3 * fs / f0_floor + 1)))`.
pub fn fft_size_for_f0_floor(f0_floor: f64, sample_rate: u32) -> SynthResult<usize> {
    if !f0_floor.is_finite() || f0_floor <= 0.0 {
        return Err(SynthError::invalid_param(
            "f0_floor",
            format!("must be positive, got {}", f0_floor),
        ));
    }
    if sample_rate == 0 {
        return Err(SynthError::InvalidSampleRate { rate: sample_rate });
    }
    let exponent = (3.0 * sample_rate as f64 / f0_floor + 1.0).log2().floor() as u32;
    1usize
        .checked_shl(exponent.saturating_add(1))
        .filter(|&size| size <= MAX_FFT_SIZE)
        .ok_or_else(|| {
            SynthError::invalid_param(
                "f0_floor",
                format!(
                    "{} Hz at {} Hz needs an FFT larger than {}",
                    f0_floor, sample_rate, MAX_FFT_SIZE
                ),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_valid() {
        let config = SynthesizerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bins(), 1025);
    }

    #[test]
    fn test_frame_shift_rounds() {
        // 5 ms at 44100 Hz is 220.5 samples
        assert_eq!(frame_shift_samples(5.0, 44100), 221);
        assert_eq!(frame_shift_samples(5.0, 16000), 80);
        assert_eq!(frame_shift_samples(0.001, 8000), 0);
    }

    #[test]
    fn test_derived_lengths() {
        let config = SynthesizerConfig::new(16000, 5.0, 1024, 16, 4);
        assert_eq!(config.frame_shift(), 80);
        assert_eq!(config.segment_len(), 320);
        assert_eq!(config.lead(), 2);
        assert_eq!(config.bins(), 513);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = SynthesizerConfig::default();

        let err = base.clone().with_sample_rate(0).validate().unwrap_err();
        assert_eq!(err, SynthError::InvalidSampleRate { rate: 0 });

        let err = base.clone().with_frame_period(0.0).validate().unwrap_err();
        assert_eq!(err.code(), "SYNTH_002");
        assert!(base.clone().with_frame_period(f64::NAN).validate().is_err());

        let err = base.clone().with_fft_size(0).validate().unwrap_err();
        assert_eq!(err, SynthError::InvalidFftSize { size: 0 });
        assert!(base.clone().with_fft_size(1023).validate().is_err());

        assert!(base.clone().with_number_of_pointers(0).validate().is_err());

        let err = base
            .clone()
            .with_buffer_size(4)
            .with_number_of_pointers(8)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            SynthError::InvalidBufferSize {
                buffer_size: 4,
                pointers: 8
            }
        );

        let err = base
            .with_sample_rate(8000)
            .with_frame_period(0.01)
            .validate()
            .unwrap_err();
        assert_eq!(err.code(), "SYNTH_005");
    }

    #[test]
    fn test_buffer_equal_to_pointers_is_valid() {
        let config = SynthesizerConfig::default()
            .with_buffer_size(3)
            .with_number_of_pointers(3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config =
            SynthesizerConfig::from_json(r#"{"sample_rate": 16000, "number_of_pointers": 2}"#)
                .unwrap();
        assert_eq!(config.sample_rate, 16000);
        assert_eq!(config.number_of_pointers, 2);
        assert_eq!(config.frame_period, DEFAULT_FRAME_PERIOD);
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn test_from_json_rejects_unknown_fields() {
        let err = SynthesizerConfig::from_json(r#"{"sample_rat": 16000}"#).unwrap_err();
        assert_eq!(err.code(), "SYNTH_005");
    }

    #[test]
    fn test_fft_size_from_bins() {
        assert_eq!(fft_size_from_bins(1025).unwrap(), 2048);
        assert_eq!(fft_size_from_bins(2).unwrap(), 2);
        assert!(fft_size_from_bins(1).is_err());
        assert!(fft_size_from_bins(0).is_err());
    }

    #[test]
    fn test_fft_size_for_f0_floor() {
        // 3 * 44100 / 71 + 1 = 1864.4 -> floor(log2) = 10 -> 2^11
        assert_eq!(fft_size_for_f0_floor(71.0, 44100).unwrap(), 2048);
        // 3 * 16000 / 71 + 1 = 677.06 -> floor(log2) = 9 -> 2^10
        assert_eq!(fft_size_for_f0_floor(71.0, 16000).unwrap(), 1024);
        assert!(fft_size_for_f0_floor(0.0, 16000).is_err());
        assert!(fft_size_for_f0_floor(71.0, 0).is_err());
    }

    #[test]
    fn test_fft_size_for_tiny_f0_floor_is_rejected() {
        let err = fft_size_for_f0_floor(1e-300, 44100).unwrap_err();
        assert_eq!(err.code(), "SYNTH_005");
        assert!(fft_size_for_f0_floor(1e-3, 44100).is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_frame_period() {
        let config = SynthesizerConfig::new(44100, 1e18, 16, 8, 8);
        assert_eq!(config.segment_len(), usize::MAX);

        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), "SYNTH_005");
        assert!(err.to_string().contains("frame_period"), "{}", err);

        // One second frames over a few pointers are still fine
        assert!(SynthesizerConfig::new(44100, 1000.0, 16, 8, 8).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_storage() {
        let err = SynthesizerConfig::new(44100, 1000.0, 16, 1 << 20, 8)
            .validate()
            .unwrap_err();
        assert_eq!(err.code(), "SYNTH_005");
        assert!(err.to_string().contains("buffer_size"), "{}", err);

        let err = SynthesizerConfig::default()
            .with_buffer_size(usize::MAX)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("buffer_size"), "{}", err);
    }

    #[test]
    fn test_validate_rejects_oversized_fft() {
        let err = SynthesizerConfig::default()
            .with_fft_size(MAX_FFT_SIZE * 2)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            SynthError::InvalidFftSize {
                size: MAX_FFT_SIZE * 2
            }
        );
    }
}
