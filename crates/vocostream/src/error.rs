//! Error types for the streaming synthesizer.

use thiserror::Error;

/// Result type for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;

/// Errors that can occur while configuring or feeding a synthesizer.
///
/// Backpressure (`append` returning `Ok(false)`), starvation (`render`
/// returning `None`) and deadlock (`is_locked`) are normal outcomes and are
/// never reported through this type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    /// Invalid sample rate.
    #[error("invalid sample rate: {rate} Hz")]
    InvalidSampleRate {
        /// The invalid sample rate.
        rate: u32,
    },

    /// Invalid frame period.
    #[error("invalid frame period: {period} ms")]
    InvalidFramePeriod {
        /// The invalid frame period in milliseconds.
        period: f64,
    },

    /// Invalid FFT size.
    #[error("invalid fft size: {size} (must be even and at least 2)")]
    InvalidFftSize {
        /// The invalid FFT size.
        size: usize,
    },

    /// Ring buffer capacity cannot hold the render pointers.
    #[error("buffer size {buffer_size} must be at least the number of pointers ({pointers})")]
    InvalidBufferSize {
        /// Requested ring buffer capacity in frames.
        buffer_size: usize,
        /// Requested number of render pointers.
        pointers: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// A frame vector does not have `fft_size / 2 + 1` bins.
    #[error(
        "frame has {spectral_envelope} envelope bins and {aperiodicity} aperiodicity bins, expected {expected}"
    )]
    FrameShape {
        /// Expected bin count.
        expected: usize,
        /// Length of the spectral envelope.
        spectral_envelope: usize,
        /// Length of the aperiodicity vector.
        aperiodicity: usize,
    },

    /// f0, envelope and aperiodicity counts of a frame block disagree.
    #[error(
        "frame count mismatch: {f0} f0 values, {spectral_envelope} envelopes, {aperiodicity} aperiodicity rows"
    )]
    FrameCountMismatch {
        /// Number of f0 values.
        f0: usize,
        /// Number of spectral envelope rows.
        spectral_envelope: usize,
        /// Number of aperiodicity rows.
        aperiodicity: usize,
    },

    /// A frame carries a value the synthesizer cannot use.
    #[error("invalid frame: {message}")]
    InvalidFrame {
        /// Error message.
        message: String,
    },

    /// `append` was called after `finish`.
    #[error("stream already finished; refresh the synthesizer to start a new session")]
    StreamFinished,

    /// An earlier frame error made this synthesizer unusable.
    #[error("synthesizer rejected an invalid frame earlier and can no longer be used")]
    Poisoned,
}

impl SynthError {
    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid frame error.
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame {
            message: message.into(),
        }
    }

    /// Stable identifier for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            SynthError::InvalidSampleRate { .. } => "SYNTH_001",
            SynthError::InvalidFramePeriod { .. } => "SYNTH_002",
            SynthError::InvalidFftSize { .. } => "SYNTH_003",
            SynthError::InvalidBufferSize { .. } => "SYNTH_004",
            SynthError::InvalidParameter { .. } => "SYNTH_005",
            SynthError::FrameShape { .. } => "SYNTH_006",
            SynthError::FrameCountMismatch { .. } => "SYNTH_007",
            SynthError::InvalidFrame { .. } => "SYNTH_008",
            SynthError::StreamFinished => "SYNTH_009",
            SynthError::Poisoned => "SYNTH_010",
        }
    }

    /// Returns true for errors raised while validating a configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SynthError::InvalidSampleRate { .. }
                | SynthError::InvalidFramePeriod { .. }
                | SynthError::InvalidFftSize { .. }
                | SynthError::InvalidBufferSize { .. }
                | SynthError::InvalidParameter { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_param_helper() {
        let err = SynthError::invalid_param("number_of_pointers", "must be at least 1");
        assert!(err.to_string().contains("number_of_pointers"));
        assert!(err.to_string().contains("at least 1"));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_frame_shape_message() {
        let err = SynthError::FrameShape {
            expected: 1025,
            spectral_envelope: 513,
            aperiodicity: 1025,
        };
        let msg = err.to_string();
        assert!(msg.contains("513"));
        assert!(msg.contains("1025"));
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_codes_are_unique() {
        let errors = [
            SynthError::InvalidSampleRate { rate: 0 },
            SynthError::InvalidFramePeriod { period: 0.0 },
            SynthError::InvalidFftSize { size: 0 },
            SynthError::InvalidBufferSize {
                buffer_size: 1,
                pointers: 2,
            },
            SynthError::invalid_param("x", "y"),
            SynthError::FrameShape {
                expected: 3,
                spectral_envelope: 2,
                aperiodicity: 3,
            },
            SynthError::FrameCountMismatch {
                f0: 1,
                spectral_envelope: 2,
                aperiodicity: 2,
            },
            SynthError::invalid_frame("nan"),
            SynthError::StreamFinished,
            SynthError::Poisoned,
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
