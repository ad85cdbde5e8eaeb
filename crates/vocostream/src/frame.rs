//! Parameter frames: one time slice of f0, spectral envelope and aperiodicity.

use crate::error::{SynthError, SynthResult};

/// Borrowed view of one parameter frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameRef<'a> {
    /// Fundamental frequency in Hz, `0.0` for unvoiced frames.
    pub f0: f64,
    /// Power spectral envelope, `fft_size / 2 + 1` bins.
    pub spectral_envelope: &'a [f64],
    /// Aperiodicity per bin, conventionally in [0, 1].
    pub aperiodicity: &'a [f64],
}

impl<'a> FrameRef<'a> {
    /// Creates a frame view.
    pub fn new(f0: f64, spectral_envelope: &'a [f64], aperiodicity: &'a [f64]) -> Self {
        Self {
            f0,
            spectral_envelope,
            aperiodicity,
        }
    }

    /// Returns true if the frame carries a pitch.
    pub fn is_voiced(&self) -> bool {
        self.f0 > 0.0
    }

    /// Checks the frame against the expected bin count.
    pub fn validate(&self, bins: usize) -> SynthResult<()> {
        if self.spectral_envelope.len() != bins || self.aperiodicity.len() != bins {
            return Err(SynthError::FrameShape {
                expected: bins,
                spectral_envelope: self.spectral_envelope.len(),
                aperiodicity: self.aperiodicity.len(),
            });
        }
        if !self.f0.is_finite() || self.f0 < 0.0 {
            return Err(SynthError::invalid_frame(format!(
                "f0 must be finite and non-negative, got {}",
                self.f0
            )));
        }
        if let Some(bin) = self.spectral_envelope.iter().position(|v| !v.is_finite()) {
            return Err(SynthError::invalid_frame(format!(
                "spectral envelope bin {} is not finite",
                bin
            )));
        }
        if let Some(bin) = self.aperiodicity.iter().position(|v| !v.is_finite()) {
            return Err(SynthError::invalid_frame(format!(
                "aperiodicity bin {} is not finite",
                bin
            )));
        }
        Ok(())
    }

    /// Copies the view into an owned frame.
    pub fn to_frame(&self) -> ParameterFrame {
        ParameterFrame {
            f0: self.f0,
            spectral_envelope: self.spectral_envelope.to_vec(),
            aperiodicity: self.aperiodicity.to_vec(),
        }
    }
}

/// Owned parameter frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterFrame {
    /// Fundamental frequency in Hz, `0.0` for unvoiced frames.
    pub f0: f64,
    /// Power spectral envelope.
    pub spectral_envelope: Vec<f64>,
    /// Aperiodicity per bin.
    pub aperiodicity: Vec<f64>,
}

impl ParameterFrame {
    /// Creates an owned frame.
    pub fn new(f0: f64, spectral_envelope: Vec<f64>, aperiodicity: Vec<f64>) -> Self {
        Self {
            f0,
            spectral_envelope,
            aperiodicity,
        }
    }

    /// Borrows the frame.
    pub fn view(&self) -> FrameRef<'_> {
        FrameRef::new(self.f0, &self.spectral_envelope, &self.aperiodicity)
    }
}

/// A block of consecutive frames with consistent counts.
///
/// Used for bulk appends and for batch synthesis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSequence {
    f0: Vec<f64>,
    spectral_envelope: Vec<Vec<f64>>,
    aperiodicity: Vec<Vec<f64>>,
}

impl FrameSequence {
    /// Builds a sequence from per-frame columns.
    ///
    /// The three inputs must hold the same number of frames, and every
    /// envelope row must have the same length as the aperiodicity row
    /// beside it. Bin counts against an FFT size are checked by the consumer.
    pub fn new(
        f0: Vec<f64>,
        spectral_envelope: Vec<Vec<f64>>,
        aperiodicity: Vec<Vec<f64>>,
    ) -> SynthResult<Self> {
        if f0.len() != spectral_envelope.len() || f0.len() != aperiodicity.len() {
            return Err(SynthError::FrameCountMismatch {
                f0: f0.len(),
                spectral_envelope: spectral_envelope.len(),
                aperiodicity: aperiodicity.len(),
            });
        }
        for (sp, ap) in spectral_envelope.iter().zip(&aperiodicity) {
            if sp.len() != ap.len() {
                return Err(SynthError::FrameShape {
                    expected: sp.len(),
                    spectral_envelope: sp.len(),
                    aperiodicity: ap.len(),
                });
            }
        }
        Ok(Self {
            f0,
            spectral_envelope,
            aperiodicity,
        })
    }

    /// Builds a sequence from owned frames.
    pub fn from_frames(frames: Vec<ParameterFrame>) -> SynthResult<Self> {
        let mut f0 = Vec::with_capacity(frames.len());
        let mut spectral_envelope = Vec::with_capacity(frames.len());
        let mut aperiodicity = Vec::with_capacity(frames.len());
        for frame in frames {
            f0.push(frame.f0);
            spectral_envelope.push(frame.spectral_envelope);
            aperiodicity.push(frame.aperiodicity);
        }
        Self::new(f0, spectral_envelope, aperiodicity)
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.f0.len()
    }

    /// Returns true if the sequence holds no frames.
    pub fn is_empty(&self) -> bool {
        self.f0.is_empty()
    }

    /// Borrows frame `index`.
    pub fn frame(&self, index: usize) -> Option<FrameRef<'_>> {
        Some(FrameRef::new(
            *self.f0.get(index)?,
            self.spectral_envelope.get(index)?,
            self.aperiodicity.get(index)?,
        ))
    }

    /// Iterates over the frames in order.
    pub fn iter(&self) -> impl Iterator<Item = FrameRef<'_>> + '_ {
        self.f0
            .iter()
            .zip(&self.spectral_envelope)
            .zip(&self.aperiodicity)
            .map(|((&f0, sp), ap)| FrameRef::new(f0, sp, ap))
    }

    /// Validates every frame against `bins`.
    pub fn validate(&self, bins: usize) -> SynthResult<()> {
        self.iter().try_for_each(|frame| frame.validate(bins))
    }

    /// The f0 contour.
    pub fn f0(&self) -> &[f64] {
        &self.f0
    }
}
