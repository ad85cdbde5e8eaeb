//! Spectral magnitude rules, zero-phase impulse responses and the synthesis window.

use std::f64::consts::TAU;

use rustfft::num_complex::Complex;
use rustfft::Fft;

use crate::frame::FrameRef;

/// Which part of the source-filter model a response shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// Pulse-train (harmonic) part.
    Periodic,
    /// Noise part.
    Aperiodic,
}

/// Amplitude of the periodic component for one bin.
///
/// Aperiodicity is treated as an amplitude ratio, so the periodic share of
/// the power is `1 - ap^2`.
#[inline]
pub fn periodic_magnitude(power: f64, aperiodicity: f64) -> f64 {
    let ap = aperiodicity.clamp(0.0, 1.0);
    (power.max(0.0) * (1.0 - ap * ap)).sqrt()
}

/// Amplitude of the aperiodic component for one bin.
#[inline]
pub fn aperiodic_magnitude(power: f64, aperiodicity: f64) -> f64 {
    aperiodicity.clamp(0.0, 1.0) * power.max(0.0).sqrt()
}

/// Magnitude of `component` at `bin`; unvoiced frames are fully aperiodic.
#[inline]
fn magnitude(frame: &FrameRef<'_>, component: Component, bin: usize) -> f64 {
    let power = frame.spectral_envelope[bin];
    match (component, frame.is_voiced()) {
        (Component::Periodic, true) => periodic_magnitude(power, frame.aperiodicity[bin]),
        (Component::Periodic, false) => 0.0,
        (Component::Aperiodic, true) => aperiodic_magnitude(power, frame.aperiodicity[bin]),
        (Component::Aperiodic, false) => power.max(0.0).sqrt(),
    }
}

/// Writes the centered zero-phase impulse response of `component` into `out`.
///
/// `buffer` and `out` hold `fft_size` values; `ifft` is an inverse transform of
/// that size. The response peak lands on index `fft_size / 2` and the taps are
/// normalized so a flat unit magnitude yields a unit impulse.
pub fn zero_phase_response(
    frame: &FrameRef<'_>,
    component: Component,
    ifft: &dyn Fft<f64>,
    buffer: &mut [Complex<f64>],
    scratch: &mut [Complex<f64>],
    out: &mut [f64],
) {
    let size = buffer.len();
    let half = size / 2;

    buffer[0] = Complex::new(magnitude(frame, component, 0), 0.0);
    for bin in 1..half {
        let m = Complex::new(magnitude(frame, component, bin), 0.0);
        buffer[bin] = m;
        buffer[size - bin] = m;
    }
    buffer[half] = Complex::new(magnitude(frame, component, half), 0.0);

    ifft.process_with_scratch(buffer, scratch);

    let scale = 1.0 / size as f64;
    for (n, tap) in out.iter_mut().enumerate() {
        *tap = buffer[(n + size - half) % size].re * scale;
    }
}

/// Synthesis window for segments of `len` samples built from `pointers` hops.
///
/// Rectangular for a single pointer; otherwise a periodic Hann window scaled
/// by `2 / pointers`, which sums to exactly one when overlapped at
/// `len / pointers` spacing.
pub fn synthesis_window(len: usize, pointers: usize) -> Vec<f64> {
    if pointers <= 1 {
        return vec![1.0; len];
    }
    let scale = 2.0 / pointers as f64;
    (0..len)
        .map(|i| scale * 0.5 * (1.0 - (TAU * i as f64 / len as f64).cos()))
        .collect()
}
