//! Per-frame windowed synthesis.

use std::fmt;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::response::{synthesis_window, zero_phase_response, Component};
use crate::config::SynthesizerConfig;
use crate::error::SynthResult;
use crate::frame::FrameRef;
use crate::rng::{create_frame_rng, gaussian};

const ZERO: Complex<f64> = Complex { re: 0.0, im: 0.0 };

/// Turns one parameter frame into its windowed waveform segment.
///
/// Frame `j`'s segment covers `segment_len` samples starting at absolute
/// sample `(j - lead) * frame_shift`. Output depends only on the frame, its
/// index and the configuration, never on rendering order. Every FFT plan and
/// buffer is allocated here, so [`render`](Self::render) does not allocate.
pub struct FrameRenderer {
    sample_rate: f64,
    fft_size: usize,
    frame_shift: usize,
    segment_len: usize,
    lead: usize,
    seed: u32,
    conv_size: usize,
    response_ifft: Arc<dyn Fft<f64>>,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
    response_buffer: Vec<Complex<f64>>,
    taps: Vec<f64>,
    periodic_kernel: Vec<Complex<f64>>,
    aperiodic_kernel: Vec<Complex<f64>>,
    pulses: Vec<Complex<f64>>,
    noise: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl FrameRenderer {
    /// Plans transforms and allocates buffers for `config`.
    pub fn new(config: &SynthesizerConfig) -> SynthResult<Self> {
        config.validate()?;

        let fft_size = config.fft_size;
        let segment_len = config.segment_len();
        // Excitation spans the segment plus half a response on each side
        let conv_size = (segment_len + 2 * fft_size).next_power_of_two();

        let mut planner = FftPlanner::new();
        let response_ifft = planner.plan_fft_inverse(fft_size);
        let forward = planner.plan_fft_forward(conv_size);
        let inverse = planner.plan_fft_inverse(conv_size);

        let scratch_len = response_ifft
            .get_inplace_scratch_len()
            .max(forward.get_inplace_scratch_len())
            .max(inverse.get_inplace_scratch_len());

        log::debug!(
            "frame renderer: fft_size={} segment_len={} conv_size={}",
            fft_size,
            segment_len,
            conv_size
        );

        Ok(Self {
            sample_rate: config.sample_rate as f64,
            fft_size,
            frame_shift: config.frame_shift(),
            segment_len,
            lead: config.lead(),
            seed: config.seed,
            conv_size,
            response_ifft,
            forward,
            inverse,
            window: synthesis_window(segment_len, config.number_of_pointers),
            response_buffer: vec![ZERO; fft_size],
            taps: vec![0.0; fft_size],
            periodic_kernel: vec![ZERO; conv_size],
            aperiodic_kernel: vec![ZERO; conv_size],
            pulses: vec![ZERO; conv_size],
            noise: vec![ZERO; conv_size],
            scratch: vec![ZERO; scratch_len],
        })
    }

    /// Segment length in samples.
    pub fn segment_len(&self) -> usize {
        self.segment_len
    }

    /// Absolute sample at which frame `index`'s segment starts.
    pub fn segment_start(&self, index: u64) -> i64 {
        (index as i64 - self.lead as i64) * self.frame_shift as i64
    }

    /// Renders frame `index` into `out`, which must hold `segment_len` samples.
    ///
    /// The frame is assumed to be validated against this renderer's bin count.
    pub fn render(&mut self, frame: FrameRef<'_>, index: u64, out: &mut [f64]) {
        debug_assert_eq!(out.len(), self.segment_len);

        let fft_size = self.fft_size;
        let half = fft_size / 2;
        let excitation_len = self.segment_len + fft_size;
        let region_start = self.segment_start(index) - half as i64;
        let voiced = frame.is_voiced();

        self.load_kernel(&frame, Component::Aperiodic);
        self.noise.fill(ZERO);
        let mut rng = create_frame_rng(self.seed, index);
        for sample in &mut self.noise[..excitation_len] {
            *sample = Complex::new(gaussian(&mut rng), 0.0);
        }
        self.forward
            .process_with_scratch(&mut self.noise, &mut self.scratch);
        for (bin, kernel) in self.noise.iter_mut().zip(&self.aperiodic_kernel) {
            *bin *= kernel;
        }

        if voiced {
            self.load_kernel(&frame, Component::Periodic);
            self.pulses.fill(ZERO);
            let period = pulse_period(self.sample_rate, frame.f0);
            let amplitude = period.sqrt();
            let start = region_start as f64;
            let end = start + excitation_len as f64;
            // Pulses sit on a global grid so neighbouring frames of equal f0 agree.
            // Positions stay in f64 until they are known to fall inside the region.
            let mut m = (start / period).ceil();
            for _ in 0..=excitation_len {
                let position = (m * period).round();
                if !(position < end) {
                    break;
                }
                if position >= start {
                    self.pulses[(position - start) as usize].re += amplitude;
                }
                m += 1.0;
            }
            self.forward
                .process_with_scratch(&mut self.pulses, &mut self.scratch);
            for ((bin, pulse), kernel) in self
                .noise
                .iter_mut()
                .zip(&self.pulses)
                .zip(&self.periodic_kernel)
            {
                *bin += pulse * kernel;
            }
        }

        self.inverse
            .process_with_scratch(&mut self.noise, &mut self.scratch);

        let scale = 1.0 / self.conv_size as f64;
        for ((sample, y), w) in out
            .iter_mut()
            .zip(&self.noise[fft_size..fft_size + self.segment_len])
            .zip(&self.window)
        {
            *sample = y.re * scale * w;
        }
    }

    /// Computes the spectrum of the centered response of `component`.
    fn load_kernel(&mut self, frame: &FrameRef<'_>, component: Component) {
        zero_phase_response(
            frame,
            component,
            self.response_ifft.as_ref(),
            &mut self.response_buffer,
            &mut self.scratch,
            &mut self.taps,
        );

        let kernel = match component {
            Component::Periodic => &mut self.periodic_kernel,
            Component::Aperiodic => &mut self.aperiodic_kernel,
        };
        kernel.fill(ZERO);
        for (slot, &tap) in kernel.iter_mut().zip(&self.taps) {
            *slot = Complex::new(tap, 0.0);
        }
        self.forward.process_with_scratch(kernel, &mut self.scratch);
    }
}

/// Pulse spacing in samples for a voiced frame.
///
/// At least one sample; an f0 so low that `sample_rate / f0` overflows is
/// capped at the largest finite spacing, which leaves at most one pulse.
fn pulse_period(sample_rate: f64, f0: f64) -> f64 {
    (sample_rate / f0).clamp(1.0, f64::MAX)
}

impl fmt::Debug for FrameRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameRenderer")
            .field("fft_size", &self.fft_size)
            .field("frame_shift", &self.frame_shift)
            .field("segment_len", &self.segment_len)
            .field("conv_size", &self.conv_size)
            .finish_non_exhaustive()
    }
}
