//! The streaming synthesis engine.

use super::accumulator::OutputAccumulator;
use super::pointer::RenderPointer;
use super::ring::FrameRing;
use crate::config::SynthesizerConfig;
use crate::error::{SynthError, SynthResult};
use crate::frame::{FrameRef, FrameSequence, ParameterFrame};
use crate::synthesis::FrameRenderer;

/// Externally visible engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesizerState {
    /// Accepting frames and producing output.
    Running,
    /// Ring buffer full and no output can be produced.
    Locked,
    /// End of stream declared; remaining output can still be drained.
    Finished,
}

/// Incremental synthesizer fed one parameter frame at a time.
///
/// Frames are held in a fixed ring until every render pointer has consumed
/// them. Pointer 0 synthesizes each frame's windowed segment; pointer `p`
/// adds slice `p` of that segment to the output block it currently points
/// at. A block is handed out by [`render`](Self::render) once every frame
/// overlapping it has contributed.
///
/// All storage is allocated by [`new`](Self::new).
#[derive(Debug)]
pub struct RealtimeSynthesizer {
    config: SynthesizerConfig,
    frame_shift: usize,
    bins: usize,
    renderer: FrameRenderer,
    ring: FrameRing,
    pointers: Vec<RenderPointer>,
    accumulator: OutputAccumulator,
    chunk: Vec<f64>,
    next_block: u64,
    finished: bool,
    poisoned: bool,
}

impl RealtimeSynthesizer {
    /// Creates a synthesizer for `config`.
    ///
    /// # Arguments
    /// * `config` - Session configuration, validated here
    ///
    /// # Returns
    /// The engine, or the first configuration error found.
    pub fn new(config: SynthesizerConfig) -> SynthResult<Self> {
        config.validate()?;

        let renderer = FrameRenderer::new(&config)?;
        let frame_shift = config.frame_shift();
        let lead = config.lead();
        let pointers = (0..config.number_of_pointers)
            .map(|p| RenderPointer::new(p, lead))
            .collect();
        let ring = FrameRing::new(config.buffer_size, config.bins(), config.segment_len());
        let accumulator =
            OutputAccumulator::new(config.buffer_size + config.number_of_pointers, frame_shift);
        let chunk = vec![0.0; accumulator.block_len()];

        log::debug!(
            "realtime synthesizer: fs={} frame_shift={} fft_size={} buffer_size={} pointers={}",
            config.sample_rate,
            frame_shift,
            config.fft_size,
            config.buffer_size,
            config.number_of_pointers
        );

        Ok(Self {
            bins: config.bins(),
            frame_shift,
            renderer,
            ring,
            pointers,
            accumulator,
            chunk,
            next_block: 0,
            finished: false,
            poisoned: false,
            config,
        })
    }

    /// Appends one frame.
    ///
    /// # Returns
    /// `Ok(true)` if the frame was stored, `Ok(false)` if the ring is full
    /// (retry after rendering). A malformed frame is returned as an error and
    /// poisons the synthesizer.
    pub fn append(
        &mut self,
        f0: f64,
        spectral_envelope: &[f64],
        aperiodicity: &[f64],
    ) -> SynthResult<bool> {
        self.check_accepting()?;
        let frame = FrameRef::new(f0, spectral_envelope, aperiodicity);
        if let Err(err) = frame.validate(self.bins) {
            return Err(self.poison(err));
        }
        Ok(self.ring.push(frame))
    }

    /// Appends an owned frame. Same contract as [`append`](Self::append).
    pub fn append_frame(&mut self, frame: &ParameterFrame) -> SynthResult<bool> {
        self.append(frame.f0, &frame.spectral_envelope, &frame.aperiodicity)
    }

    /// Appends a block of frames, all or nothing.
    ///
    /// Returns `Ok(false)` without storing anything when the block does not
    /// fit in the free slots. An empty block is accepted.
    pub fn append_frames(&mut self, frames: &FrameSequence) -> SynthResult<bool> {
        self.check_accepting()?;
        if let Err(err) = frames.validate(self.bins) {
            return Err(self.poison(err));
        }
        if frames.len() > self.ring.free_slots() {
            return Ok(false);
        }
        for frame in frames.iter() {
            self.ring.push(frame);
        }
        Ok(true)
    }

    /// Produces the next block of `frame_shift` samples, if one is complete.
    ///
    /// Returns `None` when more frames are needed, when the stream is fully
    /// drained after [`finish`](Self::finish), or when the synthesizer is
    /// poisoned. The returned slice is valid until the next call.
    pub fn render(&mut self) -> Option<&[f64]> {
        if self.poisoned {
            return None;
        }
        self.pump();

        if self.finished && self.next_block >= self.ring.head() {
            return None;
        }
        if !self.is_finalized(self.next_block) {
            return None;
        }

        self.accumulator.take(self.next_block, &mut self.chunk);
        log::trace!("rendered block {}", self.next_block);
        self.next_block += 1;
        Some(self.chunk.as_slice())
    }

    /// Renders every available block into `out`.
    ///
    /// # Returns
    /// Number of samples appended.
    pub fn drain_into(&mut self, out: &mut Vec<f64>) -> usize {
        let mut written = 0;
        while let Some(chunk) = self.render() {
            out.extend_from_slice(chunk);
            written += chunk.len();
        }
        written
    }

    /// Returns true if the ring is full and no output can be produced.
    ///
    /// With `buffer_size >= number_of_pointers` a full ring always leaves a
    /// pointer able to advance or a block ready to render, so this reports
    /// true only if that guarantee is broken.
    pub fn is_locked(&self) -> bool {
        if self.finished || !self.ring.is_full() {
            return false;
        }
        let stuck = !(0..self.pointers.len()).any(|p| self.can_advance(p))
            && !self.is_finalized(self.next_block);
        if stuck {
            log::warn!(
                "synthesizer locked: frames {}..{} held, next block {}",
                self.ring.tail(),
                self.ring.head(),
                self.next_block
            );
        }
        stuck
    }

    /// Current state.
    pub fn state(&self) -> SynthesizerState {
        if self.finished {
            SynthesizerState::Finished
        } else if self.is_locked() {
            SynthesizerState::Locked
        } else {
            SynthesizerState::Running
        }
    }

    /// Declares end of stream.
    ///
    /// Pointers no longer wait for successors of the last frame, so the final
    /// blocks become renderable. Further appends fail.
    pub fn finish(&mut self) {
        if !self.finished {
            log::debug!("stream finished after {} frames", self.ring.head());
        }
        self.finished = true;
    }

    /// Returns to the freshly constructed state, discarding pending frames and
    /// output. A poisoned synthesizer stays poisoned.
    pub fn refresh(&mut self) {
        self.ring.clear();
        self.accumulator.clear();
        self.pointers.iter_mut().for_each(RenderPointer::reset);
        self.chunk.fill(0.0);
        self.next_block = 0;
        self.finished = false;
        log::debug!("synthesizer refreshed");
    }

    /// Session configuration.
    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Samples per rendered block.
    pub fn frame_shift(&self) -> usize {
        self.frame_shift
    }

    /// Frames that must be appended before the first block can be rendered.
    pub fn latency_frames(&self) -> usize {
        self.config.lead() + 1
    }

    /// Frames held in the ring.
    pub fn pending_frames(&self) -> usize {
        self.ring.len()
    }

    /// Free ring slots.
    pub fn free_slots(&self) -> usize {
        self.ring.free_slots()
    }

    /// Total frames accepted since construction or the last refresh.
    pub fn appended_frames(&self) -> u64 {
        self.ring.head()
    }

    /// Total samples rendered since construction or the last refresh.
    pub fn emitted_samples(&self) -> u64 {
        self.next_block * self.frame_shift as u64
    }

    /// Returns true once [`finish`](Self::finish) was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns true once a malformed frame was rejected.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    fn check_accepting(&self) -> SynthResult<()> {
        if self.poisoned {
            return Err(SynthError::Poisoned);
        }
        if self.finished {
            return Err(SynthError::StreamFinished);
        }
        Ok(())
    }

    fn poison(&mut self, err: SynthError) -> SynthError {
        self.poisoned = true;
        log::warn!("rejected frame {}: {}", self.ring.head(), err);
        err
    }

    /// Advances every pointer as far as the rules allow, then frees frames
    /// all pointers have passed.
    fn pump(&mut self) {
        loop {
            let mut progressed = false;
            for p in 0..self.pointers.len() {
                while self.can_advance(p) {
                    self.step(p);
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }

        let slowest = self
            .pointers
            .iter()
            .map(RenderPointer::cursor)
            .min()
            .unwrap_or(0);
        self.ring.release_until(slowest);
        log::trace!(
            "pointers at frames {}..={}, {} frames held",
            slowest,
            self.pointers.first().map_or(0, RenderPointer::cursor),
            self.ring.len()
        );
    }

    fn can_advance(&self, p: usize) -> bool {
        let pointer = &self.pointers[p];
        let frame = pointer.cursor();
        let head = self.ring.head();
        if frame >= head {
            return false;
        }

        let ordered = if p == 0 {
            // Keep pointer 0 within one window of the slowest pointer
            let slowest = self.pointers[self.pointers.len() - 1].cursor();
            frame.saturating_sub(slowest) < self.pointers.len() as u64
        } else {
            let ahead = self.pointers[p - 1].cursor();
            ahead >= frame + 2 || (self.finished && ahead == head)
        };

        let window_end = self.next_block as i64 + self.accumulator.capacity() as i64;
        ordered && pointer.target_block() < window_end
    }

    fn step(&mut self, p: usize) {
        let Self {
            renderer,
            ring,
            pointers,
            accumulator,
            frame_shift,
            ..
        } = self;
        let pointer = &mut pointers[p];
        let frame = pointer.cursor();

        if p == 0 {
            if let Some((params, segment)) = ring.frame_and_segment_mut(frame) {
                renderer.render(params, frame, segment);
            }
        }

        let block = pointer.target_block();
        if block >= 0 {
            if let Some(segment) = ring.segment(frame) {
                let start = pointer.slice() * *frame_shift;
                accumulator.add(block as u64, &segment[start..start + *frame_shift]);
            }
        }
        pointer.advance();
    }

    /// A block is final once every pointer whose slice maps a real frame onto
    /// it has moved past that frame.
    fn is_finalized(&self, block: u64) -> bool {
        let head = self.ring.head();
        self.pointers.iter().all(|pointer| {
            let frame = pointer.frame_for_block(block);
            if frame < 0 || (self.finished && frame as u64 >= head) {
                return true;
            }
            pointer.cursor() as i64 > frame
        })
    }
}
