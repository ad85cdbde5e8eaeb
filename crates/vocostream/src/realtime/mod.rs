//! Streaming synthesis with bounded memory.
//!
//! A producer appends parameter frames while a consumer renders waveform
//! blocks of one frame period each:
//! - `ring` - Fixed-capacity FIFO of pending frames and their segments
//! - `pointer` - Staggered overlap-add cursors
//! - `accumulator` - Block ring summing pointer contributions
//! - `synthesizer` - The engine tying them together
//!
//! Concatenated output equals [`crate::synthesis::synthesize`] of the same
//! frames, up to summation order.

mod accumulator;
mod pointer;
mod ring;
mod synthesizer;


pub use accumulator::OutputAccumulator;
pub use pointer::RenderPointer;
pub use ring::FrameRing;
pub use synthesizer::{RealtimeSynthesizer, SynthesizerState};
