//! vocostream
//!
//! Streaming source-filter vocoder synthesis with bounded memory.
//!
//! # Overview
//!
//! A synthesis session receives one parameter frame per frame period (f0,
//! power spectral envelope, aperiodicity) and turns it into waveform blocks
//! of one frame period each. Frames wait in a fixed-capacity ring buffer;
//! staggered render pointers overlap-add each frame's windowed segment into
//! an output accumulator; a block is handed out once every frame that
//! overlaps it has contributed.
//!
//! The producer/consumer handoff is explicit:
//! - [`RealtimeSynthesizer::append`] returns `Ok(false)` when the ring is full
//! - [`RealtimeSynthesizer::render`] returns `None` until a block is complete
//! - [`RealtimeSynthesizer::is_locked`] reports a full ring that cannot make progress
//!
//! # Determinism
//!
//! Output depends only on the frames, their indices and the configuration.
//! Aperiodic noise for frame `j` comes from a PCG32 stream seeded with a
//! BLAKE3 hash of the session seed and `j`, so streaming output matches
//! [`synthesize`] regardless of how appends and renders interleave.
//!
//! # Example
//!
//! ```
//! use vocostream::{RealtimeSynthesizer, SynthesizerConfig};
//!
//! let config = SynthesizerConfig::default()
//!     .with_sample_rate(16000)
//!     .with_fft_size(512)
//!     .with_buffer_size(16)
//!     .with_number_of_pointers(4);
//! let mut synth = RealtimeSynthesizer::new(config)?;
//!
//! let bins = synth.config().bins();
//! let envelope = vec![1e-4; bins];
//! let aperiodicity = vec![0.2; bins];
//!
//! let mut audio = Vec::new();
//! for _ in 0..100 {
//!     while !synth.append(120.0, &envelope, &aperiodicity)? {
//!         synth.drain_into(&mut audio);
//!     }
//!     synth.drain_into(&mut audio);
//! }
//! synth.finish();
//! synth.drain_into(&mut audio);
//!
//! assert_eq!(audio.len(), 100 * synth.frame_shift());
//! # Ok::<(), vocostream::SynthError>(())
//! ```
//!
//! # Crate Structure
//!
//! - [`config`] - Session configuration and FFT size helpers
//! - [`error`] - Error types
//! - [`frame`] - Parameter frame types
//! - [`realtime`] - Streaming engine (ring buffer, render pointers, accumulator)
//! - [`rng`] - Deterministic per-frame noise
//! - [`synthesis`] - Per-frame synthesis kernel and batch synthesis

pub mod config;
pub mod error;
pub mod frame;
pub mod realtime;
pub mod rng;
pub mod synthesis;

pub use config::{fft_size_for_f0_floor, fft_size_from_bins, SynthesizerConfig};
pub use error::{SynthError, SynthResult};
pub use frame::{FrameRef, FrameSequence, ParameterFrame};
pub use realtime::{RealtimeSynthesizer, SynthesizerState};
pub use synthesis::{synthesize, FrameRenderer};
