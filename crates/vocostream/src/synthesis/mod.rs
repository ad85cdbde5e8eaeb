//! Source-filter synthesis of parameter frames.
//!
//! - `response` - Periodic/aperiodic magnitude split, zero-phase responses, synthesis window
//! - `renderer` - Per-frame windowed segment synthesis
//!
//! [`synthesize`] is the non-streaming reference: it renders every frame and
//! overlap-adds the segments in one pass. The streaming engine in
//! [`crate::realtime`] produces the same samples block by block.

pub mod renderer;
pub mod response;


pub use renderer::FrameRenderer;
pub use response::{synthesis_window, Component};

use crate::config::SynthesizerConfig;
use crate::error::SynthResult;
use crate::frame::FrameSequence;

/// Synthesizes a complete frame sequence.
///
/// # Arguments
/// * `frames` - Frames to synthesize, each with `config.bins()` bins
/// * `config` - Synthesis configuration
///
/// # Returns
/// `frames.len() * config.frame_shift()` samples. Segment parts falling before
/// the first or after the last frame period are discarded.
pub fn synthesize(frames: &FrameSequence, config: &SynthesizerConfig) -> SynthResult<Vec<f64>> {
    config.validate()?;
    frames.validate(config.bins())?;

    if frames.is_empty() {
        return Ok(Vec::new());
    }

    let mut renderer = FrameRenderer::new(config)?;
    let total = (frames.len() * config.frame_shift()) as i64;
    let mut output = vec![0.0; total as usize];
    let mut segment = vec![0.0; renderer.segment_len()];

    for (index, frame) in frames.iter().enumerate() {
        let index = index as u64;
        renderer.render(frame, index, &mut segment);

        let start = renderer.segment_start(index);
        for (i, &sample) in segment.iter().enumerate() {
            let position = start + i as i64;
            if (0..total).contains(&position) {
                output[position as usize] += sample;
            }
        }
    }

    log::debug!("synthesized {} frames into {} samples", frames.len(), total);
    Ok(output)
}
