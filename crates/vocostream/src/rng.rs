//! Deterministic noise source for the aperiodic excitation.
//!
//! Every frame draws its noise from its own PCG32 stream whose seed is derived
//! from the session seed and the frame index with BLAKE3. A frame therefore
//! produces the same noise whether it is rendered by the streaming engine or
//! by batch synthesis, and regardless of how appends and renders interleave.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Derives the noise seed of one frame from the session seed.
///
/// Hashes the little-endian session seed followed by the little-endian
/// frame index and keeps the first four bytes of the digest.
pub fn derive_frame_seed(base_seed: u32, frame_index: u64) -> u32 {
    let mut input = [0u8; 12];
    input[..4].copy_from_slice(&base_seed.to_le_bytes());
    input[4..].copy_from_slice(&frame_index.to_le_bytes());

    let hash = blake3::hash(&input);
    let bytes = hash.as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Noise stream of frame `frame_index` in a session seeded with `base_seed`.
///
/// The renderer draws one gaussian per excitation sample from the returned
/// generator. The derived 32-bit frame seed fills both halves of the 64-bit
/// PCG32 seed.
pub fn create_frame_rng(base_seed: u32, frame_index: u64) -> Pcg32 {
    let frame_seed = u64::from(derive_frame_seed(base_seed, frame_index));
    Pcg32::seed_from_u64((frame_seed << 32) | frame_seed)
}

/// Draws one standard normal sample (Box-Muller, cosine branch).
pub fn gaussian(rng: &mut Pcg32) -> f64 {
    // gen() is in [0, 1); flip it so the logarithm never sees zero
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}
