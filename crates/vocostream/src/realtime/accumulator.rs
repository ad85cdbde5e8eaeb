//! Block ring that sums pointer contributions.

/// Fixed ring of output blocks addressed by absolute block index.
///
/// The caller keeps every live block within `capacity` consecutive indices.
#[derive(Debug, Clone)]
pub struct OutputAccumulator {
    samples: Vec<f64>,
    capacity: usize,
    block_len: usize,
}

impl OutputAccumulator {
    /// Creates a ring of `capacity` zeroed blocks of `block_len` samples.
    pub fn new(capacity: usize, block_len: usize) -> Self {
        Self {
            samples: vec![0.0; capacity * block_len],
            capacity,
            block_len,
        }
    }

    /// Number of blocks.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples per block.
    pub fn block_len(&self) -> usize {
        self.block_len
    }

    fn range(&self, block: u64) -> std::ops::Range<usize> {
        let start = (block % self.capacity as u64) as usize * self.block_len;
        start..start + self.block_len
    }

    /// Adds `samples` into `block`.
    pub fn add(&mut self, block: u64, samples: &[f64]) {
        let range = self.range(block);
        for (acc, &s) in self.samples[range].iter_mut().zip(samples) {
            *acc += s;
        }
    }

    /// Copies `block` into `out` and zeroes it for reuse.
    pub fn take(&mut self, block: u64, out: &mut [f64]) {
        let range = self.range(block);
        let stored = &mut self.samples[range];
        out.copy_from_slice(stored);
        stored.fill(0.0);
    }

    /// Zeroes every block.
    pub fn clear(&mut self) {
        self.samples.fill(0.0);
    }
}
