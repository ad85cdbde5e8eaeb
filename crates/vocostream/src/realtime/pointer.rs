//! Overlap-add cursors.

/// One staggered render pointer.
///
/// Pointer `p` owns slice `p` of every frame's segment. Consuming frame `j`
/// adds that slice to output block `j + offset`, where `offset = p - lead`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPointer {
    slice: usize,
    offset: i64,
    cursor: u64,
}

impl RenderPointer {
    /// Creates pointer `slice` for a window whose segments start `lead`
    /// frame periods early.
    pub fn new(slice: usize, lead: usize) -> Self {
        Self {
            slice,
            offset: slice as i64 - lead as i64,
            cursor: 0,
        }
    }

    /// Segment slice this pointer reads.
    pub fn slice(&self) -> usize {
        self.slice
    }

    /// Absolute index of the next frame to consume.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Block the next consumed frame is written to.
    pub fn target_block(&self) -> i64 {
        self.cursor as i64 + self.offset
    }

    /// Frame whose slice lands on `block`.
    pub fn frame_for_block(&self, block: u64) -> i64 {
        block as i64 - self.offset
    }

    /// Moves past the current frame.
    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    /// Returns to frame zero.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointers_at_rest_share_a_block() {
        let lead = 2;
        let mut pointers: Vec<RenderPointer> =
            (0..4).map(|p| RenderPointer::new(p, lead)).collect();

        // Pointer p trails pointer 0 by p frames
        for (p, pointer) in pointers.iter_mut().enumerate() {
            for _ in 0..(6 - p) {
                pointer.advance();
            }
        }
        let blocks: Vec<i64> = pointers.iter().map(RenderPointer::target_block).collect();
        assert_eq!(blocks, vec![4, 4, 4, 4]);
    }

    #[test]
    fn test_offsets() {
        let mut pointer = RenderPointer::new(0, 1);
        assert_eq!(pointer.target_block(), -1);
        assert_eq!(pointer.frame_for_block(0), 1);

        pointer.advance();
        pointer.advance();
        assert_eq!(pointer.cursor(), 2);
        assert_eq!(pointer.target_block(), 1);

        pointer.reset();
        assert_eq!(pointer.cursor(), 0);
        assert_eq!(RenderPointer::new(3, 1).slice(), 3);
    }
}
