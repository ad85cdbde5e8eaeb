//! Fixed-capacity FIFO of pending parameter frames.

use crate::frame::FrameRef;

/// Storage for one frame and its rendered segment.
#[derive(Debug, Clone)]
struct FrameSlot {
    f0: f64,
    spectral_envelope: Vec<f64>,
    aperiodicity: Vec<f64>,
    segment: Vec<f64>,
}

/// Ring buffer of frames addressed by absolute frame index.
///
/// Frames `tail..head` are held. Slot storage is allocated once, so pushing a
/// frame copies it into existing buffers.
#[derive(Debug, Clone)]
pub struct FrameRing {
    slots: Vec<FrameSlot>,
    head: u64,
    tail: u64,
}

impl FrameRing {
    /// Creates a ring of `capacity` slots for frames of `bins` bins and
    /// segments of `segment_len` samples.
    pub fn new(capacity: usize, bins: usize, segment_len: usize) -> Self {
        let slot = FrameSlot {
            f0: 0.0,
            spectral_envelope: vec![0.0; bins],
            aperiodicity: vec![0.0; bins],
            segment: vec![0.0; segment_len],
        };
        Self {
            slots: vec![slot; capacity],
            head: 0,
            tail: 0,
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of frames held.
    pub fn len(&self) -> usize {
        (self.head - self.tail) as usize
    }

    /// Returns true if no frame is held.
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Returns true if every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Number of unoccupied slots.
    pub fn free_slots(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Absolute index the next pushed frame will get (total frames pushed).
    pub fn head(&self) -> u64 {
        self.head
    }

    /// Absolute index of the oldest held frame.
    pub fn tail(&self) -> u64 {
        self.tail
    }

    /// Returns true if frame `index` is held.
    pub fn contains(&self, index: u64) -> bool {
        index >= self.tail && index < self.head
    }

    fn slot_index(&self, index: u64) -> usize {
        (index % self.slots.len() as u64) as usize
    }

    /// Copies `frame` into the next slot.
    ///
    /// Returns false, leaving the ring untouched, when it is full. The frame
    /// must already be validated against the ring's bin count.
    pub fn push(&mut self, frame: FrameRef<'_>) -> bool {
        if self.is_full() {
            return false;
        }
        let i = self.slot_index(self.head);
        let slot = &mut self.slots[i];
        slot.f0 = frame.f0;
        slot.spectral_envelope.copy_from_slice(frame.spectral_envelope);
        slot.aperiodicity.copy_from_slice(frame.aperiodicity);
        self.head += 1;
        true
    }

    /// Rendered segment of frame `index`.
    pub fn segment(&self, index: u64) -> Option<&[f64]> {
        if !self.contains(index) {
            return None;
        }
        Some(self.slots[self.slot_index(index)].segment.as_slice())
    }

    /// Borrows frame `index` together with its writable segment buffer.
    pub fn frame_and_segment_mut(&mut self, index: u64) -> Option<(FrameRef<'_>, &mut [f64])> {
        if !self.contains(index) {
            return None;
        }
        let i = self.slot_index(index);
        let FrameSlot {
            f0,
            spectral_envelope,
            aperiodicity,
            segment,
        } = &mut self.slots[i];
        Some((
            FrameRef::new(*f0, spectral_envelope, aperiodicity),
            segment.as_mut_slice(),
        ))
    }

    /// Frees every frame below `index`.
    pub fn release_until(&mut self, index: u64) {
        self.tail = self.tail.max(index.min(self.head));
    }

    /// Drops all frames and restarts numbering at zero.
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frame_values(f0: f64) -> (Vec<f64>, Vec<f64>) {
        (vec![f0 * 0.01; 3], vec![0.5; 3])
    }

    fn held_f0(ring: &mut FrameRing, index: u64) -> Option<f64> {
        ring.frame_and_segment_mut(index).map(|(frame, _)| frame.f0)
    }

    #[test]
    fn test_push_until_full() {
        let mut ring = FrameRing::new(2, 3, 4);
        let (sp, ap) = frame_values(100.0);

        assert!(ring.is_empty());
        assert!(ring.push(FrameRef::new(100.0, &sp, &ap)));
        assert!(ring.push(FrameRef::new(110.0, &sp, &ap)));
        assert!(ring.is_full());
        assert_eq!(ring.free_slots(), 0);
        assert!(!ring.push(FrameRef::new(120.0, &sp, &ap)));
        assert_eq!(ring.head(), 2);
        assert_eq!(held_f0(&mut ring, 1), Some(110.0));
    }

    #[test]
    fn test_release_frees_slots_in_order() {
        let mut ring = FrameRing::new(2, 3, 4);
        let (sp, ap) = frame_values(100.0);
        ring.push(FrameRef::new(100.0, &sp, &ap));
        ring.push(FrameRef::new(110.0, &sp, &ap));

        ring.release_until(1);
        assert_eq!(ring.tail(), 1);
        assert_eq!(held_f0(&mut ring, 0), None);
        assert!(ring.push(FrameRef::new(120.0, &sp, &ap)));

        // Frame 2 reuses frame 0's slot
        assert_eq!(held_f0(&mut ring, 2), Some(120.0));
        assert_eq!(held_f0(&mut ring, 1), Some(110.0));
        assert_eq!(held_f0(&mut ring, 3), None);
    }

    #[test]
    fn test_release_never_passes_head_or_rewinds() {
        let mut ring = FrameRing::new(4, 3, 4);
        let (sp, ap) = frame_values(100.0);
        ring.push(FrameRef::new(100.0, &sp, &ap));

        ring.release_until(10);
        assert_eq!(ring.tail(), 1);
        ring.release_until(0);
        assert_eq!(ring.tail(), 1);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_segment_storage() {
        let mut ring = FrameRing::new(2, 3, 4);
        let (sp, ap) = frame_values(100.0);
        ring.push(FrameRef::new(100.0, &sp, &ap));

        if let Some((frame, segment)) = ring.frame_and_segment_mut(0) {
            assert_eq!(frame.spectral_envelope, &sp[..]);
            segment.copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
        }
        assert_eq!(ring.segment(0), Some(&[1.0, 2.0, 3.0, 4.0][..]));
        assert!(ring.segment(1).is_none());
        assert!(ring.frame_and_segment_mut(1).is_none());
    }

    #[test]
    fn test_clear() {
        let mut ring = FrameRing::new(2, 3, 4);
        let (sp, ap) = frame_values(100.0);
        ring.push(FrameRef::new(100.0, &sp, &ap));
        ring.clear();
        assert_eq!(ring.head(), 0);
        assert_eq!(ring.free_slots(), 2);
    }
}
