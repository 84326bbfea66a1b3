//! CLOCK (second-chance) replacement policy.
//!
//! The clock is a cheap approximation of LRU:
//! 1. A hand sweeps the frame table in slot order, wrapping around
//! 2. Pinned frames are skipped
//! 3. An unpinned frame with its reference bit set loses the bit and is
//!    passed over once
//! 4. The first unpinned frame with a clear reference bit is the victim
//!
//! The reference bit is set by the buffer manager when a pin count drops to
//! zero, so recently released pages survive one pass of the hand.

use tracing::trace;

use crate::buffer::frame::FrameTable;
use crate::common::FrameId;

/// Clock sweep state: just the hand.
///
/// The hand persists across calls and only ever moves forward (mod pool
/// size). Victim selection clears reference bits as it passes, which is
/// why it takes the frame table mutably.
#[derive(Debug)]
pub struct ClockReplacer {
    hand: usize,
    pool_size: usize,
}

impl ClockReplacer {
    /// Create a replacer for a pool of `pool_size` frames.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize) -> Self {
        assert!(pool_size > 0, "clock replacer needs at least one frame");
        Self { hand: 0, pool_size }
    }

    /// Select a frame to evict, or `None` if every frame is pinned.
    ///
    /// Inspects at most `2 × pool_size` frames: one revolution can clear
    /// every reference bit, the second then finds a victim if any frame is
    /// unpinned. The hand is left one past the victim.
    pub fn find_victim(&mut self, frames: &mut FrameTable) -> Option<FrameId> {
        debug_assert_eq!(frames.len(), self.pool_size);

        for _ in 0..2 * self.pool_size {
            let frame_id = FrameId::new(self.hand);
            self.advance();

            let frame = &mut frames[frame_id];
            if frame.is_pinned() {
                continue;
            }
            if frame.reference() {
                trace!(%frame_id, "clearing reference bit");
                frame.set_reference(false);
                continue;
            }
            return Some(frame_id);
        }

        None
    }

    /// Current hand position.
    #[inline]
    pub fn hand(&self) -> usize {
        self.hand
    }

    #[inline]
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    #[inline]
    fn advance(&mut self) {
        self.hand = (self.hand + 1) % self.pool_size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{FileId, PageId, PageKey};
    use proptest::prelude::*;

    /// Table where every frame holds a page, unpinned with the given bits.
    fn resident_table(references: &[bool]) -> FrameTable {
        let mut table = FrameTable::new(references.len());
        for (i, &reference) in references.iter().enumerate() {
            let frame = &mut table[FrameId::new(i)];
            frame.load(PageKey::new(PageId::new(i as u32), FileId::new(0)));
            frame.unpin();
            frame.set_reference(reference);
        }
        table
    }

    #[test]
    fn test_empty_frames_are_victims_in_order() {
        let mut table = FrameTable::new(3);
        let mut clock = ClockReplacer::new(3);

        assert_eq!(clock.find_victim(&mut table), Some(FrameId::new(0)));
        assert_eq!(clock.find_victim(&mut table), Some(FrameId::new(1)));
        assert_eq!(clock.find_victim(&mut table), Some(FrameId::new(2)));
        assert_eq!(clock.find_victim(&mut table), Some(FrameId::new(0)));
    }

    #[test]
    fn test_skips_pinned() {
        let mut table = resident_table(&[false, false, false]);
        table[FrameId::new(0)].pin();
        table[FrameId::new(1)].pin();
        let mut clock = ClockReplacer::new(3);

        assert_eq!(clock.find_victim(&mut table), Some(FrameId::new(2)));
        assert_eq!(clock.hand(), 0);
    }

    #[test]
    fn test_all_pinned_is_exhaustion() {
        let mut table = resident_table(&[true, false]);
        table[FrameId::new(0)].pin();
        table[FrameId::new(1)].pin();
        let mut clock = ClockReplacer::new(2);

        assert_eq!(clock.find_victim(&mut table), None);
        // Two full revolutions leave the hand where it started
        assert_eq!(clock.hand(), 0);
        // Pinned frames keep their reference bits
        assert!(table[FrameId::new(0)].reference());
    }

    #[test]
    fn test_second_chance() {
        let mut table = resident_table(&[true, false, true]);
        let mut clock = ClockReplacer::new(3);

        // Frame 0 loses its bit, frame 1 is taken
        assert_eq!(clock.find_victim(&mut table), Some(FrameId::new(1)));
        assert!(!table[FrameId::new(0)].reference());
        assert!(table[FrameId::new(2)].reference());

        table[FrameId::new(1)].pin();

        // Frame 2 loses its bit, frame 0 (bit already cleared) is taken
        assert_eq!(clock.find_victim(&mut table), Some(FrameId::new(0)));
        assert!(!table[FrameId::new(2)].reference());
    }

    #[test]
    fn test_all_referenced_needs_full_revolution() {
        let mut table = resident_table(&[true, true, true]);
        let mut clock = ClockReplacer::new(3);

        assert_eq!(clock.find_victim(&mut table), Some(FrameId::new(0)));
        assert!(table.iter().all(|(_, f)| !f.reference()));
        assert_eq!(clock.hand(), 1);
    }

    #[test]
    fn test_hand_persists_across_calls() {
        let mut table = resident_table(&[false, false, false, false]);
        let mut clock = ClockReplacer::new(4);

        let first = clock.find_victim(&mut table).unwrap();
        table[first].pin();
        let second = clock.find_victim(&mut table).unwrap();

        assert_eq!(first, FrameId::new(0));
        assert_eq!(second, FrameId::new(1));
        assert_eq!(clock.hand(), 2);
    }

    proptest! {
        #[test]
        fn prop_never_selects_pinned(
            states in proptest::collection::vec((0u32..3, any::<bool>()), 1..16),
            start in 0usize..16,
        ) {
            let mut table = FrameTable::new(states.len());
            for (i, &(pins, reference)) in states.iter().enumerate() {
                let frame = &mut table[FrameId::new(i)];
                for _ in 0..pins {
                    frame.pin();
                }
                frame.set_reference(reference);
            }
            let mut clock = ClockReplacer::new(states.len());
            for _ in 0..start % states.len() {
                clock.advance();
            }

            let any_unpinned = states.iter().any(|&(pins, _)| pins == 0);
            match clock.find_victim(&mut table) {
                Some(victim) => {
                    prop_assert!(!table[victim].is_pinned());
                    prop_assert!(!table[victim].reference());
                }
                None => prop_assert!(!any_unpinned),
            }
        }
    }
}
