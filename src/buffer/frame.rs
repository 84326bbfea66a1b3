//! Frame table - one descriptor per buffer pool slot.
//!
//! A [`FrameDescriptor`] records what a slot currently holds:
//! - Which page is resident (if any)
//! - Pin count for reference counting
//! - Dirty flag for write-back tracking
//! - Reference bit for the clock sweep
//!
//! The [`FrameTable`] is the dense array of descriptors. It carries no
//! policy; the manager and the replacer decide what to write into it.

use crate::common::{FileId, FrameId, PageId, PageKey};

/// Metadata for one frame.
///
/// Invariants maintained by the buffer manager:
/// - an empty frame (`key == None`) has `pin_count == 0` and is clean
/// - a frame is evictable iff `pin_count == 0`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameDescriptor {
    /// The resident page, or `None` if the frame is empty.
    key: Option<PageKey>,

    /// Number of active holders.
    pin_count: u32,

    /// Content differs from the page store since the last flush.
    dirty: bool,

    /// Set when the pin count drops to zero, cleared by the clock sweep.
    reference: bool,
}

impl FrameDescriptor {
    /// Create a new empty frame descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Residency
    // ========================================================================

    /// The resident page key.
    #[inline]
    pub fn key(&self) -> Option<PageKey> {
        self.key
    }

    /// Resident page id, or [`PageId::INVALID`] for an empty frame.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.key.map_or(PageId::INVALID, |k| k.page_id)
    }

    /// Owning file of the resident page.
    #[inline]
    pub fn file_id(&self) -> Option<FileId> {
        self.key.map(|k| k.file_id)
    }

    /// Check if the frame is empty (no page loaded).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.key.is_none()
    }

    /// Install `key` as a freshly loaded page: pinned once, clean, unreferenced.
    pub fn load(&mut self, key: PageKey) {
        self.key = Some(key);
        self.pin_count = 1;
        self.dirty = false;
        self.reference = false;
    }

    /// Reset the frame to the empty state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // ========================================================================
    // Pin count
    // ========================================================================

    /// Increment the pin count. Returns the new pin count.
    #[inline]
    pub fn pin(&mut self) -> u32 {
        self.pin_count += 1;
        self.pin_count
    }

    /// Decrement the pin count. Returns the new pin count.
    ///
    /// # Panics
    /// Panics if pin count is already 0. The manager checks before calling.
    #[inline]
    pub fn unpin(&mut self) -> u32 {
        assert!(self.pin_count > 0, "pin count underflow");
        self.pin_count -= 1;
        self.pin_count
    }

    /// Get the current pin count.
    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    /// Check if the frame is currently pinned.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }

    /// Check if the replacer may reclaim this frame.
    #[inline]
    pub fn is_evictable(&self) -> bool {
        self.pin_count == 0
    }

    // ========================================================================
    // Dirty and reference bits
    // ========================================================================

    /// Mark the frame as dirty (modified).
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clear the dirty flag.
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Check if the frame is dirty.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn set_reference(&mut self, reference: bool) {
        self.reference = reference;
    }

    #[inline]
    pub fn reference(&self) -> bool {
        self.reference
    }
}

/// Fixed-size array of frame descriptors, addressed by [`FrameId`].
#[derive(Debug, Clone)]
pub struct FrameTable {
    frames: Vec<FrameDescriptor>,
}

impl FrameTable {
    /// Create a table of `size` empty frames.
    pub fn new(size: usize) -> Self {
        Self {
            frames: vec![FrameDescriptor::new(); size],
        }
    }

    /// Number of frames.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Descriptor for `frame_id`, if in range.
    #[inline]
    pub fn get(&self, frame_id: FrameId) -> Option<&FrameDescriptor> {
        self.frames.get(frame_id.0)
    }

    /// Mutable descriptor for `frame_id`, if in range.
    #[inline]
    pub fn get_mut(&mut self, frame_id: FrameId) -> Option<&mut FrameDescriptor> {
        self.frames.get_mut(frame_id.0)
    }

    /// All descriptors with their frame ids, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (FrameId, &FrameDescriptor)> {
        self.frames
            .iter()
            .enumerate()
            .map(|(i, frame)| (FrameId::new(i), frame))
    }
}

impl std::ops::Index<FrameId> for FrameTable {
    type Output = FrameDescriptor;

    #[inline]
    fn index(&self, frame_id: FrameId) -> &FrameDescriptor {
        &self.frames[frame_id.0]
    }
}

impl std::ops::IndexMut<FrameId> for FrameTable {
    #[inline]
    fn index_mut(&mut self, frame_id: FrameId) -> &mut FrameDescriptor {
        &mut self.frames[frame_id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(page: u32) -> PageKey {
        PageKey::new(PageId::new(page), FileId::new(0))
    }

    #[test]
    fn test_frame_new() {
        let frame = FrameDescriptor::new();
        assert!(frame.is_empty());
        assert!(!frame.is_pinned());
        assert!(!frame.is_dirty());
        assert!(!frame.reference());
        assert_eq!(frame.page_id(), PageId::INVALID);
        assert_eq!(frame.file_id(), None);
        assert!(frame.is_evictable());
    }

    #[test]
    fn test_frame_pin_unpin() {
        let mut frame = FrameDescriptor::new();

        assert_eq!(frame.pin(), 1);
        assert_eq!(frame.pin(), 2);
        assert!(!frame.is_evictable());

        assert_eq!(frame.unpin(), 1);
        assert_eq!(frame.unpin(), 0);
        assert!(frame.is_evictable());
    }

    #[test]
    #[should_panic(expected = "pin count underflow")]
    fn test_frame_unpin_underflow() {
        let mut frame = FrameDescriptor::new();
        frame.unpin();
    }

    #[test]
    fn test_frame_load_resets_bits() {
        let mut frame = FrameDescriptor::new();
        frame.mark_dirty();
        frame.set_reference(true);

        frame.load(key(7));

        assert_eq!(frame.key(), Some(key(7)));
        assert_eq!(frame.page_id(), PageId::new(7));
        assert_eq!(frame.pin_count(), 1);
        assert!(!frame.is_dirty());
        assert!(!frame.reference());
    }

    #[test]
    fn test_frame_reset() {
        let mut frame = FrameDescriptor::new();
        frame.load(key(99));
        frame.pin();
        frame.mark_dirty();
        frame.set_reference(true);

        frame.reset();

        assert_eq!(frame, FrameDescriptor::new());
    }

    #[test]
    fn test_table_indexing() {
        let mut table = FrameTable::new(4);
        assert_eq!(table.len(), 4);

        table[FrameId::new(2)].load(key(1));
        assert_eq!(table[FrameId::new(2)].page_id(), PageId::new(1));
        assert!(table.get(FrameId::new(4)).is_none());

        let resident: Vec<FrameId> = table
            .iter()
            .filter(|(_, f)| !f.is_empty())
            .map(|(id, _)| id)
            .collect();
        assert_eq!(resident, vec![FrameId::new(2)]);
    }
}
