//! RAII guard for pinned page access.
//!
//! A [`PageGuard`] holds one pin on a page and releases it when dropped,
//! passing along whether the page was modified. It borrows the manager
//! mutably, so no other manager call can run (and nothing can evict the
//! frame) while the guard is alive.

use std::ops::{Deref, DerefMut};

use tracing::warn;

use crate::common::{FileId, FrameId, PageId, PageKey};
use crate::storage::page::Page;
use crate::storage::PageStore;

use super::buffer_manager::BufferManager;

/// Guard for a pinned page.
///
/// Mutable access through [`DerefMut`] marks the page dirty, so the
/// unpin on drop reports the modification.
///
/// # Example
/// ```
/// use clockpool::storage::{MemoryStore, PageStore};
/// use clockpool::{BufferManager, FileId, PageId};
///
/// let file = FileId::new(0);
/// let mut store = MemoryStore::new();
/// store.allocate_pages(file, 1).unwrap();
/// let mut bpm = BufferManager::new(2, store);
///
/// {
///     let mut guard = bpm.fetch_page(PageId::new(0), file).unwrap();
///     guard.as_mut_slice()[0] = 0xFF;
/// } // unpinned and marked dirty here
///
/// assert_eq!(bpm.pin_count(PageId::new(0), file), Some(0));
/// assert_eq!(bpm.is_dirty(PageId::new(0), file), Some(true));
/// ```
pub struct PageGuard<'a, S: PageStore> {
    /// Back-reference for unpin on drop.
    bpm: &'a mut BufferManager<S>,
    /// Frame holding this page.
    frame_id: FrameId,
    key: PageKey,
    dirty: bool,
}

impl<'a, S: PageStore> PageGuard<'a, S> {
    /// Called by `BufferManager::fetch_page()` after pinning.
    pub(crate) fn new(bpm: &'a mut BufferManager<S>, frame_id: FrameId, key: PageKey) -> Self {
        Self {
            bpm,
            frame_id,
            key,
            dirty: false,
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.key.page_id
    }

    #[inline]
    pub fn file_id(&self) -> FileId {
        self.key.file_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Report the page as modified on drop without touching it.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether the guard will unpin with the dirty flag.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl<S: PageStore> Deref for PageGuard<'_, S> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        self.bpm.frame_page(self.frame_id)
    }
}

impl<S: PageStore> DerefMut for PageGuard<'_, S> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Page {
        self.dirty = true;
        self.bpm.frame_page_mut(self.frame_id)
    }
}

impl<S: PageStore> Drop for PageGuard<'_, S> {
    fn drop(&mut self) {
        // The guard's pin keeps the count positive, so this only fails on a bug
        if let Err(err) = self
            .bpm
            .unpin_page(self.key.page_id, self.key.file_id, self.dirty)
        {
            warn!(page = %self.key, error = %err, "page guard unpin failed");
        }
    }
}
