//! Buffer Manager - the page cache facade.
//!
//! The [`BufferManager`] provides:
//! - Page caching between a [`PageStore`] and memory
//! - Pin-based reference counting
//! - Dirty tracking with write-back before eviction
//! - CLOCK (second-chance) victim selection

use tracing::{debug, trace, warn};

use crate::buffer::frame::{FrameDescriptor, FrameTable};
use crate::buffer::page_index::PageIndex;
use crate::buffer::replacer::ClockReplacer;
use crate::buffer::{BufferStats, PageGuard, StatsSnapshot};
use crate::common::config::BufferConfig;
use crate::common::{Error, FileId, FrameId, PageId, PageKey, Result};
use crate::storage::page::Page;
use crate::storage::PageStore;

/// Manages a fixed pool of frames caching pages from a [`PageStore`].
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                      BufferManager                          │
/// │  ┌──────────────┐  ┌───────────────────────────────────┐   │
/// │  │ page_index   │  │     frames: FrameTable            │   │
/// │  │PageKey → Fid │─▶│  [Desc0] [Desc1] [Desc2] ...      │   │
/// │  └──────────────┘  │     pages: Vec<Box<Page>>         │   │
/// │                    │  [Page0] [Page1] [Page2] ...      │   │
/// │                    └───────────────────────────────────┘   │
/// │  ┌──────────────┐  ┌──────────────┐                        │
/// │  │   replacer   │  │    store     │                        │
/// │  │ClockReplacer │  │ S: PageStore │                        │
/// │  └──────────────┘  └──────────────┘                        │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// # Threading
/// All operations take `&mut self`: one caller drives the manager at a
/// time and there is no internal locking. Wrap it in a
/// [`SharedBufferManager`](crate::buffer::SharedBufferManager) to share it
/// between threads.
///
/// # Buffer lifetimes
/// [`pin_page`](Self::pin_page) and [`new_page`](Self::new_page) return a
/// `&mut Page` that borrows the manager, so the buffer cannot outlive the
/// next manager call. Later access goes through [`page`](Self::page) /
/// [`page_mut`](Self::page_mut), which refuse frames that are not pinned.
///
/// # Usage
/// ```
/// use clockpool::storage::MemoryStore;
/// use clockpool::{BufferManager, FileId};
///
/// let file = FileId::new(0);
/// let mut bpm = BufferManager::new(4, MemoryStore::new());
///
/// let (pid, page) = bpm.new_page(1, file).unwrap();
/// page.as_mut_slice()[0] = 0xAB;
/// bpm.unpin_page(pid, file, true).unwrap();
///
/// bpm.flush_page(pid, file).unwrap();
/// assert_eq!(bpm.store().writes(), 1);
/// ```
pub struct BufferManager<S: PageStore> {
    /// One descriptor per frame.
    frames: FrameTable,

    /// Page buffers, co-indexed with `frames`.
    pages: Vec<Box<Page>>,

    /// Maps resident page keys to frame IDs.
    page_index: PageIndex,

    /// Victim selection.
    replacer: ClockReplacer,

    /// Backing storage.
    store: S,

    /// Miss loads land here and are swapped in only once the read succeeds.
    scratch: Box<Page>,

    stats: BufferStats,
}

impl<S: PageStore> BufferManager<S> {
    /// Create a new buffer manager.
    ///
    /// # Arguments
    /// * `pool_size` - Number of frames in the pool
    /// * `store` - Backing page store
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize, store: S) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        Self {
            frames: FrameTable::new(pool_size),
            pages: (0..pool_size).map(|_| Box::new(Page::new())).collect(),
            page_index: PageIndex::new(),
            replacer: ClockReplacer::new(pool_size),
            store,
            scratch: Box::new(Page::new()),
            stats: BufferStats::new(),
        }
    }

    /// Create a buffer manager from a validated configuration.
    ///
    /// # Errors
    /// `Error::InvalidConfig` if the configuration is rejected.
    pub fn with_config(config: BufferConfig, store: S) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.pool_size, store))
    }

    /// Get the pool size.
    #[inline]
    pub fn pool_size(&self) -> usize {
        self.frames.len()
    }

    // ========================================================================
    // Public API: Pin and unpin
    // ========================================================================

    /// Pin a page, loading it into a frame if it is not resident.
    ///
    /// On a hit the pin count goes up and the resident buffer is returned
    /// with no page store access. On a miss the clock picks a victim
    /// frame, writes it back if dirty, and fills it with the requested
    /// page. With `empty_page` set the frame is zeroed instead of read:
    /// the caller is about to build the page from scratch.
    ///
    /// # Errors
    /// - `Error::PoolExhausted` if every frame is pinned
    /// - page store errors from the write-back or the read
    pub fn pin_page(
        &mut self,
        page_id: PageId,
        file_id: FileId,
        empty_page: bool,
    ) -> Result<&mut Page> {
        let frame_id = self.pin_frame(PageKey::new(page_id, file_id), empty_page)?;
        Ok(&mut *self.pages[frame_id.0])
    }

    /// Release one pin on a page.
    ///
    /// `is_dirty` is sticky: once a frame is dirty it stays dirty until it
    /// is flushed. When the pin count reaches zero the reference bit is
    /// set, so the page survives the next pass of the clock hand.
    ///
    /// # Errors
    /// `Error::PageNotPinned` if the page is not resident or has no pins.
    pub fn unpin_page(&mut self, page_id: PageId, file_id: FileId, is_dirty: bool) -> Result<()> {
        let frame_id = self.pinned_frame(PageKey::new(page_id, file_id))?;
        let frame = &mut self.frames[frame_id];

        if is_dirty {
            frame.mark_dirty();
        }
        if frame.unpin() == 0 {
            frame.set_reference(true);
        }
        Ok(())
    }

    /// Fetch a page behind a guard that unpins it on drop.
    ///
    /// Writing through the guard marks the page dirty.
    pub fn fetch_page(&mut self, page_id: PageId, file_id: FileId) -> Result<PageGuard<'_, S>> {
        let key = PageKey::new(page_id, file_id);
        let frame_id = self.pin_frame(key, false)?;
        Ok(PageGuard::new(self, frame_id, key))
    }

    // ========================================================================
    // Public API: Create and free pages
    // ========================================================================

    /// Allocate a run of `num_pages` pages and pin the first one.
    ///
    /// Only the first page is brought into the pool, as a zeroed buffer.
    /// The rest of the run exists in the store but is not loaded.
    ///
    /// If the first page cannot be pinned the whole run is released back
    /// to the store before the error is returned.
    ///
    /// # Errors
    /// - `Error::StoreAllocation` if the store cannot grant the run
    /// - `Error::PoolExhausted` if every frame is pinned
    pub fn new_page(&mut self, num_pages: u32, file_id: FileId) -> Result<(PageId, &mut Page)> {
        let first = self.store.allocate_pages(file_id, num_pages)?;
        debug!(%file_id, first = %first, num_pages, "allocated page run");

        match self.pin_frame(PageKey::new(first, file_id), true) {
            Ok(frame_id) => Ok((first, &mut *self.pages[frame_id.0])),
            Err(err) => {
                let end = first.offset(num_pages);
                if let Err(release_err) = self.store.deallocate_pages(file_id, first, end) {
                    warn!(%file_id, first = %first, num_pages, error = %release_err,
                        "failed to release page run after pin failure");
                }
                Err(err)
            }
        }
    }

    /// Release a page back to the store, dropping it from the pool.
    ///
    /// A resident, unpinned page is discarded without a write-back.
    ///
    /// # Errors
    /// - `Error::PagePinned` if the page is resident and pinned
    /// - page store errors from the deallocation
    pub fn free_page(&mut self, page_id: PageId, file_id: FileId) -> Result<()> {
        let key = PageKey::new(page_id, file_id);
        let resident = self.page_index.lookup(key);

        if let Some(frame_id) = resident {
            let pin_count = self.frames[frame_id].pin_count();
            if pin_count > 0 {
                return Err(Error::PagePinned {
                    page_id,
                    file_id,
                    pin_count,
                });
            }
        }

        self.store
            .deallocate_pages(file_id, page_id, page_id.offset(1))?;

        if let Some(frame_id) = resident {
            self.page_index.remove(key)?;
            self.frames[frame_id].reset();
            debug!(page = %key, frame = %frame_id, "freed resident page");
        }
        Ok(())
    }

    // ========================================================================
    // Public API: Flush pages
    // ========================================================================

    /// Write a page back if it is resident and dirty.
    ///
    /// Clean or non-resident pages cause no page store access at all, so
    /// flushing stays harmless even after the store has been erased.
    pub fn flush_page(&mut self, page_id: PageId, file_id: FileId) -> Result<()> {
        let key = PageKey::new(page_id, file_id);
        match self.page_index.lookup(key) {
            Some(frame_id) if self.frames[frame_id].is_dirty() => self.write_back(frame_id, key),
            _ => Ok(()),
        }
    }

    /// Write back every dirty resident page, once each.
    pub fn flush_all_pages(&mut self) -> Result<()> {
        let dirty: Vec<(FrameId, PageKey)> = self
            .frames
            .iter()
            .filter(|(_, frame)| frame.is_dirty())
            .filter_map(|(frame_id, frame)| frame.key().map(|key| (frame_id, key)))
            .collect();

        for (frame_id, key) in dirty {
            self.write_back(frame_id, key)?;
        }
        Ok(())
    }

    // ========================================================================
    // Public API: Pinned page access
    // ========================================================================

    /// Borrow a pinned page.
    ///
    /// # Errors
    /// `Error::PageNotPinned` unless the page is resident with a positive
    /// pin count.
    pub fn page(&self, page_id: PageId, file_id: FileId) -> Result<&Page> {
        let frame_id = self.pinned_frame(PageKey::new(page_id, file_id))?;
        Ok(&*self.pages[frame_id.0])
    }

    /// Mutably borrow a pinned page.
    ///
    /// Does not mark the page dirty; report that on unpin.
    pub fn page_mut(&mut self, page_id: PageId, file_id: FileId) -> Result<&mut Page> {
        let frame_id = self.pinned_frame(PageKey::new(page_id, file_id))?;
        Ok(&mut *self.pages[frame_id.0])
    }

    // ========================================================================
    // Public API: Introspection
    // ========================================================================

    /// Frame holding a page, if resident. Diagnostic only.
    pub fn find_frame(&self, page_id: PageId, file_id: FileId) -> Option<FrameId> {
        self.page_index.lookup(PageKey::new(page_id, file_id))
    }

    /// Pin count of a resident page.
    pub fn pin_count(&self, page_id: PageId, file_id: FileId) -> Option<u32> {
        self.find_frame(page_id, file_id)
            .map(|frame_id| self.frames[frame_id].pin_count())
    }

    /// Dirty flag of a resident page.
    pub fn is_dirty(&self, page_id: PageId, file_id: FileId) -> Option<bool> {
        self.find_frame(page_id, file_id)
            .map(|frame_id| self.frames[frame_id].is_dirty())
    }

    /// Descriptor of one frame.
    pub fn frame(&self, frame_id: FrameId) -> Option<&FrameDescriptor> {
        self.frames.get(frame_id)
    }

    /// Number of resident pages.
    pub fn resident_count(&self) -> usize {
        self.page_index.len()
    }

    /// Current clock hand position.
    pub fn clock_hand(&self) -> usize {
        self.replacer.hand()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consume the manager without flushing, returning the store.
    pub fn into_store(self) -> S {
        self.store
    }

    // ========================================================================
    // Internal: Used by PageGuard
    // ========================================================================

    pub(crate) fn frame_page(&self, frame_id: FrameId) -> &Page {
        &self.pages[frame_id.0]
    }

    pub(crate) fn frame_page_mut(&mut self, frame_id: FrameId) -> &mut Page {
        &mut self.pages[frame_id.0]
    }

    // ========================================================================
    // Internal: Core pin logic
    // ========================================================================

    /// Frame of a resident page with a positive pin count.
    fn pinned_frame(&self, key: PageKey) -> Result<FrameId> {
        match self.page_index.lookup(key) {
            Some(frame_id) if self.frames[frame_id].is_pinned() => Ok(frame_id),
            _ => Err(Error::PageNotPinned {
                page_id: key.page_id,
                file_id: key.file_id,
            }),
        }
    }

    /// Pin `key`, loading it on a miss. Returns its frame.
    fn pin_frame(&mut self, key: PageKey, empty_page: bool) -> Result<FrameId> {
        if let Some(frame_id) = self.page_index.lookup(key) {
            let pins = self.frames[frame_id].pin();
            self.stats.record_hit();
            trace!(page = %key, frame = %frame_id, pins, "cache hit");
            return Ok(frame_id);
        }

        self.stats.record_miss();
        self.load_into_victim(key, empty_page)
    }

    /// Miss path: pick a victim, write it back, load `key` into it.
    ///
    /// Each fallible step happens before any index or descriptor change for
    /// `key`, so a failure leaves the victim resident (clean, if its
    /// write-back went through).
    fn load_into_victim(&mut self, key: PageKey, empty_page: bool) -> Result<FrameId> {
        let Some(victim) = self.replacer.find_victim(&mut self.frames) else {
            self.stats.record_exhaustion();
            debug!(page = %key, "buffer pool exhausted");
            return Err(Error::PoolExhausted);
        };

        let old_key = self.frames[victim].key();
        if let Some(old) = old_key {
            if self.frames[victim].is_dirty() {
                self.write_back(victim, old)?;
            }
        }

        if empty_page {
            self.scratch.reset();
            self.stats.record_blank_load();
        } else {
            self.store
                .read_page(key.file_id, key.page_id, &mut self.scratch)?;
            self.stats.record_read();
        }
        std::mem::swap(&mut self.pages[victim.0], &mut self.scratch);

        if let Some(old) = old_key {
            self.page_index.remove(old)?;
            self.stats.record_eviction();
            debug!(evicted = %old, page = %key, frame = %victim, "evicted page");
        } else {
            debug!(page = %key, frame = %victim, "loaded page into empty frame");
        }

        self.frames[victim].load(key);
        self.page_index.insert(key, victim)?;
        Ok(victim)
    }

    /// Write a frame's page to the store and mark it clean.
    fn write_back(&mut self, frame_id: FrameId, key: PageKey) -> Result<()> {
        self.store
            .write_page(key.file_id, key.page_id, &self.pages[frame_id.0])?;
        self.frames[frame_id].clear_dirty();
        self.stats.record_write();
        debug!(page = %key, frame = %frame_id, "wrote back dirty page");
        Ok(())
    }
}

impl<S: PageStore> std::fmt::Debug for BufferManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferManager")
            .field("pool_size", &self.pool_size())
            .field("resident", &self.resident_count())
            .field("clock_hand", &self.clock_hand())
            .finish_non_exhaustive()
    }
}
