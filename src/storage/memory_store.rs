//! In-memory page store.
//!
//! [`MemoryStore`] keeps every file as a vector of boxed pages and records
//! each successful operation in order. Tests use the log to check how many
//! reads and writes the buffer manager issued, and in which order.

use std::collections::HashMap;
use std::io;

use crate::common::{Error, FileId, PageId, PageKey, Result};
use crate::storage::page::Page;
use crate::storage::PageStore;

/// One completed page store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Read(PageKey),
    Write(PageKey),
    Allocate {
        file_id: FileId,
        first: PageId,
        count: u32,
    },
    Deallocate {
        file_id: FileId,
        start: PageId,
        end: PageId,
    },
}

/// Slots indexed by page id. `None` marks a deallocated id.
#[derive(Default)]
struct MemFile {
    pages: Vec<Option<Box<Page>>>,
}

impl MemFile {
    /// First index of `count` consecutive deallocated slots.
    fn find_free_run(&self, count: usize) -> Option<usize> {
        let mut run = 0;
        for (i, slot) in self.pages.iter().enumerate() {
            if slot.is_none() {
                run += 1;
                if run == count {
                    return Some(i + 1 - count);
                }
            } else {
                run = 0;
            }
        }
        None
    }

    fn page(&self, page_id: PageId) -> Option<&Page> {
        self.pages.get(page_id.0 as usize)?.as_deref()
    }

    fn page_mut(&mut self, page_id: PageId) -> Option<&mut Page> {
        self.pages.get_mut(page_id.0 as usize)?.as_deref_mut()
    }
}

/// A [`PageStore`] held entirely in memory.
///
/// Deallocated ids are reused first-fit by later allocations. An optional
/// per-file capacity makes allocation fail once a file would exceed it.
///
/// # Example
/// ```
/// use clockpool::storage::{MemoryStore, PageStore};
/// use clockpool::FileId;
///
/// let mut store = MemoryStore::new();
/// let first = store.allocate_pages(FileId::new(0), 3).unwrap();
/// assert_eq!(first.0, 0);
/// assert_eq!(store.page_count(FileId::new(0)), 3);
/// ```
#[derive(Default)]
pub struct MemoryStore {
    files: HashMap<FileId, MemFile>,
    capacity: Option<u32>,
    log: Vec<StoreOp>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryStore {
    /// Create an empty store with unbounded files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store whose files hold at most `capacity` pages.
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Every successful operation so far, oldest first.
    pub fn log(&self) -> &[StoreOp] {
        &self.log
    }

    /// Forget the operation log.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Number of page reads in the log.
    pub fn reads(&self) -> usize {
        self.log.iter().filter(|op| matches!(op, StoreOp::Read(_))).count()
    }

    /// Number of page writes in the log.
    pub fn writes(&self) -> usize {
        self.log.iter().filter(|op| matches!(op, StoreOp::Write(_))).count()
    }

    /// Number of writes of one particular page.
    pub fn writes_of(&self, page_id: PageId, file_id: FileId) -> usize {
        let key = PageKey::new(page_id, file_id);
        self.log.iter().filter(|op| **op == StoreOp::Write(key)).count()
    }

    /// Make every subsequent read fail with an I/O error.
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Make every subsequent write fail with an I/O error.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Erase all files. The operation log is kept.
    pub fn reset(&mut self) {
        self.files.clear();
    }

    /// Number of page slots (allocated or freed) in `file_id`.
    pub fn page_count(&self, file_id: FileId) -> u32 {
        self.files
            .get(&file_id)
            .map_or(0, |f| f.pages.len() as u32)
    }

    /// True if `page_id` is currently allocated in `file_id`.
    pub fn is_allocated(&self, page_id: PageId, file_id: FileId) -> bool {
        self.files
            .get(&file_id)
            .is_some_and(|f| f.page(page_id).is_some())
    }

    /// Read-only view of a stored page, bypassing the log.
    pub fn peek(&self, page_id: PageId, file_id: FileId) -> Option<&Page> {
        self.files.get(&file_id)?.page(page_id)
    }
}

impl PageStore for MemoryStore {
    fn read_page(&mut self, file_id: FileId, page_id: PageId, page: &mut Page) -> Result<()> {
        if self.fail_reads {
            return Err(io::Error::other("injected read failure").into());
        }
        let stored = self
            .files
            .get(&file_id)
            .and_then(|f| f.page(page_id))
            .ok_or(Error::PageNotFound { page_id, file_id })?;
        page.copy_from(stored);
        self.log.push(StoreOp::Read(PageKey::new(page_id, file_id)));
        Ok(())
    }

    fn write_page(&mut self, file_id: FileId, page_id: PageId, page: &Page) -> Result<()> {
        if self.fail_writes {
            return Err(io::Error::other("injected write failure").into());
        }
        let stored = self
            .files
            .get_mut(&file_id)
            .and_then(|f| f.page_mut(page_id))
            .ok_or(Error::PageNotFound { page_id, file_id })?;
        stored.copy_from(page);
        self.log.push(StoreOp::Write(PageKey::new(page_id, file_id)));
        Ok(())
    }

    fn allocate_pages(&mut self, file_id: FileId, count: u32) -> Result<PageId> {
        let denied = Error::StoreAllocation {
            file_id,
            requested: count,
        };
        if count == 0 {
            return Err(denied);
        }

        let file = self.files.entry(file_id).or_default();
        let start = match file.find_free_run(count as usize) {
            Some(start) => start,
            None => {
                let start = file.pages.len();
                let end = start as u64 + count as u64;
                let limit = self.capacity.map_or(u32::MAX as u64, u64::from);
                if end > limit {
                    return Err(denied);
                }
                file.pages.resize_with(end as usize, || None);
                start
            }
        };

        for slot in &mut file.pages[start..start + count as usize] {
            *slot = Some(Box::new(Page::new()));
        }

        let first = PageId::new(start as u32);
        self.log.push(StoreOp::Allocate {
            file_id,
            first,
            count,
        });
        Ok(first)
    }

    fn deallocate_pages(&mut self, file_id: FileId, start: PageId, end: PageId) -> Result<()> {
        let file = self
            .files
            .get_mut(&file_id)
            .ok_or(Error::PageNotFound {
                page_id: start,
                file_id,
            })?;

        for id in start.0..end.0 {
            let page_id = PageId::new(id);
            if file.page(page_id).is_none() {
                return Err(Error::PageNotFound { page_id, file_id });
            }
        }
        for id in start.0..end.0 {
            file.pages[id as usize] = None;
        }

        self.log.push(StoreOp::Deallocate {
            file_id,
            start,
            end,
        });
        Ok(())
    }
}
