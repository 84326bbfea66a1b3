//! The page store seam.

use crate::common::{FileId, PageId, Result};
use crate::storage::page::Page;

/// Durable storage of fixed-size pages, addressed per file.
///
/// This is the only way the buffer manager touches storage. Every call is
/// synchronous: it completes (or fails) before returning. Errors are passed
/// through to the buffer manager's caller unchanged.
pub trait PageStore {
    /// Read page `page_id` of `file_id` into `page`.
    ///
    /// # Errors
    /// `Error::PageNotFound` if the page is not allocated, `Error::Io` on
    /// read failure.
    fn read_page(&mut self, file_id: FileId, page_id: PageId, page: &mut Page) -> Result<()>;

    /// Write `page` as the new content of `page_id` in `file_id`.
    fn write_page(&mut self, file_id: FileId, page_id: PageId, page: &Page) -> Result<()>;

    /// Allocate `count` contiguous page ids in `file_id`, returning the first.
    ///
    /// # Errors
    /// `Error::StoreAllocation` if the run cannot be granted (including
    /// `count == 0`).
    fn allocate_pages(&mut self, file_id: FileId, count: u32) -> Result<PageId>;

    /// Release the ids in `[start, end)` back to the store.
    fn deallocate_pages(&mut self, file_id: FileId, start: PageId, end: PageId) -> Result<()>;
}
