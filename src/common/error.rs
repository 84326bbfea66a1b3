//! Error types for the buffer manager.

use thiserror::Error;

use super::{FileId, PageId};

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors surfaced by the buffer manager and its page stores.
///
/// Pool exhaustion and pin-state violations are ordinary outcomes that the
/// caller is expected to handle. None of them are retried internally.
#[derive(Debug, Error)]
pub enum Error {
    /// Every frame is pinned; the clock sweep found no victim.
    #[error("buffer pool exhausted: every frame is pinned")]
    PoolExhausted,

    /// Unpin (or pinned-page access) on a page that is not resident or has
    /// a zero pin count.
    #[error("{page_id} of {file_id} is not pinned")]
    PageNotPinned { page_id: PageId, file_id: FileId },

    /// Free called on a page that is still pinned.
    #[error("{page_id} of {file_id} is pinned ({pin_count} holders)")]
    PagePinned {
        page_id: PageId,
        file_id: FileId,
        pin_count: u32,
    },

    /// The page store has no such page (never allocated or deallocated).
    #[error("{page_id} of {file_id} not found in page store")]
    PageNotFound { page_id: PageId, file_id: FileId },

    /// The page store could not grant a contiguous run of pages.
    #[error("cannot allocate {requested} pages in {file_id}")]
    StoreAllocation { file_id: FileId, requested: u32 },

    /// I/O error from the page store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Page index insert for a key that is already mapped.
    #[error("{page_id} of {file_id} is already resident")]
    PageAlreadyResident { page_id: PageId, file_id: FileId },

    /// Page index removal for a key that is not mapped.
    #[error("{page_id} of {file_id} is not resident")]
    PageNotResident { page_id: PageId, file_id: FileId },

    /// Rejected construction parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// True for [`Error::PoolExhausted`].
    pub fn is_pool_exhausted(&self) -> bool {
        matches!(self, Error::PoolExhausted)
    }

    /// True for failures that originate in the page store.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::PageNotFound { .. } | Error::StoreAllocation { .. }
        )
    }
}
