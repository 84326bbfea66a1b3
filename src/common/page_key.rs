//! Composite key for resident pages.

use std::fmt;

use super::{FileId, PageId};

/// The `(page, file)` pair that names one page across all files.
///
/// Equality and hashing cover both fields. Keying on the page id alone
/// would make page 3 of one file alias page 3 of another.
///
/// # Example
/// ```
/// use clockpool::{FileId, PageId, PageKey};
///
/// let a = PageKey::new(PageId::new(3), FileId::new(1));
/// let b = PageKey::new(PageId::new(3), FileId::new(2));
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageKey {
    pub page_id: PageId,
    pub file_id: FileId,
}

impl PageKey {
    /// Create a new key.
    #[inline]
    pub fn new(page_id: PageId, file_id: FileId) -> Self {
        Self { page_id, file_id }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.page_id, self.file_id)
    }
}
