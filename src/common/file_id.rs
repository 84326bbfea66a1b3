//! File identifier type.

use std::fmt;

/// Identifies the page store file that owns a page.
///
/// The buffer manager never interprets this value. It is supplied by the
/// caller and handed back to the [`PageStore`](crate::storage::PageStore)
/// untouched, so two files may both contain a page 0 without colliding.
///
/// # Example
/// ```
/// use clockpool::FileId;
///
/// let file = FileId::new(7);
/// assert_eq!(file.0, 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a new FileId.
    #[inline]
    pub fn new(id: u32) -> Self {
        FileId(id)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File({})", self.0)
    }
}
