//! Configuration for the buffer manager.

use super::{Error, Result};

/// Size of a page in bytes (4KB).
///
/// Matches the OS page size on most systems, so a frame maps onto one
/// memory page and page-store I/O stays aligned.
pub const PAGE_SIZE: usize = 4096;

/// Maximum number of pages per file with a u32 PageId.
///
/// One id (`u32::MAX`) is reserved for [`PageId::INVALID`](super::PageId::INVALID).
pub const MAX_PAGES: u64 = u32::MAX as u64;

/// Pool size used by [`BufferConfig::default`].
pub const DEFAULT_POOL_SIZE: usize = 64;

/// Construction parameters for a [`BufferManager`](crate::buffer::BufferManager).
///
/// # Example
/// ```
/// use clockpool::BufferConfig;
///
/// let config = BufferConfig::new(16);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.memory_usage(), 16 * clockpool::PAGE_SIZE);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferConfig {
    /// Number of frames in the pool.
    pub pool_size: usize,
}

impl BufferConfig {
    /// Creates a configuration with the given number of frames.
    pub fn new(pool_size: usize) -> Self {
        Self { pool_size }
    }

    /// Sets the number of frames.
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Bytes of page memory the pool holds once constructed.
    pub fn memory_usage(&self) -> usize {
        self.pool_size * PAGE_SIZE
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(Error::InvalidConfig("pool_size must be > 0".to_string()));
        }
        Ok(())
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}
