//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache between access methods and the
//! page store. It keeps a fixed number of frames, each holding one page.
//!
//! # Components
//! - [`BufferManager`] - The facade: pin, unpin, new, free, flush
//! - [`FrameTable`] / [`FrameDescriptor`] - Per-frame metadata
//! - [`PageIndex`] - Resident page lookup by `(page, file)`
//! - [`replacer`] - CLOCK victim selection
//! - [`PageGuard`] - RAII pin for scoped page access
//! - [`SharedBufferManager`] - Mutex-wrapped handle for multi-threaded callers
//! - [`BufferStats`] - Hit/miss/eviction/I/O counters

mod buffer_manager;
mod frame;
mod page_guard;
mod page_index;
pub mod replacer;
mod shared;
mod stats;

pub use buffer_manager::BufferManager;
pub use frame::{FrameDescriptor, FrameTable};
pub use page_guard::PageGuard;
pub use page_index::PageIndex;
pub use shared::SharedBufferManager;
pub use stats::{BufferStats, StatsSnapshot};
