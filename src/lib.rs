//! clockpool - a page-cache buffer manager with CLOCK replacement.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Access methods (callers)                        │
//! │        pin / unpin / new / free / flush by (page, file)         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Buffer Manager (buffer/)                    │   │
//! │  │   ┌──────────────┐ ┌──────────────┐ ┌───────────────┐   │   │
//! │  │   │  PageIndex   │ │  FrameTable  │ │ ClockReplacer │   │   │
//! │  │   │ key → frame  │ │ descriptors  │ │  clock hand   │   │   │
//! │  │   └──────────────┘ └──────────────┘ └───────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Storage Layer (storage/)                       │   │
//! │  │     PageStore trait: DiskStore | MemoryStore + Page      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, FileId, FrameId, Error, config)
//! - [`buffer`] - Buffer manager, frame table, page index, clock replacer
//! - [`storage`] - Page buffers and page store implementations
//!
//! # Quick Start
//! ```
//! use clockpool::storage::MemoryStore;
//! use clockpool::{BufferManager, FileId};
//!
//! let file = FileId::new(0);
//! let mut bpm = BufferManager::new(8, MemoryStore::new());
//!
//! // Allocate a run of two pages; the first comes back pinned
//! let (first, page) = bpm.new_page(2, file).unwrap();
//! page.as_mut_slice()[0] = 0x2A;
//! bpm.unpin_page(first, file, true).unwrap();
//!
//! bpm.flush_all_pages().unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::{BufferConfig, PAGE_SIZE};
pub use common::{Error, FileId, FrameId, PageId, PageKey, Result};

pub use buffer::{BufferManager, BufferStats, FrameDescriptor, PageGuard, SharedBufferManager, StatsSnapshot};
pub use storage::page::Page;
pub use storage::{DiskStore, MemoryStore, PageStore};
