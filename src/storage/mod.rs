//! Storage layer - page buffers and the page store seam.
//!
//! The buffer manager reaches durable storage only through the
//! [`PageStore`] trait:
//! - [`DiskStore`] - One file per [`FileId`](crate::FileId) on disk
//! - [`MemoryStore`] - In-memory store with an operation log, for tests
//! - [`page`] - The raw page byte buffer

mod disk_store;
mod memory_store;
pub mod page;
mod store;

pub use disk_store::DiskStore;
pub use memory_store::{MemoryStore, StoreOp};
pub use store::PageStore;
