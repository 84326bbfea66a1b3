//! Common types and utilities shared across the buffer manager.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`BufferConfig`](config::BufferConfig)
//! - Error types
//! - Identifiers (PageId, FileId, PageKey, FrameId)

pub mod config;
pub mod error;
mod file_id;
mod frame_id;
mod page_id;
mod page_key;

pub use error::{Error, Result};
pub use file_id::FileId;
pub use frame_id::FrameId;
pub use page_id::PageId;
pub use page_key::PageKey;
