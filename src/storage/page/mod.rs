//! Page buffer type.
//!
//! [`Page`] is the raw 4KB data container held by each buffer frame.

#[allow(clippy::module_inception)]
mod page;

pub use page::Page;
