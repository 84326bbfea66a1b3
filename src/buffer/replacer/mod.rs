//! Eviction policy implementations (replacers).
//!
//! Currently implements:
//! - [`ClockReplacer`] - Second-chance clock sweep over the frame table

mod clock;

pub use clock::ClockReplacer;
