//! Buffer manager statistics.

use std::fmt;

/// Counters kept by the buffer manager.
///
/// The manager is driven by one caller at a time, so these are plain
/// integers updated through `&mut self`. Use [`snapshot`](Self::snapshot)
/// to copy them out.
///
/// # Example
/// ```
/// use clockpool::BufferStats;
///
/// let mut stats = BufferStats::new();
/// stats.record_hit();
/// stats.record_miss();
/// assert_eq!(stats.hit_rate(), 0.5);
/// ```
#[derive(Debug, Default)]
pub struct BufferStats {
    inner: StatsSnapshot,
}

impl BufferStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.inner.cache_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.inner.cache_misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.inner.evictions += 1;
    }

    pub fn record_read(&mut self) {
        self.inner.pages_read += 1;
    }

    pub fn record_write(&mut self) {
        self.inner.pages_written += 1;
    }

    /// A miss served with a zeroed page instead of a read.
    pub fn record_blank_load(&mut self) {
        self.inner.blank_loads += 1;
    }

    pub fn record_exhaustion(&mut self) {
        self.inner.exhaustions += 1;
    }

    /// Calculate cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        self.inner.hit_rate()
    }

    /// Copy of the current counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        self.inner
    }

    /// Reset all counters to zero.
    pub fn reset(&mut self) {
        self.inner = StatsSnapshot::default();
    }
}

/// A point-in-time copy of [`BufferStats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Pins that found the page resident.
    pub cache_hits: u64,
    /// Pins that had to claim a frame.
    pub cache_misses: u64,
    /// Resident pages displaced by a miss.
    pub evictions: u64,
    pub pages_read: u64,
    pub pages_written: u64,
    pub blank_loads: u64,
    /// Pins refused because every frame was pinned.
    pub exhaustions: u64,
}

impl StatsSnapshot {
    /// Calculate cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, misses: {}, evictions: {}, reads: {}, writes: {}, hit_rate: {:.2}% }}",
            self.cache_hits,
            self.cache_misses,
            self.evictions,
            self.pages_read,
            self.pages_written,
            self.hit_rate() * 100.0
        )
    }
}
