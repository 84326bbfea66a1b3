//! Page index - resident page lookup.
//!
//! Maps a [`PageKey`] to the frame holding that page. The frame table stays
//! the source of truth for descriptor fields; the index only answers
//! "which slot?".

use std::collections::HashMap;

use crate::common::{Error, FrameId, PageKey, Result};

/// `(page, file)` → frame slot.
///
/// At most one entry per key: a resident page occupies exactly one frame.
#[derive(Debug, Default)]
pub struct PageIndex {
    map: HashMap<PageKey, FrameId>,
}

impl PageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame holding `key`, if resident.
    #[inline]
    pub fn lookup(&self, key: PageKey) -> Option<FrameId> {
        self.map.get(&key).copied()
    }

    /// Map `key` to `frame_id`.
    ///
    /// # Errors
    /// `Error::PageAlreadyResident` if `key` is already mapped.
    pub fn insert(&mut self, key: PageKey, frame_id: FrameId) -> Result<()> {
        if self.map.contains_key(&key) {
            return Err(Error::PageAlreadyResident {
                page_id: key.page_id,
                file_id: key.file_id,
            });
        }
        self.map.insert(key, frame_id);
        Ok(())
    }

    /// Drop the mapping for `key`, returning the frame it pointed at.
    ///
    /// # Errors
    /// `Error::PageNotResident` if `key` is not mapped.
    pub fn remove(&mut self, key: PageKey) -> Result<FrameId> {
        self.map.remove(&key).ok_or(Error::PageNotResident {
            page_id: key.page_id,
            file_id: key.file_id,
        })
    }

    /// Number of resident pages.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PageKey, FrameId)> + '_ {
        self.map.iter().map(|(&k, &f)| (k, f))
    }
}
