//! Disk Store - file-backed page store.
//!
//! The [`DiskStore`] handles all direct file operations:
//! - Reading and writing pages
//! - Allocating and releasing runs of pages
//! - Opening one database file per [`FileId`]

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::common::config::{MAX_PAGES, PAGE_SIZE};
use crate::common::{Error, FileId, PageId, Result};
use crate::storage::page::Page;
use crate::storage::PageStore;

/// One open database file.
struct DiskFile {
    file: File,
    /// Number of pages in the file.
    page_count: u32,
    /// Deallocated page ids, reused first-fit. Not persisted.
    free: BTreeSet<u32>,
}

impl DiskFile {
    fn is_allocated(&self, page_id: PageId) -> bool {
        page_id.0 < self.page_count && !self.free.contains(&page_id.0)
    }

    /// First id of `count` consecutive freed pages.
    fn find_free_run(&self, count: u32) -> Option<u32> {
        let mut run_start = None;
        let mut prev = None;
        for &id in &self.free {
            match (run_start, prev) {
                (Some(start), Some(p)) if id == p + 1 => {
                    if id - start + 1 == count {
                        return Some(start);
                    }
                }
                _ => {
                    if count == 1 {
                        return Some(id);
                    }
                    run_start = Some(id);
                }
            }
            prev = Some(id);
        }
        None
    }

    fn write_at(&mut self, page_id: PageId, bytes: &[u8]) -> Result<()> {
        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(bytes)?;
        Ok(())
    }
}

/// A [`PageStore`] keeping each file under one directory.
///
/// # File Layout
/// File `n` lives at `<dir>/file_<n>.db`, with pages laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// # Durability
/// Writes and allocations are followed by `fsync()`.
pub struct DiskStore {
    dir: PathBuf,
    files: HashMap<FileId, DiskFile>,
    max_pages_per_file: u64,
}

impl DiskStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            files: HashMap::new(),
            max_pages_per_file: MAX_PAGES,
        })
    }

    /// Cap the number of pages any file may grow to.
    pub fn with_max_pages_per_file(mut self, max_pages: u32) -> Self {
        self.max_pages_per_file = max_pages as u64;
        self
    }

    /// Path of the file backing `file_id`.
    pub fn file_path(&self, file_id: FileId) -> PathBuf {
        self.dir.join(format!("file_{}.db", file_id.0))
    }

    /// Number of pages in `file_id` (allocated or freed).
    pub fn page_count(&mut self, file_id: FileId) -> Result<u32> {
        Ok(self.file(file_id)?.page_count)
    }

    /// Open `file_id`, creating it on first use.
    fn file(&mut self, file_id: FileId) -> Result<&mut DiskFile> {
        let path = self.file_path(file_id);
        match self.files.entry(file_id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(&path)?;
                let page_count = (file.metadata()?.len() / PAGE_SIZE as u64) as u32;
                debug!(%file_id, page_count, path = %path.display(), "opened page file");
                Ok(entry.insert(DiskFile {
                    file,
                    page_count,
                    free: BTreeSet::new(),
                }))
            }
        }
    }

    /// Open `file_id` and check `page_id` is allocated in it.
    fn allocated_file(&mut self, file_id: FileId, page_id: PageId) -> Result<&mut DiskFile> {
        let file = self.file(file_id)?;
        if !file.is_allocated(page_id) {
            return Err(Error::PageNotFound { page_id, file_id });
        }
        Ok(file)
    }
}

impl PageStore for DiskStore {
    fn read_page(&mut self, file_id: FileId, page_id: PageId, page: &mut Page) -> Result<()> {
        let file = self.allocated_file(file_id, page_id)?;
        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        file.file.seek(SeekFrom::Start(offset))?;
        file.file.read_exact(page.as_mut_slice())?;
        Ok(())
    }

    fn write_page(&mut self, file_id: FileId, page_id: PageId, page: &Page) -> Result<()> {
        let file = self.allocated_file(file_id, page_id)?;
        file.write_at(page_id, page.as_slice())?;
        file.file.sync_all()?; // fsync for durability
        Ok(())
    }

    fn allocate_pages(&mut self, file_id: FileId, count: u32) -> Result<PageId> {
        let denied = Error::StoreAllocation {
            file_id,
            requested: count,
        };
        if count == 0 {
            return Err(denied);
        }
        let max_pages = self.max_pages_per_file;
        let file = self.file(file_id)?;

        let first = match file.find_free_run(count) {
            Some(first) => {
                for id in first..first + count {
                    file.free.remove(&id);
                }
                first
            }
            None => {
                if file.page_count as u64 + count as u64 > max_pages {
                    return Err(denied);
                }
                file.page_count
            }
        };

        // Zero the run, extending the file where it runs past the end
        let zeros = [0u8; PAGE_SIZE];
        for id in first..first + count {
            file.write_at(PageId::new(id), &zeros)?;
        }
        file.file.sync_all()?;
        file.page_count = file.page_count.max(first + count);

        debug!(%file_id, first, count, "allocated page run");
        Ok(PageId::new(first))
    }

    fn deallocate_pages(&mut self, file_id: FileId, start: PageId, end: PageId) -> Result<()> {
        let file = self.file(file_id)?;
        for id in start.0..end.0 {
            let page_id = PageId::new(id);
            if !file.is_allocated(page_id) {
                return Err(Error::PageNotFound { page_id, file_id });
            }
        }
        file.free.extend(start.0..end.0);
        debug!(%file_id, start = start.0, end = end.0, "deallocated page run");
        Ok(())
    }
}
