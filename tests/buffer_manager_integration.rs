//! Integration tests for the buffer manager.
//!
//! These tests verify cross-component behavior that unit tests don't cover:
//! the disk-backed store, multi-file pools, and randomized operation
//! sequences checked against a simple model.

use std::collections::HashMap;

use clockpool::storage::{DiskStore, MemoryStore, PageStore};
use clockpool::{BufferManager, Error, FileId, FrameId, PageId, PageKey};
use proptest::prelude::*;
use tempfile::tempdir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Test data persistence across evictions and manager instances.
#[test]
fn test_disk_store_persistence_across_evictions() {
    init_tracing();
    let dir = tempdir().unwrap();
    let file = FileId::new(3);
    let mut ids = vec![];

    {
        let store = DiskStore::open(dir.path()).unwrap();
        let mut bpm = BufferManager::new(2, store);

        for i in 0u8..6 {
            let (pid, page) = bpm.new_page(1, file).unwrap();
            page.as_mut_slice()[0] = i;
            page.as_mut_slice()[4095] = i ^ 0xFF;
            bpm.unpin_page(pid, file, true).unwrap();
            ids.push(pid);
        }
        bpm.flush_all_pages().unwrap();
    }

    {
        let store = DiskStore::open(dir.path()).unwrap();
        let mut bpm = BufferManager::new(2, store);

        for (i, &pid) in ids.iter().enumerate() {
            let guard = bpm.fetch_page(pid, file).unwrap();
            assert_eq!(guard.as_slice()[0], i as u8);
            assert_eq!(guard.as_slice()[4095], (i as u8) ^ 0xFF);
        }
    }
}

/// Freed pages are released on disk and their ids come back.
#[test]
fn test_disk_store_free_and_reallocate() {
    let dir = tempdir().unwrap();
    let file = FileId::new(0);
    let mut bpm = BufferManager::new(2, DiskStore::open(dir.path()).unwrap());

    let (first, _) = bpm.new_page(3, file).unwrap();
    bpm.unpin_page(first, file, false).unwrap();

    bpm.free_page(first.offset(1), file).unwrap();
    assert!(matches!(
        bpm.pin_page(first.offset(1), file, false),
        Err(Error::PageNotFound { .. })
    ));

    let (again, page) = bpm.new_page(1, file).unwrap();
    assert_eq!(again, first.offset(1));
    assert!(page.is_zeroed());
}

/// Pages of different files with the same id stay apart through eviction.
#[test]
fn test_same_page_id_in_two_files() {
    let dir = tempdir().unwrap();
    let (f1, f2) = (FileId::new(1), FileId::new(2));
    let mut bpm = BufferManager::new(1, DiskStore::open(dir.path()).unwrap());

    let (p1, page) = bpm.new_page(1, f1).unwrap();
    page.as_mut_slice()[0] = 0x11;
    bpm.unpin_page(p1, f1, true).unwrap();

    let (p2, page) = bpm.new_page(1, f2).unwrap();
    page.as_mut_slice()[0] = 0x22;
    bpm.unpin_page(p2, f2, true).unwrap();
    assert_eq!(p1, p2);

    assert_eq!(bpm.pin_page(p1, f1, false).unwrap().as_slice()[0], 0x11);
    bpm.unpin_page(p1, f1, false).unwrap();
    assert_eq!(bpm.pin_page(p2, f2, false).unwrap().as_slice()[0], 0x22);
}

/// Stats follow hits, misses and write-backs.
#[test]
fn test_stats_accuracy() {
    let file = FileId::new(0);
    let mut store = MemoryStore::new();
    store.allocate_pages(file, 3).unwrap();
    let mut bpm = BufferManager::new(2, store);

    bpm.pin_page(PageId::new(0), file, false).unwrap();
    for _ in 0..4 {
        bpm.pin_page(PageId::new(0), file, false).unwrap();
    }
    for _ in 0..5 {
        bpm.unpin_page(PageId::new(0), file, true).unwrap();
    }
    bpm.pin_page(PageId::new(1), file, false).unwrap();
    bpm.pin_page(PageId::new(2), file, false).unwrap();

    let stats = bpm.stats();
    assert_eq!(stats.cache_hits, 4);
    assert_eq!(stats.cache_misses, 3);
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.pages_read, 3);
    assert_eq!(stats.pages_written, 1);

    bpm.reset_stats();
    assert_eq!(bpm.stats().cache_hits, 0);
}

// ============================================================================
// Randomized model check
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Pin { page: u32, file: u32 },
    Unpin { page: u32, file: u32, dirty: bool },
    Flush { page: u32, file: u32 },
    FlushAll,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u32..6, 0u32..2).prop_map(|(page, file)| Op::Pin { page, file }),
        4 => (0u32..6, 0u32..2, any::<bool>())
            .prop_map(|(page, file, dirty)| Op::Unpin { page, file, dirty }),
        1 => (0u32..6, 0u32..2).prop_map(|(page, file)| Op::Flush { page, file }),
        1 => Just(Op::FlushAll),
    ]
}

/// Frame table and page index agree, and empty frames are idle.
fn check_structure(bpm: &BufferManager<MemoryStore>) -> Result<(), TestCaseError> {
    let mut resident = 0;
    for i in 0..bpm.pool_size() {
        let frame_id = FrameId::new(i);
        let frame = bpm.frame(frame_id).unwrap();
        match frame.key() {
            Some(key) => {
                resident += 1;
                prop_assert_eq!(bpm.find_frame(key.page_id, key.file_id), Some(frame_id));
            }
            None => {
                prop_assert_eq!(frame.pin_count(), 0);
                prop_assert!(!frame.is_dirty());
                prop_assert_eq!(frame.page_id(), PageId::INVALID);
            }
        }
    }
    prop_assert_eq!(resident, bpm.resident_count());
    Ok(())
}

proptest! {
    #[test]
    fn prop_pool_matches_model(
        pool_size in 1usize..5,
        ops in proptest::collection::vec(op_strategy(), 1..80),
    ) {
        let mut store = MemoryStore::new();
        for f in 0..2 {
            store.allocate_pages(FileId::new(f), 6).unwrap();
        }
        let mut bpm = BufferManager::new(pool_size, store);

        // Expected pin counts and first-byte contents per page
        let mut pins: HashMap<PageKey, u32> = HashMap::new();
        let mut content: HashMap<PageKey, u8> = HashMap::new();

        for op in ops {
            match op {
                Op::Pin { page, file } => {
                    let key = PageKey::new(PageId::new(page), FileId::new(file));
                    match bpm.pin_page(key.page_id, key.file_id, false) {
                        Ok(buf) => {
                            prop_assert_eq!(buf.as_slice()[0], content.get(&key).copied().unwrap_or(0));
                            *pins.entry(key).or_default() += 1;
                        }
                        Err(Error::PoolExhausted) => {
                            // Only when every frame is held
                            let held: u32 = pins.values().filter(|&&n| n > 0).count() as u32;
                            prop_assert_eq!(held as usize, pool_size);
                        }
                        Err(other) => prop_assert!(false, "unexpected error {}", other),
                    }
                }
                Op::Unpin { page, file, dirty } => {
                    let key = PageKey::new(PageId::new(page), FileId::new(file));
                    let expected = pins.get(&key).copied().unwrap_or(0);
                    if expected > 0 && dirty {
                        let next = content.get(&key).copied().unwrap_or(0).wrapping_add(1);
                        bpm.page_mut(key.page_id, key.file_id).unwrap().as_mut_slice()[0] = next;
                        content.insert(key, next);
                    }
                    let result = bpm.unpin_page(key.page_id, key.file_id, dirty);
                    if expected == 0 {
                        let is_not_pinned = matches!(result, Err(Error::PageNotPinned { .. }));
                        prop_assert!(is_not_pinned);
                    } else {
                        prop_assert!(result.is_ok());
                        pins.insert(key, expected - 1);
                    }
                }
                Op::Flush { page, file } => {
                    bpm.flush_page(PageId::new(page), FileId::new(file)).unwrap();
                    prop_assert_ne!(bpm.is_dirty(PageId::new(page), FileId::new(file)), Some(true));
                }
                Op::FlushAll => {
                    bpm.flush_all_pages().unwrap();
                    for i in 0..pool_size {
                        prop_assert!(!bpm.frame(FrameId::new(i)).unwrap().is_dirty());
                    }
                }
            }

            check_structure(&bpm)?;
            for (key, &n) in &pins {
                if n > 0 {
                    prop_assert_eq!(bpm.pin_count(key.page_id, key.file_id), Some(n));
                }
            }
        }
    }
}
