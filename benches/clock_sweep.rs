//! Pin/unpin throughput under the clock policy.

use clockpool::storage::{MemoryStore, PageStore};
use clockpool::{BufferManager, FileId, PageId};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const FILE: FileId = FileId(0);

fn create_bpm(pool_size: usize, pages: u32) -> BufferManager<MemoryStore> {
    let mut store = MemoryStore::new();
    store.allocate_pages(FILE, pages).unwrap();
    BufferManager::new(pool_size, store)
}

fn bench_hits(c: &mut Criterion) {
    let mut bpm = create_bpm(64, 64);
    for n in 0..64 {
        bpm.pin_page(PageId::new(n), FILE, false).unwrap();
        bpm.unpin_page(PageId::new(n), FILE, false).unwrap();
    }

    c.bench_function("pin_unpin_hit", |b| {
        let mut n = 0u32;
        b.iter(|| {
            let pid = PageId::new(n % 64);
            black_box(bpm.pin_page(pid, FILE, false).unwrap());
            bpm.unpin_page(pid, FILE, false).unwrap();
            n = n.wrapping_add(1);
        })
    });
}

fn bench_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("pin_unpin_evicting");
    for pool_size in [8usize, 64, 512] {
        let mut bpm = create_bpm(pool_size, 4096);
        group.bench_with_input(BenchmarkId::from_parameter(pool_size), &pool_size, |b, _| {
            let mut n = 0u32;
            b.iter(|| {
                let pid = PageId::new(n % 4096);
                black_box(bpm.pin_page(pid, FILE, false).unwrap());
                bpm.unpin_page(pid, FILE, n % 4 == 0).unwrap();
                if n % 4096 == 0 {
                    bpm.store_mut().clear_log();
                }
                n = n.wrapping_add(1);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_hits, bench_eviction);
criterion_main!(benches);
