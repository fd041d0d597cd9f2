#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use criterion::{Criterion, criterion_group, criterion_main};

use re_resource_pool::{EvictionPolicy, PoolItem, ResourcePool};

// ---

criterion_group!(benches, alloc_steady_state, insert_unsorted, evict_all);
criterion_main!(benches);

// ---

// `cargo test` also runs the benchmark setup code, so make sure they run quickly:
#[cfg(debug_assertions)]
mod constants {
    pub const NUM_DESCS: u32 = 2;
    pub const NUM_PER_DESC: usize = 2;
}

#[cfg(not(debug_assertions))]
mod constants {
    pub const NUM_DESCS: u32 = 64;
    pub const NUM_PER_DESC: usize = 8;
}

use self::constants::{NUM_DESCS, NUM_PER_DESC};

// ---

/// Every frame, grab `NUM_PER_DESC` resources of every shape, then release them all again.
fn alloc_steady_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("resource_pool");
    group.throughput(criterion::Throughput::Elements(
        (NUM_DESCS as usize * NUM_PER_DESC) as _,
    ));

    let mut pool = ResourcePool::<u32, [u8; 16]>::with_policy(EvictionPolicy::default());
    let mut handles = Vec::with_capacity(NUM_DESCS as usize * NUM_PER_DESC);
    let mut frame = 0;

    group.bench_function("alloc_steady_state", |b| {
        b.iter(|| {
            frame += 1;
            pool.begin_frame(frame);
            for desc in 0..NUM_DESCS {
                for _ in 0..NUM_PER_DESC {
                    handles.push(pool.alloc(&desc, |_| [0; 16]));
                }
            }
            handles.clear();
        });
    });
}

fn insert_unsorted(c: &mut Criterion) {
    let mut group = c.benchmark_group("resource_pool");
    group.throughput(criterion::Throughput::Elements(
        (NUM_DESCS as usize * NUM_PER_DESC) as _,
    ));

    group.bench_function("insert_unsorted", |b| {
        b.iter(|| {
            let mut pool = ResourcePool::<u32, ()>::new();
            for i in 0..NUM_PER_DESC {
                for desc in (0..NUM_DESCS).rev() {
                    pool.insert(PoolItem::new(desc ^ i as u32, (), 0));
                }
            }
            pool
        });
    });
}

fn evict_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("resource_pool");
    group.throughput(criterion::Throughput::Elements(
        (NUM_DESCS as usize * NUM_PER_DESC) as _,
    ));

    group.bench_function("evict_all", |b| {
        b.iter_batched(
            || {
                let mut pool = ResourcePool::<u32, ()>::new();
                for desc in 0..NUM_DESCS {
                    for _ in 0..NUM_PER_DESC {
                        pool.insert(PoolItem::new(desc, (), 0));
                    }
                }
                pool
            },
            |mut pool| {
                pool.evict(10, 1);
                pool
            },
            criterion::BatchSize::SmallInput,
        );
    });
}
