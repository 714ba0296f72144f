//! Criterion micro-benchmarks for arena allocation, growth, and scratch marks.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use stam_arena::{Arena, ArenaConfig, GrowthPolicy, KB};
use stam_bench::{frame_profile, long_lived_profile, request_sizes};

/// Benchmark: 1K mixed small allocations into a warm arena, reset per iteration.
fn bench_alloc_mixed_1k(c: &mut Criterion) {
    let sizes = request_sizes(1000, 256, 42);
    let mut arena = Arena::with_config(frame_profile()).unwrap();

    c.bench_function("arena_alloc_mixed_1k", |b| {
        b.iter(|| {
            for &size in &sizes {
                black_box(arena.alloc_raw(size).unwrap());
            }
            arena.reset();
        });
    });
}

/// Benchmark: typed u64 allocation, the common "one small object" path.
fn bench_alloc_typed(c: &mut Criterion) {
    let mut arena = Arena::with_config(long_lived_profile()).unwrap();

    c.bench_function("arena_alloc_typed_u64_1k", |b| {
        b.iter(|| {
            for i in 0..1000u64 {
                black_box(arena.alloc(i).unwrap());
            }
            arena.reset();
        });
    });
}

/// Benchmark: cold arena that must grow its chain, per growth policy.
fn bench_growth(c: &mut Criterion) {
    let sizes = request_sizes(4000, 512, 7);
    let policies = [
        ("match_previous", GrowthPolicy::MatchPrevious),
        ("fixed_16k", GrowthPolicy::Fixed { bytes: 16 * KB }),
        ("multiply_2", GrowthPolicy::Multiply { factor: 2 }),
    ];

    let mut group = c.benchmark_group("arena_growth");
    for (name, policy) in policies {
        group.bench_function(name, |b| {
            b.iter(|| {
                let arena = Arena::with_config(ArenaConfig::new(4 * KB).with_growth(policy)).unwrap();
                for &size in &sizes {
                    black_box(arena.alloc_raw(size).unwrap());
                }
                black_box(arena.region_count());
            });
        });
    }
    group.finish();
}

/// Benchmark: mark / allocate a transient buffer / pop, as a loader would.
fn bench_scratch_cycle(c: &mut Criterion) {
    let mut arena = Arena::with_config(frame_profile()).unwrap();
    arena.alloc_slice_fill(512, 0u8).unwrap();

    c.bench_function("arena_scratch_cycle_4k", |b| {
        b.iter(|| {
            let mark = arena.scratch_mark();
            let buf = arena.alloc_slice_fill(4 * KB, 0u8).unwrap();
            black_box(buf.len());
            arena.pop_scratch(mark);
        });
    });
}

criterion_group!(
    benches,
    bench_alloc_mixed_1k,
    bench_alloc_typed,
    bench_growth,
    bench_scratch_cycle
);
criterion_main!(benches);
