#![allow(missing_docs)]
//! Benchmarks for scheduled tick processing.

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use steel_core::ticks::{LevelChunkTicks, LevelTicks, TickPriority};
use steel_utils::{BlockPos, ChunkPos};

const CHUNK_RADIUS: i32 = 8;

/// Creates a scheduler with `(2r+1)^2` loaded chunks and `per_chunk` ticks in each.
fn populated_level(per_chunk: i32, trigger_spread: i64) -> LevelTicks<u16> {
    let mut level_ticks = LevelTicks::new();
    for x in -CHUNK_RADIUS..=CHUNK_RADIUS {
        for z in -CHUNK_RADIUS..=CHUNK_RADIUS {
            level_ticks.add_container(ChunkPos::new(x, z), LevelChunkTicks::new());
        }
    }
    for x in -CHUNK_RADIUS..=CHUNK_RADIUS {
        for z in -CHUNK_RADIUS..=CHUNK_RADIUS {
            for i in 0..per_chunk {
                let pos = BlockPos::new(x * 16 + i % 16, 64 + i / 16, z * 16);
                let trigger = i64::from(i) % trigger_spread;
                let priority = if i % 5 == 0 {
                    TickPriority::High
                } else {
                    TickPriority::Normal
                };
                let _ = level_ticks.schedule(pos, 1, trigger, priority);
            }
        }
    }
    level_ticks
}

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain_due_ticks");

    for per_chunk in [4, 32, 128] {
        group.bench_with_input(
            BenchmarkId::new("ticks_per_chunk", per_chunk),
            &per_chunk,
            |b, &per_chunk| {
                b.iter_batched(
                    || populated_level(per_chunk, 4),
                    |mut level_ticks| {
                        let mut fired = 0usize;
                        level_ticks.tick(4, 65536, |_| true, |_, pos, _| {
                            black_box(pos);
                            fired += 1;
                        });
                        black_box(fired)
                    },
                    BatchSize::LargeInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_nothing_due(c: &mut Criterion) {
    // Every chunk has a pending tick, none of them due for a long time
    let mut level_ticks = populated_level(1, 1);
    let mut now = 0;
    level_ticks.tick(now, 65536, |_| true, |_, _, _| {});
    for x in -CHUNK_RADIUS..=CHUNK_RADIUS {
        for z in -CHUNK_RADIUS..=CHUNK_RADIUS {
            let _ = level_ticks.schedule_tick(BlockPos::new(x * 16, 64, z * 16), 1, now, 1_000_000);
        }
    }

    c.bench_function("tick_with_nothing_due", |b| {
        b.iter(|| {
            now += 1;
            level_ticks.tick(black_box(now), 65536, |_| true, |_, _, _| {});
        });
    });
}

criterion_group!(benches, bench_drain, bench_nothing_due);
criterion_main!(benches);
