//! Query pipeline microbenchmarks - pipeline vs hand-written loop
//!
//! Run with: cargo bench --bench pipeline
//!
//! Metrics:
//! - ns/element
//! - light records (one i32) vs heavy records (4 KiB each)
//! - collapsed Skip/Take chain vs the equivalent single window

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use querypipe::Query;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const LIGHT_ROWS: usize = 200_000;
const HEAVY_ROWS: usize = 10_000;

#[derive(Clone, Copy)]
struct Light {
    map: [i32; 1],
}

#[derive(Clone)]
struct Heavy {
    map: Box<[i32; 1024]>,
}

fn light_rows(n: usize) -> Vec<Light> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|_| Light {
            map: [rng.random_range(0..1000)],
        })
        .collect()
}

fn heavy_rows(n: usize) -> Vec<Heavy> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|_| {
            let mut map = Box::new([0; 1024]);
            map[0] = rng.random_range(0..1000);
            Heavy { map }
        })
        .collect()
}

fn bench_select_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_sum");

    for size in [1_000, 10_000, LIGHT_ROWS].iter() {
        let data = light_rows(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("pipeline", size), size, |b, _| {
            b.iter(|| {
                let result = Query::from_slice(black_box(&data))
                    .select(|v| v.map[0])
                    .sum()
                    .unwrap();
                black_box(result);
            });
        });
        group.bench_with_input(BenchmarkId::new("legacy", size), size, |b, _| {
            b.iter(|| {
                let mut result = 0;
                for it in black_box(&data) {
                    result += it.map[0];
                }
                black_box(result);
            });
        });
    }

    group.finish();
}

fn bench_select_where_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_where_sum");
    let data = light_rows(LIGHT_ROWS);

    group.throughput(Throughput::Elements(LIGHT_ROWS as u64));

    group.bench_function("pipeline", |b| {
        b.iter(|| {
            let result = Query::from_slice(black_box(&data))
                .select(|v| v.map[0])
                .filter(|v| *v > 5)
                .sum()
                .unwrap();
            black_box(result);
        });
    });

    group.bench_function("legacy", |b| {
        b.iter(|| {
            let mut result = 0;
            for it in black_box(&data) {
                let val = it.map[0];
                if val > 5 {
                    result += val;
                }
            }
            black_box(result);
        });
    });

    group.finish();
}

fn bench_window_collapse(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_collapse");
    let data = light_rows(LIGHT_ROWS);

    group.throughput(Throughput::Elements(LIGHT_ROWS as u64));

    group.bench_function("chained", |b| {
        b.iter(|| {
            let result = Query::from_slice(black_box(&data))
                .select(|v| v.map[0])
                .skip(20000)
                .and_then(|q| q.take(500000))
                .and_then(|q| q.take(190000))
                .and_then(|q| q.skip(20000))
                .and_then(|q| q.sum())
                .unwrap();
            black_box(result);
        });
    });

    group.bench_function("single_window", |b| {
        b.iter(|| {
            let result = Query::from_slice(black_box(&data))
                .select(|v| v.map[0])
                .skip(40000)
                .and_then(|q| q.take(160000))
                .and_then(|q| q.sum())
                .unwrap();
            black_box(result);
        });
    });

    group.bench_function("legacy", |b| {
        b.iter(|| {
            let mut result = 0;
            for it in black_box(&data).iter().skip(40000).take(160000) {
                result += it.map[0];
            }
            black_box(result);
        });
    });

    group.finish();
}

fn bench_heavy_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("heavy_records");
    let data = heavy_rows(HEAVY_ROWS);

    group.throughput(Throughput::Elements(HEAVY_ROWS as u64));

    // Borrowed elements: the pipeline never copies a record.
    group.bench_function("pipeline", |b| {
        b.iter(|| {
            let result = Query::from_slice(black_box(&data))
                .filter(|v| v.map[0] > 5)
                .select(|v| v.map[0])
                .sum()
                .unwrap();
            black_box(result);
        });
    });

    group.bench_function("legacy", |b| {
        b.iter(|| {
            let mut result = 0;
            for it in black_box(&data) {
                if it.map[0] > 5 {
                    result += it.map[0];
                }
            }
            black_box(result);
        });
    });

    group.finish();
}

fn bench_group_by(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_by");
    let data = light_rows(LIGHT_ROWS);

    group.throughput(Throughput::Elements(LIGHT_ROWS as u64));

    group.bench_function("nested_sum", |b| {
        b.iter(|| {
            let result = Query::from_slice(black_box(&data))
                .select(|v| v.map[0])
                .group_by(|v| *v)
                .try_select(|g| Query::from_slice(g.values()).copied().sum())
                .sum()
                .unwrap();
            black_box(result);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_select_sum,
    bench_select_where_sum,
    bench_window_collapse,
    bench_heavy_records,
    bench_group_by
);
criterion_main!(benches);
