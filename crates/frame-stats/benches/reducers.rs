use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use frame_columnar::{Column, Table};
use frame_stats::{correlation_matrix, count_values, mean, median, min, variance};
use std::time::Duration;

fn bench_rows() -> usize {
    std::env::var("FRAME_STATS_BENCH_ROWS")
        .ok()
        .and_then(|v| v.replace('_', "").parse::<usize>().ok())
        .filter(|&v| (10_000..=10_000_000).contains(&v))
        .unwrap_or(1_000_000)
}

fn build_table(rows: usize) -> Table {
    // Every 16th row of `x` is null so the validity branch of the traversal is exercised.
    let x: Vec<Option<i64>> = (0..rows)
        .map(|i| (i % 16 != 0).then_some(((i * 7919) % 10_007) as i64))
        .collect();
    let y: Vec<f64> = (0..rows).map(|i| (i % 97) as f64 * 0.5).collect();
    let z: Vec<i32> = (0..rows).map(|i| (i % 251) as i32 - 125).collect();

    Table::new(vec![
        Column::from_options("x", x),
        Column::from_values("y", y),
        Column::from_values("z", z),
    ])
    .unwrap()
}

fn bench_reducers(c: &mut Criterion) {
    let rows = bench_rows();
    let table = build_table(rows);
    let x = table.column(0).unwrap();
    let y = table.column(1).unwrap();

    let mut group = c.benchmark_group("reducers");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(rows as u64));

    group.bench_with_input(BenchmarkId::new("min", rows), &rows, |b, _| {
        b.iter(|| black_box(min(x).unwrap()))
    });
    group.bench_with_input(BenchmarkId::new("mean", rows), &rows, |b, _| {
        b.iter(|| black_box(mean(y).unwrap()))
    });
    group.bench_with_input(BenchmarkId::new("variance", rows), &rows, |b, _| {
        b.iter(|| black_box(variance(y).unwrap()))
    });
    group.bench_with_input(BenchmarkId::new("median", rows), &rows, |b, _| {
        b.iter(|| black_box(median(x).unwrap()))
    });
    group.bench_with_input(BenchmarkId::new("count_values", rows), &rows, |b, _| {
        b.iter(|| black_box(count_values(x).unwrap()))
    });
    group.bench_with_input(BenchmarkId::new("correlation_matrix", rows), &rows, |b, _| {
        b.iter(|| black_box(correlation_matrix(&table).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_reducers);
criterion_main!(benches);
