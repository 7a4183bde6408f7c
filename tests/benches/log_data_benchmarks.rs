//! # Wellx Log Data Benchmarks
//!
//! | Operation | Input | Target |
//! |-----------|-------|--------|
//! | Range coalescing | 100k-row table, random selection | < 50ms |
//! | Export projection | 100k rows, 4 columns | < 100ms |
//! | Batched read | 100k rows, 1k-row store cap | < 500ms |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use wx_log_data::{
    coalesce_index_ranges, full_window, project, BatchedLogDataReader, CurveSpecification,
    CurveValue, Direction, ExportColumn, ExportOptions, IndexType, InMemoryLogStore,
    LogDataTable, ReaderConfig, Row,
};
use wx_tests::fixtures::depth_log;

fn table(rows: usize) -> LogDataTable {
    let mnemonics: Vec<String> = ["DEPTH", "GR", "RHOB", "NPHI"].iter().map(|m| m.to_string()).collect();
    let specs = vec![
        CurveSpecification::new("DEPTH", "m"),
        CurveSpecification::new("GR", "gAPI"),
        CurveSpecification::new("RHOB", "g/cm3"),
        CurveSpecification::new("NPHI", "v/v"),
    ];
    let rows = (0..rows)
        .map(|i| {
            let depth = 1000.0 + i as f64 * 0.1524;
            let record = vec![
                CurveValue::Number(depth),
                CurveValue::Number((i % 150) as f64),
                CurveValue::Number(2.4),
                CurveValue::Number(0.21),
            ];
            Row::from_record(&mnemonics, record, "DEPTH").expect("valid row")
        })
        .collect();
    LogDataTable::new(specs, rows)
}

fn bench_coalesce(c: &mut Criterion) {
    let mut group = c.benchmark_group("range-coalesce");
    group.measurement_time(Duration::from_secs(10));

    let table = table(100_000);
    for fraction in [10, 50, 90] {
        let mut positions: Vec<usize> = (0..table.len()).filter(|i| i % 100 < fraction).collect();
        positions.shuffle(&mut rand::thread_rng());

        group.throughput(Throughput::Elements(positions.len() as u64));
        group.bench_with_input(BenchmarkId::new("selected_percent", fraction), &positions, |b, positions| {
            b.iter(|| {
                black_box(
                    coalesce_index_ranges(positions, &table, IndexType::Depth, Direction::Increasing)
                        .expect("valid selection"),
                )
            })
        });
    }
    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export-projection");
    let table = table(100_000);
    let columns: Vec<ExportColumn> = table
        .curve_specifications()
        .iter()
        .map(ExportColumn::from_specification)
        .collect();
    let mut shuffled: Vec<&Row> = table.rows().iter().collect();
    shuffled.shuffle(&mut rand::thread_rng());

    group.throughput(Throughput::Elements(table.len() as u64));
    group.bench_function("sorted_rows", |b| {
        b.iter(|| black_box(project(table.rows(), &columns, &ExportOptions::default())))
    });
    group.bench_function("shuffled_rows", |b| {
        b.iter(|| black_box(project(shuffled.iter().copied(), &columns, &ExportOptions::default())))
    });
    group.finish();
}

fn bench_batched_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("batched-read");
    group.sample_size(20);
    let runtime = tokio::runtime::Runtime::new().expect("runtime");

    let depths: Vec<f64> = (0..100_000).map(|i| i as f64 * 0.1).collect();
    for cap in [1_000, 10_000] {
        let store = Arc::new(InMemoryLogStore::new().with_max_rows_per_call(cap));
        let fixture = depth_log("BENCH", Direction::Increasing, &depths);
        let log = fixture.header.clone();
        store.insert_log(fixture);
        let reader = BatchedLogDataReader::new(store, ReaderConfig::default());
        let window = full_window(&log).expect("bounded log");
        let mnemonics = vec!["GR".to_string()];

        group.throughput(Throughput::Elements(depths.len() as u64));
        group.bench_with_input(BenchmarkId::new("store_cap", cap), &cap, |b, _| {
            b.iter(|| {
                runtime.block_on(async {
                    black_box(
                        reader
                            .read(&log, &mnemonics, &window, true, &CancellationToken::new())
                            .await
                            .expect("read succeeds"),
                    )
                })
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_coalesce, bench_export, bench_batched_read);
criterion_main!(benches);
