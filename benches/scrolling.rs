//! Benchmarks for window recomputation on scroll.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_precision_loss)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gridview::{Column, GridConfig, MemoryProvider, RecordingMaterializer, TableView};

type View = TableView<RecordingMaterializer, MemoryProvider>;

fn view(rows: u32, cols: u32) -> View {
    let columns = (0..cols)
        .map(|i| Column::new(format!("C{i}"), 80.0 + f64::from(i % 5) * 20.0))
        .collect();
    let mut view = TableView::new(
        GridConfig::default(),
        RecordingMaterializer::new(),
        MemoryProvider::sequential(columns, rows),
    )
    .expect("valid config")
    .with_size(1280.0, 800.0);
    view.load();
    view
}

/// One row at a time, the common wheel case: a shift per escape
fn bench_row_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("row_steps");
    for rows in [10_000u32, 1_000_000] {
        group.throughput(Throughput::Elements(100));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            let mut v = view(rows, 50);
            b.iter(|| {
                for i in 0..100 {
                    black_box(v.scroll_to(0.0, f64::from(i) * 20.0 + 1.0));
                }
                v.scroll_to(0.0, 0.0);
            });
        });
    }
    group.finish();
}

/// Horizontal steps across variable-width columns
fn bench_column_steps(c: &mut Criterion) {
    c.bench_function("column_steps", |b| {
        let mut v = view(10_000, 500);
        b.iter(|| {
            for i in 0..100 {
                black_box(v.scroll_to(f64::from(i) * 90.0, 0.0));
            }
            v.scroll_to(0.0, 0.0);
        });
    });
}

/// Jumps far enough that no cell can be reused
fn bench_far_jumps(c: &mut Criterion) {
    c.bench_function("far_jumps", |b| {
        let mut v = view(1_000_000, 50);
        let mut y = 0.0;
        b.iter(|| {
            y = (y + 123_457.0) % 19_000_000.0;
            black_box(v.scroll_to(0.0, y));
        });
    });
}

criterion_group!(benches, bench_row_steps, bench_column_steps, bench_far_jumps);
criterion_main!(benches);
