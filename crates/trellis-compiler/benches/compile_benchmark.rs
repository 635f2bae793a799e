//! Compiler benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trellis_compiler::{compile, ElementSnapshot, Snapshot};
use trellis_core::Settings;

/// A page of uniform cards, three per row.
fn card_grid(rows: u64) -> Snapshot {
    let mut snapshot = Snapshot::new().with(ElementSnapshot::new(1, "div").bounds(0.0, 0.0, 300.0, rows as f64 * 60.0));
    for index in 0..rows * 3 {
        let (row, column) = (index / 3, index % 3);
        snapshot.push(
            ElementSnapshot::new(index + 2, "div")
                .parent(1)
                .bounds(column as f64 * 100.0, row as f64 * 60.0, 100.0, 60.0),
        );
    }
    snapshot
}

fn flex_row(items: u64) -> Snapshot {
    let width = 40.0;
    let mut snapshot = Snapshot::new().with(
        ElementSnapshot::new(1, "div")
            .bounds(0.0, 0.0, items as f64 * width, 48.0)
            .style("display", "flex"),
    );
    for index in 0..items {
        snapshot.push(
            ElementSnapshot::new(index + 2, "span")
                .parent(1)
                .bounds(index as f64 * width, 0.0, width, 48.0)
                .text(&format!("Item {index}")),
        );
    }
    snapshot
}

fn compile_grid(c: &mut Criterion) {
    let snapshot = card_grid(20);
    let settings = Settings::default();
    c.bench_function("compile_grid", |b| b.iter(|| compile(black_box(&snapshot), &settings)));
}

fn compile_flex(c: &mut Criterion) {
    let snapshot = flex_row(12);
    let settings = Settings::default();
    c.bench_function("compile_flex", |b| b.iter(|| compile(black_box(&snapshot), &settings)));
}

criterion_group!(benches, compile_grid, compile_flex);
criterion_main!(benches);
