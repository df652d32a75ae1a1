//! Benchmarks for pdfsift extraction performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks run the pipeline over synthetic snapshots.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pdfsift::{
    extract, BBox, DocumentSnapshot, ExtractOptions, LineSegment, PageSnapshot, Span,
    SnapshotProvider,
};

/// Creates a snapshot where every page carries a ruled table, an unruled
/// table and some prose.
fn create_test_snapshot(page_count: u32) -> DocumentSnapshot {
    let mut snapshot = DocumentSnapshot::new();

    for number in 1..=page_count {
        let mut page = PageSnapshot::new(number);

        // Ruled 5x3 table
        for i in 0..=5 {
            let y = 100.0 + i as f32 * 20.0;
            page = page.with_line(LineSegment::horizontal(y, 50.0, 350.0));
        }
        for x in [50.0, 150.0, 250.0, 350.0] {
            page = page.with_line(LineSegment::vertical(x, 100.0, 200.0));
        }
        for row in 0..5 {
            for col in 0..3 {
                let x = 55.0 + col as f32 * 100.0;
                let y = 105.0 + row as f32 * 20.0;
                page = page.with_span(Span::new(
                    format!("r{}c{}", row, col),
                    BBox::new(x, y, x + 40.0, y + 10.0),
                ));
            }
        }

        // Unruled 8x4 table
        for row in 0..8 {
            for col in 0..4 {
                let x = 50.0 + col as f32 * 120.0;
                let y = 300.0 + row as f32 * 18.0;
                page = page.with_span(Span::new(
                    format!("{}", row * 4 + col),
                    BBox::new(x, y, x + 30.0, y + 10.0),
                ));
            }
        }

        // Prose
        for line in 0..10 {
            let y = 480.0 + line as f32 * 14.0;
            page = page.with_span(Span::new(
                "Benchmark prose for pdfsift performance measurement.",
                BBox::new(50.0, y, 500.0, y + 10.0),
            ));
        }

        snapshot = snapshot.with_page(page);
    }

    snapshot
}

/// Benchmark the full pipeline at various sizes.
fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");
    let dir = std::env::temp_dir().join("pdfsift-bench");

    for page_count in [1, 10, 50].iter() {
        let provider = SnapshotProvider::from_snapshot(create_test_snapshot(*page_count))
            .expect("valid snapshot");

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| extract(black_box(&provider), &dir, &ExtractOptions::default()));
        });

        let sequential = ExtractOptions::default().with_parallel(false);
        group.bench_function(format!("{}_pages_sequential", page_count), |b| {
            b.iter(|| extract(black_box(&provider), &dir, &sequential));
        });
    }

    group.finish();
}

/// Benchmark snapshot decoding.
fn bench_snapshot_parsing(c: &mut Criterion) {
    let json = create_test_snapshot(10).to_json().expect("serializable");

    c.bench_function("snapshot_from_bytes", |b| {
        b.iter(|| SnapshotProvider::from_bytes(black_box(json.as_bytes())).unwrap());
    });
}

criterion_group!(benches, bench_extraction, bench_snapshot_parsing);
criterion_main!(benches);
