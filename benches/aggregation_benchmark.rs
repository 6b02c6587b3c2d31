use archmap::{
    derive_metrics, find_hotspots, group_by_namespace, ElementId, HotspotSettings, Matrix,
    MatrixInput, MatrixProjection, Metric, RenameTable, TrendsAnalysis,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

/// `modules` namespaces of `files` leaves each, every leaf calling three
/// others
fn create_matrix(name: &str, modules: usize, files: usize, growth: i64) -> Matrix {
    let mut matrix = Matrix::from_input(MatrixInput {
        name: name.to_string(),
        elements: (0..modules)
            .flat_map(|m| (0..files).map(move |f| format!("crate/mod_{}/file_{}.rs", m, f)))
            .collect(),
        edges: Vec::new(),
    })
    .unwrap();

    let n = modules * files;
    for source in 0..n {
        for step in 1..=3 {
            let destination = (source * 7 + step) % n;
            if destination == source {
                continue;
            }
            let _ = matrix.add_edge(
                ElementId(source),
                ElementId(destination),
                [("Call".to_string(), (source % 5 + 1) as u64)],
            );
        }
    }
    for (i, leaf) in matrix.leaves().to_vec().into_iter().enumerate() {
        let size = 100 + (i as i64 % 17) * 10 + growth * (i as i64 % 3);
        matrix.add_metric(leaf, &Metric::SIZE, size).unwrap();
    }
    group_by_namespace(&mut matrix, "/").unwrap();
    matrix
}

fn benchmark_top_level_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("top_level_projection");
    for files in [10, 50, 200] {
        let matrix = create_matrix("bench", 10, files, 0);
        group.bench_with_input(BenchmarkId::from_parameter(files * 10), &matrix, |b, m| {
            b.iter(|| black_box(MatrixProjection::top_level(m)));
        });
    }
    group.finish();
}

fn benchmark_leaf_projection(c: &mut Criterion) {
    let matrix = create_matrix("bench", 10, 30, 0);
    c.bench_function("leaf_projection_300", |b| {
        b.iter(|| black_box(MatrixProjection::over_leaves(&matrix)));
    });
}

fn benchmark_derive_metrics(c: &mut Criterion) {
    let matrix = create_matrix("bench", 10, 30, 0);
    c.bench_function("derive_metrics_300", |b| {
        b.iter(|| {
            let mut copy = matrix.clone();
            derive_metrics(&mut copy);
            black_box(copy)
        });
    });
}

fn benchmark_hotspots(c: &mut Criterion) {
    let snapshots: Vec<Matrix> = (0..8)
        .map(|i| create_matrix(&format!("v{}", i), 10, 30, i * 5))
        .collect();
    let renames = RenameTable::new();
    let settings = HotspotSettings::new(3, 1.0);

    c.bench_function("hotspots_8_snapshots", |b| {
        b.iter(|| {
            let trends = TrendsAnalysis::new(snapshots.iter().collect(), &renames);
            black_box(find_hotspots(
                &trends,
                &[Metric::SIZE, Metric::COMPLEXITY],
                &settings,
            ))
        });
    });
}

criterion_group!(
    benches,
    benchmark_top_level_projection,
    benchmark_leaf_projection,
    benchmark_derive_metrics,
    benchmark_hotspots
);
criterion_main!(benches);
