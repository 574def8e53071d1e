// Benchmarks for the embedding and tour stages
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use smartshuffle_core::{
    Embedder, FeatureMatrix, FeatureVector, TourSolver, DEFAULT_FEATURE_FIELDS,
};

fn generate_matrix(n: usize, dim: usize) -> FeatureMatrix {
    let mut rng = StdRng::seed_from_u64(n as u64);
    let rows = (0..n)
        .map(|_| FeatureVector::new((0..dim).map(|_| rng.random_range(0.0..1.0)).collect()))
        .collect();
    FeatureMatrix::from_rows(rows, dim).unwrap()
}

fn generate_points(n: usize) -> Vec<[f64; 2]> {
    let mut rng = StdRng::seed_from_u64(n as u64);
    (0..n)
        .map(|_| [rng.random_range(-100.0..100.0), rng.random_range(-100.0..100.0)])
        .collect()
}

fn benchmark_embedding(c: &mut Criterion) {
    let mut group = c.benchmark_group("embedding");
    group.sample_size(10);

    for size in [50, 200, 500].iter() {
        let matrix = generate_matrix(*size, DEFAULT_FEATURE_FIELDS.len());
        group.bench_with_input(BenchmarkId::new("smacof", size), size, |b, _| {
            let embedder = Embedder::default();
            b.iter(|| black_box(embedder.embed(black_box(&matrix))));
        });
    }

    group.finish();
}

fn benchmark_tour(c: &mut Criterion) {
    let mut group = c.benchmark_group("tour");

    for size in [50, 200, 1000].iter() {
        let points = generate_points(*size);
        group.bench_with_input(BenchmarkId::new("nn_2opt", size), size, |b, _| {
            let solver = TourSolver::default();
            b.iter(|| black_box(solver.solve(black_box(&points)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_embedding, benchmark_tour);
criterion_main!(benches);
