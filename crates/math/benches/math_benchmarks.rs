//! Benchmarks for hobart-math operations.
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use hobart_math::{
    DegreesOfFreedom, SvdSolver, covariance_matrix, jacobi_svd, least_squares, quadratic_form,
    sandwich,
};
use ndarray::{Array1, Array2};
use rand::Rng;

fn random_array(n: usize) -> Array1<f64> {
    let mut rng = rand::thread_rng();
    Array1::from_iter((0..n).map(|_| rng.r#gen::<f64>() * 0.1 - 0.05))
}

fn random_matrix(rows: usize, cols: usize) -> Array2<f64> {
    let mut rng = rand::thread_rng();
    Array2::from_shape_fn((rows, cols), |_| rng.r#gen::<f64>() * 0.1 - 0.05)
}

fn bench_jacobi_svd(c: &mut Criterion) {
    let mut group = c.benchmark_group("jacobi_svd");

    for (n_dates, n_factors) in [(60, 2), (252, 5), (1260, 10), (2520, 20)] {
        group.throughput(Throughput::Elements((n_dates * n_factors) as u64));
        group.bench_with_input(
            BenchmarkId::new("dates_factors", format!("{n_dates}x{n_factors}")),
            &(n_dates, n_factors),
            |b, &(n_dates, n_factors)| {
                let x = random_matrix(n_dates, n_factors);
                b.iter(|| jacobi_svd(black_box(&x)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_least_squares(c: &mut Criterion) {
    let mut group = c.benchmark_group("least_squares");
    group.sample_size(50);

    for (n_dates, n_factors) in [(60, 2), (252, 5), (1260, 10)] {
        group.bench_with_input(
            BenchmarkId::new("one_shot", format!("{n_dates}x{n_factors}")),
            &(n_dates, n_factors),
            |b, &(n_dates, n_factors)| {
                let y = random_array(n_dates);
                let x = random_matrix(n_dates, n_factors);
                b.iter(|| least_squares(black_box(y.view()), black_box(&x)).unwrap());
            },
        );

        group.bench_with_input(
            BenchmarkId::new("factorized", format!("{n_dates}x{n_factors}")),
            &(n_dates, n_factors),
            |b, &(n_dates, n_factors)| {
                let y = random_array(n_dates);
                let solver = SvdSolver::new(&random_matrix(n_dates, n_factors)).unwrap();
                b.iter(|| solver.fit(black_box(y.view())).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_covariance(c: &mut Criterion) {
    let mut group = c.benchmark_group("covariance_matrix");

    for (n_dates, n_factors) in [(60, 2), (252, 10), (1260, 50)] {
        group.throughput(Throughput::Elements((n_dates * n_factors) as u64));
        group.bench_with_input(
            BenchmarkId::new("dates_factors", format!("{n_dates}x{n_factors}")),
            &(n_dates, n_factors),
            |b, &(n_dates, n_factors)| {
                let data = random_matrix(n_dates, n_factors);
                b.iter(|| {
                    covariance_matrix(black_box(data.view()), DegreesOfFreedom::Sample).unwrap()
                });
            },
        );
    }

    group.finish();
}

fn bench_portfolio_variance(c: &mut Criterion) {
    let mut group = c.benchmark_group("portfolio_variance");
    group.sample_size(30);

    for (n_assets, n_factors) in [(100, 2), (500, 10), (3000, 20)] {
        group.bench_with_input(
            BenchmarkId::new("assets_factors", format!("{n_assets}x{n_factors}")),
            &(n_assets, n_factors),
            |b, &(n_assets, n_factors)| {
                let loadings = random_matrix(n_assets, n_factors);
                let inner = Array2::<f64>::eye(n_factors) * 1e-4;
                let w = Array1::from_elem(n_assets, 1.0 / n_assets as f64);

                b.iter(|| {
                    let cov = sandwich(black_box(loadings.view()), black_box(inner.view())).unwrap();
                    quadratic_form(w.view(), cov.view()).unwrap()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_jacobi_svd,
    bench_least_squares,
    bench_covariance,
    bench_portfolio_variance,
);

criterion_main!(benches);
