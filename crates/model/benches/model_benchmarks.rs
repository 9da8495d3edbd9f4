//! Benchmarks for hobart-model estimation and decomposition.
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use hobart_model::{
    OlsExposureEstimator, RiskModel, decompose_portfolio_risk, estimate_factor_covariance,
};
use hobart_primitives::{
    Date, FactorMatrix, FactorName, Observation, PortfolioWeights, ReturnMatrix, Symbol,
};
use hobart_traits::ExposureEstimator;
use ndarray::Array2;
use rand::Rng;

fn random_matrix(rows: usize, cols: usize, scale: f64) -> Array2<f64> {
    let mut rng = rand::thread_rng();
    Array2::from_shape_fn((rows, cols), |_| (rng.r#gen::<f64>() * 2.0 - 1.0) * scale)
}

fn dates(n: usize) -> Vec<Date> {
    let start = Date::from_ymd_opt(2000, 1, 3).unwrap();
    start.iter_days().take(n).collect()
}

/// Factor returns and asset returns generated from random exposures plus noise.
fn random_panel(n_dates: usize, n_assets: usize, n_factors: usize) -> (ReturnMatrix, FactorMatrix) {
    let factors = random_matrix(n_dates, n_factors, 0.01);
    let loadings = random_matrix(n_assets, n_factors, 1.5);
    let returns = factors.dot(&loadings.t()) + random_matrix(n_dates, n_assets, 0.005);

    let dates = dates(n_dates);
    let assets = (0..n_assets).map(|i| Symbol::new(format!("A{i:05}"))).collect();
    let names = (0..n_factors).map(|k| FactorName::new(format!("F{k}"))).collect();
    (ReturnMatrix::new(dates.clone(), assets, returns), FactorMatrix::new(dates, names, factors))
}

fn bench_exposures(c: &mut Criterion) {
    let mut group = c.benchmark_group("exposures");
    group.sample_size(30);

    // (dates, assets, factors)
    let scenarios = [
        (252, 100, 3, "small_universe"),
        (252, 1000, 5, "large_universe"),
        (1260, 3000, 10, "full_universe"),
    ];

    for (n_dates, n_assets, n_factors, name) in scenarios {
        group.throughput(Throughput::Elements(n_assets as u64));
        group.bench_with_input(
            BenchmarkId::new("scenario", name),
            &(n_dates, n_assets, n_factors),
            |b, &(n_dates, n_assets, n_factors)| {
                let (returns, factors) = random_panel(n_dates, n_assets, n_factors);
                let estimator = OlsExposureEstimator::new();
                b.iter(|| estimator.estimate(black_box(&returns), black_box(&factors)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_estimate_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate_single");

    for (n_dates, n_factors) in [(60, 3), (252, 5), (1260, 10)] {
        group.bench_with_input(
            BenchmarkId::new("dates_factors", format!("{n_dates}x{n_factors}")),
            &(n_dates, n_factors),
            |b, &(n_dates, n_factors)| {
                let (returns, factors) = random_panel(n_dates, 1, n_factors);
                let estimator = OlsExposureEstimator::new();
                b.iter(|| {
                    estimator
                        .estimate_single(black_box(returns.values.column(0)), black_box(&factors.values))
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn bench_decomposition(c: &mut Criterion) {
    let mut group = c.benchmark_group("decomposition");
    group.sample_size(20);

    for (n_assets, n_factors) in [(100, 3), (500, 5), (2000, 10)] {
        group.bench_with_input(
            BenchmarkId::new("assets_factors", format!("{n_assets}x{n_factors}")),
            &(n_assets, n_factors),
            |b, &(n_assets, n_factors)| {
                let (returns, factors) = random_panel(252, n_assets, n_factors);
                let exposures = OlsExposureEstimator::new().estimate(&returns, &factors).unwrap();
                let covariance = estimate_factor_covariance(&factors).unwrap();
                let weights = PortfolioWeights::equal_weight(returns.assets.clone());

                b.iter(|| {
                    decompose_portfolio_risk(
                        black_box(&exposures),
                        black_box(&covariance),
                        black_box(&weights),
                    )
                    .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pipeline");
    group.sample_size(10);

    for (n_dates, n_assets) in [(252, 50), (504, 200)] {
        let (returns, factors) = random_panel(n_dates, n_assets, 2);
        let (values, assets) = (&returns.values, &returns.assets);
        let observations: Vec<Observation> = returns
            .dates
            .iter()
            .enumerate()
            .flat_map(|(t, date)| {
                let factor_values: Vec<(FactorName, f64)> = factors
                    .factors
                    .iter()
                    .cloned()
                    .zip(factors.values.row(t).iter().copied())
                    .collect();
                assets.iter().enumerate().map(move |(i, asset)| {
                    Observation::new(*date, asset.clone(), values[[t, i]], factor_values.clone())
                })
            })
            .collect();

        let model = RiskModel::with_config(hobart_model::RiskModelConfig {
            panel: hobart_data::PanelConfig::with_factors(["F0", "F1"]),
            ..Default::default()
        });

        group.throughput(Throughput::Elements(observations.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("dates_assets", format!("{n_dates}x{n_assets}")),
            &observations,
            |b, observations| {
                b.iter(|| model.run(black_box(observations), None).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_exposures,
    bench_estimate_single,
    bench_decomposition,
    bench_full_pipeline,
);

criterion_main!(benches);
