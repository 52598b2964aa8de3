//! Criterion benchmarks for u-heurmodel.
//!
//! Uses synthetic models (Sphere function, OneMax) to measure tracing and
//! algorithm overhead independent of any domain.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use u_heurmodel::de::DeConfig;
use u_heurmodel::ga::GaConfig;
use u_heurmodel::model::{ChromosomeView, HeurModel, ModelTracer, TraceContext};
use u_heurmodel::random::create_rng;
use u_heurmodel::sa::SaConfig;
use u_heurmodel::{Algorithm, HeurError, SearchConfig, SearchRunner};

// ===========================================================================
// Sphere function: minimize sum(x_i^2)
// ===========================================================================

struct Sphere {
    dim: usize,
}

impl HeurModel for Sphere {
    fn build(&self, ctx: &mut TraceContext<'_>) -> Result<(), HeurError> {
        let x = ctx.continuous("x", self.dim, (-5.0, 5.0))?;
        ctx.minimize(x.elements().map(|e| e.powi(2)).sum())
    }
}

// ===========================================================================
// OneMax: maximize the number of set bits
// ===========================================================================

struct OneMax {
    n: usize,
}

impl HeurModel for OneMax {
    fn build(&self, ctx: &mut TraceContext<'_>) -> Result<(), HeurError> {
        let bits = ctx.binary("bits", self.n)?;
        ctx.maximize(bits.sum())
    }
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_trace_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("trace_sphere");

    for (dim, rows) in [(10usize, 50usize), (50, 100), (100, 500)] {
        let model = Sphere { dim };
        let mut rng = create_rng(42);
        let data: Vec<f64> = (0..dim * rows).map(|_| rng.random::<f64>()).collect();
        group.bench_with_input(
            BenchmarkId::new(format!("d{dim}_r{rows}"), dim),
            &(model, data),
            |b, (m, d)| {
                let tracer = ModelTracer::discover(m).unwrap();
                b.iter(|| {
                    let view = ChromosomeView::contiguous(black_box(d), dim);
                    black_box(tracer.evaluate(view))
                })
            },
        );
    }
    group.finish();
}

fn bench_ga_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("ga_sphere");
    group.sample_size(10);

    for (dim, pop, iterations) in [(10usize, 50usize, 50usize), (50, 100, 30), (100, 100, 20)] {
        let model = Sphere { dim };
        let config = SearchConfig::new(Algorithm::Ga(GaConfig::default()))
            .with_population_size(pop)
            .with_iterations(iterations)
            .with_seed(42);
        group.bench_with_input(
            BenchmarkId::new(format!("d{dim}_p{pop}_i{iterations}"), dim),
            &(model, config),
            |b, (m, c)| b.iter(|| black_box(SearchRunner::run(black_box(m), black_box(c)))),
        );
    }
    group.finish();
}

fn bench_de_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("de_sphere");
    group.sample_size(10);

    for &dim in &[10, 50, 100] {
        let model = Sphere { dim };
        let config = SearchConfig::new(Algorithm::De(DeConfig::default()))
            .with_population_size(50)
            .with_iterations(50)
            .with_seed(42);
        group.bench_with_input(BenchmarkId::from_parameter(dim), &(model, config), |b, (m, c)| {
            b.iter(|| black_box(SearchRunner::run(black_box(m), black_box(c))))
        });
    }
    group.finish();
}

fn bench_sa_onemax(c: &mut Criterion) {
    let mut group = c.benchmark_group("sa_onemax");
    group.sample_size(10);

    for &n in &[20, 50, 100] {
        let model = OneMax { n };
        let config = SearchConfig::new(Algorithm::Sa(SaConfig::default()))
            .with_iterations(1000)
            .with_seed(42);
        group.bench_with_input(BenchmarkId::from_parameter(n), &(model, config), |b, (m, c)| {
            b.iter(|| black_box(SearchRunner::run(black_box(m), black_box(c))))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_trace_sphere,
    bench_ga_sphere,
    bench_de_sphere,
    bench_sa_onemax
);
criterion_main!(benches);
