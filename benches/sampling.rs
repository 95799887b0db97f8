use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use metalg::sampler::{RandomSampler, Sampler};
use metalg::{Expr, Int, List, Term, Value, args, function};

/// A network template with `max_layers` optional layers, each choosing
/// between two layer kinds with their own unit counts.
fn network(max_layers: i64) -> Expr {
    let dense = function("dense", |a| Ok(Value::List(a.positional.clone())));
    let conv = function("conv", |a| Ok(Value::List(a.positional.clone())));
    let num_layers: Expr = Int::new(1, max_layers).name("num_layers").into();
    let layers = List::new((0..max_layers).map(|i| {
        Expr::from(
            List::new([
                dense.call(args![Int::new(16, 256).log_scale().name(format!("units_{i}"))]),
                conv.call(args![Int::new(1, 7).name(format!("kernel_{i}"))]),
            ])
            .name(format!("layer_{i}")),
        )
    }))
    .k(&num_layers)
    .invariant()
    .name("layers");
    let stack = Term::from(vec!["input"]) + layers + vec!["output"];
    function("network", |a| Ok(a.arg(0)?.clone())).call(args![stack])
}

fn bench_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample");
    for max_layers in [2, 8, 32] {
        let sampler = RandomSampler::with_seed(network(max_layers), 42);
        group.bench_with_input(BenchmarkId::new("layers", max_layers), &sampler, |b, s| {
            b.iter(|| s.sample());
        });
    }
    group.finish();
}

fn bench_freeze_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("freeze_evaluate");
    for max_layers in [2, 8, 32] {
        let template = network(max_layers);
        let bindings = RandomSampler::with_seed(template.clone(), 7)
            .sample()
            .expect("sampling a valid template");
        group.bench_with_input(
            BenchmarkId::new("layers", max_layers),
            &(template, bindings),
            |b, (template, bindings)| {
                b.iter(|| {
                    let program = template.clone_shallow().frozen(bindings).expect("valid bindings");
                    program.evaluate()
                });
            },
        );
    }
    group.finish();
}

fn bench_clone(c: &mut Criterion) {
    let mut group = c.benchmark_group("clone");
    let template = network(16);
    group.bench_function("shallow", |b| b.iter(|| template.clone_shallow()));
    group.bench_function("deep", |b| b.iter(|| template.clone_deep()));
    group.finish();
}

#[cfg(feature = "gp")]
fn bench_gp_ask(c: &mut Criterion) {
    use metalg::optimizer::{BayesianOptimizer, Optimizer};
    use metalg::{Float, SearchSpace};

    let mut group = c.benchmark_group("gp_ask");
    let program = function("f", |_| Ok(Value::None)).call(args![
        Float::new(-5.0, 5.0),
        Float::new(-5.0, 5.0),
        Int::new(1, 100).log_scale(),
    ]);
    let space = SearchSpace::from_expr(&program).expect("fixed bounds");

    for n_observations in [10, 50, 100] {
        let mut opt = BayesianOptimizer::builder()
            .n_initial_points(5)
            .n_candidates(500)
            .seed(42)
            .build(&space);
        for _ in 0..n_observations {
            let x = opt.ask().expect("ask");
            let y = x[0] * x[0] + x[1] * x[1] + x[2];
            opt.tell(&x, y, false).expect("tell");
        }
        group.bench_with_input(
            BenchmarkId::new("observations", n_observations),
            &n_observations,
            |b, _| {
                b.iter(|| opt.ask());
            },
        );
    }
    group.finish();
}

#[cfg(not(feature = "gp"))]
fn bench_gp_ask(_c: &mut Criterion) {}

criterion_group!(
    benches,
    bench_sample,
    bench_freeze_evaluate,
    bench_clone,
    bench_gp_ask
);
criterion_main!(benches);
