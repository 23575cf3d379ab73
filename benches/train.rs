mod common;

use common::Plane;
use criterion::Criterion;
use xcsf::{PredictionStrategy, Xcsf, XcsfConfig};

fn bench_train(bench: &mut Criterion, prediction: PredictionStrategy, name: &str) {
    let cfg = XcsfConfig {
        max_population: 400,
        prediction,
        ..XcsfConfig::default()
    };
    let mut xcsf = Xcsf::new(Plane::new(1), cfg).unwrap();
    xcsf.train_for_steps(2_000).unwrap();

    bench.bench_function(name, |b| {
        b.iter(|| xcsf.train_for_steps(10).unwrap());
    });
}

fn bench_inference(bench: &mut Criterion) {
    let mut xcsf = Xcsf::new(Plane::new(2), XcsfConfig::default()).unwrap();
    xcsf.train_for_steps(2_000).unwrap();

    bench.bench_function("select-action", |b| {
        b.iter(|| xcsf.select_action(&[0.25, 0.75]))
    });
}

pub fn benches() {
    #[cfg(not(feature = "smol_bench"))]
    let mut criterion: criterion::Criterion<_> = Criterion::default()
        .sample_size(200)
        .significance_level(0.1);
    #[cfg(feature = "smol_bench")]
    let mut criterion: criterion::Criterion<_> = {
        use core::time::Duration;
        Criterion::default()
            .measurement_time(Duration::from_millis(1))
            .sample_size(10)
            .nresamples(1)
            .without_plots()
            .configure_from_args()
    };
    bench_train(&mut criterion, PredictionStrategy::Rls, "train-10-rls");
    bench_train(&mut criterion, PredictionStrategy::Nlms, "train-10-nlms");
    bench_inference(&mut criterion);
}

fn main() {
    benches();
    criterion::Criterion::default()
        .configure_from_args()
        .final_summary();
}
