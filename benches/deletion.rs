mod common;

use common::Plane;
use criterion::{BatchSize, Criterion};
use xcsf::{deletion::deletion, random::WyRng, Xcsf, XcsfConfig};

fn bench_deletion(bench: &mut Criterion) {
    let cfg = XcsfConfig {
        max_population: 800,
        ..XcsfConfig::default()
    };
    let mut xcsf = Xcsf::new(Plane::new(3), cfg.clone()).unwrap();
    xcsf.train_for_steps(5_000).unwrap();
    let pop = xcsf.into_population();

    let halved = XcsfConfig {
        max_population: (pop.num_micros() / 2) as usize,
        ..cfg
    };
    let mut rng = WyRng::seeded(7);
    bench.bench_function("deletion-halve", |b| {
        b.iter_batched(
            || pop.clone(),
            |mut pop| deletion(&mut pop, &halved, &mut rng),
            BatchSize::SmallInput,
        )
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
    bench_deletion(&mut criterion);
}

fn main() {
    benches();
    criterion::Criterion::default()
        .configure_from_args()
        .final_summary();
}
