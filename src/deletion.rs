//! Numerosity aware roulette deletion, bounding the population at `N` micro-classifiers.

use crate::{
    classifier::{Classifier, ClfrId},
    config::XcsfConfig,
    constants::{XCSF_DELETION_FITNESS_FLOOR, XCSF_MIN_NUM_MACROS},
    population::{Op, Population},
};
use rand::{Rng, RngCore};

/// Vote of a classifier, inflated for experienced classifiers whose numerosity scaled fitness is
/// small relative to the population's mean fitness
pub fn deletion_vote(clfr: &Classifier, avg_fitness: f64, cfg: &XcsfConfig) -> f64 {
    let vote = clfr.deletion_vote();
    let scaled_fitness = clfr.numerosity_scaled_fitness();
    if clfr.has_sufficient_experience(cfg.theta_del) && scaled_fitness < cfg.delta * avg_fitness {
        vote * avg_fitness / scaled_fitness.max(XCSF_DELETION_FITNESS_FLOOR)
    } else {
        vote
    }
}

/// Remove micro-classifiers until there are at most `N`
pub fn deletion(pop: &mut Population, cfg: &XcsfConfig, rng: &mut impl RngCore) {
    let max = cfg.max_population as u64;
    if pop.num_micros() <= max {
        return;
    }
    while pop.num_micros() > max {
        delete_single_micro(pop, cfg, rng);
    }
    assert!(pop.num_macros() >= XCSF_MIN_NUM_MACROS, "deletion emptied the population");
    debug_assert!(pop.num_micros() <= max);
}

/// Spin the roulette wheel once and take one micro-classifier off the winner, returning its id
pub(crate) fn delete_single_micro(
    pop: &mut Population,
    cfg: &XcsfConfig,
    rng: &mut impl RngCore,
) -> ClfrId {
    let avg_fitness = pop.iter().map(|c| c.fitness()).sum::<f64>() / pop.num_micros() as f64;
    let votes = pop
        .iter()
        .map(|c| deletion_vote(c, avg_fitness, cfg))
        .collect::<Vec<_>>();
    let total = votes.iter().sum::<f64>();

    let choice_point = rng.random::<f64>() * total;
    let mut running = 0.;
    let idx = votes
        .iter()
        .position(|v| {
            running += v;
            running > choice_point
        })
        .unwrap_or(votes.len() - 1);

    let clfr = &pop.classifiers()[idx];
    let id = clfr.id();
    if clfr.numerosity() > 1 {
        pop.alter_numerosity(idx, -1, Op::Deletion);
    } else {
        pop.remove(idx, Op::Deletion);
    }
    id
}
