//! The niche genetic algorithm run on action sets.

use crate::{
    classifier::{Classifier, ClfrId},
    condition::Condition,
    config::XcsfConfig,
    constants::{XCSF_ERROR_CUTDOWN, XCSF_FITNESS_CUTDOWN, XCSF_NICHE_MIN_ERROR_CUTDOWN},
    deletion::deletion,
    encoding::Encoding,
    environment::Action,
    population::{Op, Population},
    random::Happens,
    subsumption::does_subsume,
};
use rand::{seq::IndexedRandom, RngCore};
use tracing::debug;

/// Whether the action set has gone more than `theta_ga` steps, on average over its micro
/// classifiers, since the GA last ran on it
pub fn should_run(
    pop: &Population,
    action_set: &[ClfrId],
    time_step: u64,
    cfg: &XcsfConfig,
) -> bool {
    let members = pop.resolve(action_set);
    if members.is_empty() {
        return false;
    }

    let (stamp_sum, num_sum) = members
        .iter()
        .map(|&idx| &pop.classifiers()[idx])
        .fold((0., 0.), |(s, n), c| {
            let num = f64::from(c.numerosity());
            (s + c.time_stamp() as f64 * num, n + num)
        });
    time_step as f64 - stamp_sum / num_sum > cfg.theta_ga as f64
}

/// Tournament of `ceil(tau * macros)` uniform draws, with replacement, from the action set. The
/// member with the highest numerosity scaled fitness wins, the first drawn among equals.
fn tournament(pop: &Population, members: &[usize], tau: f64, rng: &mut impl RngCore) -> usize {
    let size = ((tau * members.len() as f64).ceil() as usize).max(1);
    let mut best: Option<usize> = None;
    for _ in 0..size {
        let Some(&idx) = members.choose(rng) else {
            break;
        };
        best = match best {
            Some(b)
                if pop.classifiers()[b].numerosity_scaled_fitness()
                    >= pop.classifiers()[idx].numerosity_scaled_fitness() =>
            {
                Some(b)
            }
            _ => Some(idx),
        };
    }
    best.unwrap_or(members[0])
}

/// Swap each allele position between the two children with probability `upsilon`
fn uniform_crossover(
    a: &mut Classifier,
    b: &mut Classifier,
    encoding: &Encoding,
    upsilon: f64,
    rng: &mut impl RngCore,
) {
    let mut a_alleles = a.condition().alleles().to_vec();
    let mut b_alleles = b.condition().alleles().to_vec();
    for (l, r) in a_alleles.iter_mut().zip(b_alleles.iter_mut()) {
        if rng.happens(upsilon) {
            core::mem::swap(l, r);
        }
    }
    a.set_condition(Condition::new(a_alleles, encoding));
    b.set_condition(Condition::new(b_alleles, encoding));
}

fn mutate(
    child: &mut Classifier,
    encoding: &Encoding,
    action_space: &[Action],
    mu: f64,
    rng: &mut impl RngCore,
) {
    let alleles = encoding.mutate_condition_alleles(child.condition().alleles(), mu, rng);
    child.set_condition(Condition::new(alleles, encoding));

    if rng.happens(mu) {
        let others = action_space
            .iter()
            .copied()
            .filter(|&a| a != child.action())
            .collect::<Vec<_>>();
        if let Some(&action) = others.choose(rng) {
            child.set_action(action);
        }
    }
}

/// Children of two parents. They are crossed over with probability `chi`, taking the parents'
/// averaged statistics, then cut down and mutated.
fn gen_children(
    parent_a: &Classifier,
    parent_b: &Classifier,
    encoding: &Encoding,
    action_space: &[Action],
    cfg: &XcsfConfig,
    rng: &mut impl RngCore,
) -> ([Classifier; 2], bool) {
    let mut child_a = parent_a.offspring(cfg.delta_rls);
    let mut child_b = parent_b.offspring(cfg.delta_rls);

    let crossed = rng.happens(cfg.chi);
    if crossed {
        uniform_crossover(&mut child_a, &mut child_b, encoding, cfg.upsilon, rng);

        let niche_min_error = (parent_a.niche_min_error() + parent_b.niche_min_error()) / 2.;
        let error = (parent_a.error() + parent_b.error()) / 2.;
        let fitness = (parent_a.fitness() + parent_b.fitness()) / 2.;
        for child in [&mut child_a, &mut child_b] {
            child.set_niche_min_error(niche_min_error);
            child.set_error(error);
            child.set_fitness(fitness);
        }
    }

    for child in [&mut child_a, &mut child_b] {
        child.set_niche_min_error(child.niche_min_error() * XCSF_NICHE_MIN_ERROR_CUTDOWN);
        child.set_error(child.error() * XCSF_ERROR_CUTDOWN);
        child.set_fitness(child.fitness() * XCSF_FITNESS_CUTDOWN);
        mutate(child, encoding, action_space, cfg.mu, rng);
    }
    ([child_a, child_b], crossed)
}

/// Reproduce two children from the action set, and insert or subsume each before deleting down to
/// the population limit
pub fn run_ga(
    pop: &mut Population,
    action_set: &[ClfrId],
    time_step: u64,
    encoding: &Encoding,
    action_space: &[Action],
    cfg: &XcsfConfig,
    rng: &mut impl RngCore,
) {
    let members = pop.resolve(action_set);
    if members.is_empty() {
        return;
    }
    for &idx in &members {
        pop.get_mut(idx).set_time_stamp(time_step);
    }

    let parent_a = pop.classifiers()[tournament(pop, &members, cfg.tau, rng)].clone();
    let parent_b = pop.classifiers()[tournament(pop, &members, cfg.tau, rng)].clone();
    let (children, crossed) =
        gen_children(&parent_a, &parent_b, encoding, action_space, cfg, rng);

    for child in children {
        let subsumer = if cfg.do_ga_subsumption {
            [&parent_a, &parent_b]
                .into_iter()
                .find(|p| does_subsume(p, &child, cfg))
                .and_then(|p| pop.position(p.id()))
        } else {
            None
        };

        match subsumer {
            Some(idx) => pop.alter_numerosity(idx, 1, Op::GaSubsumption),
            None => {
                pop.insert(child);
            }
        }
        deletion(pop, cfg, rng);
    }

    debug!(
        time_step,
        parent_a = %parent_a.id(),
        parent_b = %parent_b.id(),
        crossed,
        "ga"
    );
}
