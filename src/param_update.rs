//! Reinforcement of an action set toward a payoff.

use crate::{
    classifier::{Classifier, ClfrId},
    config::XcsfConfig,
    constants::{
        XCSF_ACTION_SET_SIZE_MIN, XCSF_ERROR_MIN, XCSF_FITNESS_MAX, XCSF_FITNESS_MIN,
        XCSF_MAX_ACCURACY,
    },
    population::Population,
    subsumption::action_set_subsumption,
};
use rulinalg::vector::Vector;

/// Cumulative average while a classifier is young (`experience < 1 / rate`), Widrow-Hoff after
#[inline]
fn moving_average(current: f64, target: f64, experience: u64, rate: f64) -> f64 {
    if (experience as f64) < 1. / rate {
        current + (target - current) / experience as f64
    } else {
        current + rate * (target - current)
    }
}

pub fn accuracy(clfr: &Classifier, cfg: &XcsfConfig) -> f64 {
    if clfr.error() < cfg.epsilon_nought {
        XCSF_MAX_ACCURACY
    } else {
        cfg.alpha * (clfr.error() / cfg.epsilon_nought).powf(-cfg.nu)
    }
}

/// Update every member of the action set with `payoff`, observed under `aug_obs`. Members that
/// have left the population are skipped.
pub fn update_action_set(
    pop: &mut Population,
    action_set: &[ClfrId],
    payoff: f64,
    aug_obs: &Vector<f64>,
    cfg: &XcsfConfig,
) {
    let members = pop.resolve(action_set);
    if members.is_empty() {
        return;
    }

    let as_num_micros = members
        .iter()
        .map(|&idx| f64::from(pop.classifiers()[idx].numerosity()))
        .sum::<f64>();
    let as_min_error = members
        .iter()
        .map(|&idx| pop.classifiers()[idx].error())
        .fold(f64::INFINITY, f64::min);

    for &idx in &members {
        let clfr = pop.get_mut(idx);
        clfr.increment_experience();
        let experience = clfr.experience();

        let tracks_niche = cfg.beta_epsilon > 0.;
        if tracks_niche {
            let niche_min_error = moving_average(
                clfr.niche_min_error(),
                as_min_error,
                experience,
                cfg.beta_epsilon,
            );
            clfr.set_niche_min_error(niche_min_error.max(XCSF_ERROR_MIN));
        }

        let deviation = (payoff - clfr.prediction(aug_obs)).abs();
        let target = if !tracks_niche {
            deviation
        } else if deviation > clfr.niche_min_error() {
            deviation - clfr.niche_min_error()
        } else {
            cfg.epsilon_nought
        };
        let error = moving_average(clfr.error(), target, experience, cfg.beta);
        clfr.set_error(error.max(XCSF_ERROR_MIN));

        cfg.prediction.update_prediction(clfr, payoff, aug_obs, cfg);

        let action_set_size =
            moving_average(clfr.action_set_size(), as_num_micros, experience, cfg.beta);
        clfr.set_action_set_size(action_set_size.max(XCSF_ACTION_SET_SIZE_MIN));
    }

    update_fitness(pop, &members, cfg);

    if cfg.do_as_subsumption {
        action_set_subsumption(pop, action_set, cfg);
    }
}

fn update_fitness(pop: &mut Population, members: &[usize], cfg: &XcsfConfig) {
    let accuracies = members
        .iter()
        .map(|&idx| accuracy(&pop.classifiers()[idx], cfg))
        .collect::<Vec<_>>();
    let accuracy_sum = members
        .iter()
        .zip(&accuracies)
        .map(|(&idx, acc)| acc * f64::from(pop.classifiers()[idx].numerosity()))
        .sum::<f64>();
    if accuracy_sum <= 0. {
        return;
    }

    for (&idx, acc) in members.iter().zip(accuracies) {
        let clfr = pop.get_mut(idx);
        let relative_accuracy = acc * f64::from(clfr.numerosity()) / accuracy_sum;
        let fitness = clfr.fitness() + cfg.beta * (relative_accuracy - clfr.fitness());
        clfr.set_fitness(fitness.clamp(XCSF_FITNESS_MIN, XCSF_FITNESS_MAX));
    }
}
