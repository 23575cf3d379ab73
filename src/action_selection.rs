//! Per action value estimates of a match set, and the policies choosing among them.

use crate::{
    environment::Action,
    error::{Result, XcsfError},
    population::Population,
    random::Happens,
};
use rand::{seq::IndexedRandom, RngCore};
use rulinalg::vector::Vector;
use serde::{Deserialize, Serialize};

/// Fitness weighted prediction of every action, in action space order. `None` marks an action
/// no classifier of the match set advocates.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionArr(Vec<(Action, Option<f64>)>);

impl PredictionArr {
    pub fn new(
        pop: &Population,
        match_set: &[usize],
        aug_obs: &Vector<f64>,
        action_space: &[Action],
    ) -> Self {
        let entries = action_space
            .iter()
            .map(|&action| {
                let (weighted, fitness_sum, represented) = match_set
                    .iter()
                    .map(|&idx| &pop.classifiers()[idx])
                    .filter(|c| c.action() == action)
                    .fold((0., 0., false), |(w, f, _), c| {
                        (w + c.prediction(aug_obs) * c.fitness(), f + c.fitness(), true)
                    });
                let prediction = match (represented, fitness_sum > 0.) {
                    (false, _) => None,
                    (true, true) => Some(weighted / fitness_sum),
                    (true, false) => Some(0.),
                };
                (action, prediction)
            })
            .collect();
        Self(entries)
    }

    #[inline]
    pub fn entries(&self) -> &[(Action, Option<f64>)] {
        &self.0
    }

    pub fn get(&self, action: Action) -> Option<f64> {
        self.0
            .iter()
            .find(|(a, _)| *a == action)
            .and_then(|(_, p)| *p)
    }

    /// Highest non null entry, the first in action space order among equals
    pub fn greedy(&self) -> Option<(Action, f64)> {
        self.0
            .iter()
            .filter_map(|&(a, p)| p.map(|p| (a, p)))
            .fold(None, |best, (a, p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((a, p)),
            })
    }

    pub fn greedy_action(&self) -> Result<Action> {
        self.greedy().map(|(a, _)| a).ok_or(XcsfError::NoAction)
    }

    /// Maximum over non null entries, used to bootstrap the payoff of the previous step
    pub fn max_prediction(&self) -> Option<f64> {
        self.greedy().map(|(_, p)| p)
    }
}

/// Exploration policies used while training
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSelection {
    FixedEpsilonGreedy {
        epsilon: f64,
    },
    /// epsilon starts at `epsilon_max` and falls by `decay_factor` each time step, down to
    /// `epsilon_min`
    LinearDecayEpsilonGreedy {
        epsilon_max: f64,
        decay_factor: f64,
        epsilon_min: f64,
    },
    /// epsilon greedy with epsilon 0.5
    BalancedExploreExploit,
}

impl ActionSelection {
    pub fn epsilon(&self, time_step: u64) -> f64 {
        match *self {
            Self::FixedEpsilonGreedy { epsilon } => epsilon,
            Self::LinearDecayEpsilonGreedy {
                epsilon_max,
                decay_factor,
                epsilon_min,
            } => (epsilon_max - decay_factor * time_step as f64).max(epsilon_min),
            Self::BalancedExploreExploit => 0.5,
        }
    }

    /// With probability epsilon a uniformly random action, otherwise the greedy one
    pub fn select(
        &self,
        prediction_arr: &PredictionArr,
        action_space: &[Action],
        time_step: u64,
        rng: &mut impl RngCore,
    ) -> Result<Action> {
        if rng.happens(self.epsilon(time_step)) {
            action_space.choose(rng).copied().ok_or(XcsfError::NoAction)
        } else {
            prediction_arr.greedy_action()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, v: f64| {
            if (0. ..=1.).contains(&v) {
                Ok(())
            } else {
                Err(XcsfError::InvalidConfig(format!(
                    "{name} = {v} is not within [0, 1]"
                )))
            }
        };
        match *self {
            Self::FixedEpsilonGreedy { epsilon } => unit("epsilon", epsilon),
            Self::LinearDecayEpsilonGreedy {
                epsilon_max,
                decay_factor,
                epsilon_min,
            } => {
                unit("epsilon_max", epsilon_max)?;
                unit("epsilon_min", epsilon_min)?;
                if epsilon_min > epsilon_max {
                    return Err(XcsfError::InvalidConfig(format!(
                        "epsilon_min {epsilon_min} above epsilon_max {epsilon_max}"
                    )));
                }
                if decay_factor < 0. || !decay_factor.is_finite() {
                    return Err(XcsfError::InvalidConfig(format!(
                        "decay_factor = {decay_factor} must be non negative"
                    )));
                }
                Ok(())
            }
            Self::BalancedExploreExploit => Ok(()),
        }
    }
}
