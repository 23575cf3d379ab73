//! Hyperparameters of a learning run.

use crate::{
    action_selection::ActionSelection,
    error::{Result, XcsfError},
    prediction::PredictionStrategy,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Every hyperparameter XCSF reads. Field names follow the usual XCS notation. Missing fields
/// take their [Default] value when loading from json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XcsfConfig {
    /// maximum number of micro-classifiers
    #[serde(rename = "N")]
    pub max_population: usize,
    /// learning rate of error, niche-min-error, action set size and fitness
    pub beta: f64,
    pub alpha: f64,
    /// error below which a classifier is considered accurate
    pub epsilon_nought: f64,
    pub nu: f64,
    /// discount factor
    pub gamma: f64,
    /// mean time since last GA in an action set before it runs again
    pub theta_ga: u64,
    /// crossover probability
    pub chi: f64,
    /// per allele swap probability during crossover
    pub upsilon: f64,
    /// mutation probability
    pub mu: f64,
    /// tournament size as a fraction of the action set's macros
    pub tau: f64,
    pub theta_sub: u64,
    pub theta_del: u64,
    pub delta: f64,
    /// covering noise bound
    pub r_nought: f64,
    /// mutation noise bound
    pub m_nought: f64,
    /// RLS forgetting factor
    pub lambda_rls: f64,
    /// RLS covariance reset period in experience, 0 disables resets
    pub tau_rls: u64,
    /// RLS covariance initial scale
    pub delta_rls: f64,
    /// NLMS learning rate
    pub eta: f64,
    #[serde(rename = "epsilon_I")]
    pub epsilon_i: f64,
    #[serde(rename = "fitness_I")]
    pub fitness_i: f64,
    /// constant input prefixed to every augmented observation
    pub x_nought: f64,
    pub seed: u64,
    pub poly_order: usize,
    pub do_ga_subsumption: bool,
    pub do_as_subsumption: bool,
    /// niche-min-error learning rate
    pub beta_epsilon: f64,
    pub prediction: PredictionStrategy,
    pub action_selection: ActionSelection,
}

impl Default for XcsfConfig {
    fn default() -> Self {
        Self {
            max_population: 800,
            beta: 0.1,
            alpha: 0.1,
            epsilon_nought: 0.01,
            nu: 5.,
            gamma: 0.95,
            theta_ga: 50,
            chi: 0.8,
            upsilon: 0.5,
            mu: 0.04,
            tau: 0.4,
            theta_sub: 20,
            theta_del: 20,
            delta: 0.1,
            r_nought: 1.,
            m_nought: 1.,
            lambda_rls: 1.,
            tau_rls: 0,
            delta_rls: 1000.,
            eta: 0.1,
            epsilon_i: 0.,
            fitness_i: 0.01,
            x_nought: 10.,
            seed: 0,
            poly_order: 1,
            do_ga_subsumption: true,
            do_as_subsumption: true,
            beta_epsilon: 0.,
            prediction: PredictionStrategy::Rls,
            action_selection: ActionSelection::FixedEpsilonGreedy { epsilon: 0.5 },
        }
    }
}

fn invalid(msg: String) -> XcsfError {
    XcsfError::InvalidConfig(msg)
}

fn check_unit(name: &str, v: f64) -> Result<()> {
    if (0. ..=1.).contains(&v) {
        Ok(())
    } else {
        Err(invalid(format!("{name} = {v} is not within [0, 1]")))
    }
}

fn check_positive(name: &str, v: f64) -> Result<()> {
    if v > 0. && v.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{name} = {v} must be positive")))
    }
}

impl XcsfConfig {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_str(&fs::read_to_string(path)?)
    }

    /// Reject hyperparameters outside of their domain. Checks that depend on the environment
    /// (population size against the action space) happen when a controller is built.
    pub fn validate(&self) -> Result<()> {
        if self.max_population == 0 {
            return Err(invalid("N must be at least 1".into()));
        }

        for (name, v) in [
            ("beta", self.beta),
            ("alpha", self.alpha),
            ("gamma", self.gamma),
            ("chi", self.chi),
            ("upsilon", self.upsilon),
            ("mu", self.mu),
            ("delta", self.delta),
            ("beta_epsilon", self.beta_epsilon),
        ] {
            check_unit(name, v)?;
        }

        check_positive("beta", self.beta)?;
        check_positive("epsilon_nought", self.epsilon_nought)?;
        check_positive("nu", self.nu)?;
        check_positive("delta_rls", self.delta_rls)?;
        check_positive("eta", self.eta)?;

        if !(self.tau > 0. && self.tau <= 1.) {
            return Err(invalid(format!("tau = {} is not within (0, 1]", self.tau)));
        }
        if !(self.lambda_rls > 0. && self.lambda_rls <= 1.) {
            return Err(invalid(format!(
                "lambda_rls = {} is not within (0, 1]",
                self.lambda_rls
            )));
        }
        if self.epsilon_i < 0. {
            return Err(invalid(format!("epsilon_I = {} is negative", self.epsilon_i)));
        }
        check_unit("fitness_I", self.fitness_i)?;
        if !self.x_nought.is_finite() {
            return Err(invalid("x_nought must be finite".into()));
        }
        if !(1..=2).contains(&self.poly_order) {
            return Err(invalid(format!(
                "poly_order = {} must be 1 or 2",
                self.poly_order
            )));
        }

        self.action_selection.validate()
    }
}
