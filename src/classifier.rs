//! The classifier (rule) and its evolving statistics.

use crate::{
    condition::Condition,
    config::XcsfConfig,
    constants::{
        XCSF_ACTION_SET_SIZE_MIN, XCSF_ERROR_MIN, XCSF_FITNESS_MAX, XCSF_FITNESS_MIN,
        XCSF_NUMEROSITY_MIN,
    },
    environment::Action,
    prediction::PredictionStrategy,
    serialize::{deserialize_cov_mat, deserialize_vector, serialize_cov_mat, serialize_vector},
};
use core::fmt;
use rulinalg::{
    matrix::{BaseMatrix, Matrix},
    vector::Vector,
};
use serde::{Deserialize, Serialize};

/// Population-unique identity of a macro-classifier, assigned on insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClfrId(pub u64);

impl fmt::Display for ClfrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A macro-classifier: one stored rule standing in for `numerosity` identical micro-classifiers.
///
/// Statistics are only changed through setters which assert their domain, a violation is a
/// logic error and panics at the point of mutation. Derived quantities (deletion vote,
/// scaled fitness) are computed on read and never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classifier {
    pub(crate) id: ClfrId,
    condition: Condition,
    action: Action,
    #[serde(
        serialize_with = "serialize_vector",
        deserialize_with = "deserialize_vector"
    )]
    pub(crate) weight_vec: Vector<f64>,
    /// present only for classifiers learning by recursive least squares
    #[serde(
        serialize_with = "serialize_cov_mat",
        deserialize_with = "deserialize_cov_mat"
    )]
    pub(crate) cov_mat: Option<Matrix<f64>>,
    error: f64,
    fitness: f64,
    niche_min_error: f64,
    experience: u64,
    time_stamp: u64,
    action_set_size: f64,
    numerosity: u32,
}

impl Classifier {
    /// A fresh classifier whose weights are all zero, and whose statistics are at their initial
    /// values. Its id is assigned once it enters a population.
    pub fn new(
        condition: Condition,
        action: Action,
        time_step: u64,
        num_weights: usize,
        strategy: PredictionStrategy,
        cfg: &XcsfConfig,
    ) -> Self {
        let mut clfr = Self {
            id: ClfrId(0),
            condition,
            action,
            weight_vec: Vector::zeros(num_weights),
            cov_mat: strategy.init_cov_mat(num_weights, cfg.delta_rls),
            error: 0.,
            fitness: 0.,
            niche_min_error: 0.,
            experience: 0,
            time_stamp: 0,
            action_set_size: XCSF_ACTION_SET_SIZE_MIN,
            numerosity: XCSF_NUMEROSITY_MIN,
        };
        clfr.set_error(cfg.epsilon_i);
        clfr.set_fitness(cfg.fitness_i);
        clfr.set_niche_min_error(cfg.epsilon_i);
        clfr.set_time_stamp(time_step);
        clfr
    }

    /// Deep copy for reproduction: a single micro-classifier with no experience, whose
    /// covariance matrix (if any) starts over
    pub(crate) fn offspring(&self, delta_rls: f64) -> Self {
        let mut child = self.clone();
        child.numerosity = XCSF_NUMEROSITY_MIN;
        child.experience = 0;
        child.reset_cov_mat(delta_rls);
        child
    }

    #[inline]
    pub fn id(&self) -> ClfrId {
        self.id
    }

    #[inline]
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    #[inline]
    pub fn action(&self) -> Action {
        self.action
    }

    #[inline]
    pub fn weight_vec(&self) -> &Vector<f64> {
        &self.weight_vec
    }

    #[inline]
    pub fn cov_mat(&self) -> Option<&Matrix<f64>> {
        self.cov_mat.as_ref()
    }

    #[inline]
    pub fn error(&self) -> f64 {
        self.error
    }

    #[inline]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    #[inline]
    pub fn niche_min_error(&self) -> f64 {
        self.niche_min_error
    }

    #[inline]
    pub fn experience(&self) -> u64 {
        self.experience
    }

    #[inline]
    pub fn time_stamp(&self) -> u64 {
        self.time_stamp
    }

    #[inline]
    pub fn action_set_size(&self) -> f64 {
        self.action_set_size
    }

    #[inline]
    pub fn numerosity(&self) -> u32 {
        self.numerosity
    }

    #[inline]
    pub fn generality(&self) -> f64 {
        self.condition.generality()
    }

    pub(crate) fn set_condition(&mut self, condition: Condition) {
        assert_eq!(condition.len(), self.condition.len(), "condition dimensionality");
        self.condition = condition;
    }

    pub(crate) fn set_action(&mut self, action: Action) {
        self.action = action;
    }

    pub(crate) fn set_error(&mut self, error: f64) {
        assert!(error >= XCSF_ERROR_MIN, "error {error} below {XCSF_ERROR_MIN}");
        self.error = error;
    }

    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        assert!(
            (XCSF_FITNESS_MIN..=XCSF_FITNESS_MAX).contains(&fitness),
            "fitness {fitness} outside of [{XCSF_FITNESS_MIN}, {XCSF_FITNESS_MAX}]"
        );
        self.fitness = fitness;
    }

    pub(crate) fn set_niche_min_error(&mut self, niche_min_error: f64) {
        assert!(
            niche_min_error >= XCSF_ERROR_MIN,
            "niche min error {niche_min_error} below {XCSF_ERROR_MIN}"
        );
        self.niche_min_error = niche_min_error;
    }

    pub(crate) fn increment_experience(&mut self) {
        self.experience += 1;
    }

    pub(crate) fn set_time_stamp(&mut self, time_stamp: u64) {
        self.time_stamp = time_stamp;
    }

    pub(crate) fn set_action_set_size(&mut self, action_set_size: f64) {
        assert!(
            action_set_size >= XCSF_ACTION_SET_SIZE_MIN,
            "action set size {action_set_size} below {XCSF_ACTION_SET_SIZE_MIN}"
        );
        self.action_set_size = action_set_size;
    }

    pub(crate) fn set_numerosity(&mut self, numerosity: u32) {
        assert!(
            numerosity >= XCSF_NUMEROSITY_MIN,
            "numerosity {numerosity} below {XCSF_NUMEROSITY_MIN}"
        );
        self.numerosity = numerosity;
    }

    pub(crate) fn reset_cov_mat(&mut self, delta_rls: f64) {
        if let Some(cov_mat) = self.cov_mat.as_mut() {
            *cov_mat = Matrix::identity(cov_mat.rows()) * delta_rls;
        }
    }

    /// Linear prediction for an augmented observation
    #[inline]
    pub fn prediction(&self, aug_obs: &Vector<f64>) -> f64 {
        self.weight_vec.dot(aug_obs)
    }

    #[inline]
    pub fn does_match(&self, obs: &[f64]) -> bool {
        self.condition.does_match(obs)
    }

    /// Deletion vote before any fitness based inflation
    #[inline]
    pub fn deletion_vote(&self) -> f64 {
        self.action_set_size * f64::from(self.numerosity)
    }

    #[inline]
    pub fn has_sufficient_experience(&self, theta_del: u64) -> bool {
        self.experience > theta_del
    }

    #[inline]
    pub fn numerosity_scaled_fitness(&self) -> f64 {
        self.fitness / f64::from(self.numerosity)
    }

    /// Strictly more general than other, and containing other's condition
    pub fn is_more_general(&self, other: &Self) -> bool {
        self.generality() > other.generality() && self.condition.does_subsume(&other.condition)
    }

    /// Same (condition, action), which is what makes two rules duplicates of each other
    #[inline]
    pub fn is_duplicate_of(&self, other: &Self) -> bool {
        self.action == other.action && self.condition == other.condition
    }

    /// Duplicate, with every parameter and statistic equal within `tol`
    pub fn full_eq(&self, other: &Self, tol: f64) -> bool {
        let close = |l: f64, r: f64| (l - r).abs() <= tol;
        let close_all = |l: &[f64], r: &[f64]| {
            l.len() == r.len() && l.iter().zip(r).all(|(l, r)| close(*l, *r))
        };

        self.is_duplicate_of(other)
            && close_all(self.weight_vec.data(), other.weight_vec.data())
            && match (&self.cov_mat, &other.cov_mat) {
                (Some(l), Some(r)) => close_all(l.data(), r.data()),
                (None, None) => true,
                _ => false,
            }
            && close(self.error, other.error)
            && close(self.fitness, other.fitness)
            && close(self.niche_min_error, other.niche_min_error)
            && close(self.action_set_size, other.action_set_size)
            && self.experience == other.experience
            && self.time_stamp == other.time_stamp
            && self.numerosity == other.numerosity
    }
}

impl fmt::Display for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} (err {:.4}, fit {:.4}, exp {}, num {})",
            self.id,
            self.condition,
            self.action,
            self.error,
            self.fitness,
            self.experience,
            self.numerosity
        )
    }
}
