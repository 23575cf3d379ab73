//! Online linear regression rules used to learn each classifier's local predictor.
//!
//! Recursive least squares follows Butz et al. '08 (Function approximation with XCS:
//! hyperellipsoidal conditions, recursive least squares, and compaction), including the
//! `lambda_rls` forgetting factor. Normalized least mean squares follows Lanzi et al. '06
//! (Generalization in the XCSF classifier system), algorithm 2.

use crate::{classifier::Classifier, config::XcsfConfig};
use rulinalg::{matrix::Matrix, vector::Vector};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStrategy {
    /// recursive least squares, each classifier carries a covariance matrix
    Rls,
    /// normalized least mean squares
    Nlms,
}

impl PredictionStrategy {
    pub fn init_cov_mat(&self, num_weights: usize, delta_rls: f64) -> Option<Matrix<f64>> {
        match self {
            Self::Rls => Some(Matrix::identity(num_weights) * delta_rls),
            Self::Nlms => None,
        }
    }

    /// Move a classifier's weights toward predicting `payoff` for the augmented observation
    pub fn update_prediction(
        &self,
        clfr: &mut Classifier,
        payoff: f64,
        aug_obs: &Vector<f64>,
        cfg: &XcsfConfig,
    ) {
        match self {
            Self::Rls => update_rls(clfr, payoff, aug_obs, cfg),
            Self::Nlms => update_nlms(clfr, payoff, aug_obs, cfg),
        }
    }
}

fn update_rls(clfr: &mut Classifier, payoff: f64, x: &Vector<f64>, cfg: &XcsfConfig) {
    if cfg.tau_rls > 0 && clfr.experience() % cfg.tau_rls == 0 {
        clfr.reset_cov_mat(cfg.delta_rls);
    }

    let lambda = cfg.lambda_rls;
    let gain = {
        let n = x.size();
        let cov_mat = clfr
            .cov_mat
            .get_or_insert_with(|| Matrix::identity(n) * cfg.delta_rls);

        // P x, and since P is symmetric x^T P is its transpose
        let px = &*cov_mat * x;
        let beta_rls = lambda + x.dot(&px);
        let outer = Matrix::from_fn(n, n, |c, r| px[r] * px[c]);
        *cov_mat = (&*cov_mat - outer / beta_rls) / lambda;

        &*cov_mat * x
    };

    let error = payoff - clfr.prediction(x);
    clfr.weight_vec = &clfr.weight_vec + gain * error;
}

fn update_nlms(clfr: &mut Classifier, payoff: f64, x: &Vector<f64>, cfg: &XcsfConfig) {
    let norm = x.dot(x);
    if norm <= 0. {
        return;
    }

    let error = payoff - clfr.prediction(x);
    let correction = (cfg.eta / norm) * error;
    clfr.weight_vec = &clfr.weight_vec + x.clone() * correction;
}
