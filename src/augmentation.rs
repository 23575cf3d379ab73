//! Feature expansion of an observation into the input of a classifier's linear predictor.

use crate::error::{Result, XcsfError};
use rulinalg::vector::Vector;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Augmentation {
    /// `[x0, x1, .., xn]`
    Linear,
    /// `[x0, x1, x1^2, .., xn, xn^2]`
    Quadratic,
}

impl Augmentation {
    pub fn from_poly_order(poly_order: usize) -> Result<Self> {
        match poly_order {
            1 => Ok(Self::Linear),
            2 => Ok(Self::Quadratic),
            _ => Err(XcsfError::InvalidConfig(format!(
                "poly_order must be 1 or 2, got {poly_order}"
            ))),
        }
    }

    pub fn poly_order(&self) -> usize {
        match self {
            Self::Linear => 1,
            Self::Quadratic => 2,
        }
    }

    /// Length of an augmented observation with `num_features` dimensions, and therefore the length
    /// of a classifier's weight vector
    pub fn num_weights(&self, num_features: usize) -> usize {
        self.poly_order() * num_features + 1
    }

    /// Prefix the bias input `x_nought` and expand every feature
    pub fn augment(&self, obs: &[f64], x_nought: f64) -> Vector<f64> {
        let mut aug = Vec::with_capacity(self.num_weights(obs.len()));
        aug.push(x_nought);
        match self {
            Self::Linear => aug.extend_from_slice(obs),
            Self::Quadratic => {
                for &v in obs {
                    aug.push(v);
                    aug.push(v * v);
                }
            }
        }
        Vector::new(aug)
    }
}
