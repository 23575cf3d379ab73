//! Closed intervals, and the observation space they carve up.

use crate::error::{Result, XcsfError};
use core::fmt;
use serde::{Deserialize, Serialize};

/// A closed interval `[lower, upper]`, where `lower <= upper`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    lower: f64,
    upper: f64,
}

impl Interval {
    pub fn new(lower: f64, upper: f64) -> Self {
        assert!(lower <= upper, "interval [{lower}, {upper}] is inverted");
        Self { lower, upper }
    }

    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    #[inline]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Continuous width of the interval. Discrete cardinality is handled by the encoding
    #[inline]
    pub fn span(&self) -> f64 {
        self.upper - self.lower
    }

    #[inline]
    pub fn contains_val(&self, val: f64) -> bool {
        self.lower <= val && val <= self.upper
    }

    /// Whether this interval contains every point of other
    #[inline]
    pub fn does_subsume(&self, other: &Self) -> bool {
        self.lower <= other.lower && self.upper >= other.upper
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimKind {
    Integer,
    Real,
}

/// Bounds of one observation dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub lower: f64,
    pub upper: f64,
}

impl Dimension {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.upper - self.lower
    }

    #[inline]
    pub fn clip(&self, val: f64) -> f64 {
        val.clamp(self.lower, self.upper)
    }
}

/// The space observations are drawn from. Every dimension shares one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObsSpace {
    kind: DimKind,
    dims: Vec<Dimension>,
}

impl ObsSpace {
    pub fn new(kind: DimKind, dims: Vec<Dimension>) -> Result<Self> {
        if dims.is_empty() {
            return Err(XcsfError::ObsSpace("no dimensions".into()));
        }

        for (idx, dim) in dims.iter().enumerate() {
            if !(dim.lower.is_finite() && dim.upper.is_finite()) {
                return Err(XcsfError::ObsSpace(format!(
                    "dimension {idx} has non-finite bounds"
                )));
            }
            let degenerate = match kind {
                DimKind::Integer => {
                    dim.lower > dim.upper || dim.lower.fract() != 0. || dim.upper.fract() != 0.
                }
                DimKind::Real => dim.lower >= dim.upper,
            };
            if degenerate {
                return Err(XcsfError::ObsSpace(format!(
                    "dimension {idx} has invalid {kind:?} bounds [{}, {}]",
                    dim.lower, dim.upper
                )));
            }
        }

        Ok(Self { kind, dims })
    }

    /// Integer space where every dimension spans `lower..=upper`
    pub fn integer(bounds: &[(i64, i64)]) -> Result<Self> {
        Self::new(
            DimKind::Integer,
            bounds
                .iter()
                .map(|&(l, u)| Dimension::new(l as f64, u as f64))
                .collect(),
        )
    }

    pub fn real(bounds: &[(f64, f64)]) -> Result<Self> {
        Self::new(
            DimKind::Real,
            bounds.iter().map(|&(l, u)| Dimension::new(l, u)).collect(),
        )
    }

    #[inline]
    pub fn kind(&self) -> DimKind {
        self.kind
    }

    #[inline]
    pub fn dims(&self) -> &[Dimension] {
        &self.dims
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    /// Whether obs lies inside of this space, with integral values on integer dimensions
    pub fn contains(&self, obs: &[f64]) -> bool {
        obs.len() == self.dims.len()
            && obs.iter().zip(&self.dims).all(|(v, dim)| {
                dim.lower <= *v
                    && *v <= dim.upper
                    && (self.kind == DimKind::Real || v.fract() == 0.)
            })
    }
}
