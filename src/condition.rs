use crate::{encoding::Encoding, interval::Interval};
use core::fmt;
use serde::{Deserialize, Serialize};

/// The matching predicate of a classifier: a genotype of alleles and the phenotype of intervals
/// an [Encoding] decodes it into, one interval per observation dimension.
///
/// Conditions are immutable. Crossover and mutation build new conditions from new alleles so
/// that the phenotype, generality and matching order cached here never go stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    alleles: Vec<f64>,
    phenotype: Vec<Interval>,
    generality: f64,
    /// dimensions ordered by ascending relative span, narrow intervals reject observations
    /// soonest
    matching_idx_order: Vec<usize>,
}

impl Condition {
    pub fn new(alleles: Vec<f64>, encoding: &Encoding) -> Self {
        let phenotype = encoding.decode(&alleles);
        let generality = encoding.calc_condition_generality(&phenotype);
        let matching_idx_order = encoding.calc_matching_idx_order(&phenotype);
        Self {
            alleles,
            phenotype,
            generality,
            matching_idx_order,
        }
    }

    #[inline]
    pub fn alleles(&self) -> &[f64] {
        &self.alleles
    }

    #[inline]
    pub fn phenotype(&self) -> &[Interval] {
        &self.phenotype
    }

    #[inline]
    pub fn generality(&self) -> f64 {
        self.generality
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.phenotype.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.phenotype.is_empty()
    }

    pub fn does_match(&self, obs: &[f64]) -> bool {
        debug_assert_eq!(obs.len(), self.phenotype.len());
        self.matching_idx_order
            .iter()
            .all(|&idx| self.phenotype[idx].contains_val(obs[idx]))
    }

    /// Whether every interval of this condition contains the respective interval of other
    pub fn does_subsume(&self, other: &Self) -> bool {
        self.phenotype
            .iter()
            .zip(&other.phenotype)
            .all(|(mine, theirs)| mine.does_subsume(theirs))
    }
}

/// Conditions are equal when they express the same intervals, regardless of the order of
/// alleles inside of each pair.
impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.phenotype == other.phenotype
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, interval) in self.phenotype.iter().enumerate() {
            if idx != 0 {
                f.write_str(" && ")?;
            }
            write!(f, "{interval}")?;
        }
        Ok(())
    }
}
