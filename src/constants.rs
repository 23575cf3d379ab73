//! Centralized constants for XCSF that are not hyperparameters.
//!
//! All constants are defined here with the `XCSF_` prefix, hyperparameters live in
//! [crate::config::XcsfConfig].

// ============================================================================
// Genetic Algorithm
// ============================================================================

/// Scale applied to a child's error after reproduction
pub const XCSF_ERROR_CUTDOWN: f64 = 0.25;

/// Scale applied to a child's niche-min-error after reproduction
pub const XCSF_NICHE_MIN_ERROR_CUTDOWN: f64 = XCSF_ERROR_CUTDOWN;

/// Scale applied to a child's fitness after reproduction
pub const XCSF_FITNESS_CUTDOWN: f64 = 0.1;

// ============================================================================
// Classifier Statistics
// ============================================================================

/// Accuracy of a classifier whose error is below epsilon_nought
pub const XCSF_MAX_ACCURACY: f64 = 1.0;

pub const XCSF_ERROR_MIN: f64 = 0.0;

pub const XCSF_FITNESS_MIN: f64 = 0.0;

pub const XCSF_FITNESS_MAX: f64 = 1.0;

pub const XCSF_ACTION_SET_SIZE_MIN: f64 = 1.0;

pub const XCSF_NUMEROSITY_MIN: u32 = 1;

// ============================================================================
// Population
// ============================================================================

/// Smallest number of macro-classifiers a non-empty population may be reduced to by deletion
pub const XCSF_MIN_NUM_MACROS: usize = 1;

/// Floor for numerosity-scaled fitness when computing an inflated deletion vote, keeps the vote
/// finite for classifiers whose fitness decayed to zero
pub const XCSF_DELETION_FITNESS_FLOOR: f64 = f64::EPSILON;
