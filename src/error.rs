//! Error type shared by every fallible operation in the crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum XcsfError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid observation space: {0}")]
    ObsSpace(String),

    #[error("observation has {got} dimensions, expected {expected}")]
    ObsDimMismatch { expected: usize, got: usize },

    #[error("observation {0:?} lies outside of the observation space")]
    ObsOutOfSpace(Vec<f64>),

    /// No classifier in the population advocates any action for an observation
    #[error("no action is advocated for this observation")]
    NoAction,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, XcsfError>;
