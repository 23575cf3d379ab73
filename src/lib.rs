pub mod action_selection;
pub mod augmentation;
pub mod classifier;
pub mod condition;
pub mod config;
pub mod constants;
pub mod covering;
pub mod deletion;
pub mod encoding;
pub mod environment;
pub mod error;
pub mod ga;
pub mod interval;
mod macros;
pub mod param_update;
pub mod population;
pub mod prediction;
pub mod random;
pub mod serialize;
pub mod subsumption;
pub mod xcsf;

pub use action_selection::{ActionSelection, PredictionArr};
pub use augmentation::Augmentation;
pub use classifier::{Classifier, ClfrId};
pub use condition::Condition;
pub use config::XcsfConfig;
pub use encoding::Encoding;
pub use environment::{Action, EnvResponse, Environment, TrainingProgress, TrainingTarget};
pub use error::{Result, XcsfError};
pub use interval::{DimKind, Dimension, Interval, ObsSpace};
pub use population::{Population, PopulationOps};
pub use prediction::PredictionStrategy;
pub use random::{Happens, WyRng};
pub use xcsf::Xcsf;
