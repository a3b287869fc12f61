//! Evaluation pipeline for keystroke-dynamics subject identification.
//!
//! Splits a labeled keystroke table per subject, trains any
//! [`keyprint_forest::Classifier`] on the scaled training rows, and turns
//! the held-out predictions into per-subject verification rates.

pub mod confusion;
pub mod domain;
mod error;
pub mod partition;
pub mod runner;
pub mod scaler;
pub mod stats;

pub use confusion::ConfusionMatrix;
pub use domain::{KeystrokeTable, SampleRow, SubjectId, SubjectIndex};
pub use error::{EvalError, Phase};
pub use partition::{PartitionConfig, PartitionedDataset};
pub use runner::{ModelRun, run_model};
pub use scaler::MinMaxScaler;
pub use stats::{Statistics, SubjectMetric, accuracy, weighted_precision};
