//! Random Forest classification behind a generic fit/predict seam.
//!
//! Provides CART decision trees with Gini/Entropy criteria, bootstrap
//! bagging with per-split column subsampling, parallel tree growth via
//! rayon, and the [`Classifier`] trait the evaluation pipeline is written
//! against.

mod classifier;
mod config;
mod error;
mod forest;
mod node;
mod split;
mod tree;

pub use classifier::{Classifier, RandomForestClassifier};
pub use config::{MaxFeatures, RandomForestConfig};
pub use error::ForestError;
pub use forest::RandomForest;
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
