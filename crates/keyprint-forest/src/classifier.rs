//! The fit/predict seam that evaluation code is written against.

use crate::config::RandomForestConfig;
use crate::error::ForestError;
use crate::forest::RandomForest;

/// A supervised multi-class model over row-major `f64` features.
///
/// Labels are zero-based class positions. Implementations are fitted once
/// and then queried; `predict` before `fit` is an error.
pub trait Classifier {
    /// Failure type for both phases.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Train on `features[row][column]` with one label per row.
    ///
    /// # Errors
    ///
    /// Implementation-defined; typically malformed shapes or values.
    fn fit(&mut self, features: &[Vec<f64>], labels: &[usize]) -> Result<(), Self::Error>;

    /// Predict one label per row of `features`.
    ///
    /// # Errors
    ///
    /// Implementation-defined; typically an unfitted model or a width mismatch.
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, Self::Error>;
}

/// [`Classifier`] adapter around [`RandomForestConfig`] and its fitted forest.
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    config: RandomForestConfig,
    forest: Option<RandomForest>,
}

impl RandomForestClassifier {
    /// Wrap a config; nothing is trained until [`Classifier::fit`].
    #[must_use]
    pub fn new(config: RandomForestConfig) -> Self {
        Self { config, forest: None }
    }

    /// Borrow the training configuration.
    #[must_use]
    pub fn config(&self) -> &RandomForestConfig {
        &self.config
    }

    /// Borrow the fitted forest, if any.
    #[must_use]
    pub fn forest(&self) -> Option<&RandomForest> {
        self.forest.as_ref()
    }
}

impl Classifier for RandomForestClassifier {
    type Error = ForestError;

    fn fit(&mut self, features: &[Vec<f64>], labels: &[usize]) -> Result<(), ForestError> {
        self.forest = Some(self.config.fit(features, labels)?);
        Ok(())
    }

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, ForestError> {
        self.forest
            .as_ref()
            .ok_or(ForestError::NotFitted)?
            .predict_batch(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_before_fit_fails() {
        let model = RandomForestClassifier::new(RandomForestConfig::new(2).unwrap());
        assert!(matches!(model.predict(&[vec![1.0]]), Err(ForestError::NotFitted)));
    }

    #[test]
    fn fit_then_predict() {
        let features = vec![vec![0.0], vec![0.1], vec![0.2], vec![5.0], vec![5.1], vec![5.2]];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let mut model = RandomForestClassifier::new(RandomForestConfig::new(10).unwrap());
        model.fit(&features, &labels).unwrap();
        assert_eq!(model.predict(&[vec![0.05], vec![5.05]]).unwrap(), vec![0, 1]);
        assert!(model.forest().is_some());
    }

    #[test]
    fn failed_fit_surfaces_error() {
        let mut model = RandomForestClassifier::new(RandomForestConfig::new(2).unwrap());
        assert!(matches!(model.fit(&[], &[]), Err(ForestError::EmptyDataset)));
        assert!(model.forest().is_none());
    }
}
