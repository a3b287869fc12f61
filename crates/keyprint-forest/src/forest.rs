//! Bagged ensemble training and majority-probability prediction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::error::ForestError;
use crate::tree::{DecisionTree, DecisionTreeConfig, to_columns, validate_training_set};

/// A fitted Random Forest.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
}

/// Draw `draw_count` row positions with replacement.
fn bootstrap(n_rows: usize, draw_count: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..draw_count).map(|_| rng.gen_range(0..n_rows)).collect()
}

#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<RandomForest, ForestError> {
    let n_features = validate_training_set(features, labels)?;
    let max_features = config.max_features.resolve(n_features)?;
    if !(config.bootstrap_fraction > 0.0 && config.bootstrap_fraction <= 1.0) {
        return Err(ForestError::InvalidBootstrapFraction {
            fraction: config.bootstrap_fraction,
        });
    }

    let tree_template = DecisionTreeConfig::new()
        .with_criterion(config.criterion)
        .with_max_depth(config.max_depth)
        .with_min_samples_split(config.min_samples_split)
        .with_min_samples_leaf(config.min_samples_leaf)
        .with_max_features(Some(max_features));
    tree_template.validate(n_features)?;

    let n_rows = features.len();
    let n_classes = labels.iter().max().map_or(1, |&m| m + 1);
    let draw_count = ((n_rows as f64) * config.bootstrap_fraction).ceil() as usize;

    info!(
        n_trees = config.n_trees,
        n_rows,
        n_features,
        n_classes,
        max_features,
        "training random forest"
    );

    // Per-tree seeds come from one master stream so results do not depend on
    // how rayon schedules the trees.
    let mut master = ChaCha8Rng::seed_from_u64(config.seed);
    let seeds: Vec<(u64, u64)> = (0..config.n_trees)
        .map(|_| (master.r#gen(), master.r#gen()))
        .collect();

    let trees: Vec<DecisionTree> = seeds
        .into_par_iter()
        .map(|(bag_seed, split_seed)| {
            let mut rng = ChaCha8Rng::seed_from_u64(bag_seed);
            let bag = bootstrap(n_rows, draw_count, &mut rng);
            let bag_rows: Vec<Vec<f64>> = bag.iter().map(|&i| features[i].clone()).collect();
            let bag_labels: Vec<usize> = bag.iter().map(|&i| labels[i]).collect();
            tree_template
                .clone()
                .with_seed(split_seed)
                .grow(&to_columns(&bag_rows, n_features), &bag_labels, n_classes)
        })
        .collect();

    debug!(
        mean_depth = trees.iter().map(DecisionTree::depth).sum::<usize>() as f64 / trees.len() as f64,
        "forest grown"
    );

    Ok(RandomForest {
        trees,
        n_features,
        n_classes,
    })
}

impl RandomForest {
    /// Averaged class distribution over all trees for one row.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] on a width mismatch.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, ForestError> {
        let mut mean = vec![0.0f64; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in mean.iter_mut().zip(tree.predict_proba(sample)?) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        mean.iter_mut().for_each(|v| *v /= n);
        Ok(mean)
    }

    /// Most probable class for one row; ties go to the lowest class index.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] on a width mismatch.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, ForestError> {
        let proba = self.predict_proba(sample)?;
        let mut best = 0;
        for (class, &p) in proba.iter().enumerate() {
            if p > proba[best] {
                best = class;
            }
        }
        Ok(best)
    }

    /// Predict every row of `features` in parallel, preserving order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ForestError::PredictionFeatureMismatch`] found.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, ForestError> {
        features.par_iter().map(|row| self.predict(row)).collect()
    }

    /// Number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Feature width the forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of classes (`max(label) + 1` at training time).
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Borrow the fitted trees.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}
