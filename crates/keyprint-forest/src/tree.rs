use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::error::ForestError;
use crate::node::{Node, NodeId};
use crate::split::{SplitContext, SplitCriterion};

/// Configuration for a single CART decision tree.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `criterion`         | `Gini`                |
/// | `max_depth`         | `None` (unlimited)    |
/// | `min_samples_split` | 2                     |
/// | `min_samples_leaf`  | 1                     |
/// | `max_features`      | `None` (all features) |
/// | `seed`              | 42                    |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: u64,
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeConfig {
    /// Create a config with the defaults listed above.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }

    /// Set the impurity criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Limit the depth; the root is depth 0.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum node size eligible for splitting.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of rows each child must keep.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set how many columns are examined per split. `None` examines all.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the seed driving column subsampling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fit a tree on row-major `features` with zero-based class `labels`.
    ///
    /// The number of classes is taken as `max(labels) + 1`.
    ///
    /// # Errors
    ///
    /// Input errors ([`ForestError::EmptyDataset`], [`ForestError::LabelCountMismatch`],
    /// [`ForestError::ZeroFeatures`], [`ForestError::FeatureCountMismatch`],
    /// [`ForestError::NonFiniteValue`]), plus [`ForestError::InvalidMaxDepth`], [`ForestError::InvalidMinSamplesSplit`],
    /// [`ForestError::InvalidMinSamplesLeaf`] and [`ForestError::InvalidMaxFeatures`]
    /// for out-of-range settings.
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<DecisionTree, ForestError> {
        let n_features = validate_training_set(features, labels)?;
        let n_classes = labels.iter().max().map_or(1, |&m| m + 1);
        self.validate(n_features)?;
        Ok(self.grow(&to_columns(features, n_features), labels, n_classes))
    }

    pub(crate) fn validate(&self, n_features: usize) -> Result<(), ForestError> {
        if self.max_depth == Some(0) {
            return Err(ForestError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(ForestError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.min_samples_leaf == 0 {
            return Err(ForestError::InvalidMinSamplesLeaf { min_samples_leaf: 0 });
        }
        let max_features = self.max_features.unwrap_or(n_features);
        if max_features == 0 || max_features > n_features {
            return Err(ForestError::InvalidMaxFeatures {
                max_features,
                n_features,
            });
        }
        Ok(())
    }

    /// Grow a tree over pre-validated column-major data.
    ///
    /// Nodes are expanded depth-first from an explicit work stack; each
    /// child slot is reserved as a placeholder leaf and overwritten when the
    /// child is processed.
    #[instrument(level = "trace", skip_all, fields(n_rows = labels.len()))]
    pub(crate) fn grow(&self, columns: &[Vec<f64>], labels: &[usize], n_classes: usize) -> DecisionTree {
        let n_features = columns.len();
        let ctx = SplitContext {
            columns,
            labels,
            n_classes,
            criterion: self.criterion,
            max_features: self.max_features.unwrap_or(n_features),
            min_samples_leaf: self.min_samples_leaf,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut nodes = vec![Node::leaf(&[])];
        let mut pending: Vec<(NodeId, Vec<usize>, usize)> =
            vec![(NodeId::new(0), (0..labels.len()).collect(), 0)];

        while let Some((id, rows, depth)) = pending.pop() {
            let counts = ctx.class_counts(&rows);
            let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
            let at_limit = self.max_depth.is_some_and(|d| depth >= d);

            let split = if pure || at_limit || rows.len() < self.min_samples_split {
                None
            } else {
                ctx.best_split(&rows, &mut rng)
            };

            nodes[id.index()] = match split {
                None => Node::leaf(&counts),
                Some(split) => {
                    let left = NodeId::new(nodes.len());
                    let right = NodeId::new(nodes.len() + 1);
                    nodes.push(Node::leaf(&[]));
                    nodes.push(Node::leaf(&[]));
                    pending.push((right, split.right, depth + 1));
                    pending.push((left, split.left, depth + 1));
                    Node::Split {
                        feature: split.feature,
                        threshold: split.threshold,
                        left,
                        right,
                    }
                }
            };
        }

        debug!(n_nodes = nodes.len(), "decision tree grown");
        DecisionTree {
            nodes,
            n_features,
            n_classes,
        }
    }
}

/// Check a training set and return its feature count.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`ForestError::EmptyDataset`] | no rows |
/// | [`ForestError::LabelCountMismatch`] | `features.len() != labels.len()` |
/// | [`ForestError::ZeroFeatures`] | rows are empty |
/// | [`ForestError::FeatureCountMismatch`] | ragged rows |
/// | [`ForestError::NonFiniteValue`] | NaN or infinity present |
pub(crate) fn validate_training_set(features: &[Vec<f64>], labels: &[usize]) -> Result<usize, ForestError> {
    let Some(first) = features.first() else {
        return Err(ForestError::EmptyDataset);
    };
    if features.len() != labels.len() {
        return Err(ForestError::LabelCountMismatch {
            features: features.len(),
            labels: labels.len(),
        });
    }
    let n_features = first.len();
    if n_features == 0 {
        return Err(ForestError::ZeroFeatures);
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(ForestError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(ForestError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }
    Ok(n_features)
}

/// Transpose row-major rows into `columns[feature][row]`.
pub(crate) fn to_columns(features: &[Vec<f64>], n_features: usize) -> Vec<Vec<f64>> {
    (0..n_features)
        .map(|f| features.iter().map(|row| row[f]).collect())
        .collect()
}

/// A fitted CART decision tree.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

impl DecisionTree {
    /// Predict the class of one row.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when the row width
    /// differs from the training width.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, ForestError> {
        match self.leaf_for(sample)? {
            Node::Leaf { prediction, .. } => Ok(*prediction),
            Node::Split { .. } => unreachable!("leaf_for stops at a leaf"),
        }
    }

    /// Class distribution of the leaf reached by one row.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] on a width mismatch.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<&[f64], ForestError> {
        match self.leaf_for(sample)? {
            Node::Leaf { distribution, .. } => Ok(distribution.as_slice()),
            Node::Split { .. } => unreachable!("leaf_for stops at a leaf"),
        }
    }

    /// Total node count.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Leaf count.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Number of classes the tree distributes over.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Longest root-to-leaf path; a lone root leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(NodeId::new(0), 0usize)];
        while let Some((id, d)) = stack.pop() {
            match &self.nodes[id.index()] {
                Node::Leaf { .. } => deepest = deepest.max(d),
                Node::Split { left, right, .. } => {
                    stack.push((*left, d + 1));
                    stack.push((*right, d + 1));
                }
            }
        }
        deepest
    }

    fn leaf_for(&self, sample: &[f64]) -> Result<&Node, ForestError> {
        if sample.len() != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut node = &self.nodes[0];
        while let Node::Split {
            feature,
            threshold,
            left,
            right,
        } = node
        {
            let next = if sample[*feature] <= *threshold { left } else { right };
            node = &self.nodes[next.index()];
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f64>>, Vec<usize>) {
        let features = vec![
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![3.0, 0.0],
            vec![10.0, 0.0],
            vec![11.0, 0.0],
            vec![12.0, 0.0],
        ];
        (features, vec![0, 0, 0, 1, 1, 1])
    }

    #[test]
    fn single_class_gives_single_leaf() {
        let tree = DecisionTreeConfig::new()
            .fit(&[vec![1.0], vec![2.0], vec![3.0]], &[0, 0, 0])
            .unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict(&[9.0]).unwrap(), 0);
    }

    #[test]
    fn separates_two_groups() {
        let (features, labels) = separable();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert_eq!(tree.predict(&[2.5, 0.0]).unwrap(), 0);
        assert_eq!(tree.predict(&[10.5, 0.0]).unwrap(), 1);
        assert_eq!(tree.n_leaves(), 2);
    }

    #[test]
    fn xor_needs_two_levels() {
        let features = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]];
        let tree = DecisionTreeConfig::new().fit(&features, &[0, 1, 1, 0]).unwrap();
        assert!(tree.depth() >= 2);
        for (row, expected) in features.iter().zip([0, 1, 1, 0]) {
            assert_eq!(tree.predict(row).unwrap(), expected);
        }
    }

    #[test]
    fn max_depth_caps_growth() {
        let features = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]];
        let tree = DecisionTreeConfig::new()
            .with_max_depth(Some(1))
            .fit(&features, &[0, 1, 1, 0])
            .unwrap();
        assert!(tree.depth() <= 1);
    }

    #[test]
    fn proba_sums_to_one() {
        let (features, labels) = separable();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        let sum: f64 = tree.predict_proba(&[6.0, 0.0]).unwrap().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_inputs() {
        let cfg = DecisionTreeConfig::new();
        assert!(matches!(cfg.fit(&[], &[]), Err(ForestError::EmptyDataset)));
        assert!(matches!(
            cfg.fit(&[vec![1.0], vec![2.0]], &[0]),
            Err(ForestError::LabelCountMismatch { features: 2, labels: 1 })
        ));
        assert!(matches!(
            cfg.fit(&[vec![1.0, 2.0], vec![3.0]], &[0, 1]),
            Err(ForestError::FeatureCountMismatch { .. })
        ));
        assert!(matches!(
            cfg.fit(&[vec![1.0, f64::INFINITY], vec![3.0, 4.0]], &[0, 1]),
            Err(ForestError::NonFiniteValue { sample_index: 0, feature_index: 1 })
        ));
    }

    #[test]
    fn rejects_bad_settings() {
        let (features, labels) = separable();
        assert!(matches!(
            DecisionTreeConfig::new().with_max_depth(Some(0)).fit(&features, &labels),
            Err(ForestError::InvalidMaxDepth { .. })
        ));
        assert!(matches!(
            DecisionTreeConfig::new().with_min_samples_split(1).fit(&features, &labels),
            Err(ForestError::InvalidMinSamplesSplit { .. })
        ));
        assert!(matches!(
            DecisionTreeConfig::new().with_max_features(Some(3)).fit(&features, &labels),
            Err(ForestError::InvalidMaxFeatures { max_features: 3, n_features: 2 })
        ));
    }

    #[test]
    fn prediction_width_checked() {
        let (features, labels) = separable();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert!(matches!(
            tree.predict(&[1.0]),
            Err(ForestError::PredictionFeatureMismatch { expected: 2, got: 1 })
        ));
    }
}
