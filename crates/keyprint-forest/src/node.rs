/// Position of a node inside a tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Return the zero-based arena position.
    #[must_use]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node of a fitted decision tree.
///
/// Children are referenced by [`NodeId`] into the owning tree's `Vec<Node>`;
/// the root always lives at position 0.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    /// Interior node: rows with `row[feature] <= threshold` go left.
    Split {
        /// Column tested at this node.
        feature: usize,
        /// Midpoint between the two closest values on either side.
        threshold: f64,
        /// Left child.
        left: NodeId,
        /// Right child.
        right: NodeId,
    },
    /// Terminal node carrying the class distribution of its training rows.
    Leaf {
        /// Majority class.
        prediction: usize,
        /// Class frequencies, normalized to sum to 1.
        distribution: Vec<f64>,
    },
}

impl Node {
    /// Build a leaf from raw class counts.
    ///
    /// Ties resolve to the lowest class index.
    pub(crate) fn leaf(counts: &[usize]) -> Self {
        let total = counts.iter().sum::<usize>().max(1) as f64;
        let mut prediction = 0;
        for (class, &count) in counts.iter().enumerate() {
            if count > counts[prediction] {
                prediction = class;
            }
        }
        Node::Leaf {
            prediction,
            distribution: counts.iter().map(|&c| c as f64 / total).collect(),
        }
    }

    /// Return `true` for [`Node::Leaf`].
    #[must_use]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_majority_and_distribution() {
        let node = Node::leaf(&[1, 3, 0]);
        match node {
            Node::Leaf {
                prediction,
                distribution,
            } => {
                assert_eq!(prediction, 1);
                assert!((distribution[0] - 0.25).abs() < 1e-12);
                assert!((distribution[1] - 0.75).abs() < 1e-12);
                assert_eq!(distribution[2], 0.0);
            }
            Node::Split { .. } => panic!("expected a leaf"),
        }
    }

    #[test]
    fn leaf_tie_prefers_lowest_class() {
        let node = Node::leaf(&[2, 2]);
        assert!(matches!(node, Node::Leaf { prediction: 0, .. }));
    }
}
