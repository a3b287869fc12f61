use rand::Rng;

/// Impurity measure used to score candidate splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitCriterion {
    /// `1 - Σ p²`
    #[default]
    Gini,
    /// `-Σ p·ln p` over non-empty classes.
    Entropy,
}

impl SplitCriterion {
    /// Impurity of a node holding `counts` rows per class (`n` in total).
    ///
    /// An empty node is pure.
    #[must_use]
    pub fn impurity(self, counts: &[usize], n: usize) -> f64 {
        if n == 0 {
            return 0.0;
        }
        let n = n as f64;
        match self {
            SplitCriterion::Gini => {
                1.0 - counts
                    .iter()
                    .map(|&c| (c as f64 / n).powi(2))
                    .sum::<f64>()
            }
            SplitCriterion::Entropy => counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / n;
                    -p * p.ln()
                })
                .sum(),
        }
    }
}

/// Outcome of a successful split search.
#[derive(Debug, Clone)]
pub(crate) struct Split {
    pub(crate) feature: usize,
    pub(crate) threshold: f64,
    pub(crate) left: Vec<usize>,
    pub(crate) right: Vec<usize>,
}

/// Inputs shared by every split search of one tree.
pub(crate) struct SplitContext<'a> {
    /// Column-major: `columns[feature][row]`.
    pub(crate) columns: &'a [Vec<f64>],
    pub(crate) labels: &'a [usize],
    pub(crate) n_classes: usize,
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_features: usize,
    pub(crate) min_samples_leaf: usize,
}

impl SplitContext<'_> {
    /// Per-class row counts for `rows`.
    pub(crate) fn class_counts(&self, rows: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &r in rows {
            counts[self.labels[r]] += 1;
        }
        counts
    }

    /// Search `max_features` randomly drawn columns for the threshold with the
    /// largest weighted impurity decrease.
    ///
    /// If none of the drawn columns can split `rows`, further columns are
    /// drawn until one can. Returns `None` when no column has a boundary
    /// leaving `min_samples_leaf` rows on both sides.
    pub(crate) fn best_split(&self, rows: &[usize], rng: &mut impl Rng) -> Option<Split> {
        let n = rows.len();
        let n_features = self.columns.len();
        if n < 2 || n_features == 0 {
            return None;
        }

        let parent = self.class_counts(rows);
        let parent_score = n as f64 * self.criterion.impurity(&parent, n);

        let mut candidates: Vec<usize> = (0..n_features).collect();
        let take = self.max_features.min(n_features);

        let mut best: Option<(f64, usize, f64)> = None;
        let mut ordered: Vec<(f64, usize)> = Vec::with_capacity(n);

        // Past the budget, keep drawing columns only until one yields a split.
        for drawn in 0..n_features {
            if drawn >= take && best.is_some() {
                break;
            }
            let j = rng.gen_range(drawn..n_features);
            candidates.swap(drawn, j);
            let feature = candidates[drawn];
            let column = &self.columns[feature];
            ordered.clear();
            ordered.extend(rows.iter().map(|&r| (column[r], self.labels[r])));
            ordered.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

            let mut left = vec![0usize; self.n_classes];
            let mut right = parent.clone();

            for i in 0..n - 1 {
                let (value, class) = ordered[i];
                left[class] += 1;
                right[class] -= 1;

                let next = ordered[i + 1].0;
                if value == next {
                    continue;
                }
                let n_left = i + 1;
                let n_right = n - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let decrease = parent_score
                    - n_left as f64 * self.criterion.impurity(&left, n_left)
                    - n_right as f64 * self.criterion.impurity(&right, n_right);
                if best.is_none_or(|(d, _, _)| decrease > d) {
                    best = Some((decrease, feature, (value + next) / 2.0));
                }
            }
        }

        let (_, feature, threshold) = best?;
        let column = &self.columns[feature];
        let (left, right): (Vec<usize>, Vec<usize>) =
            rows.iter().copied().partition(|&r| column[r] <= threshold);
        Some(Split {
            feature,
            threshold,
            left,
            right,
        })
    }
}
