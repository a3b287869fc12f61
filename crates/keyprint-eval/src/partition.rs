//! Stratified, seeded train/test partitioning with train-fitted scaling.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use crate::EvalError;
use crate::domain::{KeystrokeTable, SubjectIndex};
use crate::scaler::MinMaxScaler;

/// Configuration for splitting a keystroke table.
///
/// # Defaults
///
/// | Parameter | Default |
/// |---|---|
/// | `test_fraction` | 0.2 |
/// | `seed` | 42 |
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionConfig {
    test_fraction: f64,
    seed: u64,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Scaled train and test sets with their subject labels.
///
/// Labels are positions in the [`SubjectIndex`] the split was made with.
#[derive(Debug, Clone)]
pub struct PartitionedDataset {
    /// Scaled training rows.
    pub train_features: Vec<Vec<f64>>,
    /// One label per training row.
    pub train_labels: Vec<usize>,
    /// Test rows scaled with the training bounds.
    pub test_features: Vec<Vec<f64>>,
    /// One label per test row.
    pub test_labels: Vec<usize>,
    /// Scaler fitted on the unscaled training rows.
    pub scaler: MinMaxScaler,
}

impl PartitionedDataset {
    /// Number of training rows.
    #[must_use]
    pub fn n_train(&self) -> usize {
        self.train_labels.len()
    }

    /// Number of test rows.
    #[must_use]
    pub fn n_test(&self) -> usize {
        self.test_labels.len()
    }
}

impl PartitionConfig {
    /// Create a config with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }

    /// Set the share of each subject's rows held out for testing.
    #[must_use]
    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    /// Set the shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the test fraction.
    #[must_use]
    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    /// Return the seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Split `table` into scaled train and test sets, stratified by subject.
    ///
    /// Each subject with `n` rows contributes `ceil(test_fraction * n)` rows
    /// to the test side. Rows are shuffled per subject with a generator
    /// seeded from `seed`, so the same table, index, and seed always yield
    /// the same partition. Output rows are grouped by subject in index order.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::InvalidTestFraction`] | fraction is outside `(0, 1)` |
    /// | [`EvalError::UnknownSubject`] | a row's subject is not indexed |
    /// | [`EvalError::TooFewRows`] | an indexed subject has fewer than 2 rows |
    /// | [`EvalError::EmptySplit`] | the fraction leaves no training rows for a subject |
    #[instrument(skip_all, fields(n_rows = table.n_rows(), n_subjects = subjects.len()))]
    pub fn split(
        &self,
        table: &KeystrokeTable,
        subjects: &SubjectIndex,
    ) -> Result<PartitionedDataset, EvalError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(EvalError::InvalidTestFraction {
                fraction: self.test_fraction,
            });
        }

        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); subjects.len()];
        for (row_index, row) in table.rows().iter().enumerate() {
            let Some(position) = subjects.position(&row.subject) else {
                return Err(EvalError::UnknownSubject {
                    subject: row.subject.to_string(),
                    row_index,
                });
            };
            groups[position].push(row_index);
        }

        let mut train_features = Vec::new();
        let mut train_labels = Vec::new();
        let mut test_features = Vec::new();
        let mut test_labels = Vec::new();

        for (label, (subject, group)) in subjects.iter().zip(&groups).enumerate() {
            let n_rows = group.len();
            if n_rows < 2 {
                return Err(EvalError::TooFewRows {
                    subject: subject.to_string(),
                    count: n_rows,
                });
            }
            let n_test = (self.test_fraction * n_rows as f64).ceil() as usize;
            if n_test == 0 || n_test >= n_rows {
                return Err(EvalError::EmptySplit {
                    subject: subject.to_string(),
                    n_rows,
                    n_test,
                });
            }

            let mut order = group.clone();
            let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
            order.shuffle(&mut rng);
            let (test_rows, train_rows) = order.split_at(n_test);
            debug!(%subject, n_train = train_rows.len(), n_test, "subject split");

            for &i in test_rows {
                test_features.push(table.rows()[i].features.clone());
                test_labels.push(label);
            }
            for &i in train_rows {
                train_features.push(table.rows()[i].features.clone());
                train_labels.push(label);
            }
        }

        let scaler = MinMaxScaler::fit(&train_features)?;
        scaler.transform(&mut train_features)?;
        scaler.transform(&mut test_features)?;

        info!(
            n_train = train_labels.len(),
            n_test = test_labels.len(),
            seed = self.seed,
            "dataset partitioned"
        );

        Ok(PartitionedDataset {
            train_features,
            train_labels,
            test_features,
            test_labels,
            scaler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SampleRow, SubjectId};

    /// `per_subject` rows for each named subject; the first feature encodes
    /// the global row number so rows can be traced through the split.
    fn table(subjects: &[&str], per_subject: usize) -> KeystrokeTable {
        let mut rows = Vec::new();
        for rep in 0..per_subject {
            for subject in subjects {
                let n = rows.len() as f64;
                rows.push(SampleRow {
                    subject: SubjectId::new(*subject),
                    session_index: 1,
                    repetition: rep as u32 + 1,
                    features: vec![n, 0.5],
                });
            }
        }
        KeystrokeTable::new(vec!["H.t".into(), "H.i".into()], rows).unwrap()
    }

    #[test]
    fn two_subjects_of_ten_rows_split_sixteen_four() {
        let table = table(&["s002", "s003"], 10);
        let subjects = SubjectIndex::from_rows(table.rows());
        let data = PartitionConfig::new().split(&table, &subjects).unwrap();

        assert_eq!(data.n_train(), 16);
        assert_eq!(data.n_test(), 4);
        for label in 0..2 {
            assert_eq!(data.train_labels.iter().filter(|&&l| l == label).count(), 8);
            assert_eq!(data.test_labels.iter().filter(|&&l| l == label).count(), 2);
        }
    }

    #[test]
    fn test_side_uses_ceiling() {
        let table = table(&["a", "b", "c"], 7);
        let subjects = SubjectIndex::from_rows(table.rows());
        let data = PartitionConfig::new().split(&table, &subjects).unwrap();
        // ceil(0.2 * 7) = 2
        assert_eq!(data.n_test(), 6);
        assert_eq!(data.n_train(), 15);
    }

    #[test]
    fn sides_are_disjoint_and_cover_the_table() {
        let table = table(&["a", "b"], 10);
        let subjects = SubjectIndex::from_rows(table.rows());
        let data = PartitionConfig::new().split(&table, &subjects).unwrap();

        let lo = data.scaler.data_min()[0];
        let hi = data.scaler.data_max()[0];
        let unscale = |v: f64| (v * (hi - lo) + lo).round() as usize;
        let mut seen: Vec<usize> = data
            .train_features
            .iter()
            .chain(&data.test_features)
            .map(|r| unscale(r[0]))
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_partition() {
        let table = table(&["a", "b", "c"], 10);
        let subjects = SubjectIndex::from_rows(table.rows());
        let a = PartitionConfig::new().with_seed(7).split(&table, &subjects).unwrap();
        let b = PartitionConfig::new().with_seed(7).split(&table, &subjects).unwrap();
        assert_eq!(a.train_features, b.train_features);
        assert_eq!(a.test_features, b.test_features);
        assert_eq!(a.train_labels, b.train_labels);
    }

    #[test]
    fn training_features_are_unit_scaled() {
        let table = table(&["a", "b"], 10);
        let subjects = SubjectIndex::from_rows(table.rows());
        let data = PartitionConfig::new().split(&table, &subjects).unwrap();
        for row in &data.train_features {
            assert!(row.iter().all(|v| (0.0..=1.0).contains(v)));
            // second column is constant
            assert_eq!(row[1], 0.0);
        }
    }

    #[test]
    fn labels_group_by_subject_in_index_order() {
        let table = table(&["x", "y"], 5);
        let subjects = SubjectIndex::from_ids([SubjectId::new("y"), SubjectId::new("x")]).unwrap();
        let data = PartitionConfig::new().split(&table, &subjects).unwrap();
        assert_eq!(data.test_labels, vec![0, 1]);
        assert_eq!(data.train_labels, vec![0, 0, 0, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn single_row_subject_is_rejected() {
        let mut rows = table(&["a"], 3).rows().to_vec();
        rows.push(SampleRow {
            subject: SubjectId::new("lonely"),
            session_index: 1,
            repetition: 1,
            features: vec![0.0, 0.0],
        });
        let table = KeystrokeTable::new(vec!["H.t".into(), "H.i".into()], rows).unwrap();
        let subjects = SubjectIndex::from_rows(table.rows());
        let err = PartitionConfig::new().split(&table, &subjects).unwrap_err();
        assert!(matches!(err, EvalError::TooFewRows { subject, count: 1 } if subject == "lonely"));
    }

    #[test]
    fn unlisted_subject_is_rejected() {
        let table = table(&["a", "b"], 3);
        let subjects = SubjectIndex::from_ids([SubjectId::new("a")]).unwrap();
        assert!(matches!(
            PartitionConfig::new().split(&table, &subjects),
            Err(EvalError::UnknownSubject { row_index: 1, .. })
        ));
    }

    #[test]
    fn fraction_must_leave_both_sides_populated() {
        let table = table(&["a"], 2);
        let subjects = SubjectIndex::from_rows(table.rows());
        assert!(matches!(
            PartitionConfig::new().with_test_fraction(0.9).split(&table, &subjects),
            Err(EvalError::EmptySplit { n_rows: 2, n_test: 2, .. })
        ));
        for bad in [0.0, 1.0, -0.5, f64::NAN] {
            assert!(matches!(
                PartitionConfig::new().with_test_fraction(bad).split(&table, &subjects),
                Err(EvalError::InvalidTestFraction { .. })
            ));
        }
    }
}
