//! Subject-by-subject confusion matrix.

use std::fmt;

use crate::EvalError;

/// A square count matrix over the subject index.
///
/// Entry `[true_subject][predicted_subject]` counts test samples typed by
/// `true_subject` and attributed to `predicted_subject`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
    n_subjects: usize,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from true and predicted labels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::EmptyTestSet`] | Zero labels provided |
    /// | [`EvalError::LabelLengthMismatch`] | Sequences differ in length |
    /// | [`EvalError::LabelOutOfRange`] | A label is `>= n_subjects` |
    pub fn from_labels(
        true_labels: &[usize],
        predicted: &[usize],
        n_subjects: usize,
    ) -> Result<Self, EvalError> {
        if true_labels.len() != predicted.len() {
            return Err(EvalError::LabelLengthMismatch {
                true_len: true_labels.len(),
                predicted_len: predicted.len(),
            });
        }
        if true_labels.is_empty() {
            return Err(EvalError::EmptyTestSet);
        }
        let mut matrix = vec![vec![0usize; n_subjects]; n_subjects];
        for (&t, &p) in true_labels.iter().zip(predicted) {
            let label = t.max(p);
            if label >= n_subjects {
                return Err(EvalError::LabelOutOfRange { label, n_subjects });
            }
            matrix[t][p] += 1;
        }
        Ok(Self { matrix, n_subjects })
    }

    /// Count at `[true_subject][predicted_subject]`.
    #[must_use]
    pub fn get(&self, true_subject: usize, predicted_subject: usize) -> usize {
        self.matrix[true_subject][predicted_subject]
    }

    /// Correct attributions per subject.
    #[must_use]
    pub fn diagonal(&self) -> Vec<usize> {
        (0..self.n_subjects).map(|i| self.matrix[i][i]).collect()
    }

    /// Test samples per true subject.
    #[must_use]
    pub fn row_sums(&self) -> Vec<usize> {
        self.matrix.iter().map(|row| row.iter().sum()).collect()
    }

    /// Predictions per subject.
    #[must_use]
    pub fn column_sums(&self) -> Vec<usize> {
        (0..self.n_subjects)
            .map(|j| self.matrix.iter().map(|row| row[j]).sum())
            .collect()
    }

    /// Total number of test samples.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Largest single cell, used to scale the heatmap.
    #[must_use]
    pub fn max_count(&self) -> usize {
        self.matrix.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Return the underlying matrix rows.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    /// Return the number of subjects.
    #[must_use]
    pub fn n_subjects(&self) -> usize {
        self.n_subjects
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>8}", "")?;
        for j in 0..self.n_subjects {
            write!(f, " pred_{j:>3}")?;
        }
        writeln!(f)?;

        for (i, row) in self.matrix.iter().enumerate() {
            write!(f, "true_{i:>3}")?;
            for val in row {
                write!(f, " {val:>8}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_land_in_true_by_predicted_cells() {
        let cm = ConfusionMatrix::from_labels(&[0, 0, 1, 1, 2], &[0, 1, 1, 1, 0], 3).unwrap();
        assert_eq!(cm.as_rows(), &[vec![1, 1, 0], vec![0, 2, 0], vec![1, 0, 0]]);
        assert_eq!(cm.get(2, 0), 1);
        assert_eq!(cm.diagonal(), vec![1, 2, 0]);
        assert_eq!(cm.row_sums(), vec![2, 2, 1]);
        assert_eq!(cm.column_sums(), vec![2, 3, 0]);
        assert_eq!(cm.total(), 5);
        assert_eq!(cm.max_count(), 2);
    }

    #[test]
    fn unseen_subject_keeps_zero_row() {
        let cm = ConfusionMatrix::from_labels(&[0, 0], &[0, 0], 3).unwrap();
        assert_eq!(cm.row_sums(), vec![2, 0, 0]);
        assert_eq!(cm.n_subjects(), 3);
    }

    #[test]
    fn rejects_length_mismatch() {
        assert!(matches!(
            ConfusionMatrix::from_labels(&[0, 1], &[0], 2),
            Err(EvalError::LabelLengthMismatch { true_len: 2, predicted_len: 1 })
        ));
    }

    #[test]
    fn rejects_out_of_range_prediction() {
        assert!(matches!(
            ConfusionMatrix::from_labels(&[0, 1], &[0, 4], 2),
            Err(EvalError::LabelOutOfRange { label: 4, n_subjects: 2 })
        ));
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            ConfusionMatrix::from_labels(&[], &[], 2),
            Err(EvalError::EmptyTestSet)
        ));
    }

    #[test]
    fn display_has_header_and_one_line_per_subject() {
        let cm = ConfusionMatrix::from_labels(&[0, 1], &[0, 1], 2).unwrap();
        let text = cm.to_string();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("pred_"));
        assert!(text.contains("true_"));
    }
}
