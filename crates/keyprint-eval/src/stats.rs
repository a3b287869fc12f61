//! Per-subject verification rates and scalar classification scores.
//!
//! Rates are percentages. Divisions by zero follow IEEE-754 and yield NaN or
//! infinity; renderers treat non-finite values as missing.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::EvalError;
use crate::confusion::ConfusionMatrix;

/// Statistics derived from one test-set evaluation.
///
/// Every vector is in subject-index order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    /// Samples of subject `i` attributed to `i`.
    pub true_positive: Vec<usize>,
    /// Samples of other subjects attributed to `i`.
    pub false_positive: Vec<usize>,
    /// Samples of subject `i` attributed elsewhere.
    pub false_negative: Vec<usize>,
    /// Samples neither typed by nor attributed to `i`.
    pub true_negative: Vec<usize>,
    /// `FP / (FP + TN) * 100`.
    pub false_acceptance_rate: Vec<f64>,
    /// `FP / (TP + FN) * 100`.
    pub false_rejection_rate: Vec<f64>,
    /// `TP / (TP + FN) * 100`.
    pub recall: Vec<f64>,
    /// `TN / (TN + FP) * 100`.
    pub specificity: Vec<f64>,
    /// Harmonic mean of the scalar precision and each subject's recall.
    pub f_measure: Vec<f64>,
    /// Support-weighted precision over all subjects, as a percentage.
    pub precision: f64,
    /// Share of correctly attributed test samples, as a percentage.
    pub accuracy: f64,
}

/// A per-subject rate series that gets its own chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectMetric {
    /// [`Statistics::false_acceptance_rate`].
    FalseAcceptanceRate,
    /// [`Statistics::false_rejection_rate`].
    FalseRejectionRate,
    /// [`Statistics::recall`].
    Recall,
    /// [`Statistics::specificity`].
    Specificity,
    /// [`Statistics::f_measure`].
    FMeasure,
}

impl SubjectMetric {
    /// All plotted series, in report order.
    pub const ALL: [SubjectMetric; 5] = [
        SubjectMetric::FalseAcceptanceRate,
        SubjectMetric::FalseRejectionRate,
        SubjectMetric::Recall,
        SubjectMetric::Specificity,
        SubjectMetric::FMeasure,
    ];

    /// Chart title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            SubjectMetric::FalseAcceptanceRate => "False acceptance rate per subject",
            SubjectMetric::FalseRejectionRate => "False rejection rate per subject",
            SubjectMetric::Recall => "Recall per subject",
            SubjectMetric::Specificity => "Specificity per subject",
            SubjectMetric::FMeasure => "F-measure per subject",
        }
    }

    /// Output file name without extension.
    #[must_use]
    pub fn file_stem(self) -> &'static str {
        match self {
            SubjectMetric::FalseAcceptanceRate => "false_acceptance_rate",
            SubjectMetric::FalseRejectionRate => "false_rejection_rate",
            SubjectMetric::Recall => "recall",
            SubjectMetric::Specificity => "specificity",
            SubjectMetric::FMeasure => "f_measure",
        }
    }

    /// Spreadsheet column header.
    #[must_use]
    pub fn column_header(self) -> &'static str {
        match self {
            SubjectMetric::FalseAcceptanceRate => "False Acceptance Rate",
            SubjectMetric::FalseRejectionRate => "False Rejection Rate",
            SubjectMetric::Recall => "Recall",
            SubjectMetric::Specificity => "Specificity",
            SubjectMetric::FMeasure => "F-Measure",
        }
    }
}

impl Statistics {
    /// Derive all statistics from a confusion matrix and the label
    /// sequences it was built from.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::LabelLengthMismatch`] | `y_true` and `y_pred` differ in length |
    /// | [`EvalError::EmptyTestSet`] | no labels |
    #[instrument(skip_all, fields(n_subjects = confusion.n_subjects(), n_test = y_true.len()))]
    pub fn compute(
        confusion: &ConfusionMatrix,
        y_true: &[usize],
        y_pred: &[usize],
    ) -> Result<Self, EvalError> {
        check_labels(y_true, y_pred)?;

        let total = confusion.total();
        let true_positive = confusion.diagonal();
        let false_positive: Vec<usize> = confusion
            .column_sums()
            .iter()
            .zip(&true_positive)
            .map(|(col, tp)| col - tp)
            .collect();
        let false_negative: Vec<usize> = confusion
            .row_sums()
            .iter()
            .zip(&true_positive)
            .map(|(row, tp)| row - tp)
            .collect();
        let true_negative: Vec<usize> = (0..true_positive.len())
            .map(|i| total - (false_positive[i] + false_negative[i] + true_positive[i]))
            .collect();

        let n = true_positive.len();
        let (tp, fp, fn_, tn) = (&true_positive, &false_positive, &false_negative, &true_negative);
        let false_acceptance_rate: Vec<f64> =
            (0..n).map(|i| percent(fp[i], fp[i] + tn[i])).collect();
        // Numerator is FP, not FN.
        let false_rejection_rate: Vec<f64> =
            (0..n).map(|i| percent(fp[i], tp[i] + fn_[i])).collect();
        let recall: Vec<f64> = (0..n).map(|i| percent(tp[i], tp[i] + fn_[i])).collect();
        let specificity: Vec<f64> = (0..n).map(|i| percent(tn[i], tn[i] + fp[i])).collect();

        let precision = weighted_precision(y_true, y_pred)? * 100.0;
        let accuracy = accuracy(y_true, y_pred)? * 100.0;
        let f_measure: Vec<f64> = recall
            .iter()
            .map(|&r| 2.0 * (precision * r) / (precision + r))
            .collect();

        debug!(precision, accuracy, "statistics computed");

        Ok(Self {
            true_positive,
            false_positive,
            false_negative,
            true_negative,
            false_acceptance_rate,
            false_rejection_rate,
            recall,
            specificity,
            f_measure,
            precision,
            accuracy,
        })
    }

    /// Borrow one plotted rate series.
    #[must_use]
    pub fn series(&self, metric: SubjectMetric) -> &[f64] {
        match metric {
            SubjectMetric::FalseAcceptanceRate => &self.false_acceptance_rate,
            SubjectMetric::FalseRejectionRate => &self.false_rejection_rate,
            SubjectMetric::Recall => &self.recall,
            SubjectMetric::Specificity => &self.specificity,
            SubjectMetric::FMeasure => &self.f_measure,
        }
    }

    /// Number of subjects covered.
    #[must_use]
    pub fn n_subjects(&self) -> usize {
        self.true_positive.len()
    }
}

fn percent(numerator: usize, denominator: usize) -> f64 {
    numerator as f64 / denominator as f64 * 100.0
}

fn check_labels(y_true: &[usize], y_pred: &[usize]) -> Result<(), EvalError> {
    if y_true.len() != y_pred.len() {
        return Err(EvalError::LabelLengthMismatch {
            true_len: y_true.len(),
            predicted_len: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(EvalError::EmptyTestSet);
    }
    Ok(())
}

/// Support-weighted mean of per-label precision, in `[0, 1]`.
///
/// A label that is never predicted contributes precision 0.
///
/// # Errors
///
/// Same as [`Statistics::compute`].
pub fn weighted_precision(y_true: &[usize], y_pred: &[usize]) -> Result<f64, EvalError> {
    check_labels(y_true, y_pred)?;
    let n_labels = y_true.iter().chain(y_pred).max().map_or(0, |&m| m + 1);
    let mut support = vec![0usize; n_labels];
    let mut predicted = vec![0usize; n_labels];
    let mut hits = vec![0usize; n_labels];
    for (&t, &p) in y_true.iter().zip(y_pred) {
        support[t] += 1;
        predicted[p] += 1;
        if t == p {
            hits[t] += 1;
        }
    }
    let weighted: f64 = (0..n_labels)
        .filter(|&c| predicted[c] > 0)
        .map(|c| hits[c] as f64 / predicted[c] as f64 * support[c] as f64)
        .sum();
    Ok(weighted / y_true.len() as f64)
}

/// Share of positions where `y_pred` equals `y_true`, in `[0, 1]`.
///
/// # Errors
///
/// Same as [`Statistics::compute`].
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> Result<f64, EvalError> {
    check_labels(y_true, y_pred)?;
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}
