use std::fmt;

/// Which half of a model run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Training on the train partition.
    Fit,
    /// Predicting the test partition.
    Predict,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Fit => "fit",
            Phase::Predict => "predict",
        })
    }
}

/// Errors from partitioning, model runs, and statistics.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Returned when the test fraction is not strictly between 0 and 1.
    #[error("test_fraction must be in (0.0, 1.0), got {fraction}")]
    InvalidTestFraction {
        /// The rejected fraction.
        fraction: f64,
    },

    /// Returned when the keystroke table has no rows.
    #[error("keystroke table has no rows")]
    EmptyTable,

    /// Returned when a row's feature count differs from the table header.
    #[error("row {row_index} has {got} features, expected {expected}")]
    RowWidthMismatch {
        /// Zero-based row index.
        row_index: usize,
        /// Number of feature names.
        expected: usize,
        /// Number of values in the row.
        got: usize,
    },

    /// Returned when the same subject is listed twice in an index.
    #[error("subject \"{subject}\" appears more than once in the subject index")]
    DuplicateSubject {
        /// The repeated identifier.
        subject: String,
    },

    /// Returned when a row's subject is missing from the subject index.
    #[error("row {row_index} belongs to subject \"{subject}\", which is not in the subject index")]
    UnknownSubject {
        /// The unlisted identifier.
        subject: String,
        /// Zero-based row index.
        row_index: usize,
    },

    /// Returned when a subject has fewer than two rows and cannot be split.
    #[error("subject \"{subject}\" has {count} row(s); at least 2 are needed for a train/test split")]
    TooFewRows {
        /// The subject identifier.
        subject: String,
        /// Rows available for it.
        count: usize,
    },

    /// Returned when the test fraction leaves one side of a subject's split empty.
    #[error("subject \"{subject}\": {n_rows} rows with {n_test} held out leaves an empty split")]
    EmptySplit {
        /// The subject identifier.
        subject: String,
        /// Rows available for it.
        n_rows: usize,
        /// Rows assigned to the test side.
        n_test: usize,
    },

    /// Returned when a scaler is fitted on zero rows.
    #[error("cannot fit a scaler on an empty feature set")]
    EmptyFeatureSet,

    /// Returned when a row passed to a scaler has the wrong width.
    #[error("scaler was fitted on {expected} features, got a row with {got}")]
    ScalerWidthMismatch {
        /// Width seen at fit time.
        expected: usize,
        /// Width of the offending row.
        got: usize,
    },

    /// Returned when truth and prediction sequences differ in length.
    #[error("{true_len} true labels but {predicted_len} predictions")]
    LabelLengthMismatch {
        /// Length of the ground-truth sequence.
        true_len: usize,
        /// Length of the prediction sequence.
        predicted_len: usize,
    },

    /// Returned when a label does not address a subject in the index.
    #[error("label {label} is out of range for {n_subjects} subjects")]
    LabelOutOfRange {
        /// The offending label.
        label: usize,
        /// Size of the subject index.
        n_subjects: usize,
    },

    /// Returned when statistics are requested over zero test samples.
    #[error("test set is empty")]
    EmptyTestSet,

    /// Returned when the supplied classifier fails.
    #[error("classifier {phase} failed")]
    Classifier {
        /// The phase that failed.
        phase: Phase,
        /// The classifier's own error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
