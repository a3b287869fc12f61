//! Train a classifier on a partition and score it on the held-out rows.

use std::time::{Duration, Instant};

use keyprint_forest::Classifier;
use tracing::{info, instrument};

use crate::EvalError;
use crate::confusion::ConfusionMatrix;
use crate::domain::SubjectIndex;
use crate::error::Phase;
use crate::partition::PartitionedDataset;

/// Outcome of one fit/predict cycle.
#[derive(Debug, Clone)]
pub struct ModelRun {
    /// Test-set confusion matrix over the subject index.
    pub confusion: ConfusionMatrix,
    /// One predicted label per test row, in test-row order.
    pub predictions: Vec<usize>,
    /// Wall-clock time spent in `fit`.
    pub training_time: Duration,
    /// Wall-clock time spent in `predict`.
    pub testing_time: Duration,
}

/// Fit `model` on the training side and evaluate it on the test side.
///
/// Timings cover the classifier calls only.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`EvalError::Classifier`] | `fit` or `predict` failed |
/// | [`EvalError::LabelLengthMismatch`] | the model returned the wrong number of predictions |
/// | [`EvalError::LabelOutOfRange`] | a prediction is not a position in `subjects` |
/// | [`EvalError::EmptyTestSet`] | the partition has no test rows |
#[instrument(skip_all, fields(n_train = data.n_train(), n_test = data.n_test()))]
pub fn run_model<C: Classifier>(
    model: &mut C,
    data: &PartitionedDataset,
    subjects: &SubjectIndex,
) -> Result<ModelRun, EvalError> {
    let start = Instant::now();
    model
        .fit(&data.train_features, &data.train_labels)
        .map_err(|e| EvalError::Classifier {
            phase: Phase::Fit,
            source: Box::new(e),
        })?;
    let training_time = start.elapsed();

    let start = Instant::now();
    let predictions = model
        .predict(&data.test_features)
        .map_err(|e| EvalError::Classifier {
            phase: Phase::Predict,
            source: Box::new(e),
        })?;
    let testing_time = start.elapsed();

    let confusion = ConfusionMatrix::from_labels(&data.test_labels, &predictions, subjects.len())?;

    info!(
        training_secs = training_time.as_secs_f64(),
        testing_secs = testing_time.as_secs_f64(),
        correct = confusion.diagonal().iter().sum::<usize>(),
        total = confusion.total(),
        "model run complete"
    );

    Ok(ModelRun {
        confusion,
        predictions,
        training_time,
        testing_time,
    })
}
