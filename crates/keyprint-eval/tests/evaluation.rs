//! Partition -> run -> statistics over an in-memory table.

use keyprint_eval::{
    EvalError, KeystrokeTable, PartitionConfig, SampleRow, Statistics, SubjectId, SubjectIndex,
    run_model,
};
use keyprint_forest::{Classifier, RandomForestClassifier, RandomForestConfig};

/// Two typists whose hold times never overlap.
fn two_typists() -> (KeystrokeTable, SubjectIndex) {
    let mut rows = Vec::new();
    for rep in 0..10u32 {
        for (subject, base) in [("s002", 0.1), ("s003", 0.3)] {
            let jitter = f64::from(rep) * 0.005;
            rows.push(SampleRow {
                subject: SubjectId::new(subject),
                session_index: rep / 5 + 1,
                repetition: rep % 5 + 1,
                features: vec![base + jitter, base * 2.0 - jitter, 0.05],
            });
        }
    }
    let table = KeystrokeTable::new(vec!["H.period".into(), "DD.period.t".into(), "UD.period.t".into()], rows)
        .unwrap();
    let subjects = SubjectIndex::from_rows(table.rows());
    (table, subjects)
}

/// Nearest training row by squared distance.
#[derive(Default)]
struct NearestNeighbour {
    rows: Vec<Vec<f64>>,
    labels: Vec<usize>,
}

impl Classifier for NearestNeighbour {
    type Error = EvalError;

    fn fit(&mut self, features: &[Vec<f64>], labels: &[usize]) -> Result<(), EvalError> {
        self.rows = features.to_vec();
        self.labels = labels.to_vec();
        Ok(())
    }

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, EvalError> {
        features
            .iter()
            .map(|x| {
                self.rows
                    .iter()
                    .zip(&self.labels)
                    .map(|(r, &l)| (r.iter().zip(x).map(|(a, b)| (a - b).powi(2)).sum::<f64>(), l))
                    .min_by(|a, b| a.0.total_cmp(&b.0))
                    .map(|(_, l)| l)
                    .ok_or(EvalError::EmptyFeatureSet)
            })
            .collect()
    }
}

#[test]
fn two_by_ten_gives_sixteen_four_and_perfect_scores() {
    let (table, subjects) = two_typists();
    let data = PartitionConfig::new().split(&table, &subjects).unwrap();
    assert_eq!((data.n_train(), data.n_test()), (16, 4));

    let run = run_model(&mut NearestNeighbour::default(), &data, &subjects).unwrap();
    assert_eq!(run.confusion.n_subjects(), 2);
    assert_eq!(run.confusion.as_rows(), &[vec![2, 0], vec![0, 2]]);

    let stats = Statistics::compute(&run.confusion, &data.test_labels, &run.predictions).unwrap();
    assert_eq!(stats.accuracy, 100.0);
    assert_eq!(stats.false_positive, vec![0, 0]);
    assert_eq!(stats.false_negative, vec![0, 0]);
}

#[test]
fn forest_run_is_reproducible() {
    let (table, subjects) = two_typists();
    let once = || {
        let data = PartitionConfig::new().split(&table, &subjects).unwrap();
        let mut model = RandomForestClassifier::new(RandomForestConfig::new(25).unwrap());
        let run = run_model(&mut model, &data, &subjects).unwrap();
        Statistics::compute(&run.confusion, &data.test_labels, &run.predictions).unwrap()
    };
    let first = once();
    assert_eq!(first, once());
    assert_eq!(first.accuracy, 100.0);
    for i in 0..2 {
        for rate in [first.false_acceptance_rate[i], first.recall[i], first.specificity[i]] {
            assert!((0.0..=100.0).contains(&rate));
        }
    }
}
