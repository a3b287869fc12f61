//! Accuracy regression tests for keyprint-forest.
//!
//! Guards against algorithmic changes that degrade classification on a
//! deterministic keystroke-timing-like dataset.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use keyprint_forest::{Classifier, MaxFeatures, RandomForestClassifier, RandomForestConfig};

/// Synthetic typing profiles: every subject has a characteristic hold/latency
/// offset on the first four columns; the remaining columns are shared noise.
fn typing_profiles(n_subjects: usize, reps: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::new();
    let mut labels = Vec::new();
    for _ in 0..reps {
        for subject in 0..n_subjects {
            let row: Vec<f64> = (0..12)
                .map(|col| {
                    let base = if col < 4 { 0.08 + subject as f64 * 0.04 } else { 0.1 };
                    base + rng.r#gen::<f64>() * 0.015
                })
                .collect();
            features.push(row);
            labels.push(subject);
        }
    }
    (features, labels)
}

#[test]
fn held_out_accuracy_above_threshold() {
    let (train_x, train_y) = typing_profiles(6, 40, 1);
    let (test_x, test_y) = typing_profiles(6, 10, 2);

    let mut model = RandomForestClassifier::new(RandomForestConfig::new(60).unwrap().with_seed(42));
    model.fit(&train_x, &train_y).unwrap();
    let pred = model.predict(&test_x).unwrap();

    let correct = pred.iter().zip(&test_y).filter(|(p, t)| p == t).count();
    let accuracy = correct as f64 / test_y.len() as f64;
    assert!(accuracy > 0.9, "held-out accuracy {accuracy} <= 0.9");
}

#[test]
fn all_columns_budget_not_worse_than_sqrt() {
    let (train_x, train_y) = typing_profiles(4, 30, 3);
    let (test_x, test_y) = typing_profiles(4, 10, 4);

    let score = |max_features| {
        let forest = RandomForestConfig::new(40)
            .unwrap()
            .with_max_features(max_features)
            .fit(&train_x, &train_y)
            .unwrap();
        let pred = forest.predict_batch(&test_x).unwrap();
        pred.iter().zip(&test_y).filter(|(p, t)| p == t).count() as f64 / test_y.len() as f64
    };

    let sqrt = score(MaxFeatures::Sqrt);
    let all = score(MaxFeatures::All);
    assert!(sqrt > 0.85, "sqrt accuracy {sqrt}");
    assert!(all > 0.85, "all-columns accuracy {all}");
}
