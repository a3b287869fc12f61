//! End-to-end integration tests: CSV -> split -> forest -> statistics -> charts and workbook.

use std::fs;
use std::path::Path;

use keyprint_eval::{PartitionConfig, Statistics, run_model};
use keyprint_forest::{RandomForestClassifier, RandomForestConfig};
use keyprint_io::{KeystrokeReader, ReportRenderer, SpreadsheetExporter, StatisticsSheet, Timings};
use tempfile::TempDir;

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn full_pipeline_writes_charts_and_workbook() {
    // 1. Read CSV
    let (table, subjects) = KeystrokeReader::new(&fixture_path("keystrokes_3x10.csv"))
        .read()
        .expect("fixture should parse");
    assert_eq!(table.n_rows(), 30);
    assert_eq!(subjects.names(), vec!["s002", "s003", "s004"]);
    assert_eq!(table.n_features(), 7);

    // 2. Split: 10 rows per subject -> 8 train, 2 test
    let data = PartitionConfig::new().split(&table, &subjects).unwrap();
    assert_eq!(data.n_train(), 24);
    assert_eq!(data.n_test(), 6);

    // 3. Train and predict
    let mut model = RandomForestClassifier::new(RandomForestConfig::new(50).unwrap().with_seed(42));
    let run = run_model(&mut model, &data, &subjects).unwrap();
    assert_eq!(run.confusion.row_sums(), vec![2, 2, 2]);

    // 4. Statistics: subjects are well separated
    let stats = Statistics::compute(&run.confusion, &data.test_labels, &run.predictions).unwrap();
    assert_eq!(stats.accuracy, 100.0);
    assert_eq!(stats.precision, 100.0);
    assert!(stats.false_acceptance_rate.iter().all(|&v| v == 0.0));
    for i in 0..subjects.len() {
        let total = stats.true_positive[i]
            + stats.false_positive[i]
            + stats.false_negative[i]
            + stats.true_negative[i];
        assert_eq!(total, data.n_test());
    }

    // 5. Render and export
    let dir = TempDir::new().unwrap();
    let renderer = ReportRenderer::new(dir.path()).unwrap();
    renderer.render(&stats, &subjects, &run.confusion).unwrap();
    for path in renderer.output_paths() {
        assert!(path.exists(), "missing {}", path.display());
    }

    let timings = Timings::from(&run);
    let exporter = SpreadsheetExporter::new(dir.path()).unwrap();
    exporter.export(&timings, &stats, &subjects).unwrap();
    assert!(fs::metadata(exporter.output_path()).unwrap().len() > 0);

    let sheet = StatisticsSheet::build(&timings, &stats, &subjects).unwrap();
    assert_eq!(sheet.scalar_rows.len(), 4);
    assert_eq!(sheet.subject_rows.len(), 3);
}

#[test]
fn same_seed_same_results() {
    let (table, subjects) = KeystrokeReader::new(&fixture_path("keystrokes_3x10.csv"))
        .read()
        .unwrap();

    let evaluate = || {
        let data = PartitionConfig::new().with_seed(7).split(&table, &subjects).unwrap();
        let mut model = RandomForestClassifier::new(RandomForestConfig::new(20).unwrap().with_seed(7));
        let run = run_model(&mut model, &data, &subjects).unwrap();
        let stats = Statistics::compute(&run.confusion, &data.test_labels, &run.predictions).unwrap();
        (data.train_features, data.test_labels, run.confusion, stats)
    };

    let (train_a, labels_a, cm_a, stats_a) = evaluate();
    let (train_b, labels_b, cm_b, stats_b) = evaluate();
    assert_eq!(train_a, train_b);
    assert_eq!(labels_a, labels_b);
    assert_eq!(cm_a, cm_b);
    assert_eq!(stats_a, stats_b);
}
