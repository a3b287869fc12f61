use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use keyprint_eval::{PartitionConfig, Statistics, run_model};
use keyprint_forest::{RandomForestClassifier, RandomForestConfig, SplitCriterion};
use keyprint_io::{KeystrokeReader, ReportRenderer, SpreadsheetExporter, Timings};

#[derive(Parser)]
#[command(name = "keyprint")]
#[command(about = "Keystroke-dynamics subject identification and per-subject verification statistics")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for the train/test split and the forest
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Split, train a Random Forest, and write charts plus a statistics workbook
    Evaluate {
        /// Path to the keystroke CSV file
        #[arg(long)]
        data: PathBuf,

        /// Output directory for charts and the workbook
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Share of each subject's rows held out for testing
        #[arg(long, default_value_t = 0.2)]
        test_fraction: f64,

        /// Number of trees in the Random Forest
        #[arg(long, default_value_t = 100)]
        n_trees: usize,

        /// Maximum tree depth (unlimited if not set)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Split criterion: "gini" or "entropy"
        #[arg(long, default_value = "gini")]
        criterion: String,
    },

    /// Summarize a keystroke CSV file without training
    Inspect {
        /// Path to the keystroke CSV file
        #[arg(long)]
        data: PathBuf,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct EvaluateOutput {
    n_subjects: usize,
    n_features: usize,
    n_train: usize,
    n_test: usize,
    n_trees: usize,
    training_secs: f64,
    testing_secs: f64,
    precision: f64,
    accuracy: f64,
    statistics: Statistics,
    files: Vec<PathBuf>,
}

#[derive(Serialize)]
struct InspectOutput {
    n_rows: usize,
    n_features: usize,
    subjects: Vec<SubjectRowsOutput>,
}

#[derive(Serialize)]
struct SubjectRowsOutput {
    subject: String,
    rows: usize,
}

fn parse_criterion(s: &str) -> Result<SplitCriterion> {
    match s {
        "gini" => Ok(SplitCriterion::Gini),
        "entropy" => Ok(SplitCriterion::Entropy),
        other => anyhow::bail!("unknown criterion: {other} (expected gini or entropy)"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Evaluate {
            data,
            output_dir,
            test_fraction,
            n_trees,
            max_depth,
            criterion,
        } => {
            let criterion = parse_criterion(&criterion)?;

            let (table, subjects) = KeystrokeReader::new(&data)
                .read()
                .context("failed to read keystroke CSV")?;

            let split = PartitionConfig::new()
                .with_test_fraction(test_fraction)
                .with_seed(cli.seed)
                .split(&table, &subjects)
                .context("failed to partition dataset")?;

            let config = RandomForestConfig::new(n_trees)?
                .with_max_depth(max_depth)
                .with_criterion(criterion)
                .with_seed(cli.seed);
            let mut model = RandomForestClassifier::new(config);
            let run = run_model(&mut model, &split, &subjects).context("model run failed")?;

            let stats = Statistics::compute(&run.confusion, &split.test_labels, &run.predictions)
                .context("failed to compute statistics")?;
            info!(
                precision = stats.precision,
                accuracy = stats.accuracy,
                "evaluation complete"
            );

            let renderer = ReportRenderer::new(&output_dir)?;
            renderer
                .render(&stats, &subjects, &run.confusion)
                .context("failed to render charts")?;

            let timings = Timings::from(&run);
            let exporter = SpreadsheetExporter::new(&output_dir)?;
            exporter
                .export(&timings, &stats, &subjects)
                .context("failed to export statistics workbook")?;

            let mut files = renderer.output_paths();
            files.push(exporter.output_path());

            let output = EvaluateOutput {
                n_subjects: subjects.len(),
                n_features: table.n_features(),
                n_train: split.n_train(),
                n_test: split.n_test(),
                n_trees,
                training_secs: timings.training.as_secs_f64(),
                testing_secs: timings.testing.as_secs_f64(),
                precision: stats.precision,
                accuracy: stats.accuracy,
                statistics: stats,
                files,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Inspect { data } => {
            let (table, subjects) = KeystrokeReader::new(&data)
                .read()
                .context("failed to read keystroke CSV")?;

            let mut counts = vec![0usize; subjects.len()];
            for row in table.rows() {
                if let Some(position) = subjects.position(&row.subject) {
                    counts[position] += 1;
                }
            }

            let output = InspectOutput {
                n_rows: table.n_rows(),
                n_features: table.n_features(),
                subjects: subjects
                    .iter()
                    .zip(counts)
                    .map(|(id, rows)| SubjectRowsOutput {
                        subject: id.to_string(),
                        rows,
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
