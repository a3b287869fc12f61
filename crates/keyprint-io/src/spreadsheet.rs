//! Workbook export of run timings and per-subject statistics.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use keyprint_eval::{ModelRun, Statistics, SubjectIndex, SubjectMetric};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::{info, instrument};

use crate::IoError;

/// File name of the exported workbook.
pub const WORKBOOK_FILE: &str = "model_statistics.xlsx";
/// Name of the single worksheet.
pub const SHEET_NAME: &str = "Statistics";

/// Header of the scalar block at `A1`.
pub const SCALAR_HEADER: [&str; 2] = ["Metric", "Value"];

/// Header of the per-subject block at `D1`.
pub const SUBJECT_HEADER: [&str; 10] = [
    "Subject",
    "True Positive",
    "False Positive",
    "False Negative",
    "True Negative",
    "False Acceptance Rate",
    "False Rejection Rate",
    "Recall",
    "Specificity",
    "F-Measure",
];

const SCALAR_COL: u16 = 0;
const SUBJECT_COL: u16 = 3;

/// Column widths as `(first, last, width)`, inclusive.
const COLUMN_WIDTHS: [(u16, u16, f64); 4] = [(0, 0, 20.0), (1, 1, 18.0), (3, 7, 10.0), (8, 11, 12.0)];

/// Wall-clock cost of one model run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timings {
    /// Time spent fitting.
    pub training: Duration,
    /// Time spent predicting.
    pub testing: Duration,
}

impl From<&ModelRun> for Timings {
    fn from(run: &ModelRun) -> Self {
        Self {
            training: run.training_time,
            testing: run.testing_time,
        }
    }
}

/// One `Metric`/`Value` row. `value` is `None` when non-finite.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarRow {
    /// Text in the `Metric` column.
    pub label: &'static str,
    /// Number in the `Value` column.
    pub value: Option<f64>,
}

/// One per-subject row under [`SUBJECT_HEADER`].
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectRow {
    /// Subject identifier.
    pub subject: String,
    /// TP, FP, FN, TN.
    pub counts: [usize; 4],
    /// Rates in [`SubjectMetric::ALL`] order; `None` when non-finite.
    pub rates: [Option<f64>; 5],
}

/// Sheet content, laid out but not yet written.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsSheet {
    /// Rows under [`SCALAR_HEADER`], from `A2`.
    pub scalar_rows: Vec<ScalarRow>,
    /// Rows under [`SUBJECT_HEADER`], from `D2`, in subject-index order.
    pub subject_rows: Vec<SubjectRow>,
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

impl StatisticsSheet {
    /// Lay out `stats` and `timings` in subject-index order.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::SubjectCountMismatch`] if `stats` covers a
    /// different number of subjects than `subjects`.
    pub fn build(
        timings: &Timings,
        stats: &Statistics,
        subjects: &SubjectIndex,
    ) -> Result<Self, IoError> {
        if stats.n_subjects() != subjects.len() {
            return Err(IoError::SubjectCountMismatch {
                expected: subjects.len(),
                got: stats.n_subjects(),
            });
        }

        let scalar_rows = vec![
            ScalarRow {
                label: "Training time (s)",
                value: finite(timings.training.as_secs_f64()),
            },
            ScalarRow {
                label: "Testing time (s)",
                value: finite(timings.testing.as_secs_f64()),
            },
            ScalarRow {
                label: "Precision (%)",
                value: finite(stats.precision),
            },
            ScalarRow {
                label: "Accuracy (%)",
                value: finite(stats.accuracy),
            },
        ];

        let subject_rows = subjects
            .iter()
            .enumerate()
            .map(|(i, id)| SubjectRow {
                subject: id.to_string(),
                counts: [
                    stats.true_positive[i],
                    stats.false_positive[i],
                    stats.false_negative[i],
                    stats.true_negative[i],
                ],
                rates: SubjectMetric::ALL.map(|m| finite(stats.series(m)[i])),
            })
            .collect();

        Ok(Self {
            scalar_rows,
            subject_rows,
        })
    }

    /// Write both blocks onto `sheet`. Empty values leave the cell blank.
    fn write_to(&self, sheet: &mut Worksheet) -> Result<(), XlsxError> {
        let bold = Format::new().set_bold();

        for (first, last, width) in COLUMN_WIDTHS {
            for col in first..=last {
                sheet.set_column_width(col, width)?;
            }
        }

        for (offset, title) in SCALAR_HEADER.iter().enumerate() {
            sheet.write_string_with_format(0, SCALAR_COL + offset as u16, *title, &bold)?;
        }
        for (r, row) in self.scalar_rows.iter().enumerate() {
            let r = r as u32 + 1;
            sheet.write_string(r, SCALAR_COL, row.label)?;
            if let Some(v) = row.value {
                sheet.write_number(r, SCALAR_COL + 1, v)?;
            }
        }

        for (offset, title) in SUBJECT_HEADER.iter().enumerate() {
            sheet.write_string_with_format(0, SUBJECT_COL + offset as u16, *title, &bold)?;
        }
        for (r, row) in self.subject_rows.iter().enumerate() {
            let r = r as u32 + 1;
            sheet.write_string(r, SUBJECT_COL, row.subject.as_str())?;
            for (k, &count) in row.counts.iter().enumerate() {
                sheet.write_number(r, SUBJECT_COL + 1 + k as u16, count as f64)?;
            }
            for (k, rate) in row.rates.iter().enumerate() {
                if let Some(v) = rate {
                    sheet.write_number(r, SUBJECT_COL + 5 + k as u16, *v)?;
                }
            }
        }
        Ok(())
    }
}

/// Saves a [`StatisticsSheet`] as [`WORKBOOK_FILE`].
pub struct SpreadsheetExporter {
    output_dir: PathBuf,
}

impl SpreadsheetExporter {
    /// Create an exporter targeting `output_dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    pub fn new(output_dir: &Path) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Path the workbook is written to.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(WORKBOOK_FILE)
    }

    /// Build and save the workbook, replacing any existing file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::SubjectCountMismatch`] | `stats` and `subjects` disagree |
    /// | [`IoError::Spreadsheet`] | the workbook cannot be built or saved |
    #[instrument(skip_all, fields(dir = %self.output_dir.display(), n_subjects = subjects.len()))]
    pub fn export(
        &self,
        timings: &Timings,
        stats: &Statistics,
        subjects: &SubjectIndex,
    ) -> Result<(), IoError> {
        let sheet = StatisticsSheet::build(timings, stats, subjects)?;
        let path = self.output_path();
        let to_error = |source| IoError::Spreadsheet {
            path: path.clone(),
            source,
        };

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME).map_err(to_error)?;
        sheet.write_to(worksheet).map_err(to_error)?;
        workbook.save(&path).map_err(to_error)?;

        info!(path = %path.display(), rows = sheet.subject_rows.len(), "statistics exported");
        Ok(())
    }
}
