//! CSV keystroke reader with full input validation.

use std::path::{Path, PathBuf};

use keyprint_eval::{KeystrokeTable, SampleRow, SubjectId, SubjectIndex};
use tracing::{debug, info, instrument};

use crate::IoError;

const SUBJECT: &str = "subject";
const SESSION: &str = "sessionIndex";
const REPETITION: &str = "rep";

/// Reads a keystroke timing table from a CSV file.
///
/// Expected CSV format:
/// - Header row required
/// - `subject`, `sessionIndex`, and `rep` columns located by name
/// - Every other column is a timing feature, in header order
///
/// ```text
/// subject,sessionIndex,rep,H.period,DD.period.t,UD.period.t,...
/// s002,1,1,0.1491,0.3979,0.2488,...
/// ```
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | `subject`, `sessionIndex`, or `rep` absent |
/// | [`IoError::NoFeatureColumns`] | Only the three auxiliary columns |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::NonFiniteValue`] | Feature cell is NaN, Inf, or unparseable |
/// | [`IoError::InvalidAuxiliary`] | Session or repetition is not a non-negative integer |
/// | [`IoError::EmptySubject`] | Blank subject cell |
pub struct KeystrokeReader {
    path: PathBuf,
}

/// Column positions resolved from the header.
struct Layout {
    subject: usize,
    session: usize,
    repetition: usize,
    features: Vec<usize>,
}

impl KeystrokeReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file.
    ///
    /// Returns the table together with the subject index in order of first
    /// appearance.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<(KeystrokeTable, SubjectIndex), IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so ragged rows surface as InconsistentRowLength.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?.clone();
        let expected_cols = header.len();
        let layout = self.layout(&header)?;
        let feature_names: Vec<String> =
            layout.features.iter().map(|&c| header[c].to_string()).collect();
        debug!(expected_cols, n_features = feature_names.len(), "read CSV header");

        let mut rows = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;

            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            let subject = &record[layout.subject];
            if subject.is_empty() {
                return Err(IoError::EmptySubject {
                    path: self.path.clone(),
                    row_index,
                });
            }
            let session_index = self.auxiliary(&record[layout.session], SESSION, row_index)?;
            let repetition = self.auxiliary(&record[layout.repetition], REPETITION, row_index)?;

            let mut features = Vec::with_capacity(layout.features.len());
            for &col in &layout.features {
                let raw = &record[col];
                let value = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| IoError::NonFiniteValue {
                        path: self.path.clone(),
                        row_index,
                        column: header[col].to_string(),
                        raw: raw.to_string(),
                    })?;
                features.push(value);
            }

            rows.push(SampleRow {
                subject: SubjectId::new(subject),
                session_index,
                repetition,
                features,
            });
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let subjects = SubjectIndex::from_rows(&rows);
        let table = KeystrokeTable::new(feature_names, rows).map_err(|e| IoError::InvalidTable {
            path: self.path.clone(),
            source: e,
        })?;

        info!(
            n_rows = table.n_rows(),
            n_subjects = subjects.len(),
            n_features = table.n_features(),
            "keystroke dataset loaded"
        );

        Ok((table, subjects))
    }

    fn layout(&self, header: &csv::StringRecord) -> Result<Layout, IoError> {
        let find = |column: &'static str| {
            header
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| IoError::MissingColumn {
                    path: self.path.clone(),
                    column,
                })
        };
        let subject = find(SUBJECT)?;
        let session = find(SESSION)?;
        let repetition = find(REPETITION)?;
        let features: Vec<usize> = (0..header.len())
            .filter(|c| ![subject, session, repetition].contains(c))
            .collect();
        if features.is_empty() {
            return Err(IoError::NoFeatureColumns {
                path: self.path.clone(),
            });
        }
        Ok(Layout {
            subject,
            session,
            repetition,
            features,
        })
    }

    fn auxiliary(&self, raw: &str, column: &'static str, row_index: usize) -> Result<u32, IoError> {
        raw.parse().map_err(|_| IoError::InvalidAuxiliary {
            path: self.path.clone(),
            row_index,
            column,
            raw: raw.to_string(),
        })
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}
