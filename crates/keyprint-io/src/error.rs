//! I/O error types for keyprint-io.

use std::path::PathBuf;

use keyprint_eval::EvalError;

/// Errors from CSV loading, chart rendering, and spreadsheet export.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a required column is absent from the header.
    #[error("missing column \"{column}\" in {path}")]
    MissingColumn {
        /// Path to the CSV file.
        path: PathBuf,
        /// Name of the absent column.
        column: &'static str,
    },

    /// Returned when the header has no columns besides subject, session, and repetition.
    #[error("no feature columns in {path}")]
    NoFeatureColumns {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a feature cell is NaN, Inf, or otherwise not a finite float.
    #[error("non-finite value in {path}: row {row_index}, column \"{column}\", raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Header name of the column.
        column: String,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when a session or repetition cell is not a non-negative integer.
    #[error("invalid {column} in {path}: row {row_index}, raw value \"{raw}\"")]
    InvalidAuxiliary {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Header name of the column.
        column: &'static str,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when a subject cell is blank.
    #[error("empty subject in {path}: row {row_index}")]
    EmptySubject {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
    },

    /// Returned when loaded rows do not form a valid keystroke table.
    #[error("invalid keystroke table in {path}")]
    InvalidTable {
        /// Path to the CSV file.
        path: PathBuf,
        /// Underlying validation error.
        source: EvalError,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when statistics and the subject index disagree on the number of subjects.
    #[error("statistics cover {got} subjects but the index has {expected}")]
    SubjectCountMismatch {
        /// Size of the subject index.
        expected: usize,
        /// Subjects covered by the statistics or confusion matrix.
        got: usize,
    },

    /// Returned when a chart cannot be drawn or saved.
    #[error("cannot draw chart {path}: {message}")]
    Draw {
        /// Chart file being written.
        path: PathBuf,
        /// Backend error description.
        message: String,
    },

    /// Returned when the workbook cannot be built or saved.
    #[error("cannot write spreadsheet {path}")]
    Spreadsheet {
        /// Workbook file being written.
        path: PathBuf,
        /// Underlying xlsx error.
        source: rust_xlsxwriter::XlsxError,
    },
}
