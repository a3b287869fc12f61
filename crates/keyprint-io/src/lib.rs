//! File I/O for the keyprint pipeline: keystroke CSV loading, SVG charts,
//! and the xlsx statistics workbook.

mod error;
mod reader;
mod report;
mod spreadsheet;

pub use error::IoError;
pub use reader::KeystrokeReader;
pub use report::{CONFUSION_MATRIX_FILE, ReportRenderer};
pub use spreadsheet::{
    SCALAR_HEADER, SHEET_NAME, SUBJECT_HEADER, ScalarRow, SpreadsheetExporter, StatisticsSheet,
    SubjectRow, Timings, WORKBOOK_FILE,
};
