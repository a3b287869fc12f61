//! Domain types: subjects, sample rows, and the labeled feature table.

use std::collections::HashMap;
use std::fmt;

use crate::EvalError;

/// Identifier of a typist, e.g. `s002`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectId(String);

impl SubjectId {
    /// Wrap a non-empty identifier.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        debug_assert!(!id.is_empty(), "subject ID must not be empty");
        Self(id)
    }

    /// Return the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One repetition typed by one subject.
///
/// `session_index` and `repetition` locate the sample in the collection
/// protocol; they carry no identity signal and never reach a model.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    /// Who typed the sample.
    pub subject: SubjectId,
    /// Collection session the sample came from.
    pub session_index: u32,
    /// Repetition number within the session.
    pub repetition: u32,
    /// Timing features, aligned with [`KeystrokeTable::feature_names`].
    pub features: Vec<f64>,
}

/// A labeled keystroke feature table.
///
/// Every row has exactly `feature_names().len()` values.
#[derive(Debug, Clone)]
pub struct KeystrokeTable {
    feature_names: Vec<String>,
    rows: Vec<SampleRow>,
}

impl KeystrokeTable {
    /// Build a table, checking that every row matches the header width.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::EmptyTable`] | `rows` is empty |
    /// | [`EvalError::RowWidthMismatch`] | a row's width differs from `feature_names` |
    pub fn new(feature_names: Vec<String>, rows: Vec<SampleRow>) -> Result<Self, EvalError> {
        if rows.is_empty() {
            return Err(EvalError::EmptyTable);
        }
        if let Some((row_index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.features.len() != feature_names.len())
        {
            return Err(EvalError::RowWidthMismatch {
                row_index,
                expected: feature_names.len(),
                got: row.features.len(),
            });
        }
        Ok(Self { feature_names, rows })
    }

    /// Feature column names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// All rows in input order.
    #[must_use]
    pub fn rows(&self) -> &[SampleRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }
}

/// Ordered, duplicate-free list of subjects.
///
/// A subject's position is its class label, and the same order lays out the
/// confusion matrix, every statistics series, the charts, and the
/// spreadsheet rows.
#[derive(Debug, Clone, Default)]
pub struct SubjectIndex {
    ids: Vec<SubjectId>,
    positions: HashMap<SubjectId, usize>,
}

impl SubjectIndex {
    /// Build an index from an explicit ordering.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::DuplicateSubject`] if an identifier repeats.
    pub fn from_ids(ids: impl IntoIterator<Item = SubjectId>) -> Result<Self, EvalError> {
        let mut index = Self::default();
        for id in ids {
            if index.positions.contains_key(&id) {
                return Err(EvalError::DuplicateSubject {
                    subject: id.to_string(),
                });
            }
            index.push(id);
        }
        Ok(index)
    }

    /// Build an index in order of first appearance.
    #[must_use]
    pub fn from_rows(rows: &[SampleRow]) -> Self {
        let mut index = Self::default();
        for row in rows {
            if !index.positions.contains_key(&row.subject) {
                index.push(row.subject.clone());
            }
        }
        index
    }

    fn push(&mut self, id: SubjectId) {
        self.positions.insert(id.clone(), self.ids.len());
        self.ids.push(id);
    }

    /// Label of `id`, if indexed.
    #[must_use]
    pub fn position(&self, id: &SubjectId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Subject at label `position`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&SubjectId> {
        self.ids.get(position)
    }

    /// Number of subjects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// `true` when no subject is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Subjects in label order.
    pub fn iter(&self) -> impl Iterator<Item = &SubjectId> {
        self.ids.iter()
    }

    /// Subject names in label order, for axis labels and row headers.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.ids.iter().map(SubjectId::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(subject: &str, features: Vec<f64>) -> SampleRow {
        SampleRow {
            subject: SubjectId::new(subject),
            session_index: 1,
            repetition: 1,
            features,
        }
    }

    #[test]
    fn index_keeps_first_appearance_order() {
        let rows = vec![
            row("s010", vec![0.1]),
            row("s002", vec![0.2]),
            row("s010", vec![0.3]),
            row("s005", vec![0.4]),
        ];
        let index = SubjectIndex::from_rows(&rows);
        assert_eq!(index.names(), vec!["s010", "s002", "s005"]);
        assert_eq!(index.position(&SubjectId::new("s002")), Some(1));
        assert_eq!(index.get(2).map(SubjectId::as_str), Some("s005"));
        assert_eq!(index.position(&SubjectId::new("s999")), None);
    }

    #[test]
    fn explicit_index_rejects_duplicates() {
        let err = SubjectIndex::from_ids(["a", "b", "a"].map(SubjectId::new)).unwrap_err();
        assert!(matches!(err, EvalError::DuplicateSubject { subject } if subject == "a"));
    }

    #[test]
    fn table_rejects_ragged_rows() {
        let names = vec!["H.period".to_string(), "DD.period.t".to_string()];
        let err = KeystrokeTable::new(names, vec![row("s002", vec![0.1, 0.2]), row("s002", vec![0.1])])
            .unwrap_err();
        assert!(matches!(
            err,
            EvalError::RowWidthMismatch { row_index: 1, expected: 2, got: 1 }
        ));
    }

    #[test]
    fn table_rejects_empty() {
        assert!(matches!(
            KeystrokeTable::new(vec!["x".into()], vec![]),
            Err(EvalError::EmptyTable)
        ));
    }
}
