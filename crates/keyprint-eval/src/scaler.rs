//! Per-column min-max scaling fitted on training rows.

use crate::EvalError;

/// Maps each column to `[0, 1]` using the minimum and maximum seen at fit time.
///
/// A column that is constant in the fitted rows keeps a divisor of 1, so its
/// training values become 0. Rows transformed later may fall outside
/// `[0, 1]`; they are not clipped.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl MinMaxScaler {
    /// Learn per-column bounds from `rows`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::EmptyFeatureSet`] | `rows` is empty |
    /// | [`EvalError::ScalerWidthMismatch`] | rows differ in width |
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, EvalError> {
        let first = rows.first().ok_or(EvalError::EmptyFeatureSet)?;
        let mut min = first.clone();
        let mut max = first.clone();
        for row in &rows[1..] {
            if row.len() != min.len() {
                return Err(EvalError::ScalerWidthMismatch {
                    expected: min.len(),
                    got: row.len(),
                });
            }
            for (c, &v) in row.iter().enumerate() {
                min[c] = min[c].min(v);
                max[c] = max[c].max(v);
            }
        }
        Ok(Self { min, max })
    }

    /// Scale one row in place.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::ScalerWidthMismatch`] if the row width differs
    /// from the fitted width.
    pub fn transform_row(&self, row: &mut [f64]) -> Result<(), EvalError> {
        if row.len() != self.min.len() {
            return Err(EvalError::ScalerWidthMismatch {
                expected: self.min.len(),
                got: row.len(),
            });
        }
        for ((v, &lo), &hi) in row.iter_mut().zip(&self.min).zip(&self.max) {
            let range = hi - lo;
            let range = if range == 0.0 { 1.0 } else { range };
            *v = (*v - lo) / range;
        }
        Ok(())
    }

    /// Scale every row in place.
    ///
    /// # Errors
    ///
    /// Same as [`MinMaxScaler::transform_row`].
    pub fn transform(&self, rows: &mut [Vec<f64>]) -> Result<(), EvalError> {
        rows.iter_mut().try_for_each(|row| self.transform_row(row))
    }

    /// Per-column minimum seen at fit time.
    #[must_use]
    pub fn data_min(&self) -> &[f64] {
        &self.min
    }

    /// Per-column maximum seen at fit time.
    #[must_use]
    pub fn data_max(&self) -> &[f64] {
        &self.max
    }

    /// Number of columns the scaler was fitted on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.min.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fitted_rows_land_in_unit_interval() {
        let mut rows = vec![vec![1.0, -2.0], vec![3.0, 0.0], vec![2.0, 2.0]];
        let scaler = MinMaxScaler::fit(&rows).unwrap();
        scaler.transform(&mut rows).unwrap();
        assert_eq!(rows, vec![vec![0.0, 0.0], vec![1.0, 0.5], vec![0.5, 1.0]]);
        assert_eq!(scaler.data_min(), &[1.0, -2.0]);
        assert_eq!(scaler.data_max(), &[3.0, 2.0]);
    }

    #[test]
    fn constant_column_becomes_zero() {
        let mut rows = vec![vec![0.25], vec![0.25]];
        let scaler = MinMaxScaler::fit(&rows).unwrap();
        scaler.transform(&mut rows).unwrap();
        assert_eq!(rows, vec![vec![0.0], vec![0.0]]);
    }

    #[test]
    fn unseen_rows_are_not_clipped() {
        let scaler = MinMaxScaler::fit(&[vec![0.0], vec![1.0]]).unwrap();
        let mut row = vec![2.0];
        scaler.transform_row(&mut row).unwrap();
        assert_eq!(row, vec![2.0]);
    }

    #[test]
    fn width_mismatch_is_rejected() {
        let scaler = MinMaxScaler::fit(&[vec![0.0, 1.0]]).unwrap();
        assert!(matches!(
            scaler.transform_row(&mut [1.0]),
            Err(EvalError::ScalerWidthMismatch { expected: 2, got: 1 })
        ));
        assert!(matches!(MinMaxScaler::fit(&[]), Err(EvalError::EmptyFeatureSet)));
    }
}
