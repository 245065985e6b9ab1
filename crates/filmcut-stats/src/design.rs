//! Categorical design matrices
//!
//! Count regressions over peer cohorts only use categorical predictors. Each
//! predictor is a [`Factor`]: a named column of string labels with its
//! distinct levels in sorted order. [`DesignMatrix::with_intercept`] expands a
//! set of factors using treatment coding:
//!
//! - one intercept column of ones
//! - for each factor, one indicator column per level except the first
//!   (the lexically smallest level is the reference)
//!
//! ```text
//! rating   language  |  Intercept  rating[UA]  language[tamil]
//! A        hindi     |  1          0           0
//! UA       tamil     |  1          1           1
//! UA       hindi     |  1          1           0
//! ```

use std::collections::BTreeSet;

/// Error raised when factors cannot be expanded into a design matrix.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DesignError {
    #[display("factor '{factor}' has {actual} values, expected {expected}")]
    LengthMismatch {
        factor: String,
        expected: usize,
        actual: usize,
    },
    #[display("factor '{factor}' has a single level")]
    SingleLevel { factor: String },
}

/// A categorical predictor column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factor {
    name: String,
    levels: Vec<String>,
    codes: Vec<usize>,
}

impl Factor {
    /// Builds a factor from one label per observation.
    ///
    /// # Examples
    ///
    /// ```
    /// use filmcut_stats::design::Factor;
    ///
    /// let factor = Factor::new("rating", ["UA", "A", "UA"]);
    /// assert_eq!(factor.levels(), ["A", "UA"]);
    /// assert_eq!(factor.codes(), [1, 0, 1]);
    /// ```
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect::<Vec<String>>();
        let levels = values
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        let codes = values
            .iter()
            .map(|value| {
                levels
                    .binary_search(value)
                    .unwrap_or_else(|_| unreachable!("level set built from the same values"))
            })
            .collect();
        Self {
            name: name.into(),
            levels,
            codes,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Distinct levels in ascending order.
    #[must_use]
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Level index of each observation.
    #[must_use]
    pub fn codes(&self) -> &[usize] {
        &self.codes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Dense row-major design matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    column_names: Vec<String>,
    num_rows: usize,
    data: Vec<f64>,
}

impl DesignMatrix {
    /// Expands factors into an intercept plus treatment-coded indicator columns.
    ///
    /// Every factor must have one value per observation and at least two
    /// levels; a single-level factor carries no information beyond the
    /// intercept and is reported as [`DesignError::SingleLevel`].
    ///
    /// # Examples
    ///
    /// ```
    /// use filmcut_stats::design::{DesignMatrix, Factor};
    ///
    /// let rating = Factor::new("rating", ["A", "UA", "UA"]);
    /// let design = DesignMatrix::with_intercept(3, &[rating]).unwrap();
    /// assert_eq!(design.column_names(), ["Intercept", "rating[UA]"]);
    /// assert_eq!(design.row(1), [1.0, 1.0]);
    /// ```
    pub fn with_intercept(num_rows: usize, factors: &[Factor]) -> Result<Self, DesignError> {
        for factor in factors {
            if factor.len() != num_rows {
                return Err(DesignError::LengthMismatch {
                    factor: factor.name.clone(),
                    expected: num_rows,
                    actual: factor.len(),
                });
            }
            if factor.levels.len() < 2 {
                return Err(DesignError::SingleLevel {
                    factor: factor.name.clone(),
                });
            }
        }

        let mut column_names = vec!["Intercept".to_owned()];
        for factor in factors {
            column_names.extend(
                factor
                    .levels
                    .iter()
                    .skip(1)
                    .map(|level| format!("{}[{level}]", factor.name)),
            );
        }

        let num_cols = column_names.len();
        let mut data = vec![0.0; num_rows * num_cols];
        for row in 0..num_rows {
            let cells = &mut data[row * num_cols..(row + 1) * num_cols];
            cells[0] = 1.0;
            let mut offset = 1;
            for factor in factors {
                let code = factor.codes[row];
                if code > 0 {
                    cells[offset + code - 1] = 1.0;
                }
                offset += factor.levels.len() - 1;
            }
        }

        Ok(Self {
            column_names,
            num_rows,
            data,
        })
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[must_use]
    pub fn num_cols(&self) -> usize {
        self.column_names.len()
    }

    /// Returns the predictor values of one observation.
    #[must_use]
    pub fn row(&self, index: usize) -> &[f64] {
        let num_cols = self.num_cols();
        &self.data[index * num_cols..(index + 1) * num_cols]
    }

    /// Iterates over observation rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.num_cols())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_factors() {
        let rating = Factor::new("rating", ["A", "UA", "UA", "U"]);
        let language = Factor::new("language", ["hindi", "tamil", "hindi", "Other"]);
        let design = DesignMatrix::with_intercept(4, &[rating, language]).unwrap();

        assert_eq!(
            design.column_names(),
            [
                "Intercept",
                "rating[U]",
                "rating[UA]",
                "language[hindi]",
                "language[tamil]"
            ]
        );
        assert_eq!(design.row(0), [1.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(design.row(1), [1.0, 0.0, 1.0, 0.0, 1.0]);
        assert_eq!(design.row(3), [1.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(design.rows().count(), 4);
    }

    #[test]
    fn test_single_level_factor_is_rejected() {
        let rating = Factor::new("rating", ["UA", "UA", "UA"]);
        let err = DesignMatrix::with_intercept(3, &[rating]).unwrap_err();
        assert_eq!(
            err,
            DesignError::SingleLevel {
                factor: "rating".to_owned()
            }
        );
    }

    #[test]
    fn test_length_mismatch() {
        let rating = Factor::new("rating", ["A", "UA"]);
        let err = DesignMatrix::with_intercept(3, &[rating]).unwrap_err();
        assert!(matches!(err, DesignError::LengthMismatch { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn test_intercept_only() {
        let design = DesignMatrix::with_intercept(2, &[]).unwrap();
        assert_eq!(design.num_cols(), 1);
        assert_eq!(design.row(1), [1.0]);
    }
}
