//! Validated observation matrix: response in column 0, covariates after.
//!
//! Purpose
//! -------
//! Coerce the shapes callers actually have (dense arrays, a bare response
//! series, row vectors, textual records) into one numeric table and check
//! the content rules once, at the boundary, so every later stage can rely on
//! them.
//!
//! Invariants
//! ----------
//! - At least 3 rows and at least 1 column.
//! - Every cell is finite or NaN (missing). `±inf` is rejected.
//! - No covariate column is entirely missing.
//! - The index has one entry per row.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};

use crate::impact::{
    core::index::TimeIndex,
    errors::{ImpactError, ImpactResult},
};

/// Minimum number of rows accepted by [`ObservationMatrix::new`].
pub const MIN_ROWS: usize = 3;

/// Textual cells treated as missing values.
const MISSING_MARKERS: [&str; 6] = ["", "na", "nan", "null", "none", "n/a"];

/// Raw tabular input before coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawData {
    Matrix(Array2<f64>),
    /// Response only, no covariates.
    Series(Array1<f64>),
    Rows(Vec<Vec<f64>>),
    Records(Vec<Vec<String>>),
}

impl From<Array2<f64>> for RawData {
    fn from(values: Array2<f64>) -> Self {
        RawData::Matrix(values)
    }
}

impl From<Array1<f64>> for RawData {
    fn from(values: Array1<f64>) -> Self {
        RawData::Series(values)
    }
}

impl From<Vec<Vec<f64>>> for RawData {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        RawData::Rows(rows)
    }
}

impl From<Vec<Vec<String>>> for RawData {
    fn from(records: Vec<Vec<String>>) -> Self {
        RawData::Records(records)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObservationMatrix {
    values: Array2<f64>,
    index: TimeIndex,
}

impl ObservationMatrix {
    /// Coerce and validate raw input.
    ///
    /// `index = None` gives a positional index `0..n`.
    ///
    /// # Errors
    /// - [`ImpactError::InvalidData`] for ragged rows, zero columns or an
    ///   index of the wrong length.
    /// - [`ImpactError::NonNumericData`] for unparsable or infinite cells.
    /// - [`ImpactError::InsufficientData`] for fewer than 3 rows.
    /// - [`ImpactError::AllMissingCovariate`] for an all-NaN covariate.
    pub fn new(raw: impl Into<RawData>, index: Option<TimeIndex>) -> ImpactResult<Self> {
        let values = coerce(raw.into())?;
        let n_rows = values.nrows();
        if values.ncols() == 0 {
            return Err(ImpactError::InvalidData { reason: "table has no columns".to_string() });
        }
        if n_rows < MIN_ROWS {
            return Err(ImpactError::InsufficientData { rows: n_rows });
        }
        if let Some(((row, column), value)) =
            values.indexed_iter().find(|(_, v)| v.is_infinite())
        {
            return Err(ImpactError::NonNumericData { row, column, value: value.to_string() });
        }
        for column in 1..values.ncols() {
            if values.column(column).iter().all(|v| v.is_nan()) {
                return Err(ImpactError::AllMissingCovariate { column });
            }
        }
        let index = index.unwrap_or(TimeIndex::Range(n_rows));
        if index.len() != n_rows {
            return Err(ImpactError::InvalidData {
                reason: format!("index has {} entries for {} rows", index.len(), n_rows),
            });
        }
        Ok(Self { values, index })
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_covariates(&self) -> usize {
        self.values.ncols() - 1
    }

    pub fn has_covariates(&self) -> bool {
        self.n_covariates() > 0
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn response(&self) -> ArrayView1<'_, f64> {
        self.values.column(0)
    }

    /// Covariate block, shape `(n_rows, n_covariates)`; may have zero columns.
    pub fn covariates(&self) -> ArrayView2<'_, f64> {
        self.values.slice(s![.., 1..])
    }

    pub fn index(&self) -> &TimeIndex {
        &self.index
    }

    /// Independent copy of rows `start..end`.
    pub fn slice_rows(&self, start: usize, end: usize) -> ObservationMatrix {
        Self {
            values: self.values.slice(s![start..end, ..]).to_owned(),
            index: self.index.slice(start, end),
        }
    }

    /// Copy with every column replaced by `f(column_index, column)`.
    pub(crate) fn map_columns(&self, f: impl Fn(usize, f64) -> f64) -> ObservationMatrix {
        let mut values = self.values.clone();
        for (j, mut col) in values.axis_iter_mut(Axis(1)).enumerate() {
            col.mapv_inplace(|v| f(j, v));
        }
        Self { values, index: self.index.clone() }
    }
}

fn coerce(raw: RawData) -> ImpactResult<Array2<f64>> {
    match raw {
        RawData::Matrix(values) => Ok(values),
        RawData::Series(series) => {
            let n = series.len();
            series.into_shape((n, 1)).map_err(|e| ImpactError::InvalidData {
                reason: e.to_string(),
            })
        }
        RawData::Rows(rows) => rows_to_array(rows),
        RawData::Records(records) => {
            let rows = records
                .iter()
                .enumerate()
                .map(|(row, record)| {
                    record
                        .iter()
                        .enumerate()
                        .map(|(column, cell)| parse_cell(cell, row, column))
                        .collect::<ImpactResult<Vec<f64>>>()
                })
                .collect::<ImpactResult<Vec<Vec<f64>>>>()?;
            rows_to_array(rows)
        }
    }
}

fn rows_to_array(rows: Vec<Vec<f64>>) -> ImpactResult<Array2<f64>> {
    let n_cols = rows.first().map_or(0, Vec::len);
    if let Some(row) = rows.iter().position(|r| r.len() != n_cols) {
        return Err(ImpactError::InvalidData {
            reason: format!("row {row} has {} cells; expected {n_cols}", rows[row].len()),
        });
    }
    let n_rows = rows.len();
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n_rows, n_cols), flat)
        .map_err(|e| ImpactError::InvalidData { reason: e.to_string() })
}

fn parse_cell(cell: &str, row: usize, column: usize) -> ImpactResult<f64> {
    let trimmed = cell.trim();
    if MISSING_MARKERS.contains(&trimmed.to_ascii_lowercase().as_str()) {
        return Ok(f64::NAN);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ImpactError::NonNumericData { row, column, value: cell.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Coercion of each `RawData` shape and the content rules enforced by
    // `ObservationMatrix::new`.
    // -------------------------------------------------------------------------

    fn records(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect()
    }

    #[test]
    // Purpose
    // -------
    // Textual records parse numbers and map missing markers to NaN.
    //
    // Given
    // -----
    // - Three rows with "NA" and an empty covariate cell.
    //
    // Expect
    // ------
    // - A 3x2 matrix with NaN in the marked cells.
    fn records_parse_numbers_and_missing_markers() {
        let m = ObservationMatrix::new(
            records(&[&["1.5", "2"], &["NA", "3"], &[" 4 ", ""]]),
            None,
        )
        .unwrap();

        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.n_covariates(), 1);
        assert!(m.response()[1].is_nan());
        assert!(m.covariates()[[2, 0]].is_nan());
        assert_eq!(m.response()[2], 4.0);
    }

    #[test]
    fn records_reject_text_cells() {
        let err = ObservationMatrix::new(records(&[&["1", "a"], &["2", "b"], &["3", "c"]]), None);

        assert_eq!(
            err,
            Err(ImpactError::NonNumericData { row: 0, column: 1, value: "a".to_string() })
        );
    }

    #[test]
    fn infinite_values_are_non_numeric() {
        let err = ObservationMatrix::new(array![[1.0], [f64::INFINITY], [3.0]], None);

        assert!(matches!(err, Err(ImpactError::NonNumericData { row: 1, column: 0, .. })));
    }

    #[test]
    fn shape_rules() {
        assert_eq!(
            ObservationMatrix::new(array![1.0, 2.0], None),
            Err(ImpactError::InsufficientData { rows: 2 })
        );
        assert!(matches!(
            ObservationMatrix::new(vec![vec![1.0, 2.0], vec![3.0]], None),
            Err(ImpactError::InvalidData { .. })
        ));
        assert!(matches!(
            ObservationMatrix::new(array![1.0, 2.0, 3.0], Some(TimeIndex::Range(4))),
            Err(ImpactError::InvalidData { .. })
        ));
    }

    #[test]
    fn all_missing_covariate_is_rejected() {
        let nan = f64::NAN;
        let err = ObservationMatrix::new(array![[1.0, 1.0, nan], [2.0, nan, nan], [3.0, 0.5, nan]], None);

        assert_eq!(err, Err(ImpactError::AllMissingCovariate { column: 2 }));
    }

    #[test]
    // Purpose
    // -------
    // Row slices are detached copies of the source.
    fn slice_rows_copies_data() {
        let m = ObservationMatrix::new(array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]], None)
            .unwrap();

        let mut tail = m.slice_rows(1, 3);
        tail.values[[0, 0]] = -1.0;

        assert_eq!(m.response()[1], 2.0);
        assert_eq!(tail.n_rows(), 2);
        assert_eq!(tail.covariates()[[1, 0]], 30.0);
    }
}
