//! Errors for the causal-impact pipeline (data coercion, period resolution,
//! standardization, model capabilities and effect inference).
//!
//! Every stage fails synchronously with an [`ImpactError`] naming the
//! offending field or value; no stage returns partial results.
//!
//! ## Conventions
//! - **Row and column indices are 0-based**; column 0 is the response.
//! - Periods are reported as resolved half-open offsets `[start, end)`.
//! - Optimizer failures are normalized to [`ImpactError::ModelFitFailed`]
//!   with the optimizer's message.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

use crate::{
    impact::{core::periods::PeriodRole, models::traits::ModelCapability},
    optimization::errors::OptError,
};

/// Result alias for every fallible pipeline operation.
pub type ImpactResult<T> = Result<T, ImpactError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ImpactError {
    // ---- Data shape / content ----
    /// Input could not be coerced into a numeric table.
    InvalidData { reason: String },

    /// A cell is neither a number nor a recognised missing marker.
    NonNumericData { row: usize, column: usize, value: String },

    /// Fewer than three rows.
    InsufficientData { rows: usize },

    /// A covariate column has no observed values at all.
    AllMissingCovariate { column: usize },

    // ---- Periods ----
    /// Period bounds are malformed before any lookup (arity, kinds, signs).
    InvalidPeriod { role: PeriodRole, reason: &'static str },

    /// A date label does not occur in the index.
    PeriodNotFound { role: PeriodRole, label: String },

    /// Date labels were given but the data has a positional index.
    LabelsRequireDateIndex { role: PeriodRole },

    /// Resolved period extends past the last row.
    PeriodOutOfRange { role: PeriodRole, start: usize, end: usize, len: usize },

    /// Resolved period covers fewer than three rows.
    PeriodTooShort { role: PeriodRole, start: usize, end: usize },

    /// Pre-period ends after the post-period starts.
    PeriodOverlap { pre_end: usize, post_start: usize },

    /// Pre-period end precedes its start.
    InvalidPrePeriod { start: usize, end: usize },

    /// Post-period end precedes its start.
    InvalidPostPeriod { start: usize, end: usize },

    // ---- Standardization ----
    /// Column has zero (or undefined) pre-period standard deviation.
    DegenerateColumn { column: usize, sigma: f64 },

    // ---- Model ----
    /// A user-supplied model lacks a required capability.
    IncompleteModel { capability: ModelCapability, reason: &'static str },

    /// Regressor block has the wrong shape.
    ExogShapeMismatch { expected: (usize, usize), found: (usize, usize) },

    /// The model's training data does not line up with the pre-period.
    ModelDataMismatch { expected: usize, found: usize },

    /// A covariate needed for a forecast is missing. `row` is the row of the
    /// analysed matrix; `column` counts covariates from 0.
    MissingCovariateValue { row: usize, column: usize },

    /// Maximum-likelihood estimation failed.
    ModelFitFailed { status: String },

    // ---- Forecast / inference ----
    /// Forecast mean or variance is unusable at a step.
    InvalidForecast { step: usize, mean: f64, variance: f64 },

    /// Forecast horizon does not match the post-period.
    ForecastLengthMismatch { expected: usize, found: usize },

    /// alpha must lie strictly inside (0, 1).
    InvalidAlpha { alpha: f64 },

    /// Cumulative prediction is zero, so the relative effect is undefined.
    UndefinedRelativeEffect { predicted_sum: f64 },

    /// Observed response is missing inside the post-period; `row` is the
    /// row of the analysed matrix.
    MissingPostResponse { row: usize },
}

impl std::error::Error for ImpactError {}

impl std::fmt::Display for ImpactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Data shape / content ----
            ImpactError::InvalidData { reason } => {
                write!(f, "Could not interpret input as a numeric table: {reason}")
            }
            ImpactError::NonNumericData { row, column, value } => {
                write!(f, "Non-numeric value '{value}' at row {row}, column {column}")
            }
            ImpactError::InsufficientData { rows } => {
                write!(f, "Need at least 3 rows of data; got {rows}")
            }
            ImpactError::AllMissingCovariate { column } => {
                write!(f, "Covariate column {column} has no observed values")
            }

            // ---- Periods ----
            ImpactError::InvalidPeriod { role, reason } => {
                write!(f, "Invalid {role}: {reason}")
            }
            ImpactError::PeriodNotFound { role, label } => {
                write!(f, "{role} label '{label}' not found in the data index")
            }
            ImpactError::LabelsRequireDateIndex { role } => {
                write!(f, "{role} given as dates but the data has no date index")
            }
            ImpactError::PeriodOutOfRange { role, start, end, len } => {
                write!(f, "{role} [{start}, {end}) exceeds the {len} available rows")
            }
            ImpactError::PeriodTooShort { role, start, end } => {
                write!(f, "{role} [{start}, {end}) must span at least 3 rows")
            }
            ImpactError::PeriodOverlap { pre_end, post_start } => {
                write!(
                    f,
                    "pre_period ends at {pre_end} but post_period starts at {post_start}; \
                     periods must not overlap"
                )
            }
            ImpactError::InvalidPrePeriod { start, end } => {
                write!(f, "pre_period end {end} precedes its start {start}")
            }
            ImpactError::InvalidPostPeriod { start, end } => {
                write!(f, "post_period end {end} precedes its start {start}")
            }

            // ---- Standardization ----
            ImpactError::DegenerateColumn { column, sigma } => {
                write!(
                    f,
                    "Column {column} has standard deviation {sigma} over the pre-period; \
                     cannot standardize"
                )
            }

            // ---- Model ----
            ImpactError::IncompleteModel { capability, reason } => {
                write!(f, "Model is missing its {capability} capability: {reason}")
            }
            ImpactError::ExogShapeMismatch { expected, found } => {
                write!(
                    f,
                    "Regressors have shape {}x{}; expected {}x{}",
                    found.0, found.1, expected.0, expected.1
                )
            }
            ImpactError::ModelDataMismatch { expected, found } => {
                write!(f, "Model was built on {found} observations; pre-period has {expected}")
            }
            ImpactError::MissingCovariateValue { row, column } => {
                write!(f, "Covariate {column} is missing at row {row}")
            }
            ImpactError::ModelFitFailed { status } => {
                write!(f, "Model fit failed: {status}")
            }

            // ---- Forecast / inference ----
            ImpactError::InvalidForecast { step, mean, variance } => {
                write!(f, "Invalid forecast at step {step}: mean {mean}, variance {variance}")
            }
            ImpactError::ForecastLengthMismatch { expected, found } => {
                write!(f, "Forecast has {found} steps; post-period has {expected}")
            }
            ImpactError::InvalidAlpha { alpha } => {
                write!(f, "alpha must be in (0, 1); got {alpha}")
            }
            ImpactError::UndefinedRelativeEffect { predicted_sum } => {
                write!(
                    f,
                    "Relative effect is undefined: cumulative prediction is {predicted_sum}"
                )
            }
            ImpactError::MissingPostResponse { row } => {
                write!(f, "Response is missing at post-period row {row}")
            }
        }
    }
}

impl From<OptError> for ImpactError {
    fn from(err: OptError) -> Self {
        ImpactError::ModelFitFailed { status: err.to_string() }
    }
}

#[cfg(feature = "python-bindings")]
impl std::convert::From<ImpactError> for PyErr {
    fn from(err: ImpactError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Optimizer failures become `ModelFitFailed` and keep the message.
    fn opt_error_maps_to_model_fit_failed() {
        let err: ImpactError = OptError::NonFiniteCost { value: f64::INFINITY }.into();

        match err {
            ImpactError::ModelFitFailed { status } => assert!(status.contains("inf")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn display_names_role_and_offsets() {
        let msg = ImpactError::PeriodTooShort { role: PeriodRole::Pre, start: 10, end: 11 }
            .to_string();

        assert!(msg.starts_with("pre_period"));
        assert!(msg.contains("[10, 11)"));
    }
}
