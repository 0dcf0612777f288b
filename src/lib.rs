//! rust_causalimpact — causal impact estimation for time series.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the analysis to Python via the `_rust_causalimpact` extension
//! module. When the `python-bindings` feature is enabled, this module defines
//! the Python-facing `CausalImpact` class.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`impact` and `optimization`) as the
//!   public crate surface.
//! - Define the `#[pyclass]` wrapper and the `#[pymodule]` initializer for
//!   the `_rust_causalimpact` Python extension.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, argument conversion, and error mapping.
//! - The Python class runs the whole analysis in its constructor; a
//!   constructed object always holds a finished result.
//!
//! Conventions
//! -----------
//! - Periods are half-open `[start, end)` when given as integer offsets and
//!   inclusive when given as date strings, as documented in
//!   [`impact::core::periods`].
//! - Errors from core Rust code are [`impact::errors::ImpactError`] values
//!   internally and `ValueError` at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should use [`impact::analysis::CausalImpact`] directly
//!   and can ignore the items guarded by `python-bindings`.
//! - The Python packaging layer imports `_rust_causalimpact` and re-exports
//!   its class from the top-level `rust_causalimpact` package.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by the
//!   pipeline tests under `tests/`.

pub mod impact;
pub mod optimization;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    impact::{
        analysis::CausalImpact as CoreCausalImpact,
        core::{
            matrix::ObservationMatrix,
            options::{DEFAULT_ALPHA, ImpactOptions},
            periods::PeriodRole,
        },
        inference::posterior::PointEffect,
    },
    utils::{extract_dates, extract_mle_opts, extract_period, extract_raw_data},
};

/// CausalImpact — Python-facing causal impact analysis.
///
/// Purpose
/// -------
/// Run a complete analysis on construction and expose its results through
/// read-only properties.
///
/// Key behaviors
/// -------------
/// - `data` is a 2-D array (response in column 0, covariates after), a 1-D
///   response, a pandas object, or nested lists.
/// - `pre_period` / `post_period` are two ints or two date strings; date
///   strings require `dates`.
/// - Per-step results are returned as Python lists aligned with the
///   post-period.
///
/// Notes
/// -----
/// - This type is part of the Python FFI surface; Rust code should use
///   [`CoreCausalImpact`] directly.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_causalimpact")]
pub struct CausalImpact {
    inner: CoreCausalImpact,
}

#[cfg(feature = "python-bindings")]
impl CausalImpact {
    fn column(&self, field: impl Fn(&PointEffect) -> f64) -> Vec<f64> {
        self.inner.inference().series(field).to_vec()
    }
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl CausalImpact {
    #[new]
    #[pyo3(
        text_signature = "(data, pre_period, post_period, /, alpha=0.05, standardize=True, dates=None, tol_grad=None, tol_cost=None, max_iter=None, line_searcher=None, lbfgs_mem=None)",
        signature = (
            data, pre_period, post_period, alpha = DEFAULT_ALPHA, standardize = true,
            dates = None, tol_grad = None, tol_cost = None, max_iter = None,
            line_searcher = None, lbfgs_mem = None
        )
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn new<'py>(
        data: &Bound<'py, PyAny>, pre_period: &Bound<'py, PyAny>,
        post_period: &Bound<'py, PyAny>, alpha: f64, standardize: bool,
        dates: Option<&Bound<'py, PyAny>>, tol_grad: Option<f64>, tol_cost: Option<f64>,
        max_iter: Option<usize>, line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
    ) -> PyResult<CausalImpact> {
        let raw = extract_raw_data(data)?;
        let index = extract_dates(dates)?;
        let pre = extract_period(PeriodRole::Pre, pre_period)?;
        let post = extract_period(PeriodRole::Post, post_period)?;
        let mle_opts = extract_mle_opts(tol_grad, tol_cost, max_iter, line_searcher, lbfgs_mem)?;
        let options = ImpactOptions::new(alpha, standardize, mle_opts)?;

        let matrix = ObservationMatrix::new(raw, index)?;
        let inner = CoreCausalImpact::run(&matrix, &pre, &post, options)?;
        Ok(CausalImpact { inner })
    }

    /// Two-sided tail probability of the cumulative effect.
    #[getter]
    pub fn p_value(&self) -> f64 {
        self.inner.inference().p_value()
    }

    #[getter]
    pub fn prob_causal_effect(&self) -> f64 {
        self.inner.inference().prob_causal_effect()
    }

    #[getter]
    pub fn alpha(&self) -> f64 {
        self.inner.inference().alpha()
    }

    #[getter]
    pub fn cumulative_effect(&self) -> f64 {
        self.inner.inference().cumulative_effect()
    }

    #[getter]
    pub fn average_effect(&self) -> f64 {
        self.inner.inference().average_effect()
    }

    #[getter]
    pub fn relative_effect(&self) -> f64 {
        self.inner.inference().relative_effect()
    }

    /// `(lower, upper)` interval of the cumulative effect.
    #[getter]
    pub fn cumulative_effect_interval(&self) -> (f64, f64) {
        let c = &self.inner.inference().summary().cumulative;
        (c.abs_effect_lower, c.abs_effect_upper)
    }

    /// `(lower, upper)` interval of the relative effect.
    #[getter]
    pub fn relative_effect_interval(&self) -> (f64, f64) {
        let c = &self.inner.inference().summary().cumulative;
        (c.rel_effect_lower, c.rel_effect_upper)
    }

    #[getter]
    pub fn observed(&self) -> Vec<f64> {
        self.column(|p| p.observed)
    }

    #[getter]
    pub fn predicted(&self) -> Vec<f64> {
        self.column(|p| p.predicted)
    }

    #[getter]
    pub fn predicted_lower(&self) -> Vec<f64> {
        self.column(|p| p.predicted_lower)
    }

    #[getter]
    pub fn predicted_upper(&self) -> Vec<f64> {
        self.column(|p| p.predicted_upper)
    }

    #[getter]
    pub fn point_effect(&self) -> Vec<f64> {
        self.column(|p| p.effect)
    }

    #[getter]
    pub fn point_effect_lower(&self) -> Vec<f64> {
        self.column(|p| p.effect_lower)
    }

    #[getter]
    pub fn point_effect_upper(&self) -> Vec<f64> {
        self.column(|p| p.effect_upper)
    }

    #[getter]
    pub fn cumulative_effects(&self) -> Vec<f64> {
        self.column(|p| p.cumulative_effect)
    }

    /// Post-period dates as ISO strings, or `None` for a positional index.
    #[getter]
    pub fn dates(&self) -> Option<Vec<String>> {
        self.inner
            .inference()
            .points()
            .iter()
            .map(|p| p.date.map(|d| d.format("%Y-%m-%d").to_string()))
            .collect()
    }

    /// `(start, end)` row offsets of the resolved pre- and post-periods.
    #[getter]
    pub fn periods(&self) -> ((usize, usize), (usize, usize)) {
        let split = self.inner.split();
        (
            (split.pre_period.start, split.pre_period.end),
            (split.post_period.start, split.post_period.end),
        )
    }

    /// Fitted `(sigma2_obs, sigma2_level, beta)` of the default model, in
    /// standardized units when `standardize=True`.
    #[getter]
    pub fn model_params(&self) -> Option<(f64, f64, Vec<f64>)> {
        self.inner
            .fitted_model()
            .map(|m| (m.sigma2_obs(), m.sigma2_level(), m.beta().to_vec()))
    }
}

/// Python module initializer for `_rust_causalimpact`.
///
/// Notes
/// -----
/// - Invoked by Python when importing the compiled extension; not called
///   directly by user code.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_causalimpact<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<CausalImpact>()?;
    Ok(())
}
