//! Conversion helpers between Python objects and the Rust analysis types.
//!
//! Every helper here is FFI glue: it accepts the shapes Python callers
//! commonly hold (numpy arrays, pandas objects, plain lists) and produces the
//! validated Rust inputs used by [`crate::impact`]. Content validation is left
//! to the core types; only shape and type problems are reported here.
#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::PyAny,
};

#[cfg(feature = "python-bindings")]
use numpy::{PyReadonlyArray1, PyReadonlyArray2};

#[cfg(feature = "python-bindings")]
use crate::{
    impact::core::{
        index::{TimeIndex, parse_label},
        matrix::RawData,
        periods::{PeriodBound, PeriodRole, PeriodSpec},
    },
    optimization::{
        errors::OptError,
        loglik_optimizer::{LineSearcher, MLEOptions, Tolerances},
    },
};

/// Pull the observation table out of a Python object.
///
/// Tried in order: 2-D float64 array, 1-D float64 array (response only),
/// `obj.to_numpy()` for pandas objects, nested float lists, a flat float
/// list, and finally nested string lists (textual cells are parsed later).
#[cfg(feature = "python-bindings")]
pub fn extract_raw_data<'py>(raw_data: &Bound<'py, PyAny>) -> PyResult<RawData> {
    if let Some(raw) = extract_numpy(raw_data) {
        return Ok(raw);
    }

    if let Ok(obj) = raw_data.call_method0("to_numpy") {
        if let Some(raw) = extract_numpy(&obj) {
            return Ok(raw);
        }
    }

    if let Ok(rows) = raw_data.extract::<Vec<Vec<f64>>>() {
        return Ok(RawData::Rows(rows));
    }
    if let Ok(series) = raw_data.extract::<Vec<f64>>() {
        return Ok(RawData::Series(series.into()));
    }
    if let Ok(records) = raw_data.extract::<Vec<Vec<String>>>() {
        return Ok(RawData::Records(records));
    }

    Err(PyTypeError::new_err(
        "expected a numpy.ndarray, pandas.DataFrame/Series, or (nested) sequence of float64",
    ))
}

#[cfg(feature = "python-bindings")]
fn extract_numpy(obj: &Bound<'_, PyAny>) -> Option<RawData> {
    if let Ok(arr) = obj.extract::<PyReadonlyArray2<f64>>() {
        return Some(RawData::Matrix(arr.as_array().to_owned()));
    }
    if let Ok(arr) = obj.extract::<PyReadonlyArray1<f64>>() {
        return Some(RawData::Series(arr.as_array().to_owned()));
    }
    None
}

/// Convert a two-element Python sequence of ints or date strings.
#[cfg(feature = "python-bindings")]
pub fn extract_period<'py>(role: PeriodRole, period: &Bound<'py, PyAny>) -> PyResult<PeriodSpec> {
    let items: Vec<Bound<'py, PyAny>> = period.extract().map_err(|_| {
        PyTypeError::new_err(format!("{role} must be a sequence of two ints or two date strings"))
    })?;

    let bounds = items
        .iter()
        .map(|item| {
            if let Ok(offset) = item.extract::<i64>() {
                Ok(PeriodBound::Offset(offset))
            } else if let Ok(label) = item.extract::<String>() {
                Ok(PeriodBound::Label(label))
            } else if let Ok(label) = item.call_method1("strftime", ("%Y-%m-%d",)) {
                Ok(PeriodBound::Label(label.extract()?))
            } else {
                Err(PyTypeError::new_err(format!(
                    "{role} bounds must be ints, date strings, or date-like objects"
                )))
            }
        })
        .collect::<PyResult<Vec<_>>>()?;

    Ok(PeriodSpec::try_from_bounds(role, &bounds)?)
}

/// Build a date index from strings or a pandas `DatetimeIndex`.
///
/// `None` yields `None`, meaning a plain positional index.
#[cfg(feature = "python-bindings")]
pub fn extract_dates<'py>(dates: Option<&Bound<'py, PyAny>>) -> PyResult<Option<TimeIndex>> {
    let Some(dates) = dates else {
        return Ok(None);
    };

    let labels: Vec<String> = match dates.extract() {
        Ok(labels) => labels,
        Err(_) => dates
            .call_method1("strftime", ("%Y-%m-%d",))
            .and_then(|formatted| formatted.extract())
            .map_err(|_| {
                PyTypeError::new_err("dates must be a sequence of date strings or a DatetimeIndex")
            })?,
    };

    let parsed = labels
        .iter()
        .map(|label| {
            parse_label(label).ok_or_else(|| {
                PyValueError::new_err(format!("could not parse {label:?} as a date"))
            })
        })
        .collect::<PyResult<Vec<_>>>()?;

    Ok(Some(TimeIndex::dates(parsed)?))
}

/// Optimizer settings for the default model from keyword arguments.
#[cfg(feature = "python-bindings")]
pub fn extract_mle_opts(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
) -> PyResult<MLEOptions> {
    use std::str::FromStr;

    let to_py = |e: OptError| PyValueError::new_err(e.to_string());

    // No stopping rule given: keep the library defaults.
    let tols = if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
        Tolerances::default()
    } else {
        Tolerances::new(tol_grad, tol_cost, max_iter).map_err(to_py)?
    };
    let ls = match line_searcher {
        Some(name) => LineSearcher::from_str(name).map_err(to_py)?,
        None => LineSearcher::default(),
    };

    MLEOptions::new(tols, ls, false, lbfgs_mem).map_err(to_py)
}
