//! Capability contract between the pipeline and a latent-state model.
//!
//! Purpose
//! -------
//! Let any state-space estimator stand behind the analysis. A model exposes
//! what it was specified with ([`LatentStateModel`]) and, once trained, a
//! predictive distribution over future steps ([`TrainedModel`]). The
//! built-in local-level model is one implementation among many.
//!
//! Conventions
//! -----------
//! - Capabilities are reported as `Option`s so an incomplete model can be
//!   diagnosed by name instead of failing somewhere inside training.
//! - Forecast variances are per-step marginal variances of the response.
//!   Models that know the covariance between steps report the variance of
//!   the running sum as well; otherwise steps are treated as independent.
use std::fmt;

use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::impact::errors::{ImpactError, ImpactResult};

/// State specification of the latent level.
///
/// The default model is always [`LevelComponent::LocalLevel`]; the other
/// variants are for user-supplied models to declare their own structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelComponent {
    /// Random-walk level.
    LocalLevel,
    /// Random-walk level with a random-walk slope.
    LocalLinearTrend,
    /// Fixed intercept.
    Deterministic,
}

/// Capabilities a user-supplied model must expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelCapability {
    Level,
    Data,
    Exog,
}

impl fmt::Display for ModelCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelCapability::Level => write!(f, "level"),
            ModelCapability::Data => write!(f, "data"),
            ModelCapability::Exog => write!(f, "exog"),
        }
    }
}

/// An untrained latent-state model.
pub trait LatentStateModel {
    type Trained: TrainedModel;

    /// Level/state specification, if the model declares one.
    fn level(&self) -> Option<LevelComponent>;

    /// Regressor block `(n_obs, k)` the model was built with, if any.
    fn exog(&self) -> Option<ArrayView2<'_, f64>>;

    /// Response series the model trains on.
    fn data(&self) -> Option<ArrayView1<'_, f64>>;

    /// Fit the model. Must not mutate shared state.
    fn train(&self) -> ImpactResult<Self::Trained>;
}

/// A fitted model that can forecast past the end of its training data.
pub trait TrainedModel {
    /// Predictive distribution for steps `1..=horizon`. `exog` carries the
    /// regressors for those steps, shape `(horizon, k)`, when the model uses
    /// any.
    fn forecast(&self, horizon: usize, exog: Option<ArrayView2<'_, f64>>)
    -> ImpactResult<Forecast>;
}

/// Validated predictive distribution over a forecast horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    mean: Array1<f64>,
    variance: Array1<f64>,
    cumulative_variance: Option<Array1<f64>>,
}

impl Forecast {
    /// # Errors
    /// - [`ImpactError::ForecastLengthMismatch`] if the lengths differ.
    /// - [`ImpactError::InvalidForecast`] for a non-finite mean or a negative
    ///   or non-finite variance.
    pub fn new(mean: Array1<f64>, variance: Array1<f64>) -> ImpactResult<Self> {
        if mean.len() != variance.len() {
            return Err(ImpactError::ForecastLengthMismatch {
                expected: mean.len(),
                found: variance.len(),
            });
        }
        for (step, (&m, &v)) in mean.iter().zip(variance.iter()).enumerate() {
            if !m.is_finite() || !v.is_finite() || v < 0.0 {
                return Err(ImpactError::InvalidForecast { step, mean: m, variance: v });
            }
        }
        Ok(Self { mean, variance, cumulative_variance: None })
    }

    /// Attach the variance of `sum_{i<=k} y_{T+i}` for each `k`.
    ///
    /// # Errors
    /// Same rules as [`Forecast::new`], applied to the cumulative variances.
    pub fn with_cumulative_variance(mut self, cumulative: Array1<f64>) -> ImpactResult<Self> {
        if cumulative.len() != self.mean.len() {
            return Err(ImpactError::ForecastLengthMismatch {
                expected: self.mean.len(),
                found: cumulative.len(),
            });
        }
        if let Some(step) = cumulative.iter().position(|v| !v.is_finite() || *v < 0.0) {
            return Err(ImpactError::InvalidForecast {
                step,
                mean: self.mean[step],
                variance: cumulative[step],
            });
        }
        self.cumulative_variance = Some(cumulative);
        Ok(self)
    }

    pub fn horizon(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> ArrayView1<'_, f64> {
        self.mean.view()
    }

    pub fn variance(&self) -> ArrayView1<'_, f64> {
        self.variance.view()
    }

    /// Variance of the running forecast sum; the running sum of per-step
    /// variances when the model did not provide one.
    pub fn cumulative_variances(&self) -> Array1<f64> {
        match &self.cumulative_variance {
            Some(cv) => cv.clone(),
            None => {
                let mut acc = 0.0;
                self.variance.mapv(|v| {
                    acc += v;
                    acc
                })
            }
        }
    }

    /// Rescale mean and variances from standardized to original units.
    pub(crate) fn rescaled(&self, mu: f64, sigma: f64) -> Forecast {
        let s2 = sigma * sigma;
        Forecast {
            mean: self.mean.mapv(|m| m * sigma + mu),
            variance: self.variance.mapv(|v| v * s2),
            cumulative_variance: self.cumulative_variance.as_ref().map(|cv| cv.mapv(|v| v * s2)),
        }
    }
}
