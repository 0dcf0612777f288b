//! Local-level model with static regression, fitted by maximum likelihood.
//!
//! Purpose
//! -------
//! Default counterfactual model of the pipeline. The response is a random
//! walk level plus a linear combination of covariates plus white noise; the
//! two variances and the regression weights are estimated on the pre-period
//! and the filtered level at its end seeds the post-period forecast.
//!
//! Key behaviors
//! -------------
//! - [`LocalLevelLikelihood`] implements [`LogLikelihood`] over
//!   `θ = (softplus⁻¹(σ²_obs), softplus⁻¹(σ²_level), β₁..β_k)` with the
//!   analytic gradient from [`kalman::filter_with_gradient`].
//! - Starting values come from an ordinary least-squares fit with intercept
//!   (nalgebra SVD), splitting the residual variance between the two noise
//!   terms.
//! - [`TrainedLocalLevel::forecast`] returns per-step means and variances
//!   and the exact variance of the running forecast sum.
//!
//! Invariants & assumptions
//! ------------------------
//! - `exog` always has `endog.len()` rows; zero columns means no regression.
//! - At least two observed rows are needed to evaluate the likelihood.
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};

use crate::{
    impact::{
        core::matrix::ObservationMatrix,
        errors::{ImpactError, ImpactResult},
        models::{
            kalman::{self, FilterState, LevelParams},
            traits::{Forecast, LatentStateModel, LevelComponent, TrainedModel},
        },
    },
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{
            Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, maximize,
        },
        numerical_stability::{from_variance, safe_logistic, to_variance},
    },
};

/// Observed rows needed before the likelihood has at least one term.
const MIN_USED_OBS: usize = 2;

/// Training data for the local-level likelihood.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalLevelData {
    pub endog: Array1<f64>,
    /// `(n, k)` regressors; `k = 0` without covariates.
    pub exog: Array2<f64>,
    /// Diffuse prior variance of the initial level.
    pub p0: f64,
}

impl LocalLevelData {
    /// # Errors
    /// [`ImpactError::ExogShapeMismatch`] if `exog` does not have one row per
    /// response value.
    pub fn new(endog: Array1<f64>, exog: Option<Array2<f64>>) -> ImpactResult<Self> {
        let n = endog.len();
        let exog = exog.unwrap_or_else(|| Array2::zeros((n, 0)));
        if exog.nrows() != n {
            return Err(ImpactError::ExogShapeMismatch {
                expected: (n, exog.ncols()),
                found: exog.dim(),
            });
        }
        let p0 = kalman::diffuse_variance(endog.view());
        Ok(Self { endog, exog, p0 })
    }

    pub fn n_regressors(&self) -> usize {
        self.exog.ncols()
    }

    fn usable_rows(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.endog.len()).filter(move |&t| {
            self.endog[t].is_finite() && self.exog.row(t).iter().all(|v| v.is_finite())
        })
    }
}

/// Log-likelihood of the local-level model in unconstrained θ-space.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalLevelLikelihood;

impl LocalLevelLikelihood {
    fn expected_len(data: &LocalLevelData) -> usize {
        2 + data.n_regressors()
    }

    fn params<'a>(theta: &'a Theta) -> LevelParams<'a> {
        LevelParams {
            sigma2_obs: to_variance(theta[0]),
            sigma2_level: to_variance(theta[1]),
            beta: theta.slice(s![2..]),
        }
    }

    fn filtered(theta: &Theta, data: &LocalLevelData) -> OptResult<FilterState> {
        let state = kalman::filter(data.endog.view(), data.exog.view(), &Self::params(theta), data.p0);
        if state.n_used < MIN_USED_OBS {
            return Err(OptError::TooFewObservations { used: state.n_used, required: MIN_USED_OBS });
        }
        Ok(state)
    }
}

impl LogLikelihood for LocalLevelLikelihood {
    type Data = LocalLevelData;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<f64> {
        Ok(Self::filtered(theta, data)?.loglik)
    }

    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()> {
        let expected = Self::expected_len(data);
        if theta.len() != expected {
            return Err(OptError::ThetaLengthMismatch { expected, actual: theta.len() });
        }
        if let Some(index) = theta.iter().position(|v| !v.is_finite()) {
            return Err(OptError::InvalidThetaInput { index, value: theta[index] });
        }
        let used = data.usable_rows().count();
        if used < MIN_USED_OBS {
            return Err(OptError::TooFewObservations { used, required: MIN_USED_OBS });
        }
        Ok(())
    }

    fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad> {
        let (state, mut g) = kalman::filter_with_gradient(
            data.endog.view(),
            data.exog.view(),
            &Self::params(theta),
            data.p0,
        );
        if state.n_used < MIN_USED_OBS {
            return Err(OptError::TooFewObservations { used: state.n_used, required: MIN_USED_OBS });
        }
        g[0] *= safe_logistic(theta[0]);
        g[1] *= safe_logistic(theta[1]);
        Ok(g)
    }
}

/// Untrained local-level specification.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalLevelModel {
    data: LocalLevelData,
    mle_opts: MLEOptions,
}

impl LocalLevelModel {
    /// # Errors
    /// See [`LocalLevelData::new`].
    pub fn new(
        endog: Array1<f64>, exog: Option<Array2<f64>>, mle_opts: MLEOptions,
    ) -> ImpactResult<Self> {
        Ok(Self { data: LocalLevelData::new(endog, exog)?, mle_opts })
    }

    /// Response from column 0, regressors from the remaining columns.
    pub fn from_matrix(pre: &ObservationMatrix, mle_opts: MLEOptions) -> ImpactResult<Self> {
        let exog = pre.has_covariates().then(|| pre.covariates().to_owned());
        Self::new(pre.response().to_owned(), exog, mle_opts)
    }

    pub fn training_data(&self) -> &LocalLevelData {
        &self.data
    }

    /// OLS-based starting point in θ-space.
    fn initial_theta(&self) -> Theta {
        let rows: Vec<usize> = self.data.usable_rows().collect();
        let k = self.data.n_regressors();
        let n = rows.len();
        let y = DVector::from_iterator(n, rows.iter().map(|&t| self.data.endog[t]));
        let design = DMatrix::from_fn(n, k + 1, |i, j| {
            if j == 0 { 1.0 } else { self.data.exog[[rows[i], j - 1]] }
        });

        let coef = if n > k + 1 { design.clone().svd(true, true).solve(&y, 1e-12).ok() } else { None };
        let (beta, resid_var) = match coef {
            Some(c) => {
                let resid = &y - &design * &c;
                let var = resid.norm_squared() / (n - k - 1) as f64;
                (Array1::from_iter(c.iter().skip(1).copied()), var)
            }
            None if n > 1 => (Array1::zeros(k), y.variance()),
            None => (Array1::zeros(k), 1.0),
        };
        let resid_var = if resid_var.is_finite() && resid_var > 1e-8 { resid_var } else { 1.0 };

        let mut theta = Array1::zeros(2 + k);
        theta[0] = from_variance(0.5 * resid_var);
        theta[1] = from_variance(0.1 * resid_var);
        theta.slice_mut(s![2..]).assign(&beta);
        theta
    }
}

impl LatentStateModel for LocalLevelModel {
    type Trained = TrainedLocalLevel;

    fn level(&self) -> Option<LevelComponent> {
        Some(LevelComponent::LocalLevel)
    }

    fn exog(&self) -> Option<ArrayView2<'_, f64>> {
        (self.data.n_regressors() > 0).then(|| self.data.exog.view())
    }

    fn data(&self) -> Option<ArrayView1<'_, f64>> {
        Some(self.data.endog.view())
    }

    /// # Errors
    /// [`ImpactError::ModelFitFailed`] when the optimizer cannot produce an
    /// estimate.
    fn train(&self) -> ImpactResult<TrainedLocalLevel> {
        let theta0 = self.initial_theta();
        log::debug!("local level start: theta0 = {theta0}");
        let outcome = maximize(&LocalLevelLikelihood, theta0, &self.data, &self.mle_opts)?;
        if !outcome.converged {
            log::warn!(
                "local level fit stopped without convergence after {} iterations ({})",
                outcome.iterations,
                outcome.status
            );
        }
        let theta = &outcome.theta_hat;
        let params = LocalLevelLikelihood::params(theta);
        let state = kalman::filter(self.data.endog.view(), self.data.exog.view(), &params, self.data.p0);
        let trained = TrainedLocalLevel {
            sigma2_obs: params.sigma2_obs,
            sigma2_level: params.sigma2_level,
            beta: params.beta.to_owned(),
            level: state.level,
            level_var: state.level_var,
            log_likelihood: state.loglik,
            outcome: outcome.clone(),
        };
        log::debug!(
            "local level fitted: s2_obs = {:.6}, s2_level = {:.6}, beta = {}, ell = {:.4}",
            trained.sigma2_obs,
            trained.sigma2_level,
            trained.beta,
            trained.log_likelihood
        );
        Ok(trained)
    }
}

/// Fitted local-level model, conditioned on the full training window.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedLocalLevel {
    sigma2_obs: f64,
    sigma2_level: f64,
    beta: Array1<f64>,
    level: f64,
    level_var: f64,
    log_likelihood: f64,
    outcome: OptimOutcome,
}

impl TrainedLocalLevel {
    pub fn sigma2_obs(&self) -> f64 {
        self.sigma2_obs
    }

    pub fn sigma2_level(&self) -> f64 {
        self.sigma2_level
    }

    pub fn beta(&self) -> ArrayView1<'_, f64> {
        self.beta.view()
    }

    /// Filtered level at the end of training and its variance.
    pub fn level(&self) -> (f64, f64) {
        (self.level, self.level_var)
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    pub fn outcome(&self) -> &OptimOutcome {
        &self.outcome
    }

    fn regression_term(
        &self, horizon: usize, exog: Option<ArrayView2<'_, f64>>,
    ) -> ImpactResult<Array1<f64>> {
        let k = self.beta.len();
        match exog {
            None if k == 0 => Ok(Array1::zeros(horizon)),
            Some(x) if k == 0 && x.ncols() == 0 => Ok(Array1::zeros(horizon)),
            Some(x) if x.dim() == (horizon, k) => {
                if let Some(((row, column), _)) = x.indexed_iter().find(|(_, v)| !v.is_finite()) {
                    return Err(ImpactError::MissingCovariateValue { row, column });
                }
                Ok(x.dot(&self.beta))
            }
            other => Err(ImpactError::ExogShapeMismatch {
                expected: (horizon, k),
                found: other.map_or((0, 0), |x| x.dim()),
            }),
        }
    }
}

impl TrainedModel for TrainedLocalLevel {
    /// Step `h` has mean `level + x_h'β` and variance
    /// `P + h·σ²_level + σ²_obs`; the running sum of the first `k` steps has
    /// variance `k²P + σ²_level·Σ_{m≤k} m² + k·σ²_obs`.
    fn forecast(
        &self, horizon: usize, exog: Option<ArrayView2<'_, f64>>,
    ) -> ImpactResult<Forecast> {
        let regression = self.regression_term(horizon, exog)?;
        let (p, q, r) = (self.level_var, self.sigma2_level, self.sigma2_obs);

        let mean = regression.mapv(|xb| self.level + xb);
        let variance = Array1::from_shape_fn(horizon, |i| p + (i + 1) as f64 * q + r);
        let cumulative = Array1::from_shape_fn(horizon, |i| {
            let k = (i + 1) as f64;
            k * k * p + q * k * (k + 1.0) * (2.0 * k + 1.0) / 6.0 + k * r
        });
        Forecast::new(mean, variance)?.with_cumulative_variance(cumulative)
    }
}
