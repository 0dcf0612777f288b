//! Posterior-to-effect translation over the post-period.
//!
//! Purpose
//! -------
//! Turn a trained model's predictive distribution for the post-period into
//! pointwise, cumulative and relative effect estimates with intervals and a
//! two-sided tail probability. All arithmetic happens in original units:
//! standardized inputs are inverted before any effect is computed.
//!
//! Conventions
//! -----------
//! - Intervals are `mean ± z·sd` with `z` the two-sided critical value for
//!   `alpha`.
//! - Effect bounds are reflected prediction bounds: the lower effect is
//!   `observed - predicted_upper`.
//! - Cumulative intervals use the variance of the running predicted sum
//!   reported by the model, so correlated forecast errors widen them.
use chrono::NaiveDate;
use ndarray::{Array1, ArrayView1};

use crate::impact::{
    core::{matrix::ObservationMatrix, standardize::StandardizationParams},
    errors::{ImpactError, ImpactResult},
    inference::{
        significance::{critical_value, tail_probability},
        summary::ImpactSummary,
    },
    models::traits::TrainedModel,
};

/// Estimates for one post-period step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointEffect {
    /// 0-based position inside the post-period.
    pub step: usize,
    /// Calendar date of the step for date-indexed data.
    pub date: Option<NaiveDate>,
    pub observed: f64,
    pub predicted: f64,
    pub predicted_lower: f64,
    pub predicted_upper: f64,
    pub effect: f64,
    pub effect_lower: f64,
    pub effect_upper: f64,
    /// Running sum of `effect` up to and including this step.
    pub cumulative_effect: f64,
    pub cumulative_effect_lower: f64,
    pub cumulative_effect_upper: f64,
}

/// Read-only outcome of [`infer`].
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceResult {
    points: Vec<PointEffect>,
    pre_response: Array1<f64>,
    summary: ImpactSummary,
    p_value: f64,
    alpha: f64,
}

impl InferenceResult {
    pub fn points(&self) -> &[PointEffect] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Pre-period response in original units.
    pub fn pre_response(&self) -> ArrayView1<'_, f64> {
        self.pre_response.view()
    }

    pub fn summary(&self) -> &ImpactSummary {
        &self.summary
    }

    /// Two-sided tail probability of the cumulative effect under no effect.
    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    /// `1 - p_value`.
    pub fn prob_causal_effect(&self) -> f64 {
        1.0 - self.p_value
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn cumulative_effect(&self) -> f64 {
        self.summary.cumulative.abs_effect
    }

    pub fn average_effect(&self) -> f64 {
        self.summary.average.abs_effect
    }

    pub fn relative_effect(&self) -> f64 {
        self.summary.cumulative.rel_effect
    }

    /// One field of every point as an array, e.g. `result.series(|p| p.effect)`.
    pub fn series(&self, field: impl Fn(&PointEffect) -> f64) -> Array1<f64> {
        self.points.iter().map(field).collect()
    }
}

/// Compute effects of the post-period against `trained`'s forecast.
///
/// `pre` and `post` are in the units the model was trained in; when
/// `std_params` is given they are standardized and everything is mapped back
/// to original units first.
///
/// # Errors
/// - [`ImpactError::InvalidAlpha`] unless `0 < alpha < 1`.
/// - Forecast errors from the model, and
///   [`ImpactError::ForecastLengthMismatch`] if it returns the wrong horizon.
/// - [`ImpactError::MissingPostResponse`] for a missing observed value, at
///   its row in `post`.
/// - [`ImpactError::UndefinedRelativeEffect`] if the predicted sum is 0.
pub fn infer<T: TrainedModel>(
    trained: &T, pre: &ObservationMatrix, post: &ObservationMatrix, alpha: f64,
    std_params: Option<&StandardizationParams>,
) -> ImpactResult<InferenceResult> {
    let z = critical_value(alpha)?;
    let horizon = post.n_rows();
    if horizon == 0 {
        return Err(ImpactError::InvalidData { reason: "post-period has no rows".to_string() });
    }
    let exog = post.has_covariates().then(|| post.covariates());

    let mut forecast = trained.forecast(horizon, exog)?;
    if forecast.horizon() != horizon {
        return Err(ImpactError::ForecastLengthMismatch {
            expected: horizon,
            found: forecast.horizon(),
        });
    }

    let (pre_response, observed) = match std_params {
        Some(params) => {
            forecast = forecast.rescaled(params.mu[0], params.sigma[0]);
            (params.invert_response(pre.response()), params.invert_response(post.response()))
        }
        None => (pre.response().to_owned(), post.response().to_owned()),
    };
    if let Some(step) = observed.iter().position(|v| !v.is_finite()) {
        return Err(ImpactError::MissingPostResponse { row: step });
    }

    let mean = forecast.mean();
    let sd = forecast.variance().mapv(f64::sqrt);
    let cum_sd = forecast.cumulative_variances().mapv(f64::sqrt);

    let mut points = Vec::with_capacity(horizon);
    let (mut cum_obs, mut cum_pred) = (0.0, 0.0);
    for step in 0..horizon {
        cum_obs += observed[step];
        cum_pred += mean[step];
        let predicted_lower = mean[step] - z * sd[step];
        let predicted_upper = mean[step] + z * sd[step];
        let cumulative_effect = cum_obs - cum_pred;
        points.push(PointEffect {
            step,
            date: post.index().date_at(step),
            observed: observed[step],
            predicted: mean[step],
            predicted_lower,
            predicted_upper,
            effect: observed[step] - mean[step],
            effect_lower: observed[step] - predicted_upper,
            effect_upper: observed[step] - predicted_lower,
            cumulative_effect,
            cumulative_effect_lower: cumulative_effect - z * cum_sd[step],
            cumulative_effect_upper: cumulative_effect + z * cum_sd[step],
        });
    }

    let total_sd = cum_sd[horizon - 1];
    let summary = ImpactSummary::from_totals(cum_obs, cum_pred, total_sd, z, horizon)?;
    let p_value = tail_probability(cum_obs, cum_pred, total_sd);

    log::info!(
        "inference over {horizon} steps: cumulative effect = {:.4}, relative = {:.4}, p = {:.4}",
        summary.cumulative.abs_effect,
        summary.cumulative.rel_effect,
        p_value
    );
    Ok(InferenceResult { points, pre_response, summary, p_value, alpha })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::models::traits::Forecast;
    use approx::assert_abs_diff_eq;
    use ndarray::{ArrayView2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Effect arithmetic against a fixed forecast, de-standardization, and
    // the invariants linking pointwise and cumulative effects.
    // -------------------------------------------------------------------------

    /// Constant forecast with independent unit-variance steps.
    struct Constant(f64);

    impl TrainedModel for Constant {
        fn forecast(
            &self, horizon: usize, _exog: Option<ArrayView2<'_, f64>>,
        ) -> ImpactResult<Forecast> {
            Forecast::new(Array1::from_elem(horizon, self.0), Array1::ones(horizon))
        }
    }

    fn matrix(values: Array1<f64>) -> ObservationMatrix {
        ObservationMatrix::new(values, None).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Pointwise effects, their running sum and the summary agree.
    //
    // Given
    // -----
    // - Forecast of 10 with unit variance for 4 steps.
    // - Observations 11, 12, 10, 13.
    //
    // Expect
    // ------
    // - Effects 1, 2, 0, 3; cumulative 6; average 1.5; relative 6/40.
    // - Cumulative sd = sqrt(4) = 2, so z = 3 and p ≈ 0.0027.
    fn effects_add_up() {
        let pre = matrix(array![9.0, 10.0, 11.0]);
        let post = matrix(array![11.0, 12.0, 10.0, 13.0]);

        let r = infer(&Constant(10.0), &pre, &post, 0.05, None).unwrap();

        assert_eq!(r.len(), 4);
        assert_eq!(r.series(|p| p.effect), array![1.0, 2.0, 0.0, 3.0]);
        let sum: f64 = r.points().iter().map(|p| p.effect).sum();
        assert_abs_diff_eq!(r.cumulative_effect(), sum, epsilon = 1e-12);
        assert_abs_diff_eq!(r.points()[3].cumulative_effect, sum, epsilon = 1e-12);
        assert_abs_diff_eq!(r.average_effect(), sum / 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.relative_effect(), 6.0 / 40.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.p_value(), 0.002_699_8, epsilon = 1e-6);

        let p0 = r.points()[0];
        assert_abs_diff_eq!(p0.effect_lower, 11.0 - p0.predicted_upper, epsilon = 1e-12);
        assert!(p0.effect_lower < p0.effect && p0.effect < p0.effect_upper);
    }

    #[test]
    // Purpose
    // -------
    // With standardization, forecasts and observations are reported in
    // original units.
    fn standardized_inputs_are_inverted() {
        let params = StandardizationParams { mu: array![100.0], sigma: array![10.0] };
        let pre = matrix(array![-1.0, 0.0, 1.0]);
        let post = matrix(array![0.5, 0.5, 0.5]);

        let r = infer(&Constant(0.0), &pre, &post, 0.05, Some(&params)).unwrap();

        assert_eq!(r.pre_response(), array![90.0, 100.0, 110.0]);
        let p = r.points()[1];
        assert_abs_diff_eq!(p.observed, 105.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.predicted, 100.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.predicted_upper - p.predicted, 1.959_964 * 10.0, epsilon = 1e-4);
        assert_abs_diff_eq!(r.cumulative_effect(), 15.0, epsilon = 1e-12);
    }

    #[test]
    fn invalid_alpha_and_missing_response_fail() {
        let pre = matrix(array![1.0, 2.0, 3.0]);
        let post = matrix(array![1.0, f64::NAN, 3.0]);

        assert_eq!(
            infer(&Constant(1.0), &pre, &pre, 1.5, None),
            Err(ImpactError::InvalidAlpha { alpha: 1.5 })
        );
        assert_eq!(
            infer(&Constant(1.0), &pre, &post, 0.05, None),
            Err(ImpactError::MissingPostResponse { row: 1 })
        );
    }

    #[test]
    fn zero_prediction_sum_is_reported() {
        let pre = matrix(array![1.0, 2.0, 3.0]);

        assert!(matches!(
            infer(&Constant(0.0), &pre, &pre, 0.05, None),
            Err(ImpactError::UndefinedRelativeEffect { .. })
        ));
    }
}
