//! Column-wise z-scoring fitted on the pre-period only.
//!
//! Missing values are ignored when computing statistics and stay missing
//! after the transform. A column whose pre-period standard deviation is zero
//! (or undefined) is refused rather than patched with a substitute scale.
use ndarray::{Array1, ArrayView1};

use crate::impact::{
    core::matrix::ObservationMatrix,
    errors::{ImpactError, ImpactResult},
};

/// Per-column mean and sample standard deviation (`ddof = 1`).
#[derive(Debug, Clone, PartialEq)]
pub struct StandardizationParams {
    pub mu: Array1<f64>,
    pub sigma: Array1<f64>,
}

impl StandardizationParams {
    /// Fit on `pre`.
    ///
    /// # Errors
    /// [`ImpactError::DegenerateColumn`] for a column with fewer than two
    /// observed values or zero spread.
    pub fn fit(pre: &ObservationMatrix) -> ImpactResult<Self> {
        let n_cols = pre.n_covariates() + 1;
        let mut mu = Array1::zeros(n_cols);
        let mut sigma = Array1::zeros(n_cols);
        for (column, col) in pre.values().columns().into_iter().enumerate() {
            let (m, s) = nan_mean_std(col);
            if !(s.is_finite() && s > 0.0) {
                return Err(ImpactError::DegenerateColumn { column, sigma: s });
            }
            mu[column] = m;
            sigma[column] = s;
        }
        log::debug!("standardization fitted: mu = {mu}, sigma = {sigma}");
        Ok(Self { mu, sigma })
    }

    /// `(x - mu) / sigma` column-wise.
    pub fn apply(&self, data: &ObservationMatrix) -> ObservationMatrix {
        data.map_columns(|j, v| (v - self.mu[j]) / self.sigma[j])
    }

    /// Exact inverse of [`apply`](Self::apply).
    pub fn invert(&self, data: &ObservationMatrix) -> ObservationMatrix {
        data.map_columns(|j, v| v * self.sigma[j] + self.mu[j])
    }

    /// Response-column values back to original units.
    pub fn invert_response(&self, values: ArrayView1<'_, f64>) -> Array1<f64> {
        values.mapv(|v| v * self.sigma[0] + self.mu[0])
    }

    /// Response-column variances back to original units.
    pub fn invert_response_variance(&self, variances: ArrayView1<'_, f64>) -> Array1<f64> {
        let scale = self.sigma[0] * self.sigma[0];
        variances.mapv(|v| v * scale)
    }
}

/// NaN-aware mean and sample standard deviation. The deviation is NaN when
/// fewer than two values are observed.
fn nan_mean_std(col: ArrayView1<'_, f64>) -> (f64, f64) {
    let observed: Vec<f64> = col.iter().copied().filter(|v| !v.is_nan()).collect();
    let n = observed.len();
    if n < 2 {
        let mean = observed.first().copied().unwrap_or(f64::NAN);
        return (mean, f64::NAN);
    }
    let mean = observed.iter().sum::<f64>() / n as f64;
    let ss: f64 = observed.iter().map(|v| (v - mean).powi(2)).sum();
    (mean, (ss / (n - 1) as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn matrix(values: ndarray::Array2<f64>) -> ObservationMatrix {
        ObservationMatrix::new(values, None).unwrap()
    }

    #[test]
    fn fit_uses_sample_deviation_and_skips_nan() {
        let m = matrix(array![[1.0, 10.0], [f64::NAN, 20.0], [3.0, 30.0], [5.0, f64::NAN]]);

        let p = StandardizationParams::fit(&m).unwrap();

        assert_abs_diff_eq!(p.mu[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.sigma[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.mu[1], 20.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.sigma[1], 10.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // `invert(apply(d))` restores `d`, missing cells included.
    fn apply_then_invert_round_trips() {
        let m = matrix(array![[3.2, -1.0], [7.9, 0.5], [f64::NAN, 2.0], [1.1, 4.5], [6.6, -3.3]]);
        let p = StandardizationParams::fit(&m).unwrap();

        let z = p.apply(&m);
        let back = p.invert(&z);

        for (a, b) in m.values().iter().zip(back.values().iter()) {
            if a.is_nan() {
                assert!(b.is_nan());
            } else {
                assert_abs_diff_eq!(a, b, epsilon = 1e-12);
            }
        }
        let z_resp: Vec<f64> = z.response().iter().copied().filter(|v| !v.is_nan()).collect();
        assert_abs_diff_eq!(z_resp.iter().sum::<f64>(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_column_is_degenerate() {
        let m = matrix(array![[1.0, 4.0], [2.0, 4.0], [3.0, 4.0]]);

        assert_eq!(
            StandardizationParams::fit(&m),
            Err(ImpactError::DegenerateColumn { column: 1, sigma: 0.0 })
        );
    }

    #[test]
    fn single_observation_is_degenerate() {
        let nan = f64::NAN;
        let m = matrix(array![[1.0, nan], [2.0, 7.0], [3.0, nan]]);

        assert!(matches!(
            StandardizationParams::fit(&m),
            Err(ImpactError::DegenerateColumn { column: 1, .. })
        ));
    }

    #[test]
    fn response_inversion_scales_variance_by_sigma_squared() {
        let p = StandardizationParams { mu: array![10.0], sigma: array![3.0] };

        assert_eq!(p.invert_response(array![0.0, 1.0].view()), array![10.0, 13.0]);
        assert_eq!(p.invert_response_variance(array![1.0, 2.0].view()), array![9.0, 18.0]);
    }
}
