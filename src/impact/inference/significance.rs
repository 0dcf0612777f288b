//! Normal-theory critical values and tail probabilities for effect sums.
use statrs::distribution::{ContinuousCDF, Normal};

use crate::impact::{core::options::validate_alpha, errors::ImpactResult};

fn standard_normal() -> Normal {
    Normal::new(0.0, 1.0).expect("unit normal parameters are valid")
}

/// Two-sided critical value `z` with `P(|Z| > z) = alpha`.
///
/// # Errors
/// [`ImpactError::InvalidAlpha`](crate::impact::errors::ImpactError::InvalidAlpha)
/// unless `0 < alpha < 1`.
pub fn critical_value(alpha: f64) -> ImpactResult<f64> {
    validate_alpha(alpha)?;
    Ok(standard_normal().inverse_cdf(1.0 - 0.5 * alpha))
}

/// Two-sided tail probability of the observed sum under the no-effect null
/// `N(predicted_sum, sd²)`: `2 (1 - Φ(|z|))` with
/// `z = (observed_sum - predicted_sum) / sd`.
///
/// A degenerate null (`sd == 0`) gives `1` when the sums agree and `0`
/// otherwise.
pub fn tail_probability(observed_sum: f64, predicted_sum: f64, sd: f64) -> f64 {
    let diff = observed_sum - predicted_sum;
    if sd <= 0.0 {
        return if diff == 0.0 { 1.0 } else { 0.0 };
    }
    let z = (diff / sd).abs();
    (2.0 * (1.0 - standard_normal().cdf(z))).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::errors::ImpactError;
    use approx::assert_abs_diff_eq;

    #[test]
    fn critical_values_match_tables() {
        assert_abs_diff_eq!(critical_value(0.05).unwrap(), 1.959_964, epsilon = 1e-5);
        assert_abs_diff_eq!(critical_value(0.10).unwrap(), 1.644_854, epsilon = 1e-5);
        assert_eq!(critical_value(1.0), Err(ImpactError::InvalidAlpha { alpha: 1.0 }));
    }

    #[test]
    // Purpose
    // -------
    // The tail probability is symmetric in the sign of the effect and
    // bounded in [0, 1].
    fn tail_probability_is_two_sided() {
        let p_up = tail_probability(110.0, 100.0, 5.0);
        let p_down = tail_probability(90.0, 100.0, 5.0);

        assert_abs_diff_eq!(p_up, p_down, epsilon = 1e-15);
        assert_abs_diff_eq!(p_up, 0.045_500, epsilon = 1e-5);
        assert_abs_diff_eq!(tail_probability(100.0, 100.0, 5.0), 1.0, epsilon = 1e-15);
        assert!(tail_probability(1e6, 0.0, 1.0) >= 0.0);
    }

    #[test]
    fn degenerate_null_is_all_or_nothing() {
        assert_eq!(tail_probability(3.0, 3.0, 0.0), 1.0);
        assert_eq!(tail_probability(3.5, 3.0, 0.0), 0.0);
    }
}
