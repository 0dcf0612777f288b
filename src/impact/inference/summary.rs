//! Average and cumulative views of the post-period effect.
use crate::impact::errors::{ImpactError, ImpactResult};

/// Actual vs. counterfactual over the post-period, in one view.
///
/// In the cumulative view values are sums over the post-period; in the
/// average view they are those sums divided by its length. Relative effects
/// are identical in both views.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSummary {
    pub actual: f64,
    pub predicted: f64,
    pub predicted_lower: f64,
    pub predicted_upper: f64,
    pub abs_effect: f64,
    pub abs_effect_lower: f64,
    pub abs_effect_upper: f64,
    pub rel_effect: f64,
    pub rel_effect_lower: f64,
    pub rel_effect_upper: f64,
}

impl EffectSummary {
    fn scaled(&self, by: f64) -> EffectSummary {
        EffectSummary {
            actual: self.actual / by,
            predicted: self.predicted / by,
            predicted_lower: self.predicted_lower / by,
            predicted_upper: self.predicted_upper / by,
            abs_effect: self.abs_effect / by,
            abs_effect_lower: self.abs_effect_lower / by,
            abs_effect_upper: self.abs_effect_upper / by,
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactSummary {
    pub average: EffectSummary,
    pub cumulative: EffectSummary,
}

impl ImpactSummary {
    /// Build both views from post-period totals.
    ///
    /// `predicted_sd` is the standard deviation of the predicted sum and `z`
    /// the two-sided critical value; `n` is the post-period length.
    ///
    /// # Errors
    /// [`ImpactError::UndefinedRelativeEffect`] when the predicted sum is 0.
    pub fn from_totals(
        actual: f64, predicted: f64, predicted_sd: f64, z: f64, n: usize,
    ) -> ImpactResult<Self> {
        if predicted == 0.0 {
            return Err(ImpactError::UndefinedRelativeEffect { predicted_sum: predicted });
        }
        let predicted_lower = predicted - z * predicted_sd;
        let predicted_upper = predicted + z * predicted_sd;
        let abs_effect = actual - predicted;
        let abs_effect_lower = actual - predicted_upper;
        let abs_effect_upper = actual - predicted_lower;
        let (lo, hi) = (abs_effect_lower / predicted, abs_effect_upper / predicted);

        let cumulative = EffectSummary {
            actual,
            predicted,
            predicted_lower,
            predicted_upper,
            abs_effect,
            abs_effect_lower,
            abs_effect_upper,
            rel_effect: abs_effect / predicted,
            rel_effect_lower: lo.min(hi),
            rel_effect_upper: lo.max(hi),
        };
        Ok(Self { average: cumulative.scaled(n as f64), cumulative })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn totals_produce_consistent_views() {
        let s = ImpactSummary::from_totals(120.0, 100.0, 5.0, 2.0, 10).unwrap();

        assert_eq!(s.cumulative.abs_effect, 20.0);
        assert_eq!(s.cumulative.abs_effect_lower, 10.0);
        assert_eq!(s.cumulative.abs_effect_upper, 30.0);
        assert_abs_diff_eq!(s.cumulative.rel_effect, 0.2, epsilon = 1e-15);
        assert_abs_diff_eq!(s.average.actual, 12.0, epsilon = 1e-15);
        assert_abs_diff_eq!(s.average.abs_effect, 2.0, epsilon = 1e-15);
        assert_eq!(s.average.rel_effect, s.cumulative.rel_effect);
    }

    #[test]
    fn negative_prediction_keeps_relative_bounds_ordered() {
        let s = ImpactSummary::from_totals(-8.0, -10.0, 1.0, 2.0, 4).unwrap();

        assert!(s.cumulative.rel_effect_lower <= s.cumulative.rel_effect);
        assert!(s.cumulative.rel_effect <= s.cumulative.rel_effect_upper);
    }

    #[test]
    fn zero_prediction_is_undefined() {
        assert_eq!(
            ImpactSummary::from_totals(1.0, 0.0, 1.0, 2.0, 3),
            Err(ImpactError::UndefinedRelativeEffect { predicted_sum: 0.0 })
        );
    }
}
