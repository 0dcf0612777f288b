//! Analysis configuration.
use crate::{
    impact::errors::{ImpactError, ImpactResult},
    optimization::loglik_optimizer::MLEOptions,
};

pub const DEFAULT_ALPHA: f64 = 0.05;

/// Settings for one analysis.
///
/// - `alpha`: two-sided level of every reported interval, in `(0, 1)`.
/// - `standardize`: z-score data on pre-period statistics before fitting
///   the default model. Ignored for user-supplied models.
/// - `mle_opts`: optimizer settings for the default model.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactOptions {
    pub alpha: f64,
    pub standardize: bool,
    pub mle_opts: MLEOptions,
}

impl ImpactOptions {
    /// # Errors
    /// [`ImpactError::InvalidAlpha`] unless `0 < alpha < 1`.
    pub fn new(alpha: f64, standardize: bool, mle_opts: MLEOptions) -> ImpactResult<Self> {
        validate_alpha(alpha)?;
        Ok(Self { alpha, standardize, mle_opts })
    }
}

impl Default for ImpactOptions {
    fn default() -> Self {
        Self { alpha: DEFAULT_ALPHA, standardize: true, mle_opts: MLEOptions::default() }
    }
}

/// Reject `alpha` outside the open unit interval (NaN included).
pub fn validate_alpha(alpha: f64) -> ImpactResult<()> {
    if alpha > 0.0 && alpha < 1.0 { Ok(()) } else { Err(ImpactError::InvalidAlpha { alpha }) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_must_be_strictly_inside_unit_interval() {
        for alpha in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(validate_alpha(alpha), Err(ImpactError::InvalidAlpha { .. })));
        }
        assert!(ImpactOptions::new(0.05, false, MLEOptions::default()).is_ok());
    }

    #[test]
    fn defaults() {
        let opts = ImpactOptions::default();

        assert_eq!(opts.alpha, 0.05);
        assert!(opts.standardize);
    }
}
