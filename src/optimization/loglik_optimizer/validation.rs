//! Consistency checks shared by the optimizer configuration and outcome.
//!
//! Each helper maps a violated precondition onto a specific [`OptError`]
//! variant, carrying the offending index or value so failures during a fit
//! can be traced back to the parameter that caused them.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, Theta},
};

/// Check an optional tolerance and build the matching error on failure.
fn verify_tolerance(
    tol: Option<f64>, make_err: impl Fn(f64, &'static str) -> OptError,
) -> OptResult<()> {
    match tol {
        Some(t) if !t.is_finite() => Err(make_err(t, "Tolerance must be finite.")),
        Some(t) if t <= 0.0 => Err(make_err(t, "Tolerance must be positive.")),
        _ => Ok(()),
    }
}

/// Gradient-norm tolerance: `None`, or finite and strictly positive.
///
/// # Errors
/// [`OptError::InvalidTolGrad`] otherwise.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    verify_tolerance(tol, |tol, reason| OptError::InvalidTolGrad { tol, reason })
}

/// Cost-change tolerance: `None`, or finite and strictly positive.
///
/// # Errors
/// [`OptError::InvalidTolCost`] otherwise.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    verify_tolerance(tol, |tol, reason| OptError::InvalidTolCost { tol, reason })
}

/// Require `grad.len() == dim` and finite entries.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] on a length mismatch.
/// - [`OptError::InvalidGradient`] for the first non-finite entry.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    match grad.iter().position(|g| !g.is_finite()) {
        Some(index) => Err(OptError::InvalidGradient {
            index,
            value: grad[index],
            reason: "Gradient elements must be finite.",
        }),
        None => Ok(()),
    }
}

/// Unwrap the solver's best parameter vector, rejecting non-finite entries.
///
/// # Errors
/// - [`OptError::MissingThetaHat`] when argmin kept no best parameter.
/// - [`OptError::InvalidThetaHat`] for the first non-finite entry.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta = theta_hat.ok_or(OptError::MissingThetaHat)?;
    if let Some(index) = theta.iter().position(|v| !v.is_finite()) {
        return Err(OptError::InvalidThetaHat {
            index,
            value: theta[index],
            reason: "Parameter estimates must be finite.",
        });
    }
    Ok(theta)
}

/// A log-likelihood value must be finite; its sign is irrelevant.
pub fn validate_value(value: f64) -> OptResult<()> {
    if value.is_finite() { Ok(()) } else { Err(OptError::NonFiniteCost { value }) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn tolerances_reject_zero_negative_and_nan() {
        assert!(verify_tol_grad(None).is_ok());
        assert!(verify_tol_grad(Some(1e-8)).is_ok());
        assert!(matches!(verify_tol_grad(Some(0.0)), Err(OptError::InvalidTolGrad { .. })));
        assert!(matches!(verify_tol_cost(Some(-1.0)), Err(OptError::InvalidTolCost { .. })));
        assert!(matches!(verify_tol_cost(Some(f64::NAN)), Err(OptError::InvalidTolCost { .. })));
    }

    #[test]
    fn validate_grad_reports_first_bad_index() {
        let g = array![0.5, f64::INFINITY, f64::NAN];

        let err = validate_grad(&g, 3).unwrap_err();

        match err {
            OptError::InvalidGradient { index, .. } => assert_eq!(index, 1),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            validate_grad(&array![1.0], 2),
            Err(OptError::GradientDimMismatch { expected: 2, found: 1 })
        );
    }

    #[test]
    fn validate_theta_hat_handles_missing_and_nan() {
        assert_eq!(validate_theta_hat(None), Err(OptError::MissingThetaHat));
        assert!(matches!(
            validate_theta_hat(Some(array![0.0, f64::NAN])),
            Err(OptError::InvalidThetaHat { index: 1, .. })
        ));
        assert_eq!(validate_theta_hat(Some(array![1.0, 2.0])).unwrap(), array![1.0, 2.0]);
    }
}
