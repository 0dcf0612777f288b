//! Bridge from a [`LogLikelihood`] to argmin's minimization traits.
//!
//! argmin minimizes, so the adapter exposes the cost `c(θ) = -ℓ(θ)` and the
//! cost gradient `-∇ℓ(θ)`. Models without an analytic gradient get a finite
//! difference of the cost itself, which needs no sign flip.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }

    /// Finite-difference gradient of the cost.
    ///
    /// Central differences first. If any probe failed or the result is not
    /// finite, retry once with forward differences, which stay on one side
    /// of `θ`. The finitediff closures must return `f64`, so the first probe
    /// error is parked in a cell and re-raised afterwards.
    fn numeric_gradient(&self, theta: &Theta) -> Result<Grad, Error> {
        let probe_err: RefCell<Option<Error>> = RefCell::new(None);
        let cost = |t: &Theta| -> f64 {
            self.cost(t).unwrap_or_else(|e| {
                let mut slot = probe_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            })
        };

        let central = theta.central_diff(&cost);
        if probe_err.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
            return Ok(central);
        }

        probe_err.replace(None);
        let forward = theta.forward_diff(&cost);
        if let Some(err) = probe_err.take() {
            return Err(err);
        }
        validate_grad(&forward, theta.len())?;
        Ok(forward)
    }
}

impl<F: LogLikelihood> CostFunction for ArgMinAdapter<'_, F> {
    type Param = Theta;
    type Output = Cost;

    /// `-ℓ(θ)`; a non-finite log-likelihood is an error, not a cost.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let ll = self.f.value(theta, self.data)?;
        if !ll.is_finite() {
            return Err(OptError::NonFiniteCost { value: ll }.into());
        }
        Ok(-ll)
    }
}

impl<F: LogLikelihood> Gradient for ArgMinAdapter<'_, F> {
    type Param = Theta;
    type Gradient = Grad;

    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => self.numeric_gradient(theta),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::OptResult,
        loglik_optimizer::{MLEOptions, maximize},
    };
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Sign conventions of the adapter, the finite-difference fallback, error
    // propagation out of the log-likelihood, and a full `maximize` run on a
    // concave quadratic with a known optimum.
    // -------------------------------------------------------------------------

    /// ℓ(θ) = -Σ w_i (θ_i - c_i)²; the maximum sits at `c`.
    struct Quadratic {
        analytic: bool,
    }

    struct Target {
        center: Theta,
        weights: Theta,
    }

    impl LogLikelihood for Quadratic {
        type Data = Target;

        fn value(&self, theta: &Theta, data: &Target) -> OptResult<f64> {
            if theta.len() != data.center.len() {
                return Err(OptError::ThetaLengthMismatch {
                    expected: data.center.len(),
                    actual: theta.len(),
                });
            }
            let d = theta - &data.center;
            Ok(-(&d * &d * &data.weights).sum())
        }

        fn check(&self, theta: &Theta, data: &Target) -> OptResult<()> {
            self.value(theta, data).map(|_| ())
        }

        fn grad(&self, theta: &Theta, data: &Target) -> OptResult<Grad> {
            if !self.analytic {
                return Err(OptError::GradientNotImplemented);
            }
            Ok((theta - &data.center) * &data.weights * -2.0)
        }
    }

    fn target() -> Target {
        Target { center: array![1.5, -0.5], weights: array![1.0, 4.0] }
    }

    #[test]
    // Purpose
    // -------
    // Cost and gradient are the negated log-likelihood and its gradient.
    //
    // Given
    // -----
    // - θ = (0, 0), center (1.5, -0.5), weights (1, 4).
    //
    // Expect
    // ------
    // - cost = 1.5² + 4·0.5² = 3.25.
    // - cost gradient = 2·w·(θ - c) = (-3, 4).
    fn cost_and_gradient_flip_sign() {
        let model = Quadratic { analytic: true };
        let data = target();
        let adapter = ArgMinAdapter::new(&model, &data);
        let theta = array![0.0, 0.0];

        assert_abs_diff_eq!(adapter.cost(&theta).unwrap(), 3.25, epsilon = 1e-12);
        let g = adapter.gradient(&theta).unwrap();
        assert_abs_diff_eq!(g[0], -3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(g[1], 4.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Without an analytic gradient the finite-difference path agrees with
    // the closed form.
    fn finite_difference_fallback_matches_analytic() {
        let numeric = Quadratic { analytic: false };
        let exact = Quadratic { analytic: true };
        let data = target();
        let theta = array![0.2, 0.7];

        let g_fd = ArgMinAdapter::new(&numeric, &data).gradient(&theta).unwrap();
        let g_an = ArgMinAdapter::new(&exact, &data).gradient(&theta).unwrap();

        assert_abs_diff_eq!(g_fd[0], g_an[0], epsilon = 1e-5);
        assert_abs_diff_eq!(g_fd[1], g_an[1], epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // Errors raised by the log-likelihood survive the trip through argmin.
    //
    // Given
    // -----
    // - A θ of the wrong length.
    //
    // Expect
    // ------
    // - `OptError::ThetaLengthMismatch` after conversion.
    fn model_errors_round_trip_through_argmin() {
        let model = Quadratic { analytic: false };
        let data = target();
        let adapter = ArgMinAdapter::new(&model, &data);

        let err = adapter.gradient(&array![0.0, 0.0, 0.0]).unwrap_err();

        assert_eq!(OptError::from(err), OptError::ThetaLengthMismatch { expected: 2, actual: 3 });
    }

    #[test]
    fn maximize_finds_quadratic_peak_with_both_gradients() {
        let data = target();
        for analytic in [true, false] {
            let out = maximize(
                &Quadratic { analytic },
                array![0.0, 0.0],
                &data,
                &MLEOptions::default(),
            )
            .unwrap();

            assert!(out.converged);
            assert_abs_diff_eq!(out.theta_hat[0], 1.5, epsilon = 1e-4);
            assert_abs_diff_eq!(out.theta_hat[1], -0.5, epsilon = 1e-4);
            assert_abs_diff_eq!(out.value, 0.0, epsilon = 1e-7);
        }
    }
}
