//! loglik_optimizer::types — numeric aliases shared by the MLE stack.
//!
//! Parameters and gradients are plain `ndarray` vectors over `f64`; the
//! solver aliases pin argmin's L-BFGS generics to those shapes so the rest
//! of the optimizer never spells out the backend types.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::Array1;
use std::collections::HashMap;

/// Unconstrained parameter vector `θ`.
pub type Theta = Array1<f64>;

/// Gradient with the same length as [`Theta`].
pub type Grad = Array1<f64>;

/// Scalar objective. Log-likelihood on the user side, `-ℓ` inside argmin.
pub type Cost = f64;

/// argmin function-evaluation counters keyed by name (e.g. `"cost_count"`).
pub type FnEvalMap = HashMap<String, u64>;

/// History size used when [`MLEOptions::lbfgs_mem`] is `None`.
///
/// [`MLEOptions::lbfgs_mem`]: super::MLEOptions::lbfgs_mem
pub const DEFAULT_LBFGS_MEM: usize = 7;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
