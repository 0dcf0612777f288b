//! Guarded scalar transforms for positive parameters.
//!
//! Variances are optimized on the real line and mapped back through
//! softplus. The cutoff `|x| > 20` keeps `exp` away from overflow; beyond it
//! softplus is `x` to within `f64` precision and the logistic is `1` or
//! `exp(x)`.

/// Lower bound added to every variance mapped out of θ-space.
///
/// Keeps the Kalman innovation variance away from zero when the optimizer
/// drives a softplus argument far into the negative tail.
pub const VARIANCE_FLOOR: f64 = 1e-10;

/// `ln(1 + exp(x))`, mapping ℝ → (0, ∞).
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}

/// Inverse of [`safe_softplus`] on `(0, ∞)`: `ln(exp(x) - 1)`.
///
/// Callers must pass a finite `x > 0`.
pub fn safe_softplus_inv(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp_m1().ln() }
}

/// Logistic `1 / (1 + exp(-x))`, the derivative of [`safe_softplus`].
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// `softplus(x) + VARIANCE_FLOOR`, the map from θ-space to a variance.
pub fn to_variance(x: f64) -> f64 {
    safe_softplus(x) + VARIANCE_FLOOR
}

/// Inverse of [`to_variance`]. Values at or below the floor are clamped just
/// above it first.
pub fn from_variance(v: f64) -> f64 {
    let excess = (v - VARIANCE_FLOOR).max(VARIANCE_FLOOR);
    safe_softplus_inv(excess)
}
