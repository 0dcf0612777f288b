//! optimization — MLE stack, numerical helpers, and its error surface.
//!
//! Purpose
//! -------
//! Fit state-space models by maximum likelihood without exposing argmin to
//! the model layer. A model implements
//! [`LogLikelihood`](loglik_optimizer::LogLikelihood), maps its constrained
//! parameters through [`numerical_stability`], and calls
//! [`maximize`](loglik_optimizer::maximize).
//!
//! Conventions
//! -----------
//! - Solvers minimize `c(θ) = -ℓ(θ)`; every user-facing value is `ℓ`.
//! - Parameters, gradients and counters use the aliases in
//!   [`loglik_optimizer::types`].
//! - Fallible entrypoints return [`OptResult`](errors::OptResult); raw argmin
//!   errors never cross this module's boundary.
//! - Progress is reported through the `log` facade at `debug`/`info`, plus
//!   argmin's slog observer behind the `obs_slog` feature.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
