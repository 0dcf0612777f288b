//! loglik_optimizer — argmin-backed maximum-likelihood estimation.
//!
//! Purpose
//! -------
//! Fit models by **maximizing** a log-likelihood `ℓ(θ)` over an
//! unconstrained parameter vector. Models implement [`LogLikelihood`] and
//! call [`maximize`]; everything argmin-specific stays behind this module.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] turns `ℓ` into the cost `c(θ) = -ℓ(θ)` and
//!   falls back to central then forward finite differences when the model
//!   has no analytic gradient.
//! - [`builders`] assembles L-BFGS with a More–Thuente or Hager–Zhang line
//!   search; [`run::run_lbfgs`] drives the executor and normalizes the final
//!   state into an [`OptimOutcome`].
//! - [`validation`] holds the finiteness and dimension checks shared by the
//!   configuration types and the outcome.
//!
//! Conventions
//! -----------
//! - User gradients are `∇ℓ(θ)`; the adapter negates them.
//! - [`OptimOutcome::value`] is the log-likelihood at `θ̂`, never the cost.
//! - Failures are [`OptError`](crate::optimization::errors::OptError)
//!   values. Errors raised inside a log-likelihood come back out of argmin
//!   unchanged.
//!
//! Testing notes
//! -------------
//! - `adapter` tests run [`maximize`] end to end on a weighted quadratic,
//!   with and without an analytic gradient.
//! - The local-level model in `impact::models` is the production consumer
//!   and its tests exercise the analytic-gradient path on state-space data.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
