//! numerical_stability — overflow-safe transforms between θ-space and
//! model parameters.
//!
//! The local-level likelihood optimizes its two variances as unconstrained
//! reals; [`transformations::to_variance`] maps them back with a softplus
//! plus a small floor, and [`transformations::safe_logistic`] supplies the
//! chain-rule factor for the analytic gradient. Nothing here logs or
//! allocates.

pub mod transformations;

pub use self::transformations::{
    VARIANCE_FLOOR, from_variance, safe_logistic, safe_softplus, safe_softplus_inv, to_variance,
};

pub mod prelude {
    pub use super::transformations::{
        VARIANCE_FLOOR, from_variance, safe_logistic, safe_softplus, safe_softplus_inv,
        to_variance,
    };
}
