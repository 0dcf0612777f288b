//! inference — effects, intervals and significance from a forecast.
//!
//! - [`posterior`]: [`infer`](posterior::infer) and the per-step
//!   [`PointEffect`](posterior::PointEffect) records.
//! - [`summary`]: average and cumulative effect views.
//! - [`significance`]: normal critical values and tail probabilities.

pub mod posterior;
pub mod significance;
pub mod summary;
