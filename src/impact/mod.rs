//! impact — causal effect of an intervention on a time series.
//!
//! Purpose
//! -------
//! Estimate what a response would have looked like without an intervention
//! by training a latent-state model on the pre-period only, forecasting the
//! post-period, and comparing the forecast with what was observed.
//!
//! Key behaviors
//! -------------
//! - [`core`] validates input, resolves periods to half-open offsets and
//!   z-scores data on pre-period statistics.
//! - [`models`] defines the model capability contract and ships a
//!   local-level model with regression fitted by maximum likelihood.
//! - [`inference`] turns the predictive distribution into pointwise and
//!   cumulative effects, intervals and a two-sided tail probability.
//! - [`analysis::CausalImpact`] runs the stages in order.
//!
//! Invariants & assumptions
//! ------------------------
//! - The pre-period ends no later than the post-period starts; nothing from
//!   the post-period reaches model training or standardization.
//! - Reported values are always in original units.
//! - Failures are [`errors::ImpactError`] values; nothing panics on user
//!   input.
//!
//! Testing notes
//! -------------
//! - Each stage has unit tests next to its code.
//! - `tests/integration_impact_pipeline.rs` runs complete analyses on
//!   synthetic series, with and without standardization, with date labels
//!   and with a user-supplied model.

pub mod analysis;
pub mod core;
pub mod errors;
pub mod inference;
pub mod models;

pub mod prelude {
    pub use super::analysis::CausalImpact;
    pub use super::core::{
        index::TimeIndex,
        matrix::{ObservationMatrix, RawData},
        options::ImpactOptions,
        periods::{Period, PeriodBound, PeriodRole, PeriodSpec},
        prepare::{PrePostSplit, prepare},
        standardize::StandardizationParams,
    };
    pub use super::errors::{ImpactError, ImpactResult};
    pub use super::inference::{
        posterior::{InferenceResult, PointEffect, infer},
        summary::{EffectSummary, ImpactSummary},
    };
    pub use super::models::{
        adapter::{ModelOrigin, ModelSpec, adopt, build_default},
        local_level::{LocalLevelModel, TrainedLocalLevel},
        traits::{Forecast, LatentStateModel, LevelComponent, ModelCapability, TrainedModel},
    };
}
