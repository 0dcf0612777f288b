//! models — counterfactual models behind a capability contract.
//!
//! - [`traits`]: [`LatentStateModel`] / [`TrainedModel`] and the validated
//!   [`Forecast`] every model returns.
//! - [`kalman`]: scalar filter with single-pass likelihood gradient.
//! - [`local_level`]: the default local-level-with-regression model.
//! - [`adapter`]: default construction and validation of user models.
//!
//! [`LatentStateModel`]: traits::LatentStateModel
//! [`TrainedModel`]: traits::TrainedModel
//! [`Forecast`]: traits::Forecast

pub mod adapter;
pub mod kalman;
pub mod local_level;
pub mod traits;
