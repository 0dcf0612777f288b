//! Uniform access to the counterfactual model, built-in or user-supplied.
use crate::{
    impact::{
        core::matrix::ObservationMatrix,
        errors::{ImpactError, ImpactResult},
        models::{
            local_level::LocalLevelModel,
            traits::{LatentStateModel, ModelCapability},
        },
    },
    optimization::loglik_optimizer::MLEOptions,
};

/// Where the model in a [`ModelSpec`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelOrigin {
    /// Local level built from the (possibly standardized) pre-period.
    Default,
    /// Caller-supplied model, validated by [`adopt`].
    UserSupplied,
}

/// A model that passed capability checks, ready to train.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec<M> {
    model: M,
    origin: ModelOrigin,
}

impl<M: LatentStateModel> ModelSpec<M> {
    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn origin(&self) -> ModelOrigin {
        self.origin
    }

    /// Fit the model. Neither the spec nor any data slice is modified.
    ///
    /// # Errors
    /// Whatever the model's own training reports.
    pub fn train(&self) -> ImpactResult<M::Trained> {
        self.model.train()
    }
}

/// Local-level model on `pre`, with its covariates as regressors.
///
/// # Errors
/// See [`LocalLevelModel::from_matrix`].
pub fn build_default(
    pre: &ObservationMatrix, mle_opts: &MLEOptions,
) -> ImpactResult<ModelSpec<LocalLevelModel>> {
    let model = LocalLevelModel::from_matrix(pre, mle_opts.clone())?;
    Ok(ModelSpec { model, origin: ModelOrigin::Default })
}

/// Validate a user model against the pre-period it is meant to describe.
///
/// Capabilities are checked in a fixed order: level, data, exog. Regressors
/// are required exactly when `pre` has covariates.
///
/// # Errors
/// - [`ImpactError::IncompleteModel`] naming the first missing capability.
/// - [`ImpactError::ModelDataMismatch`] if the training series length
///   differs from the pre-period.
/// - [`ImpactError::ExogShapeMismatch`] if the regressor block is not
///   `(n_pre, n_covariates)`.
pub fn adopt<M: LatentStateModel>(model: M, pre: &ObservationMatrix) -> ImpactResult<ModelSpec<M>> {
    if model.level().is_none() {
        return Err(ImpactError::IncompleteModel {
            capability: ModelCapability::Level,
            reason: "no level/state specification declared",
        });
    }

    let n_pre = pre.n_rows();
    let data = model.data().ok_or(ImpactError::IncompleteModel {
        capability: ModelCapability::Data,
        reason: "training data is not accessible",
    })?;
    if data.len() != n_pre {
        return Err(ImpactError::ModelDataMismatch { expected: n_pre, found: data.len() });
    }

    let k = pre.n_covariates();
    match model.exog() {
        None if k > 0 => {
            return Err(ImpactError::IncompleteModel {
                capability: ModelCapability::Exog,
                reason: "data has covariates but the model has no regressors",
            });
        }
        Some(x) if x.dim() != (n_pre, k) => {
            return Err(ImpactError::ExogShapeMismatch { expected: (n_pre, k), found: x.dim() });
        }
        _ => {}
    }

    log::debug!("adopted user model: {n_pre} training rows, {k} regressors");
    Ok(ModelSpec { model, origin: ModelOrigin::UserSupplied })
}
