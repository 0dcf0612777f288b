//! Analysis orchestrator: one ordered pass from raw data to effects.
//!
//! Purpose
//! -------
//! Run the stages in a fixed sequence, each producing an immutable value
//! consumed by the next:
//!
//! 1. validate options,
//! 2. prepare (coerce, resolve periods, split, check post-period content),
//! 3. standardize (default model only, when enabled),
//! 4. build the default model or adopt the caller's,
//! 5. train,
//! 6. infer.
//!
//! Any failure stops the pass; there is no partial result.
use crate::impact::{
    core::{
        index::TimeIndex,
        matrix::{ObservationMatrix, RawData},
        options::{ImpactOptions, validate_alpha},
        periods::PeriodSpec,
        prepare::{PrePostSplit, split},
        standardize::StandardizationParams,
    },
    errors::ImpactResult,
    inference::posterior::{InferenceResult, infer},
    models::{
        adapter::{ModelOrigin, adopt, build_default},
        local_level::TrainedLocalLevel,
        traits::LatentStateModel,
    },
};

/// A finished causal-impact analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct CausalImpact {
    split: PrePostSplit,
    standardization: Option<StandardizationParams>,
    fitted: Option<TrainedLocalLevel>,
    inference: InferenceResult,
    options: ImpactOptions,
    model_origin: ModelOrigin,
}

impl CausalImpact {
    /// Analyse `data` with the default local-level model.
    ///
    /// # Errors
    /// The first failing stage's [`ImpactError`](crate::impact::errors::ImpactError).
    pub fn run(
        data: &ObservationMatrix, pre_period: &PeriodSpec, post_period: &PeriodSpec,
        options: ImpactOptions,
    ) -> ImpactResult<Self> {
        validate_alpha(options.alpha)?;
        let split = split(data, pre_period, post_period)?;

        let standardization = if options.standardize {
            Some(StandardizationParams::fit(&split.pre)?)
        } else {
            None
        };
        let (pre, post) = match &standardization {
            Some(params) => (params.apply(&split.pre), params.apply(&split.post)),
            None => (split.pre.clone(), split.post.clone()),
        };

        let spec = build_default(&pre, &options.mle_opts)?;
        let trained = spec.train()?;
        let inference = infer(&trained, &pre, &post, options.alpha, standardization.as_ref())?;

        Ok(Self {
            split,
            standardization,
            fitted: Some(trained),
            inference,
            options,
            model_origin: ModelOrigin::Default,
        })
    }

    /// Coerce raw input first, then [`run`](Self::run).
    pub fn from_raw(
        raw: impl Into<RawData>, index: Option<TimeIndex>, pre_period: &PeriodSpec,
        post_period: &PeriodSpec, options: ImpactOptions,
    ) -> ImpactResult<Self> {
        let data = ObservationMatrix::new(raw, index)?;
        Self::run(&data, pre_period, post_period, options)
    }

    /// Analyse `data` with a caller-supplied model.
    ///
    /// The model is trained on its own data in its own units, so
    /// `options.standardize` does not apply.
    ///
    /// # Errors
    /// As [`run`](Self::run), plus capability errors from [`adopt`].
    pub fn run_with_model<M: LatentStateModel>(
        data: &ObservationMatrix, pre_period: &PeriodSpec, post_period: &PeriodSpec, model: M,
        options: ImpactOptions,
    ) -> ImpactResult<Self> {
        validate_alpha(options.alpha)?;
        let split = split(data, pre_period, post_period)?;
        let spec = adopt(model, &split.pre)?;
        if options.standardize {
            log::warn!("standardization skipped: user-supplied models are used in their own units");
        }
        let trained = spec.train()?;
        let inference = infer(&trained, &split.pre, &split.post, options.alpha, None)?;

        Ok(Self {
            split,
            standardization: None,
            fitted: None,
            inference,
            options,
            model_origin: ModelOrigin::UserSupplied,
        })
    }

    /// Pre/post windows in original units.
    pub fn split(&self) -> &PrePostSplit {
        &self.split
    }

    pub fn standardization(&self) -> Option<&StandardizationParams> {
        self.standardization.as_ref()
    }

    /// Fitted default model; `None` for user-supplied models.
    pub fn fitted_model(&self) -> Option<&TrainedLocalLevel> {
        self.fitted.as_ref()
    }

    pub fn inference(&self) -> &InferenceResult {
        &self.inference
    }

    pub fn options(&self) -> &ImpactOptions {
        &self.options
    }

    pub fn model_origin(&self) -> ModelOrigin {
        self.model_origin
    }
}
