//! Data preparation: coerce, resolve both periods, enforce ordering, slice.
use crate::impact::{
    core::{
        index::TimeIndex,
        matrix::{ObservationMatrix, RawData},
        periods::{Period, PeriodRole, PeriodSpec, resolve},
    },
    errors::{ImpactError, ImpactResult},
};

/// Disjoint pre/post windows cut from one observation matrix.
///
/// Both slices are owned copies; `pre_period.end <= post_period.start`.
#[derive(Debug, Clone, PartialEq)]
pub struct PrePostSplit {
    pub pre: ObservationMatrix,
    pub post: ObservationMatrix,
    pub pre_period: Period,
    pub post_period: Period,
}

/// Validate `raw`, resolve both periods against its index and slice.
///
/// # Errors
/// Any data error from [`ObservationMatrix::new`], any period error from
/// [`resolve`], and [`ImpactError::PeriodOverlap`] from [`split`].
pub fn prepare(
    raw: impl Into<RawData>, index: Option<TimeIndex>, pre_period: &PeriodSpec,
    post_period: &PeriodSpec,
) -> ImpactResult<PrePostSplit> {
    let data = ObservationMatrix::new(raw, index)?;
    split(&data, pre_period, post_period)
}

/// Resolve both periods against an already validated matrix and slice it.
///
/// Everything the post-period needs downstream is checked here, so a split
/// that succeeds never fails later for missing post-period content.
///
/// # Errors
/// Period resolution errors, then [`ImpactError::PeriodOverlap`] when the
/// pre-period ends after the post-period starts, then the errors of
/// [`check_post_content`].
pub fn split(
    data: &ObservationMatrix, pre_period: &PeriodSpec, post_period: &PeriodSpec,
) -> ImpactResult<PrePostSplit> {
    let pre = resolve(pre_period, data.index(), PeriodRole::Pre)?;
    let post = resolve(post_period, data.index(), PeriodRole::Post)?;
    if pre.end > post.start {
        return Err(ImpactError::PeriodOverlap { pre_end: pre.end, post_start: post.start });
    }
    check_post_content(data, post)?;
    log::debug!(
        "split {} rows into pre [{}, {}) and post [{}, {})",
        data.n_rows(),
        pre.start,
        pre.end,
        post.start,
        post.end
    );
    Ok(PrePostSplit {
        pre: data.slice_rows(pre.start, pre.end),
        post: data.slice_rows(post.start, post.end),
        pre_period: pre,
        post_period: post,
    })
}

/// Reject missing values inside the post-period window.
///
/// The response is compared with the forecast and covariates drive it, so
/// neither may be missing there. Rows are reported in `data`'s numbering.
///
/// # Errors
/// - [`ImpactError::MissingPostResponse`] for the first missing response.
/// - [`ImpactError::MissingCovariateValue`] for the first missing covariate,
///   `column` counting covariates from 0.
pub fn check_post_content(data: &ObservationMatrix, post: Period) -> ImpactResult<()> {
    let response = data.response();
    let covariates = data.covariates();
    for row in post.start..post.end {
        if !response[row].is_finite() {
            return Err(ImpactError::MissingPostResponse { row });
        }
        if let Some(column) = covariates.row(row).iter().position(|v| !v.is_finite()) {
            return Err(ImpactError::MissingCovariateValue { row, column });
        }
    }
    Ok(())
}
