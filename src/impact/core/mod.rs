//! core — data containers and the preparation stages of an analysis.
//!
//! - [`index`]: positional or date row index and label lookup.
//! - [`matrix`]: raw-input coercion into a validated [`ObservationMatrix`].
//! - [`periods`]: period bounds resolved to half-open row offsets.
//! - [`prepare`]: period ordering checks and the pre/post split.
//! - [`standardize`]: pre-period z-scoring and its inverse.
//! - [`options`]: [`ImpactOptions`] for a whole analysis.
//!
//! [`ObservationMatrix`]: matrix::ObservationMatrix
//! [`ImpactOptions`]: options::ImpactOptions

pub mod index;
pub mod matrix;
pub mod options;
pub mod periods;
pub mod prepare;
pub mod standardize;
