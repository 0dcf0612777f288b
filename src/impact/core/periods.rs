//! Period resolution: user-facing bounds to half-open row offsets.
//!
//! Offsets behave like positional slicing, so `[70, 100]` selects rows
//! `70..100`. Date labels are inclusive of both endpoints and resolve to
//! `[loc(start), loc(end) + 1)`. Either way the result is a [`Period`] that
//! is never re-resolved.
use std::fmt;

use crate::impact::{
    core::index::TimeIndex,
    errors::{ImpactError, ImpactResult},
};

/// Minimum number of rows a resolved period must cover.
pub const MIN_PERIOD_SPAN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodRole {
    Pre,
    Post,
}

impl fmt::Display for PeriodRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodRole::Pre => write!(f, "pre_period"),
            PeriodRole::Post => write!(f, "post_period"),
        }
    }
}

/// One element of a loosely typed period pair, as it arrives from callers
/// that cannot use [`PeriodSpec`] directly (e.g. the Python bindings).
#[derive(Debug, Clone, PartialEq)]
pub enum PeriodBound {
    Offset(i64),
    Label(String),
}

/// A homogeneous pair of period bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodSpec {
    Offsets { start: usize, end: usize },
    Labels { start: String, end: String },
}

impl PeriodSpec {
    pub fn offsets(start: usize, end: usize) -> Self {
        PeriodSpec::Offsets { start, end }
    }

    pub fn labels(start: impl Into<String>, end: impl Into<String>) -> Self {
        PeriodSpec::Labels { start: start.into(), end: end.into() }
    }

    /// Build a spec from a two-element bound list.
    ///
    /// # Errors
    /// [`ImpactError::InvalidPeriod`] when the list does not have exactly two
    /// elements, mixes offsets and labels, or holds a negative offset.
    pub fn try_from_bounds(role: PeriodRole, bounds: &[PeriodBound]) -> ImpactResult<Self> {
        let [first, second] = bounds else {
            return Err(ImpactError::InvalidPeriod {
                role,
                reason: "period must have exactly two elements",
            });
        };
        match (first, second) {
            (PeriodBound::Offset(a), PeriodBound::Offset(b)) => {
                let to_usize = |v: i64| {
                    usize::try_from(v).map_err(|_| ImpactError::InvalidPeriod {
                        role,
                        reason: "offsets must be non-negative",
                    })
                };
                Ok(PeriodSpec::Offsets { start: to_usize(*a)?, end: to_usize(*b)? })
            }
            (PeriodBound::Label(a), PeriodBound::Label(b)) => {
                Ok(PeriodSpec::Labels { start: a.clone(), end: b.clone() })
            }
            _ => Err(ImpactError::InvalidPeriod {
                role,
                reason: "period bounds must both be offsets or both be dates",
            }),
        }
    }
}

/// Resolved half-open row range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: usize,
    pub end: usize,
}

impl Period {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Resolve `spec` against `index`.
///
/// Checks run in order: label lookup, `end >= start`, span of at least
/// [`MIN_PERIOD_SPAN`] rows, then `end <= index.len()`.
///
/// # Errors
/// - [`ImpactError::LabelsRequireDateIndex`] for labels on a positional index.
/// - [`ImpactError::PeriodNotFound`] for a label that is not in the index.
/// - [`ImpactError::InvalidPrePeriod`] / [`ImpactError::InvalidPostPeriod`]
///   when the end precedes the start.
/// - [`ImpactError::PeriodTooShort`] for fewer than three rows.
/// - [`ImpactError::PeriodOutOfRange`] past the last row.
pub fn resolve(spec: &PeriodSpec, index: &TimeIndex, role: PeriodRole) -> ImpactResult<Period> {
    let (start, end) = match spec {
        PeriodSpec::Offsets { start, end } => (*start, *end),
        PeriodSpec::Labels { start, end } => {
            if !index.is_dated() {
                return Err(ImpactError::LabelsRequireDateIndex { role });
            }
            let locate = |label: &String| {
                index
                    .get_loc(label)
                    .ok_or_else(|| ImpactError::PeriodNotFound { role, label: label.clone() })
            };
            (locate(start)?, locate(end)? + 1)
        }
    };
    if end < start {
        return Err(match role {
            PeriodRole::Pre => ImpactError::InvalidPrePeriod { start, end },
            PeriodRole::Post => ImpactError::InvalidPostPeriod { start, end },
        });
    }
    if end - start < MIN_PERIOD_SPAN {
        return Err(ImpactError::PeriodTooShort { role, start, end });
    }
    if end > index.len() {
        return Err(ImpactError::PeriodOutOfRange { role, start, end, len: index.len() });
    }
    log::debug!("{role} resolved to [{start}, {end})");
    Ok(Period { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn daily(n: usize) -> TimeIndex {
        TimeIndex::daily(NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(), n).unwrap()
    }

    #[test]
    fn offsets_resolve_half_open() {
        let p = resolve(&PeriodSpec::offsets(70, 100), &TimeIndex::Range(100), PeriodRole::Post)
            .unwrap();

        assert_eq!(p, Period { start: 70, end: 100 });
        assert_eq!(p.len(), 30);
    }

    #[test]
    // Purpose
    // -------
    // Inclusive date labels land on the same offsets as positional bounds.
    //
    // Given
    // -----
    // - Daily index from 2018-01-01 with 100 rows.
    // - Labels 2018-01-01 .. 2018-03-11 (the 70th day).
    //
    // Expect
    // ------
    // - `Period { start: 0, end: 70 }`, equal to offsets `[0, 70]`.
    fn labels_match_manual_offsets() {
        let idx = daily(100);

        let by_label =
            resolve(&PeriodSpec::labels("2018-01-01", "2018-03-11"), &idx, PeriodRole::Pre)
                .unwrap();
        let by_offset = resolve(&PeriodSpec::offsets(0, 70), &idx, PeriodRole::Pre).unwrap();

        assert_eq!(by_label, by_offset);
    }

    #[test]
    fn unknown_label_is_not_found() {
        let err = resolve(&PeriodSpec::labels("2018-01-01", "2019-06-01"), &daily(100), PeriodRole::Pre);

        assert_eq!(
            err,
            Err(ImpactError::PeriodNotFound { role: PeriodRole::Pre, label: "2019-06-01".into() })
        );
    }

    #[test]
    fn labels_need_date_index() {
        let err = resolve(
            &PeriodSpec::labels("2018-01-01", "2018-01-10"),
            &TimeIndex::Range(50),
            PeriodRole::Post,
        );

        assert_eq!(err, Err(ImpactError::LabelsRequireDateIndex { role: PeriodRole::Post }));
    }

    #[test]
    fn ordering_span_and_range_checks() {
        let idx = TimeIndex::Range(100);

        assert_eq!(
            resolve(&PeriodSpec::offsets(10, 11), &idx, PeriodRole::Pre),
            Err(ImpactError::PeriodTooShort { role: PeriodRole::Pre, start: 10, end: 11 })
        );
        assert_eq!(
            resolve(&PeriodSpec::offsets(50, 40), &idx, PeriodRole::Pre),
            Err(ImpactError::InvalidPrePeriod { start: 50, end: 40 })
        );
        assert_eq!(
            resolve(&PeriodSpec::offsets(90, 80), &idx, PeriodRole::Post),
            Err(ImpactError::InvalidPostPeriod { start: 90, end: 80 })
        );
        assert!(matches!(
            resolve(&PeriodSpec::offsets(90, 120), &idx, PeriodRole::Post),
            Err(ImpactError::PeriodOutOfRange { len: 100, .. })
        ));
    }

    #[test]
    fn bounds_must_be_a_homogeneous_pair() {
        let mixed = [PeriodBound::Offset(0), PeriodBound::Label("2018-01-05".into())];
        let single = [PeriodBound::Offset(3)];
        let negative = [PeriodBound::Offset(-1), PeriodBound::Offset(5)];

        for bounds in [&mixed[..], &single[..], &negative[..]] {
            assert!(matches!(
                PeriodSpec::try_from_bounds(PeriodRole::Pre, bounds),
                Err(ImpactError::InvalidPeriod { role: PeriodRole::Pre, .. })
            ));
        }
        assert_eq!(
            PeriodSpec::try_from_bounds(
                PeriodRole::Post,
                &[PeriodBound::Offset(70), PeriodBound::Offset(99)]
            ),
            Ok(PeriodSpec::offsets(70, 99))
        );
    }
}
