//! Row index of an observation matrix: positional or calendar dates.
//!
//! A date index is what lets periods be given as labels. Dates must be
//! strictly increasing so a label maps to exactly one row and lookups can
//! binary-search.
use chrono::{Days, NaiveDate};

use crate::impact::errors::{ImpactError, ImpactResult};

/// Accepted textual date layouts for period labels.
const LABEL_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeIndex {
    /// Rows `0..n`.
    Range(usize),
    /// One strictly increasing date per row.
    Dates(Vec<NaiveDate>),
}

impl TimeIndex {
    /// Validated date index.
    ///
    /// # Errors
    /// [`ImpactError::InvalidData`] if two consecutive dates are not strictly
    /// increasing.
    pub fn dates(dates: Vec<NaiveDate>) -> ImpactResult<Self> {
        if let Some(pos) = dates.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ImpactError::InvalidData {
                reason: format!(
                    "date index must be strictly increasing; {} follows {} at row {}",
                    dates[pos + 1],
                    dates[pos],
                    pos + 1
                ),
            });
        }
        Ok(TimeIndex::Dates(dates))
    }

    /// `n` consecutive days starting at `start`.
    ///
    /// # Errors
    /// [`ImpactError::InvalidData`] if the range runs past chrono's calendar.
    pub fn daily(start: NaiveDate, n: usize) -> ImpactResult<Self> {
        let dates = (0..n as u64)
            .map(|i| start.checked_add_days(Days::new(i)))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ImpactError::InvalidData {
                reason: format!("daily index of {n} rows from {start} overflows the calendar"),
            })?;
        Ok(TimeIndex::Dates(dates))
    }

    pub fn len(&self) -> usize {
        match self {
            TimeIndex::Range(n) => *n,
            TimeIndex::Dates(d) => d.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_dated(&self) -> bool {
        matches!(self, TimeIndex::Dates(_))
    }

    /// Row of an exact date, if present. Always `None` for a positional index.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        match self {
            TimeIndex::Range(_) => None,
            TimeIndex::Dates(d) => d.binary_search(&date).ok(),
        }
    }

    /// Row of a textual date label.
    pub fn get_loc(&self, label: &str) -> Option<usize> {
        parse_label(label).and_then(|date| self.position(date))
    }

    /// Date at `row` when the index is dated.
    pub fn date_at(&self, row: usize) -> Option<NaiveDate> {
        match self {
            TimeIndex::Range(_) => None,
            TimeIndex::Dates(d) => d.get(row).copied(),
        }
    }

    /// Index restricted to rows `start..end` (clamped to the index length).
    pub fn slice(&self, start: usize, end: usize) -> TimeIndex {
        let end = end.min(self.len());
        let start = start.min(end);
        match self {
            TimeIndex::Range(_) => TimeIndex::Range(end - start),
            TimeIndex::Dates(d) => TimeIndex::Dates(d[start..end].to_vec()),
        }
    }
}

pub fn parse_label(label: &str) -> Option<NaiveDate> {
    let label = label.trim();
    LABEL_FORMATS.iter().find_map(|fmt| NaiveDate::parse_from_str(label, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_index_finds_labels_in_every_format() {
        let idx = TimeIndex::daily(ymd(2018, 1, 1), 100).unwrap();

        assert_eq!(idx.len(), 100);
        assert_eq!(idx.get_loc("2018-01-01"), Some(0));
        assert_eq!(idx.get_loc("20180311"), Some(69));
        assert_eq!(idx.get_loc("2018/04/10"), Some(99));
        assert_eq!(idx.get_loc("2018-04-11"), None);
        assert_eq!(idx.get_loc("yesterday"), None);
    }

    #[test]
    fn dates_must_increase_strictly() {
        let err = TimeIndex::dates(vec![ymd(2020, 1, 1), ymd(2020, 1, 3), ymd(2020, 1, 3)]);

        assert!(matches!(err, Err(ImpactError::InvalidData { .. })));
        assert!(TimeIndex::dates(vec![ymd(2020, 1, 1), ymd(2020, 2, 1)]).is_ok());
    }

    #[test]
    fn positional_index_has_no_labels() {
        let idx = TimeIndex::Range(10);

        assert_eq!(idx.get_loc("2018-01-01"), None);
        assert_eq!(idx.slice(3, 7), TimeIndex::Range(4));
        assert!(!idx.is_dated());
    }
}
