use chrono::{Duration, NaiveDate};

use crate::pipeline::normalize::NormalizedSheet;
use crate::pipeline::PipelineError;

/// Inclusive 7-day date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisPeriods {
    pub recent: PeriodWindow,
    pub previous: PeriodWindow,
}

/// Two contiguous, non-overlapping 7-day windows anchored on the reference
/// date: recent = [R-6, R], previous = [R-13, R-7].
pub fn analysis_periods(reference: NaiveDate) -> AnalysisPeriods {
    let recent_end = reference;
    let recent_start = recent_end - Duration::days(6);
    let previous_end = recent_start - Duration::days(1);
    let previous_start = previous_end - Duration::days(6);
    let periods = AnalysisPeriods {
        recent: PeriodWindow {
            start: recent_start,
            end: recent_end,
        },
        previous: PeriodWindow {
            start: previous_start,
            end: previous_end,
        },
    };
    debug_assert_eq!(periods.recent.span_days(), 7);
    debug_assert_eq!(periods.previous.span_days(), 7);
    periods
}

/// The most recent date present in either normalized dataset.
pub fn reference_date(
    a: &NormalizedSheet,
    b: &NormalizedSheet,
) -> Result<NaiveDate, PipelineError> {
    match (a.max_date(), b.max_date()) {
        (Some(da), Some(db)) => Ok(da.max(db)),
        (Some(da), None) => Ok(da),
        (None, Some(db)) => Ok(db),
        (None, None) => Err(PipelineError::NoData),
    }
}
