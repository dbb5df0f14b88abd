pub mod aggregate;
pub mod assemble;
pub mod change;
pub mod normalize;
pub mod window;

use thiserror::Error;

use crate::metrics::{dataset_metrics, Dataset, MetricDef};
use crate::pipeline::aggregate::aggregate_period;
use crate::pipeline::assemble::{build_variation_table, DatasetAggregates, VariationTable};
use crate::pipeline::normalize::normalize_sheet;
use crate::pipeline::window::{analysis_periods, reference_date};
use crate::sheet::Sheet;

pub use aggregate::AggregatedPeriod;
pub use assemble::VariationRow;
pub use change::Variation;
pub use normalize::{NormalizedRow, NormalizedSheet};
pub use window::{AnalysisPeriods, PeriodWindow};

/// Fatal pipeline conditions. Everything else (unparsable dates, empty URLs,
/// non-numeric metric cells, missing metric columns) is absorbed locally as
/// row exclusion or absent output cells.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("no {kind} column found; checked candidates {candidates:?}")]
    Schema {
        kind: &'static str,
        candidates: &'static [&'static str],
    },
    #[error("no usable dates found in either source worksheet")]
    NoData,
}

/// Full pure computation: two raw worksheets in, one variation table out.
/// Performs no I/O and never mutates its inputs.
pub fn compute_variations(
    search_console: &Sheet,
    analytics: &Sheet,
    metrics: &[MetricDef],
) -> Result<VariationTable, PipelineError> {
    let sc = normalize_sheet(search_console)?;
    let ga = normalize_sheet(analytics)?;

    let reference = reference_date(&sc, &ga)?;
    let periods = analysis_periods(reference);

    let sc_metrics = dataset_metrics(metrics, Dataset::SearchConsole);
    let ga_metrics = dataset_metrics(metrics, Dataset::Analytics);

    let search_console_aggs = DatasetAggregates {
        recent: aggregate_period(&sc, &sc_metrics, periods.recent),
        previous: aggregate_period(&sc, &sc_metrics, periods.previous),
    };
    let analytics_aggs = DatasetAggregates {
        recent: aggregate_period(&ga, &ga_metrics, periods.recent),
        previous: aggregate_period(&ga, &ga_metrics, periods.previous),
    };

    Ok(build_variation_table(
        &search_console_aggs,
        &analytics_aggs,
        metrics,
        &periods,
    ))
}
