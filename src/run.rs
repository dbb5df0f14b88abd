use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::metrics::MetricDef;
use crate::pipeline::assemble::VariationTable;
use crate::pipeline::compute_variations;
use crate::store::SheetStore;

/// Full read -> compute -> write flow against the bound store. With
/// `write_output` off (dry runs) the store is never written; fatal pipeline
/// errors surface before any write happens either way.
pub fn run_analysis(
    store: &dyn SheetStore,
    config: &Config,
    metrics: &[MetricDef],
    write_output: bool,
) -> Result<VariationTable> {
    let sheets = &config.sheets;

    let search_console = store
        .read(&sheets.search_console_worksheet)
        .with_context(|| format!("reading worksheet {}", sheets.search_console_worksheet))?;
    let analytics = store
        .read(&sheets.analytics_worksheet)
        .with_context(|| format!("reading worksheet {}", sheets.analytics_worksheet))?;
    info!(
        rows = search_console.rows.len(),
        columns = search_console.columns.len(),
        worksheet = %sheets.search_console_worksheet,
        "loaded search-performance data"
    );
    info!(
        rows = analytics.rows.len(),
        columns = analytics.columns.len(),
        worksheet = %sheets.analytics_worksheet,
        "loaded site-analytics data"
    );

    let table = compute_variations(&search_console, &analytics, metrics)?;
    info!(
        period = %table.period_label,
        urls = table.rows.len(),
        "computed weekly variations"
    );
    for (label, absent) in table.absent_counts() {
        if absent > 0 {
            info!(column = %label, absent, "urls without a computable change");
        }
    }

    if write_output {
        store
            .write(&sheets.output_worksheet, &table.to_sheet(), true)
            .with_context(|| format!("writing worksheet {}", sheets.output_worksheet))?;
        info!(worksheet = %sheets.output_worksheet, "wrote variation table");
    }

    Ok(table)
}
