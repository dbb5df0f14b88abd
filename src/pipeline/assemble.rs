use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::metrics::{ChangeMode, Dataset, MetricDef, PERIOD_COLUMN, SUMMARY_COLUMN, URL_COLUMN};
use crate::pipeline::aggregate::AggregatedPeriod;
use crate::pipeline::change::{difference_change, percentage_change, Variation};
use crate::pipeline::window::AnalysisPeriods;
use crate::sheet::{CellValue, Sheet};

/// Recent and previous aggregates for one dataset.
#[derive(Debug, Clone, Default)]
pub struct DatasetAggregates {
    pub recent: AggregatedPeriod,
    pub previous: AggregatedPeriod,
}

/// The final comparison table: one row per URL seen in any of the four
/// aggregated periods, one column per metric in sequence order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VariationTable {
    pub period_label: String,
    pub metric_labels: Vec<String>,
    pub rows: Vec<VariationRow>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VariationRow {
    pub url: String,
    /// Aligned with `metric_labels`.
    pub changes: Vec<Variation>,
    /// Free-text annotation column, left empty for external enrichment.
    pub summary: String,
}

impl VariationTable {
    /// Count of absent cells per metric column.
    pub fn absent_counts(&self) -> Vec<(String, usize)> {
        self.metric_labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let absent = self
                    .rows
                    .iter()
                    .filter(|row| row.changes[i].is_absent())
                    .count();
                (label.clone(), absent)
            })
            .collect()
    }

    /// Renders the table as a worksheet with the fixed output column order:
    /// period label, URL, one column per metric, then the annotation column.
    pub fn to_sheet(&self) -> Sheet {
        let mut columns = Vec::with_capacity(self.metric_labels.len() + 3);
        columns.push(PERIOD_COLUMN.to_string());
        columns.push(URL_COLUMN.to_string());
        columns.extend(self.metric_labels.iter().cloned());
        columns.push(SUMMARY_COLUMN.to_string());

        let mut sheet = Sheet::new(columns);
        for row in &self.rows {
            let mut cells = Vec::with_capacity(self.metric_labels.len() + 3);
            cells.push(CellValue::Text(self.period_label.clone()));
            cells.push(CellValue::Text(row.url.clone()));
            for change in &row.changes {
                cells.push(match change {
                    Variation::Value(v) => CellValue::Number(*v),
                    Variation::Absent => CellValue::Empty,
                });
            }
            cells.push(CellValue::Text(row.summary.clone()));
            sheet.push_row(cells);
        }
        sheet
    }
}

/// Unions URLs across all four aggregated periods and applies each metric's
/// change strategy in sequence order.
pub fn build_variation_table(
    search_console: &DatasetAggregates,
    analytics: &DatasetAggregates,
    metrics: &[MetricDef],
    periods: &AnalysisPeriods,
) -> VariationTable {
    let mut urls: BTreeSet<String> = BTreeSet::new();
    for aggregate in [
        &search_console.recent,
        &search_console.previous,
        &analytics.recent,
        &analytics.previous,
    ] {
        urls.extend(aggregate.url_keys().cloned());
    }

    let mut per_metric: Vec<BTreeMap<String, Variation>> = Vec::with_capacity(metrics.len());
    for metric in metrics {
        let aggregates = match metric.dataset {
            Dataset::SearchConsole => search_console,
            Dataset::Analytics => analytics,
        };
        let current = aggregates.recent.series(&metric.name);
        let previous = aggregates.previous.series(&metric.name);
        let changes = match metric.change {
            ChangeMode::Percentage => percentage_change(
                &current,
                &previous,
                metric.min_baseline,
                metric.max_abs_variation,
            ),
            ChangeMode::Difference => difference_change(
                &current,
                &previous,
                metric.min_baseline,
                metric.effective_multiplier(),
            ),
        };
        per_metric.push(changes);
    }

    let rows = urls
        .into_iter()
        .map(|url| {
            let changes = per_metric
                .iter()
                .map(|changes| changes.get(&url).copied().unwrap_or(Variation::Absent))
                .collect();
            VariationRow {
                url,
                changes,
                summary: String::new(),
            }
        })
        .collect();

    VariationTable {
        period_label: period_label(periods),
        metric_labels: metrics.iter().map(|m| m.label.clone()).collect(),
        rows,
    }
}

fn period_label(periods: &AnalysisPeriods) -> String {
    format!(
        "{} a {} (vs {} a {})",
        periods.recent.start.format("%Y-%m-%d"),
        periods.recent.end.format("%Y-%m-%d"),
        periods.previous.start.format("%Y-%m-%d"),
        periods.previous.end.format("%Y-%m-%d"),
    )
}
