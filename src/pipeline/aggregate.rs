use std::collections::BTreeMap;

use crate::metrics::{AggMode, MetricDef};
use crate::pipeline::normalize::NormalizedSheet;
use crate::pipeline::window::PeriodWindow;

/// Per-URL scalars for one dataset and one window. A metric whose source
/// column is absent from the sheet has no entry here for any URL, which is
/// how downstream stages distinguish "not measured" from a computed zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedPeriod {
    pub urls: BTreeMap<String, BTreeMap<String, f64>>,
}

impl AggregatedPeriod {
    pub fn get(&self, url: &str, metric: &str) -> Option<f64> {
        self.urls.get(url).and_then(|m| m.get(metric)).copied()
    }

    /// The url -> value series for one metric.
    pub fn series(&self, metric: &str) -> BTreeMap<String, f64> {
        self.urls
            .iter()
            .filter_map(|(url, metrics)| metrics.get(metric).map(|v| (url.clone(), *v)))
            .collect()
    }

    pub fn url_keys(&self) -> impl Iterator<Item = &String> {
        self.urls.keys()
    }
}

/// Reduces rows inside the window to one scalar per URL per metric.
/// Non-numeric cells are excluded from the reduction; a sum over a URL with
/// no numeric values is 0.0, while a mean over none yields no entry.
pub fn aggregate_period(
    sheet: &NormalizedSheet,
    metrics: &[MetricDef],
    window: PeriodWindow,
) -> AggregatedPeriod {
    let mut result = AggregatedPeriod::default();

    for metric in metrics {
        let Some(column) = sheet.column_index(&metric.column) else {
            continue;
        };

        let mut accumulators: BTreeMap<&str, (f64, u32)> = BTreeMap::new();
        for row in &sheet.rows {
            if !window.contains(row.date) {
                continue;
            }
            let (sum, count) = accumulators.entry(row.url.as_str()).or_default();
            if let Some(value) = row.values.get(column).and_then(|c| c.as_f64()) {
                *sum += value;
                *count += 1;
            }
        }

        for (url, (sum, count)) in accumulators {
            let value = match metric.agg {
                AggMode::Sum => sum,
                AggMode::Mean => {
                    if count == 0 {
                        continue;
                    }
                    sum / f64::from(count)
                }
            };
            result
                .urls
                .entry(url.to_string())
                .or_default()
                .insert(metric.name.clone(), value);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::metrics::{metric_sequence, Dataset};
    use crate::pipeline::normalize::NormalizedRow;
    use crate::sheet::CellValue;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    fn window(start: u32, end: u32) -> PeriodWindow {
        PeriodWindow {
            start: day(start),
            end: day(end),
        }
    }

    fn gsc_metrics() -> Vec<MetricDef> {
        metric_sequence()
            .into_iter()
            .filter(|m| m.dataset == Dataset::SearchConsole)
            .collect()
    }

    fn row(d: u32, url: &str, values: Vec<CellValue>) -> NormalizedRow {
        NormalizedRow {
            date: day(d),
            url: url.to_string(),
            values,
        }
    }

    fn clicks_position_sheet(rows: Vec<NormalizedRow>) -> NormalizedSheet {
        NormalizedSheet {
            metric_columns: vec!["clicks".to_string(), "position".to_string()],
            rows,
        }
    }

    #[test]
    fn sums_and_means_per_url_within_window() {
        let sheet = clicks_position_sheet(vec![
            row(16, "/a", vec![CellValue::Number(10.0), CellValue::Number(4.0)]),
            row(18, "/a", vec![CellValue::Number(5.0), CellValue::Number(6.0)]),
            row(20, "/b", vec![CellValue::Number(2.0), CellValue::Number(12.0)]),
            // outside the window
            row(10, "/a", vec![CellValue::Number(99.0), CellValue::Number(1.0)]),
        ]);
        let agg = aggregate_period(&sheet, &gsc_metrics(), window(16, 22));
        assert_eq!(agg.get("/a", "Clics"), Some(15.0));
        assert_eq!(agg.get("/a", "Posicion"), Some(5.0));
        assert_eq!(agg.get("/b", "Clics"), Some(2.0));
    }

    #[test]
    fn non_numeric_cells_are_excluded_from_the_reduction() {
        let sheet = clicks_position_sheet(vec![
            row(16, "/a", vec![CellValue::Number(10.0), CellValue::Number(4.0)]),
            row(
                17,
                "/a",
                vec![CellValue::Text("n/a".to_string()), CellValue::Empty],
            ),
            row(
                18,
                "/a",
                vec![CellValue::Text("5".to_string()), CellValue::Number(8.0)],
            ),
        ]);
        let agg = aggregate_period(&sheet, &gsc_metrics(), window(16, 22));
        // "5" coerces, "n/a" does not; position mean skips the blank cell.
        assert_eq!(agg.get("/a", "Clics"), Some(15.0));
        assert_eq!(agg.get("/a", "Posicion"), Some(6.0));
    }

    #[test]
    fn sum_of_no_numeric_values_is_zero_but_mean_is_absent() {
        let sheet = clicks_position_sheet(vec![row(
            16,
            "/a",
            vec![CellValue::Empty, CellValue::Empty],
        )]);
        let agg = aggregate_period(&sheet, &gsc_metrics(), window(16, 22));
        assert_eq!(agg.get("/a", "Clics"), Some(0.0));
        assert_eq!(agg.get("/a", "Posicion"), None);
    }

    #[test]
    fn absent_source_column_produces_no_entries_at_all() {
        let sheet = NormalizedSheet {
            metric_columns: vec!["clicks".to_string()],
            rows: vec![row(16, "/a", vec![CellValue::Number(7.0)])],
        };
        let agg = aggregate_period(&sheet, &gsc_metrics(), window(16, 22));
        assert_eq!(agg.get("/a", "Clics"), Some(7.0));
        assert_eq!(agg.get("/a", "Posicion"), None);
        assert_eq!(agg.get("/a", "Impresiones"), None);
        assert!(agg.series("Posicion").is_empty());
    }

    #[test]
    fn window_filter_is_inclusive_on_both_ends() {
        let sheet = clicks_position_sheet(vec![
            row(16, "/a", vec![CellValue::Number(1.0), CellValue::Empty]),
            row(22, "/a", vec![CellValue::Number(2.0), CellValue::Empty]),
            row(15, "/a", vec![CellValue::Number(100.0), CellValue::Empty]),
            row(23, "/a", vec![CellValue::Number(100.0), CellValue::Empty]),
        ]);
        let agg = aggregate_period(&sheet, &gsc_metrics(), window(16, 22));
        assert_eq!(agg.get("/a", "Clics"), Some(3.0));
    }
}
