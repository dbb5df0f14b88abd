use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub const PERIOD_COLUMN: &str = "Periodo Analizado";
pub const URL_COLUMN: &str = "URL";
pub const SUMMARY_COLUMN: &str = "Resumen_IA";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    SearchConsole,
    Analytics,
}

impl Display for Dataset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SearchConsole => write!(f, "search_console"),
            Self::Analytics => write!(f, "analytics"),
        }
    }
}

/// Reduction used to collapse per-row values into one per-URL scalar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AggMode {
    Sum,
    Mean,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeMode {
    Percentage,
    Difference,
}

/// One metric of the weekly comparison, fixed at configuration time.
/// Ordering within the metric sequence determines output column order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricDef {
    pub name: String,
    pub column: String,
    pub dataset: Dataset,
    pub agg: AggMode,
    pub change: ChangeMode,
    pub min_baseline: f64,
    /// Percentage mode only: changes whose magnitude exceeds this are
    /// suppressed as near-zero-denominator artifacts.
    pub max_abs_variation: Option<f64>,
    /// Difference mode only: scale factor for the raw delta (e.g. ratio to
    /// percentage points).
    pub multiplier: Option<f64>,
    pub label: String,
}

impl MetricDef {
    pub fn effective_multiplier(&self) -> f64 {
        self.multiplier.unwrap_or(1.0)
    }
}

/// The seven metrics of the weekly comparison, in output column order:
/// four from the search-performance dataset, three from site analytics.
pub fn metric_sequence() -> Vec<MetricDef> {
    vec![
        MetricDef {
            name: "CTR".to_string(),
            column: "ctr".to_string(),
            dataset: Dataset::SearchConsole,
            agg: AggMode::Mean,
            change: ChangeMode::Difference,
            min_baseline: 0.0025,
            max_abs_variation: None,
            multiplier: Some(100.0),
            label: "CTR Δ (p.p.)".to_string(),
        },
        MetricDef {
            name: "Impresiones".to_string(),
            column: "impressions".to_string(),
            dataset: Dataset::SearchConsole,
            agg: AggMode::Sum,
            change: ChangeMode::Percentage,
            min_baseline: 10.0,
            max_abs_variation: Some(1000.0),
            multiplier: None,
            label: "Impresiones Variacion (%)".to_string(),
        },
        MetricDef {
            name: "Clics".to_string(),
            column: "clicks".to_string(),
            dataset: Dataset::SearchConsole,
            agg: AggMode::Sum,
            change: ChangeMode::Percentage,
            min_baseline: 5.0,
            max_abs_variation: Some(1000.0),
            multiplier: None,
            label: "Clics Variacion (%)".to_string(),
        },
        MetricDef {
            name: "Posicion".to_string(),
            column: "position".to_string(),
            dataset: Dataset::SearchConsole,
            agg: AggMode::Mean,
            change: ChangeMode::Difference,
            min_baseline: 0.25,
            max_abs_variation: None,
            multiplier: None,
            label: "Posicion Δ".to_string(),
        },
        MetricDef {
            name: "Sesiones".to_string(),
            column: "sessions".to_string(),
            dataset: Dataset::Analytics,
            agg: AggMode::Sum,
            change: ChangeMode::Percentage,
            min_baseline: 5.0,
            max_abs_variation: Some(1000.0),
            multiplier: None,
            label: "Sesiones Variacion (%)".to_string(),
        },
        MetricDef {
            name: "Duracion".to_string(),
            column: "avg_session_duration".to_string(),
            dataset: Dataset::Analytics,
            agg: AggMode::Mean,
            change: ChangeMode::Difference,
            min_baseline: 1.0,
            max_abs_variation: None,
            multiplier: None,
            label: "Duracion Δ".to_string(),
        },
        MetricDef {
            name: "Rebote".to_string(),
            column: "bounce_rate".to_string(),
            dataset: Dataset::Analytics,
            agg: AggMode::Mean,
            change: ChangeMode::Difference,
            min_baseline: 0.01,
            max_abs_variation: None,
            multiplier: Some(100.0),
            label: "Rebote Δ (p.p.)".to_string(),
        },
    ]
}

pub fn dataset_metrics(metrics: &[MetricDef], dataset: Dataset) -> Vec<MetricDef> {
    metrics
        .iter()
        .filter(|m| m.dataset == dataset)
        .cloned()
        .collect()
}
