use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::pipeline::PipelineError;
use crate::sheet::{CellValue, Sheet};

pub const DATE_CANDIDATES: &[&str] = &["date", "fecha"];
pub const URL_CANDIDATES: &[&str] = &["page", "url"];

/// A worksheet reduced to canonical shape: every row carries a parsed date and
/// a non-empty URL, and the remaining metric-source columns keep their
/// original names and order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSheet {
    pub metric_columns: Vec<String>,
    pub rows: Vec<NormalizedRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub date: NaiveDate,
    pub url: String,
    /// Cells aligned with `metric_columns`.
    pub values: Vec<CellValue>,
}

impl NormalizedSheet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn max_date(&self) -> Option<NaiveDate> {
        self.rows.iter().map(|r| r.date).max()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.metric_columns.iter().position(|c| c == name)
    }
}

/// Resolves the date and URL columns case-insensitively, parses dates, and
/// drops rows with unparsable dates or blank URLs. Only an unresolvable
/// date or URL column is fatal.
pub fn normalize_sheet(sheet: &Sheet) -> Result<NormalizedSheet, PipelineError> {
    let date_idx = locate_column(&sheet.columns, DATE_CANDIDATES).ok_or(PipelineError::Schema {
        kind: "date",
        candidates: DATE_CANDIDATES,
    })?;
    let url_idx = locate_column(&sheet.columns, URL_CANDIDATES).ok_or(PipelineError::Schema {
        kind: "url",
        candidates: URL_CANDIDATES,
    })?;

    let metric_columns: Vec<String> = sheet
        .columns
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_idx && *i != url_idx)
        .map(|(_, c)| c.clone())
        .collect();

    let mut rows = Vec::with_capacity(sheet.rows.len());
    let mut dropped = 0usize;
    for raw in &sheet.rows {
        let date = raw.get(date_idx).and_then(parse_cell_date);
        let url = raw.get(url_idx).and_then(CellValue::as_text);
        let (Some(date), Some(url)) = (date, url) else {
            dropped += 1;
            continue;
        };
        let values = raw
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != date_idx && *i != url_idx)
            .map(|(_, cell)| cell.clone())
            .collect();
        rows.push(NormalizedRow { date, url, values });
    }
    if dropped > 0 {
        debug!(dropped, "dropped rows with unparsable date or blank url");
    }

    Ok(NormalizedSheet {
        metric_columns,
        rows,
    })
}

fn locate_column(columns: &[String], candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|candidate| {
        columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(candidate))
    })
}

fn parse_cell_date(cell: &CellValue) -> Option<NaiveDate> {
    let CellValue::Text(raw) = cell else {
        return None;
    };
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn sample_sheet(columns: &[&str]) -> Sheet {
        Sheet::new(columns.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn resolves_columns_case_insensitively() {
        let mut sheet = sample_sheet(&["Fecha", "Page", "clicks"]);
        sheet.push_row(vec![text("2026-08-20"), text("/a"), CellValue::Number(3.0)]);
        let normalized = normalize_sheet(&sheet).unwrap();
        assert_eq!(normalized.metric_columns, vec!["clicks".to_string()]);
        assert_eq!(normalized.rows.len(), 1);
        assert_eq!(normalized.rows[0].url, "/a");
    }

    #[test]
    fn missing_url_column_is_fatal() {
        let sheet = sample_sheet(&["date", "clicks"]);
        let err = normalize_sheet(&sheet).unwrap_err();
        assert!(matches!(err, PipelineError::Schema { kind: "url", .. }));
    }

    #[test]
    fn missing_date_column_is_fatal() {
        let sheet = sample_sheet(&["page", "clicks"]);
        let err = normalize_sheet(&sheet).unwrap_err();
        assert!(matches!(err, PipelineError::Schema { kind: "date", .. }));
    }

    #[test]
    fn bad_rows_are_dropped_not_fatal() {
        let mut sheet = sample_sheet(&["date", "url", "clicks"]);
        sheet.push_row(vec![text("2026-08-20"), text("/keep"), CellValue::Number(1.0)]);
        sheet.push_row(vec![text("not-a-date"), text("/bad-date"), CellValue::Number(2.0)]);
        sheet.push_row(vec![text("2026-08-21"), text("   "), CellValue::Number(3.0)]);
        sheet.push_row(vec![text("2026-08-21"), CellValue::Empty, CellValue::Number(4.0)]);
        let normalized = normalize_sheet(&sheet).unwrap();
        assert_eq!(normalized.rows.len(), 1);
        assert_eq!(normalized.rows[0].url, "/keep");
    }

    #[test]
    fn datetime_cells_parse_to_their_date() {
        let mut sheet = sample_sheet(&["date", "url"]);
        sheet.push_row(vec![text("2026-08-20T09:30:00"), text("/a")]);
        sheet.push_row(vec![text("2026-08-21 00:00:00"), text("/b")]);
        let normalized = normalize_sheet(&sheet).unwrap();
        assert_eq!(normalized.rows.len(), 2);
        assert_eq!(
            normalized.max_date(),
            Some(NaiveDate::from_ymd_opt(2026, 8, 21).unwrap())
        );
    }

    #[test]
    fn numeric_urls_become_text() {
        let mut sheet = sample_sheet(&["date", "url"]);
        sheet.push_row(vec![text("2026-08-20"), CellValue::Number(42.0)]);
        let normalized = normalize_sheet(&sheet).unwrap();
        assert_eq!(normalized.rows[0].url, "42");
    }
}
