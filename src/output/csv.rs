use anyhow::Result;

use crate::metrics::{PERIOD_COLUMN, SUMMARY_COLUMN, URL_COLUMN};
use crate::pipeline::assemble::VariationTable;

/// Renders the variation table as CSV text with the fixed output column
/// order. Absent cells render as empty fields.
pub fn variations_to_csv(table: &VariationTable) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);

    let mut header = Vec::with_capacity(table.metric_labels.len() + 3);
    header.push(PERIOD_COLUMN.to_string());
    header.push(URL_COLUMN.to_string());
    header.extend(table.metric_labels.iter().cloned());
    header.push(SUMMARY_COLUMN.to_string());
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(header.len());
        record.push(table.period_label.clone());
        record.push(row.url.clone());
        for change in &row.changes {
            record.push(
                change
                    .value()
                    .map(|v| format!("{v:.4}"))
                    .unwrap_or_default(),
            );
        }
        record.push(row.summary.clone());
        writer.write_record(&record)?;
    }

    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}
