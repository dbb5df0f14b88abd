use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use crate::metrics::URL_COLUMN;
use crate::pipeline::assemble::VariationTable;

/// Pretty-prints the variation table for terminal inspection. Absent cells
/// render as "-"; the shared period label becomes the caption line above.
pub fn render_variation_table(table: &VariationTable) -> String {
    let mut rendered = Table::new();
    rendered
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![URL_COLUMN.to_string()];
    header.extend(table.metric_labels.iter().cloned());
    rendered.set_header(header);

    for row in &table.rows {
        let mut cells = vec![row.url.clone()];
        for change in &row.changes {
            cells.push(
                change
                    .value()
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_else(|| "-".to_string()),
            );
        }
        rendered.add_row(cells);
    }

    format!("{}\n{rendered}", table.period_label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::assemble::VariationRow;
    use crate::pipeline::change::Variation;

    #[test]
    fn includes_period_label_and_dash_for_absent() {
        let table = VariationTable {
            period_label: "2026-08-16 a 2026-08-22 (vs 2026-08-09 a 2026-08-15)".to_string(),
            metric_labels: vec!["Posicion Δ".to_string()],
            rows: vec![VariationRow {
                url: "/a".to_string(),
                changes: vec![Variation::Absent],
                summary: String::new(),
            }],
        };
        let rendered = render_variation_table(&table);
        assert!(rendered.starts_with("2026-08-16 a 2026-08-22"));
        assert!(rendered.contains("/a"));
        assert!(rendered.contains('-'));
    }
}
