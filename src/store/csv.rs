use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};

use crate::sheet::{CellValue, Sheet};
use crate::store::SheetStore;

/// Store backed by a directory of CSV files, one per worksheet name.
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed creating store directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }
}

impl SheetStore for CsvStore {
    fn read(&self, name: &str) -> Result<Sheet> {
        let path = self.path(name);
        let file = File::open(&path)
            .with_context(|| format!("failed opening worksheet: {}", path.display()))?;
        read_sheet(file).with_context(|| format!("failed parsing worksheet: {}", path.display()))
    }

    fn write(&self, name: &str, sheet: &Sheet, replace: bool) -> Result<()> {
        let path = self.path(name);
        if replace || !path.exists() {
            let file = File::create(&path)
                .with_context(|| format!("failed creating worksheet: {}", path.display()))?;
            write_sheet(file, sheet, true)
        } else {
            let file = OpenOptions::new()
                .append(true)
                .open(&path)
                .with_context(|| format!("failed opening worksheet: {}", path.display()))?;
            write_sheet(file, sheet, false)
        }
        .with_context(|| format!("failed writing worksheet: {}", path.display()))
    }
}

fn read_sheet(file: File) -> Result<Sheet> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);
    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let mut sheet = Sheet::new(columns);
    for record in reader.records() {
        let record = record?;
        sheet.push_row(record.iter().map(CellValue::parse).collect());
    }
    Ok(sheet)
}

fn write_sheet(file: File, sheet: &Sheet, with_header: bool) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(file);
    if with_header {
        writer.write_record(&sheet.columns)?;
    }
    for row in &sheet.rows {
        writer.write_record(row.iter().map(CellValue::render))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sheet() -> Sheet {
        let mut sheet = Sheet::new(vec![
            "date".to_string(),
            "url".to_string(),
            "clicks".to_string(),
        ]);
        sheet.push_row(vec![
            CellValue::Text("2026-08-20".to_string()),
            CellValue::Text("/a".to_string()),
            CellValue::Number(12.0),
        ]);
        sheet.push_row(vec![
            CellValue::Text("2026-08-21".to_string()),
            CellValue::Text("/b".to_string()),
            CellValue::Empty,
        ]);
        sheet
    }

    #[test]
    fn round_trips_a_worksheet() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::open(dir.path()).unwrap();
        store.write("gsc_data_daily", &sample_sheet(), true).unwrap();

        let loaded = store.read("gsc_data_daily").unwrap();
        assert_eq!(loaded.columns, ["date", "url", "clicks"]);
        assert_eq!(loaded.rows.len(), 2);
        assert_eq!(loaded.value(0, 2), &CellValue::Number(12.0));
        assert_eq!(loaded.value(1, 2), &CellValue::Empty);
    }

    #[test]
    fn replace_discards_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::open(dir.path()).unwrap();
        store.write("analysis_raw", &sample_sheet(), true).unwrap();
        store.write("analysis_raw", &sample_sheet(), true).unwrap();
        assert_eq!(store.read("analysis_raw").unwrap().rows.len(), 2);
    }

    #[test]
    fn non_replace_appends_rows_without_a_second_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::open(dir.path()).unwrap();
        store.write("analysis_raw", &sample_sheet(), true).unwrap();
        store.write("analysis_raw", &sample_sheet(), false).unwrap();
        let loaded = store.read("analysis_raw").unwrap();
        assert_eq!(loaded.rows.len(), 4);
        assert_eq!(loaded.columns.len(), 3);
    }

    #[test]
    fn reading_a_missing_worksheet_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::open(dir.path()).unwrap();
        assert!(store.read("missing").is_err());
    }
}
