use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};

use crate::sheet::Sheet;
use crate::store::SheetStore;

/// In-memory store for tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    sheets: Mutex<BTreeMap<String, Sheet>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: impl Into<String>, sheet: Sheet) {
        self.lock().insert(name.into(), sheet);
    }

    pub fn get(&self, name: &str) -> Option<Sheet> {
        self.lock().get(name).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Sheet>> {
        self.sheets.lock().expect("sheet store mutex poisoned")
    }
}

impl SheetStore for MemoryStore {
    fn read(&self, name: &str) -> Result<Sheet> {
        self.get(name)
            .ok_or_else(|| anyhow!("worksheet not found: {name}"))
    }

    fn write(&self, name: &str, sheet: &Sheet, replace: bool) -> Result<()> {
        let mut sheets = self.lock();
        if replace {
            sheets.insert(name.to_string(), sheet.clone());
            return Ok(());
        }
        sheets
            .entry(name.to_string())
            .and_modify(|existing| existing.rows.extend(sheet.rows.iter().cloned()))
            .or_insert_with(|| sheet.clone());
        Ok(())
    }
}
