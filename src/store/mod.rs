pub mod csv;
pub mod memory;

use anyhow::Result;

use crate::sheet::Sheet;

pub use self::csv::CsvStore;
pub use self::memory::MemoryStore;

/// The tabular-store capability: worksheets read and written by name.
/// Implementations are bound once at construction; the pipeline never probes
/// for alternate method names.
pub trait SheetStore {
    fn read(&self, name: &str) -> Result<Sheet>;

    /// Writes a worksheet. With `replace` the previous content is discarded;
    /// without it, data rows are appended below the existing content.
    fn write(&self, name: &str, sheet: &Sheet, replace: bool) -> Result<()>;
}
