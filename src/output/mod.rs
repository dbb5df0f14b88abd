pub mod csv;
pub mod table;

use anyhow::Result;
use serde::Serialize;

pub use self::csv::variations_to_csv;
pub use self::table::render_variation_table;

pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
