use serde::{Deserialize, Serialize};

/// One cell of a worksheet. Sheets exports carry mixed types per column, so
/// numeric coercion happens at the point of use rather than at load time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// Best-effort numeric coercion. Text cells are sanitized the way sheet
    /// exports mangle numbers (thousands separators, percent signs).
    /// Non-finite values never coerce; a literal "NaN" or "inf" cell counts
    /// as missing, the same as any other non-numeric text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => n.is_finite().then_some(*n),
            CellValue::Text(s) => {
                let sanitized = strip_thousands(&s.trim().replace('%', ""))?;
                sanitized.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            CellValue::Empty => None,
        }
    }

    /// Non-empty string form, or `None` for blank cells.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Number(n) => Some(format!("{n}")),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            CellValue::Empty => None,
        }
    }

    pub fn render(&self) -> String {
        match self {
            CellValue::Number(n) => format!("{n}"),
            CellValue::Text(s) => s.clone(),
            CellValue::Empty => String::new(),
        }
    }

    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Empty;
        }
        match raw.parse::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::Text(raw.to_string()),
        }
    }
}

/// Removes commas only when they form valid thousands grouping ("1,200",
/// "12,345.6"). Anything else with a comma ("1,2") is not a number.
fn strip_thousands(s: &str) -> Option<String> {
    if !s.contains(',') {
        return Some(s.to_string());
    }
    let (int_part, frac_part) = match s.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (s, None),
    };
    if frac_part.is_some_and(|f| f.contains(',')) {
        return None;
    }
    let digits = int_part
        .strip_prefix(['-', '+'])
        .unwrap_or(int_part);
    let mut groups = digits.split(',');
    let head = groups.next()?;
    if head.is_empty() || head.len() > 3 || !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    for group in groups {
        if group.len() != 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }
    Some(s.replace(',', ""))
}

/// An in-memory worksheet: named, ordered columns over rows of mixed cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Sheet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding or truncating to the column count.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, row: usize, column: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&CellValue::Empty)
    }
}
