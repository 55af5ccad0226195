//! Spreadsheet cells, compiled sheets and the workbook codec adapters.

pub mod reader;
pub mod writer;

use crate::profile::schema::ColumnFormat;
use crate::values::{is_blank, parse_amount, CellValue};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

/// Excel limits sheet names to 31 characters.
pub const MAX_SHEET_NAME: usize = 31;

/// Display format attached to a numeric cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    General,
    Currency,
    Percent,
}

impl NumberFormat {
    pub fn code(self) -> Option<&'static str> {
        match self {
            NumberFormat::General => None,
            NumberFormat::Currency => Some("\"$\"#,##0.00"),
            NumberFormat::Percent => Some("0.0%"),
        }
    }
}

pub const DATE_FORMAT_CODE: &str = "yyyy-mm-dd";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cell {
    Empty,
    Text(String),
    Number { value: f64, format: NumberFormat },
    Date(NaiveDate),
}

impl Cell {
    /// A text cell; blank text becomes [`Cell::Empty`].
    pub fn text(value: impl Into<String>) -> Cell {
        let value = value.into();
        if value.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    pub fn number(value: f64) -> Cell {
        Cell::Number {
            value,
            format: NumberFormat::General,
        }
    }

    pub fn with_format(value: f64, format: NumberFormat) -> Cell {
        Cell::Number { value, format }
    }

    /// Format a raw extracted string for a column of the given kind.
    ///
    /// Blank markers are written empty, never as zero. Text that does not
    /// parse in a numeric column is kept as text.
    pub fn formatted(raw: &str, format: ColumnFormat) -> Cell {
        if is_blank(raw) {
            return Cell::Empty;
        }
        let number_format = match format {
            ColumnFormat::Text => return Cell::text(raw.trim()),
            ColumnFormat::Number => NumberFormat::General,
            ColumnFormat::Currency => NumberFormat::Currency,
            ColumnFormat::Percent => NumberFormat::Percent,
        };
        match parse_amount(raw).and_then(|d| d.to_f64()) {
            Some(value) => Cell::with_format(value, number_format),
            None => Cell::text(raw.trim()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Plain-text rendering, as used for terminal tables and width estimates.
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number { value, format } => match format {
                NumberFormat::Currency => format!("${value:.2}"),
                NumberFormat::Percent => format!("{:.1}%", value * 100.0),
                NumberFormat::General => value.to_string(),
            },
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

impl From<CellValue> for Cell {
    fn from(value: CellValue) -> Self {
        let decimal = |d: rust_decimal::Decimal, format| {
            d.to_f64()
                .map_or_else(|| Cell::Text(d.to_string()), |v| Cell::with_format(v, format))
        };
        match value {
            CellValue::Blank => Cell::Empty,
            CellValue::Number(d) => decimal(d, NumberFormat::General),
            CellValue::Currency(d) => decimal(d, NumberFormat::Currency),
            CellValue::Percent(d) => decimal(d, NumberFormat::Percent),
            CellValue::Date(d) => Cell::Date(d),
            CellValue::Text(s) => Cell::text(s),
        }
    }
}

/// One output worksheet.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledSheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
    /// Column widths in characters; columns past the end keep the default.
    pub column_widths: Vec<f64>,
}

impl CompiledSheet {
    pub fn new(name: &str) -> Self {
        CompiledSheet {
            name: safe_sheet_name(name),
            rows: Vec::new(),
            column_widths: Vec::new(),
        }
    }

    /// A sheet of plain text rows.
    pub fn from_text_rows(name: &str, rows: &[Vec<String>]) -> Self {
        let mut sheet = CompiledSheet::new(name);
        sheet.rows = rows
            .iter()
            .map(|row| row.iter().map(|c| Cell::text(c.as_str())).collect())
            .collect();
        sheet
    }

    pub fn with_widths(mut self, widths: Vec<f64>) -> Self {
        self.column_widths = widths;
        self
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Width per column from content: at least `min`, two characters of
    /// padding, at most `max`.
    pub fn fit_widths(&mut self, min: f64, max: f64) {
        let mut widths = vec![min; self.column_count()];
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                let len = cell.display().chars().count() as f64 + 2.0;
                if len > widths[idx] {
                    widths[idx] = len;
                }
            }
        }
        self.column_widths = widths.into_iter().map(|w| w.min(max)).collect();
    }
}

/// Replace characters Excel rejects in sheet names, collapse whitespace and
/// truncate to [`MAX_SHEET_NAME`] characters.
pub fn safe_sheet_name(input: &str) -> String {
    const ILLEGAL: [char; 7] = [':', '/', '\\', '?', '*', '[', ']'];
    let replaced: String = input
        .chars()
        .map(|c| if ILLEGAL.contains(&c) { ' ' } else { c })
        .collect();
    let collapsed = replaced
        .trim_matches('\'')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let name: String = collapsed.chars().take(MAX_SHEET_NAME).collect();
    if name.is_empty() {
        "Sheet".to_string()
    } else {
        name
    }
}
