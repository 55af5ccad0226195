use crate::batch::{BatchWarning, InputFile};
use crate::error::SheetsmithError;
use crate::sheet::reader::read_first_sheet;
use crate::sheet::{Cell, CompiledSheet, NumberFormat};
use crate::values::{date_from_serial, parse_amount, parse_date, week_number};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tracing::{debug, info, warn};

pub const CAPACITY_SHEET: &str = "Compiled Data";

/// Metric rows below the date row, in sheet order.
pub const METRICS: [&str; 9] = [
    "Capacity reliability score",
    "Completed routes",
    "Amazon paid cancels",
    "DSP dropped routes",
    "Reliability target",
    "Route target",
    "Flex-up route target",
    "Final scheduled",
    "DSP available capacity",
];

const COLUMN_WIDTHS: [f64; 11] = [15.0, 8.0, 22.0, 18.0, 20.0, 18.0, 18.0, 14.0, 20.0, 16.0, 22.0];

/// One day of capacity figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityRecord {
    pub date: NaiveDate,
    pub week: u32,
    /// Fraction, 0.875 for 87.5%. Missing scores count as zero.
    pub reliability_score: f64,
    /// The remaining eight metrics in [`METRICS`] order.
    pub metrics: [Option<f64>; 8],
}

#[derive(Debug, Clone, Serialize)]
pub struct CapacityReport {
    pub records: Vec<CapacityRecord>,
    pub warnings: Vec<BatchWarning>,
}

impl CapacityReport {
    /// The "Compiled Data" sheet: header row plus one row per record.
    pub fn to_sheet(&self) -> CompiledSheet {
        let mut header = vec![Cell::text("Date"), Cell::text("Week#")];
        header.extend(METRICS.iter().map(|m| Cell::text(*m)));

        let mut sheet = CompiledSheet::new(CAPACITY_SHEET).with_widths(COLUMN_WIDTHS.to_vec());
        sheet.rows.push(header);
        for record in &self.records {
            let mut row = vec![
                Cell::Date(record.date),
                Cell::number(f64::from(record.week)),
                Cell::with_format(record.reliability_score, NumberFormat::Percent),
            ];
            row.extend(
                record
                    .metrics
                    .iter()
                    .map(|m| m.map_or(Cell::Empty, Cell::number)),
            );
            sheet.rows.push(row);
        }
        sheet
    }
}

/// Download name for a capacity workbook compiled on `today`.
pub fn capacity_file_name(today: NaiveDate) -> String {
    format!("Capacity-Reliability-Compiled-{}.xlsx", today.format("%Y-%m-%d"))
}

/// Flatten every workbook's date-by-metric grid into dated records.
///
/// Records from all files are sorted by date; files sharing a date keep
/// upload order.
pub fn compile_capacity(files: &[InputFile]) -> Result<CapacityReport, SheetsmithError> {
    if files.is_empty() {
        return Err(SheetsmithError::EmptyInput);
    }

    let mut records = Vec::new();
    let mut warnings = Vec::new();
    for file in files {
        match read_first_sheet(&file.name, &file.bytes) {
            Ok(rows) => {
                let found = capacity_records(&rows);
                debug!(file = %file.name, records = found.len(), "read capacity sheet");
                if found.is_empty() {
                    warnings.push(BatchWarning::new(
                        file.name.as_str(),
                        "no dates found in the first row",
                    ));
                }
                records.extend(found);
            }
            Err(e) => {
                warn!(file = %file.name, error = %e, "skipping capacity file");
                warnings.push(BatchWarning::new(file.name.as_str(), e));
            }
        }
    }

    if records.is_empty() {
        return Err(SheetsmithError::NoUsableData(
            "no capacity records found in any file".into(),
        ));
    }
    records.sort_by_key(|r| r.date);
    info!(records = records.len(), files = files.len(), "compiled capacity data");
    Ok(CapacityReport { records, warnings })
}

/// Records from one sheet. Blank rows are dropped first, so row 0 is the
/// first row with any content.
pub fn capacity_records(rows: &[Vec<Cell>]) -> Vec<CapacityRecord> {
    let rows: Vec<&Vec<Cell>> = rows
        .iter()
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .collect();
    let Some(date_row) = rows.first() else {
        return Vec::new();
    };

    let metric_at = |metric: usize, col: usize| -> Option<f64> {
        rows.get(metric + 1)
            .and_then(|row| row.get(col))
            .and_then(metric_value)
    };

    date_row
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(col, cell)| header_date(cell).map(|date| (col, date)))
        .map(|(col, date)| {
            let mut metrics = [None; 8];
            for (idx, slot) in metrics.iter_mut().enumerate() {
                *slot = metric_at(idx + 1, col);
            }
            CapacityRecord {
                date,
                week: week_number(date),
                reliability_score: metric_at(0, col).unwrap_or(0.0),
                metrics,
            }
        })
        .collect()
}

fn header_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(date) => Some(*date),
        Cell::Number { value, .. } => date_from_serial(*value),
        Cell::Text(text) if text.trim().eq_ignore_ascii_case("total") => None,
        Cell::Text(text) => parse_date(text),
        Cell::Empty => None,
    }
}

fn metric_value(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number { value, .. } => Some(*value),
        Cell::Text(text) => parse_amount(text).and_then(|d| d.to_f64()),
        Cell::Empty | Cell::Date(_) => None,
    }
}
