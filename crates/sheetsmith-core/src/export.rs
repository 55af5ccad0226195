//! Turning extracted tables into worksheets.

use crate::layout::grid::GridTable;
use crate::profile::schema::{ColumnFormat, StatementLayout, TableProfile};
use crate::sheet::{Cell, CompiledSheet};
use crate::table::segment::{StatementTables, SummaryTable};
use crate::table::TableRegion;

/// Sheet name used by the single-table and grid conversions.
pub const EXTRACTED_SHEET: &str = "Extracted Data";

const GRID_MIN_WIDTH: f64 = 10.0;
const GRID_MAX_WIDTH: f64 = 50.0;

/// Sheets for a converted statement, in Summary, prepay, recon order.
/// Missing tables produce no sheet.
pub fn statement_sheets(tables: &StatementTables, layout: &StatementLayout) -> Vec<CompiledSheet> {
    let mut sheets = Vec::new();
    if let Some(summary) = &tables.summary {
        sheets.push(summary_sheet(summary, layout));
    }
    if let Some(prepay) = &tables.prepay {
        sheets.push(region_sheet(prepay, &layout.prepay));
    }
    if let Some(recon) = &tables.recon {
        sheets.push(region_sheet(recon, &layout.recon));
    }
    sheets
}

/// The summary block as two columns. Title rows stay text; amounts are
/// currency.
pub fn summary_sheet(summary: &SummaryTable, layout: &StatementLayout) -> CompiledSheet {
    let mut sheet =
        CompiledSheet::new(&summary.sheet_name).with_widths(layout.summary_widths.clone());
    let titles: Vec<&str> = summary.sections.iter().map(|s| s.title.as_str()).collect();

    for row in summary.to_rows() {
        let cells = match row.as_slice() {
            [] => Vec::new(),
            [description, _] if titles.contains(&description.as_str()) => {
                row.iter().map(|c| Cell::text(c.as_str())).collect()
            }
            [description, amount] => vec![
                Cell::text(description.as_str()),
                Cell::formatted(amount, ColumnFormat::Currency),
            ],
            other => other.iter().map(|c| Cell::text(c.as_str())).collect(),
        };
        sheet.rows.push(cells);
    }
    sheet
}

/// A detail table: header labels, then each row formatted per its column.
pub fn region_sheet(region: &TableRegion, profile: &TableProfile) -> CompiledSheet {
    let widths = profile.columns.iter().map(|c| c.width).collect();
    let mut sheet = CompiledSheet::new(&region.title).with_widths(widths);

    sheet
        .rows
        .push(region.header.iter().map(|h| Cell::text(h.as_str())).collect());
    for row in &region.rows {
        let cells = row
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                let format = profile
                    .columns
                    .get(idx)
                    .map_or(ColumnFormat::Text, |c| c.format);
                Cell::formatted(raw, format)
            })
            .collect();
        sheet.rows.push(cells);
    }
    sheet
}

/// Grid-mode tables stacked into one sheet with content-fitted widths.
pub fn grid_sheet(tables: &[GridTable]) -> CompiledSheet {
    let rows = crate::layout::grid::combine(tables);
    let mut sheet = CompiledSheet::from_text_rows(EXTRACTED_SHEET, &rows);
    sheet.fit_widths(GRID_MIN_WIDTH, GRID_MAX_WIDTH);
    sheet
}

/// `<stem>_converted.xlsx` for a source file name; `.pdf` is dropped from
/// the stem.
pub fn converted_file_name(source: &str) -> String {
    let stem = match source.len().checked_sub(4) {
        Some(cut) if source.is_char_boundary(cut) && source[cut..].eq_ignore_ascii_case(".pdf") => {
            &source[..cut]
        }
        _ => source,
    };
    let stem = if stem.trim().is_empty() { "document" } else { stem };
    format!("{stem}_converted.xlsx")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::builtin::statement_layout;
    use crate::sheet::NumberFormat;
    use crate::table::segment::{SummaryRow, SummarySection};
    use crate::table::TableKind;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn converted_names() {
        assert_eq!(converted_file_name("march.pdf"), "march_converted.xlsx");
        assert_eq!(converted_file_name("MARCH.PDF"), "MARCH_converted.xlsx");
        assert_eq!(converted_file_name("notes"), "notes_converted.xlsx");
        assert_eq!(converted_file_name(".pdf"), "document_converted.xlsx");
    }

    #[test]
    fn prepay_sheet_formats_columns() {
        let layout = statement_layout().unwrap();
        let region = TableRegion {
            kind: TableKind::Prepay,
            title: layout.prepay.sheet_name.clone(),
            header: layout.prepay.labels(),
            rows: vec![strings(&["Fleet service", "30", "2", "$10.00", "-"])],
            column_map: None,
        };
        let sheet = region_sheet(&region, &layout.prepay);

        assert_eq!(sheet.name, "Pre-payment Details");
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1][0], Cell::Text("Fleet service".into()));
        assert_eq!(sheet.rows[1][1], Cell::number(30.0));
        assert_eq!(sheet.rows[1][3], Cell::with_format(10.0, NumberFormat::Currency));
        assert_eq!(sheet.rows[1][4], Cell::Empty);
        assert_eq!(sheet.column_widths[0], 40.0);
        assert_eq!(sheet.column_widths[1], 15.0);
    }

    #[test]
    fn summary_titles_stay_text() {
        let layout = statement_layout().unwrap();
        let summary = SummaryTable {
            sheet_name: "Summary".into(),
            amount_label: "Amount".into(),
            sections: vec![SummarySection {
                title: "PREPAYMENT FOR CURRENT MONTH".into(),
                rows: vec![SummaryRow {
                    description: "Service fee".into(),
                    amount: "$1,200.00".into(),
                }],
            }],
        };
        let sheet = summary_sheet(&summary, &layout);
        assert_eq!(sheet.column_widths, vec![40.0, 20.0]);
        assert_eq!(sheet.rows[0][1], Cell::Text("Amount".into()));
        assert_eq!(sheet.rows[1][1], Cell::with_format(1200.0, NumberFormat::Currency));
    }

    #[test]
    fn statement_sheets_skip_missing_tables() {
        let layout = statement_layout().unwrap();
        let tables = StatementTables {
            summary: None,
            prepay: None,
            recon: Some(TableRegion {
                kind: TableKind::Recon,
                title: layout.recon.sheet_name.clone(),
                header: layout.recon.labels(),
                rows: vec![vec!["x".to_string(); layout.recon.columns.len()]],
                column_map: None,
            }),
        };
        let sheets = statement_sheets(&tables, &layout);
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].name, "Prior Month Recon");
    }
}
