use crate::error::SheetsmithError;
use crate::sheet::{Cell, CompiledSheet, DATE_FORMAT_CODE};
use crate::values::serial_from_date;
use std::collections::HashSet;
use std::io::Cursor;
use umya_spreadsheet::Spreadsheet;

/// Serialize sheets into an `.xlsx` workbook, in order.
pub fn write_workbook(sheets: &[CompiledSheet]) -> Result<Vec<u8>, SheetsmithError> {
    if sheets.is_empty() {
        return Err(SheetsmithError::Spreadsheet(
            "workbook needs at least one sheet".into(),
        ));
    }

    let mut seen = HashSet::new();
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    for sheet in sheets {
        if !seen.insert(sheet.name.to_lowercase()) {
            return Err(SheetsmithError::Spreadsheet(format!(
                "duplicate sheet name '{}'",
                sheet.name
            )));
        }
        add_sheet(&mut book, sheet)?;
    }

    let mut out = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut out)
        .map_err(|e| SheetsmithError::Spreadsheet(format!("failed to write workbook: {e}")))?;
    Ok(out.into_inner())
}

fn add_sheet(book: &mut Spreadsheet, sheet: &CompiledSheet) -> Result<(), SheetsmithError> {
    let ws = book
        .new_sheet(sheet.name.as_str())
        .map_err(|e| SheetsmithError::Spreadsheet(format!("sheet '{}': {e}", sheet.name)))?;

    for (r, row) in sheet.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let coord = (c as u32 + 1, r as u32 + 1);
            match cell {
                Cell::Empty => {}
                Cell::Text(text) => {
                    ws.get_cell_mut(coord).set_value_string(text.as_str());
                }
                Cell::Number { value, format } => {
                    let target = ws.get_cell_mut(coord);
                    target.set_value_number(*value);
                    if let Some(code) = format.code() {
                        target
                            .get_style_mut()
                            .get_number_format_mut()
                            .set_format_code(code);
                    }
                }
                Cell::Date(date) => {
                    let target = ws.get_cell_mut(coord);
                    target.set_value_number(serial_from_date(*date));
                    target
                        .get_style_mut()
                        .get_number_format_mut()
                        .set_format_code(DATE_FORMAT_CODE);
                }
            }
        }
    }

    for (idx, width) in sheet.column_widths.iter().enumerate() {
        ws.get_column_dimension_mut(&column_letter(idx))
            .set_width(*width);
    }
    Ok(())
}

/// Zero-based column index to its spreadsheet letter (0 -> A, 26 -> AA).
pub fn column_letter(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (idx % 26) as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::reader::read_first_sheet;
    use crate::sheet::NumberFormat;
    use calamine::{open_workbook_auto_from_rs, Reader};
    use chrono::NaiveDate;

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn empty_workbook_is_rejected() {
        assert!(matches!(
            write_workbook(&[]),
            Err(SheetsmithError::Spreadsheet(_))
        ));
    }

    #[test]
    fn written_cells_read_back() {
        let mut sheet = CompiledSheet::new("Data");
        sheet.rows = vec![
            vec![Cell::text("Item"), Cell::text("Amount"), Cell::text("When")],
            vec![
                Cell::text("Fuel"),
                Cell::with_format(12.5, NumberFormat::Currency),
                Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            ],
            vec![Cell::text("Blank"), Cell::Empty, Cell::Empty],
        ];
        sheet.column_widths = vec![40.0, 15.0];

        let bytes = write_workbook(&[sheet]).unwrap();
        let rows = read_first_sheet("out.xlsx", &bytes).unwrap();

        assert_eq!(rows[0][0], Cell::Text("Item".into()));
        assert_eq!(rows[1][0], Cell::Text("Fuel".into()));
        assert_eq!(rows[1][1], Cell::number(12.5));
        assert!(rows[2].get(1).map_or(true, Cell::is_empty));
    }

    #[test]
    fn sheets_keep_their_order() {
        let a = CompiledSheet::from_text_rows("Summary", &[vec!["a".into()]]);
        let b = CompiledSheet::from_text_rows("Details", &[vec!["b".into()]]);
        let bytes = write_workbook(&[a, b]).unwrap();

        let workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Summary", "Details"]);
    }

    #[test]
    fn duplicate_sheet_names_fail() {
        let a = CompiledSheet::from_text_rows("Same", &[vec!["a".into()]]);
        let result = write_workbook(&[a.clone(), a]);
        assert!(matches!(result, Err(SheetsmithError::Spreadsheet(_))));
    }
}
