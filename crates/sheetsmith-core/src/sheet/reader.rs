use crate::error::SheetsmithError;
use crate::sheet::Cell;
use crate::values::{classify, date_from_serial};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;

/// File extensions the spreadsheet reader accepts.
pub const SPREADSHEET_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "csv"];

/// True when the file name carries one of [`SPREADSHEET_EXTENSIONS`].
pub fn is_spreadsheet_name(name: &str) -> bool {
    extension(name).is_some_and(|ext| SPREADSHEET_EXTENSIONS.contains(&ext.as_str()))
}

fn extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

/// Read the first sheet of a spreadsheet file as rows of cells.
///
/// Excel workbooks go through calamine, `.csv` through the csv reader with
/// each field typed by [`classify`]. The cell grid keeps its absolute
/// position: a sheet whose data starts at C3 yields two empty leading rows
/// and columns.
pub fn read_first_sheet(name: &str, bytes: &[u8]) -> Result<Vec<Vec<Cell>>, SheetsmithError> {
    if bytes.is_empty() {
        return Err(SheetsmithError::EmptyInput);
    }
    match extension(name).as_deref() {
        Some("csv") => read_csv(bytes),
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => read_workbook(name, bytes),
        _ => Err(SheetsmithError::UnsupportedFile(name.to_string())),
    }
}

fn read_workbook(name: &str, bytes: &[u8]) -> Result<Vec<Vec<Cell>>, SheetsmithError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| SheetsmithError::Spreadsheet(format!("{name}: {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SheetsmithError::Spreadsheet(format!("{name}: workbook has no sheets")))?
        .map_err(|e| SheetsmithError::Spreadsheet(format!("{name}: {e}")))?;
    Ok(range_rows(&range))
}

fn range_rows(range: &Range<Data>) -> Vec<Vec<Cell>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };
    let mut rows: Vec<Vec<Cell>> = (0..start_row).map(|_| Vec::new()).collect();
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col as usize];
        cells.extend(row.iter().map(data_cell));
        rows.push(cells);
    }
    rows
}

fn data_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::text(s.as_str()),
        Data::Float(f) => Cell::number(*f),
        Data::Int(i) => Cell::number(*i as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => match date_from_serial(dt.as_f64()) {
            Some(date) => Cell::Date(date),
            None => Cell::number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::text(s.as_str()),
        Data::Error(e) => Cell::Text(format!("#ERROR:{e:?}")),
    }
}

fn read_csv(bytes: &[u8]) -> Result<Vec<Vec<Cell>>, SheetsmithError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SheetsmithError::Spreadsheet(format!("csv: {e}")))?;
        rows.push(record.iter().map(|field| Cell::from(classify(field))).collect());
    }
    Ok(rows)
}
