use crate::batch::archive::expand_uploads;
use crate::batch::{BatchWarning, InputFile};
use crate::error::SheetsmithError;
use crate::sheet::reader::read_first_sheet;
use crate::sheet::{CompiledSheet, MAX_SHEET_NAME};
use serde::Serialize;
use tracing::{info, warn};

/// Default download name for a compiled report workbook.
pub const REPORT_FILE_NAME: &str = "compiled-report.xlsx";

/// Reason given when no upload is a spreadsheet at all.
pub const NO_SPREADSHEETS: &str = "no valid Excel or CSV files found";

#[derive(Debug, Clone, Serialize)]
pub struct CompiledReports {
    pub sheets: Vec<CompiledSheet>,
    pub warnings: Vec<BatchWarning>,
}

/// Sheet name for the n-th (1-based) file of a batch.
pub fn report_sheet_name(position: usize) -> String {
    format!("Report_{position}").chars().take(MAX_SHEET_NAME).collect()
}

/// Copy the first sheet of every upload into its own `Report_<n>` sheet.
///
/// `n` is the file's position after archive expansion, so a skipped file
/// leaves a gap in the numbering. Files that fail to parse are reported as
/// warnings; the batch fails only when nothing usable remains.
pub fn compile_reports(uploads: Vec<InputFile>) -> Result<CompiledReports, SheetsmithError> {
    if uploads.is_empty() {
        return Err(SheetsmithError::EmptyInput);
    }

    let mut warnings = Vec::new();
    let files = expand_uploads(uploads, &mut warnings);
    if files.is_empty() {
        return Err(SheetsmithError::NoUsableData(NO_SPREADSHEETS.into()));
    }

    let mut sheets = Vec::new();
    for (idx, file) in files.iter().enumerate() {
        match read_first_sheet(&file.name, &file.bytes) {
            Ok(rows) => {
                let mut sheet = CompiledSheet::new(&report_sheet_name(idx + 1));
                sheet.rows = rows;
                sheets.push(sheet);
            }
            Err(e) => {
                warn!(file = %file.name, error = %e, "skipping file: could not parse");
                warnings.push(BatchWarning::new(file.name.as_str(), e));
            }
        }
    }

    if sheets.is_empty() {
        return Err(SheetsmithError::NoUsableData(
            "could not process any valid data sheets".into(),
        ));
    }
    info!(
        sheets = sheets.len(),
        skipped = warnings.len(),
        "compiled report workbook"
    );
    Ok(CompiledReports { sheets, warnings })
}
