use sheetsmith_core::batch::capacity::{capacity_file_name, compile_capacity};
use sheetsmith_core::batch::compile::compile_reports;
use sheetsmith_core::batch::{BatchWarning, InputFile};
use sheetsmith_core::error::SheetsmithError;
use sheetsmith_core::sheet::writer::write_workbook;
use std::path::PathBuf;

use crate::output;

pub fn compile(files: Vec<PathBuf>, out: PathBuf) -> Result<(), SheetsmithError> {
    let uploads = read_inputs(&files)?;
    let compiled = compile_reports(uploads)?;
    report_warnings(&compiled.warnings);

    let bytes = write_workbook(&compiled.sheets)?;
    std::fs::write(&out, bytes)?;
    eprintln!(
        "Compiled {} sheet(s), written to {}",
        compiled.sheets.len(),
        out.display()
    );
    Ok(())
}

pub fn capacity(
    files: Vec<PathBuf>,
    out: Option<PathBuf>,
    format: Option<&str>,
) -> Result<(), SheetsmithError> {
    let inputs = read_inputs(&files)?;
    let report = compile_capacity(&inputs)?;
    report_warnings(&report.warnings);

    match format {
        Some("json") => output::json::print(&report.records)?,
        Some(_) => output::table::print_capacity(&report.records),
        None => {}
    }

    let path = out.unwrap_or_else(|| {
        PathBuf::from(capacity_file_name(chrono::Local::now().date_naive()))
    });
    let bytes = write_workbook(&[report.to_sheet()])?;
    std::fs::write(&path, bytes)?;
    eprintln!(
        "Compiled {} record(s) from {} file(s), written to {}",
        report.records.len(),
        files.len(),
        path.display()
    );
    Ok(())
}

fn read_inputs(files: &[PathBuf]) -> Result<Vec<InputFile>, SheetsmithError> {
    files
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(InputFile::new(name, std::fs::read(path)?))
        })
        .collect()
}

fn report_warnings(warnings: &[BatchWarning]) {
    for w in warnings {
        eprintln!("  warning: {w}");
    }
}
