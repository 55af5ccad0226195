use sheetsmith_core::error::SheetsmithError;
use sheetsmith_core::export::{converted_file_name, grid_sheet, region_sheet, statement_sheets};
use sheetsmith_core::extraction::pdftotext::PdftotextExtractor;
use sheetsmith_core::profile::{self, builtin};
use sheetsmith_core::sheet::writer::write_workbook;
use sheetsmith_core::sheet::CompiledSheet;
use sheetsmith_core::ConversionStats;
use std::path::{Path, PathBuf};

use crate::output;

pub fn statement(
    pdf_file: PathBuf,
    layout_file: Option<PathBuf>,
    out: Option<PathBuf>,
    format: Option<&str>,
) -> Result<(), SheetsmithError> {
    let layout = match layout_file {
        Some(path) => profile::load_layout(&path)?,
        None => builtin::statement_layout()?,
    };

    let pdf_bytes = std::fs::read(&pdf_file)?;
    let extractor = PdftotextExtractor::new();
    let converted = sheetsmith_core::convert_statement(&pdf_bytes, &extractor, &layout)?;

    match format {
        Some("json") => output::json::print(&converted.tables)?,
        Some(_) => output::table::print_statement(&converted.tables),
        None => {}
    }

    let sheets = statement_sheets(&converted.tables, &layout);
    save(&pdf_file, out, &sheets, &converted.stats)
}

pub fn invoice(
    pdf_file: PathBuf,
    profile_file: Option<PathBuf>,
    out: Option<PathBuf>,
    format: Option<&str>,
) -> Result<(), SheetsmithError> {
    let table_profile = match profile_file {
        Some(path) => profile::load_profile(&path)?,
        None => builtin::invoice_profile()?,
    };

    let pdf_bytes = std::fs::read(&pdf_file)?;
    let extractor = PdftotextExtractor::new();
    let converted = sheetsmith_core::convert_table(&pdf_bytes, &extractor, &table_profile)?;

    match format {
        Some("json") => output::json::print(&converted.table)?,
        Some(_) => output::table::print_region(&converted.table),
        None => {}
    }

    let sheets = vec![region_sheet(&converted.table, &table_profile)];
    save(&pdf_file, out, &sheets, &converted.stats)
}

pub fn grid(
    pdf_file: PathBuf,
    out: Option<PathBuf>,
    format: Option<&str>,
) -> Result<(), SheetsmithError> {
    let pdf_bytes = std::fs::read(&pdf_file)?;
    let extractor = PdftotextExtractor::new();
    let converted = sheetsmith_core::extract_grid(&pdf_bytes, &extractor)?;

    let sheet = grid_sheet(&converted.tables);
    match format {
        Some("json") => output::json::print(&converted.tables)?,
        Some(_) => output::table::print_sheet(&sheet),
        None => {}
    }

    save(&pdf_file, out, &[sheet], &converted.stats)
}

fn save(
    input: &Path,
    out: Option<PathBuf>,
    sheets: &[CompiledSheet],
    stats: &ConversionStats,
) -> Result<(), SheetsmithError> {
    let path = out.unwrap_or_else(|| default_output(input));
    let bytes = write_workbook(sheets)?;
    std::fs::write(&path, bytes)?;
    eprintln!(
        "Converted {} page(s): {} table(s), {} row(s), {} cell(s), written to {}",
        stats.pages,
        stats.tables,
        stats.rows,
        stats.cells,
        path.display()
    );
    Ok(())
}

fn default_output(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(converted_file_name(&name))
}
