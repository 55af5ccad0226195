pub mod batch;
pub mod error;
pub mod export;
pub mod extraction;
pub mod layout;
pub mod profile;
pub mod sheet;
pub mod table;
pub mod values;

use error::SheetsmithError;
use extraction::{PageFragments, PdfExtractor};
use layout::grid::{page_table, GridTable};
use layout::reconstruct_rows;
use profile::schema::{StatementLayout, TableProfile};
use serde::Serialize;
use table::segment::{StatementSegmenter, StatementTables, TableScanner};
use table::TableRegion;

/// Counters reported after a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    pub pages: usize,
    pub tables: usize,
    /// Data rows, header and title rows excluded.
    pub rows: usize,
    pub cells: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatementConversion {
    pub tables: StatementTables,
    pub stats: ConversionStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableConversion {
    pub table: TableRegion,
    pub stats: ConversionStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridConversion {
    pub tables: Vec<GridTable>,
    pub stats: ConversionStats,
}

/// Main API entry point: split a monthly statement into its summary,
/// prepayment and reconciliation tables.
///
/// Pages are reconstructed into rows and fed to one segmenter in page
/// order, so a table may start on one page and continue on the next.
pub fn convert_statement(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    layout: &StatementLayout,
) -> Result<StatementConversion, SheetsmithError> {
    let pages = extract(pdf_bytes, extractor)?;

    let mut segmenter = StatementSegmenter::new(layout);
    for page in &pages {
        let rows = reconstruct_rows(&page.fragments);
        segmenter.feed_page(page.page_number, &rows);
    }
    let tables = segmenter.finish()?;

    let stats = ConversionStats {
        pages: pages.len(),
        tables: tables.table_count(),
        rows: tables.data_rows(),
        cells: tables.cell_count(),
    };
    tracing::info!(?stats, "statement converted");
    Ok(StatementConversion { tables, stats })
}

/// Extract the one table a profile describes, such as an invoice line list.
pub fn convert_table(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    profile: &TableProfile,
) -> Result<TableConversion, SheetsmithError> {
    let pages = extract(pdf_bytes, extractor)?;

    let mut scanner = TableScanner::new(profile);
    for page in &pages {
        let rows = reconstruct_rows(&page.fragments);
        scanner.feed_page(page.page_number, &rows);
    }
    let table = scanner.finish()?;

    let stats = ConversionStats {
        pages: pages.len(),
        tables: 1,
        rows: table.rows.len(),
        cells: table.cell_count(),
    };
    tracing::info!(?stats, table = profile.name.as_str(), "table converted");
    Ok(TableConversion { table, stats })
}

/// Best-effort layout mode: every page with a column structure becomes a
/// table, no header knowledge needed.
pub fn extract_grid(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
) -> Result<GridConversion, SheetsmithError> {
    let pages = extract(pdf_bytes, extractor)?;
    let tables: Vec<GridTable> = pages.iter().filter_map(page_table).collect();
    if tables.is_empty() {
        return Err(SheetsmithError::NoTablesFound);
    }

    let stats = ConversionStats {
        pages: pages.len(),
        tables: tables.len(),
        rows: tables.iter().map(|t| t.rows.len()).sum(),
        cells: tables
            .iter()
            .flat_map(|t| t.rows.iter().map(Vec::len))
            .sum(),
    };
    tracing::info!(?stats, "grid extracted");
    Ok(GridConversion { tables, stats })
}

fn extract(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
) -> Result<Vec<PageFragments>, SheetsmithError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    tracing::debug!(
        backend = extractor.backend_name(),
        pages = pages.len(),
        "pages extracted"
    );
    Ok(pages)
}
