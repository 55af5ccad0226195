pub mod header;
pub mod merge;
pub mod normalize;
pub mod segment;

use header::ColumnMap;
use normalize::NormalizedRow;
use serde::Serialize;

/// Which table a region holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Prepay,
    Recon,
    /// The only table of a single-table document (invoice mode).
    Single,
}

/// A sealed table: header labels plus cleaned data rows.
#[derive(Debug, Clone, Serialize)]
pub struct TableRegion {
    pub kind: TableKind,
    /// Output sheet name.
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<NormalizedRow>,
    pub column_map: Option<ColumnMap>,
}

impl TableRegion {
    pub fn cell_count(&self) -> usize {
        self.header.len() + self.rows.iter().map(Vec::len).sum::<usize>()
    }
}
