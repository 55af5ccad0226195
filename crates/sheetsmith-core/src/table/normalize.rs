use crate::table::header::ColumnMap;

/// One row projected onto the canonical columns, in canonical order.
pub type NormalizedRow = Vec<String>;

/// Project a raw row through a column map.
///
/// Always returns exactly one cell per key. Keys missing from the map, or
/// mapped past the end of a short row, yield empty cells.
pub fn normalize_row(raw: &[String], map: &ColumnMap, keys: &[&str]) -> NormalizedRow {
    keys.iter()
        .map(|key| {
            map.get(key)
                .and_then(|idx| raw.get(idx))
                .map(|cell| cell.trim().to_string())
                .unwrap_or_default()
        })
        .collect()
}

/// Join two pieces of text with a space and collapse runs of whitespace.
pub fn join_collapsed(head: &str, tail: &str) -> String {
    format!("{head} {tail}")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
