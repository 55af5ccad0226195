use crate::extraction::Fragment;
use std::collections::BTreeMap;

/// Height of one row bucket, in PDF units.
pub const ROW_BUCKET: f32 = 5.0;

/// One visual line of text: cells ordered left to right.
pub type RawRow = Vec<String>;

/// Quantize a baseline to its row bucket, rounding halves upward.
pub fn row_key(y: f32) -> i64 {
    (y / ROW_BUCKET + 0.5).floor() as i64
}

/// Group fragments into visual rows, top to bottom.
///
/// Fragments whose text is blank are discarded. Within a row, fragments are
/// sorted by `x`; equal `x` keeps encounter order.
pub fn bucket_rows(fragments: &[Fragment]) -> Vec<Vec<&Fragment>> {
    let mut buckets: BTreeMap<i64, Vec<&Fragment>> = BTreeMap::new();
    for fragment in fragments {
        if fragment.text.trim().is_empty() {
            continue;
        }
        buckets.entry(row_key(fragment.y)).or_default().push(fragment);
    }

    // Larger y is higher on the page, so walk the buckets in reverse.
    buckets
        .into_values()
        .rev()
        .map(|mut row| {
            row.sort_by(|a, b| a.x.total_cmp(&b.x));
            row
        })
        .collect()
}

/// Reconstruct the text rows of one page.
pub fn reconstruct_rows(fragments: &[Fragment]) -> Vec<RawRow> {
    bucket_rows(fragments)
        .into_iter()
        .map(|row| row.into_iter().map(|f| f.text.clone()).collect())
        .collect()
}

/// Lower-cased, space-joined text of a row, used for sentinel matching.
pub fn row_text(row: &[String]) -> String {
    row.join(" ").to_lowercase()
}
