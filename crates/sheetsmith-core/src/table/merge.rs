use crate::layout::rows::row_text;
use crate::profile::schema::{ColumnDef, MergeStrategy, TableProfile};
use crate::table::header::ColumnMap;
use crate::table::normalize::{join_collapsed, normalize_row, NormalizedRow};
use crate::table::{TableKind, TableRegion};
use crate::values::looks_like_amount;

/// Whether the accumulating table wants more rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

fn is_empty_cell(cell: &str) -> bool {
    cell.trim().is_empty()
}

/// A row with no text in any cell.
pub fn is_spacer(row: &[String]) -> bool {
    row.iter().all(|c| is_empty_cell(c))
}

/// A header row repeated at the top of a later page.
pub fn is_repeated_header(row: &[String], columns: &[ColumnDef]) -> bool {
    row.len() == columns.len()
        && row.iter().zip(columns).all(|(cell, column)| {
            let cell = cell.to_lowercase();
            cell.contains(&column.key.to_lowercase()) || cell == column.label.to_lowercase()
        })
}

/// A raw row that closes the table: it names a stop phrase and carries no amount.
pub fn is_stop_row(raw: &[String], stop_phrases: &[String]) -> bool {
    if stop_phrases.is_empty() {
        return false;
    }
    let text = row_text(raw);
    stop_phrases.iter().any(|p| text.contains(&p.to_lowercase()))
        && !raw.iter().any(|c| looks_like_amount(c))
}

/// Add a normalized row to `rows`, merging wrapped lines into the last record.
///
/// Spacers and repeated headers must already be filtered out.
pub fn merge_continuation(rows: &mut Vec<NormalizedRow>, row: NormalizedRow, amount_idx: Option<usize>) {
    let filled: Vec<usize> = row
        .iter()
        .enumerate()
        .filter(|(_, c)| !is_empty_cell(c))
        .map(|(i, _)| i)
        .collect();

    if let [col] = filled[..] {
        let value = &row[col];

        // Week markers stay on their own line.
        if value.to_lowercase().contains("week") {
            rows.push(row);
            return;
        }

        // A stray figure outside the amount column is a subtotal, not text.
        if let Some(amount) = amount_idx {
            if col != amount && looks_like_amount(value) {
                let mut fixed = vec![String::new(); row.len()];
                fixed[amount] = value.clone();
                rows.push(fixed);
                return;
            }
        }

        if col == 0 {
            if let Some(last) = rows.last_mut() {
                last[0] = join_collapsed(&last[0], value);
                return;
            }
        }

        rows.push(row);
        return;
    }

    // Multi-cell rows, including total lines aligned to the amount column,
    // are complete records.
    rows.push(row);
}

/// Invoice-style merge: records start on an `M/D/YYYY` date cell; any other
/// row continues the previous record's description.
pub fn merge_date_anchored(rows: &mut Vec<NormalizedRow>, row: NormalizedRow, date_idx: usize, desc_idx: usize) {
    let date = row.get(date_idx).map(|s| s.trim()).unwrap_or_default();
    if is_short_us_date(date) {
        rows.push(row);
        return;
    }

    if rows.is_empty() {
        rows.push(row);
        return;
    }

    let pieces: Vec<&str> = [date_idx, desc_idx]
        .iter()
        .filter_map(|&i| row.get(i))
        .map(|s| s.as_str())
        .filter(|s| !is_empty_cell(s))
        .collect();
    if pieces.is_empty() {
        return;
    }
    if let Some(last) = rows.last_mut() {
        last[desc_idx] = join_collapsed(&last[desc_idx], &pieces.join(" "));
    }
}

/// `M/D/YYYY` with one- or two-digit month and day.
pub fn is_short_us_date(s: &str) -> bool {
    let parts: Vec<&str> = s.split('/').collect();
    let [m, d, y] = parts[..] else {
        return false;
    };
    let digits = |p: &str, min: usize, max: usize| {
        (min..=max).contains(&p.len()) && p.bytes().all(|b| b.is_ascii_digit())
    };
    digits(m, 1, 2) && digits(d, 1, 2) && digits(y, 4, 4)
}

/// Drop blank rows and rows whose total column mentions "total".
pub fn clean_rows(rows: Vec<NormalizedRow>, total_idx: usize) -> Vec<NormalizedRow> {
    rows.into_iter()
        .filter(|row| {
            let is_total = row
                .get(total_idx)
                .is_some_and(|c| c.to_lowercase().contains("total"));
            !is_spacer(row) && !is_total
        })
        .collect()
}

/// Rows of one open table region, fed row by row once its header is known.
#[derive(Debug)]
pub struct TableAccumulator<'p> {
    kind: TableKind,
    profile: &'p TableProfile,
    map: ColumnMap,
    rows: Vec<NormalizedRow>,
}

impl<'p> TableAccumulator<'p> {
    pub fn new(kind: TableKind, profile: &'p TableProfile, map: ColumnMap) -> Self {
        TableAccumulator {
            kind,
            profile,
            map,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether `raw` would close this table.
    pub fn is_stop(&self, raw: &[String]) -> bool {
        is_stop_row(raw, &self.profile.stop_phrases)
    }

    /// Feed one raw row. The stop check runs before any other rule, and a
    /// stop row is never added to the table.
    pub fn accept(&mut self, raw: &[String]) -> Flow {
        if self.is_stop(raw) {
            return Flow::Stop;
        }

        let keys = self.profile.keys();
        let row = normalize_row(raw, &self.map, &keys);
        if is_spacer(&row) || is_repeated_header(&row, &self.profile.columns) {
            return Flow::Continue;
        }

        match &self.profile.merge {
            MergeStrategy::Continuation => {
                merge_continuation(&mut self.rows, row, self.profile.amount_index());
            }
            MergeStrategy::DateAnchored {
                date_column,
                description_column,
            } => {
                let date_idx = self.profile.index_of(date_column).unwrap_or(0);
                let desc_idx = self.profile.index_of(description_column).unwrap_or(0);
                merge_date_anchored(&mut self.rows, row, date_idx, desc_idx);
            }
        }
        Flow::Continue
    }

    /// Seal the region: clean its rows and attach the output header.
    pub fn finish(self) -> TableRegion {
        let rows = clean_rows(self.rows, self.profile.total_index());
        TableRegion {
            kind: self.kind,
            title: self.profile.sheet_name.clone(),
            header: self.profile.labels(),
            rows,
            column_map: Some(self.map),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::builtin::{invoice_profile, statement_layout};
    use crate::table::header::locate_header;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn prepay_accumulator(profile: &TableProfile) -> TableAccumulator<'_> {
        let header = row(&["Description", "Active Days", "Prepaid Quantity", "Monthly Rate", "Prepaid Amount"]);
        let map = locate_header(&header, &profile.columns, profile.min_matches).unwrap();
        TableAccumulator::new(TableKind::Prepay, profile, map)
    }

    #[test]
    fn wrapped_description_joins_previous_record() {
        let mut rows = vec![row(&["Network", "30", "2", "$10.00", "$20.00"])];
        merge_continuation(&mut rows, row(&["Service continued from above", "", "", "", ""]), Some(4));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "Network Service continued from above");
    }

    #[test]
    fn first_description_line_starts_a_record() {
        let mut rows = Vec::new();
        merge_continuation(&mut rows, row(&["Orphan text", "", "", "", ""]), Some(4));
        assert_eq!(rows, vec![row(&["Orphan text", "", "", "", ""])]);
    }

    #[test]
    fn week_marker_stays_separate() {
        let mut rows = vec![row(&["Truck", "30", "1", "$5.00", "$5.00"])];
        merge_continuation(&mut rows, row(&["Week 12", "", "", "", ""]), Some(4));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "Week 12");
    }

    #[test]
    fn stray_amount_moves_to_amount_column() {
        let mut rows = vec![row(&["Truck", "30", "1", "$5.00", "$5.00"])];
        merge_continuation(&mut rows, row(&["", "", "$125.00", "", ""]), Some(4));
        assert_eq!(rows[1], row(&["", "", "", "", "$125.00"]));
    }

    #[test]
    fn stray_amount_in_description_column_is_not_appended() {
        let mut rows = vec![row(&["Truck", "30", "1", "$5.00", "$5.00"])];
        merge_continuation(&mut rows, row(&["1,250.00", "", "", "", ""]), Some(4));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "Truck");
        assert_eq!(rows[1][4], "1,250.00");
    }

    #[test]
    fn lone_amount_cell_is_its_own_row() {
        let mut rows = vec![row(&["Truck", "30", "1", "$5.00", "$5.00"])];
        merge_continuation(&mut rows, row(&["", "", "", "", "$99.00"]), Some(4));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn lone_text_outside_description_is_its_own_row() {
        let mut rows = vec![row(&["Truck", "30", "1", "$5.00", "$5.00"])];
        merge_continuation(&mut rows, row(&["", "", "", "note", ""]), Some(4));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "Truck");
    }

    #[test]
    fn stop_phrase_needs_amount_free_row() {
        let phrases = vec!["reconciliation for prior month".to_string()];
        assert!(is_stop_row(&row(&["RECONCILIATION FOR PRIOR MONTH"]), &phrases));
        assert!(!is_stop_row(&row(&["Reconciliation for prior month", "$10.00"]), &phrases));
        assert!(!is_stop_row(&row(&["Reconciliation for prior month"]), &[]));
    }

    #[test]
    fn accumulator_stops_before_adding_stop_row() {
        let layout = statement_layout().unwrap();
        let mut acc = prepay_accumulator(&layout.prepay);
        assert_eq!(acc.accept(&row(&["Truck", "30", "1", "$5.00", "$5.00"])), Flow::Continue);
        // A lone-description stop row would otherwise be merged as a wrapped line.
        assert_eq!(acc.accept(&row(&["Reconciliation For Prior Month"])), Flow::Stop);
        assert_eq!(acc.len(), 1);
        let region = acc.finish();
        assert_eq!(region.rows[0][0], "Truck");
    }

    #[test]
    fn accumulator_skips_spacers_and_repeated_headers() {
        let layout = statement_layout().unwrap();
        let mut acc = prepay_accumulator(&layout.prepay);
        acc.accept(&row(&["Description", "Active Days", "Prepaid Quantity", "Monthly Rate", "Prepaid Amount"]));
        acc.accept(&row(&["", " ", ""]));
        acc.accept(&row(&["Truck", "30", "1", "$5.00", "$5.00"]));
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn finish_drops_total_rows() {
        let layout = statement_layout().unwrap();
        let mut acc = prepay_accumulator(&layout.prepay);
        acc.accept(&row(&["Truck", "30", "1", "$5.00", "$5.00"]));
        acc.accept(&row(&["Total", "", "", "", "$5.00"]));
        let region = acc.finish();
        assert_eq!(region.rows.len(), 1);
        assert_eq!(region.header[0], "Description");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let rows = vec![
            row(&["Truck", "30", "1", "$5.00", "$5.00"]),
            row(&["", "", "", "", ""]),
            row(&["Subtotal", "", "", "", "$5.00"]),
            row(&["Van", "28", "2", "$4.00", "$8.00"]),
        ];
        let once = clean_rows(rows, 0);
        let twice = clean_rows(once.clone(), 0);
        assert_eq!(once.len(), 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn short_us_dates() {
        assert!(is_short_us_date("1/5/2024"));
        assert!(is_short_us_date("12/31/2024"));
        assert!(!is_short_us_date("2024-01-05"));
        assert!(!is_short_us_date("1/5/24"));
        assert!(!is_short_us_date("Jan 5"));
    }

    #[test]
    fn date_anchored_appends_date_and_description_text() {
        let mut rows = vec![row(&["1/5/2024", "Fuel", "$2.00", "10", "$20.00"])];
        merge_date_anchored(&mut rows, row(&["surcharge", "applied", "", "", ""]), 0, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], "Fuel surcharge applied");

        merge_date_anchored(&mut rows, row(&["1/6/2024", "Tolls", "$1.00", "3", "$3.00"]), 0, 1);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn invoice_accumulator_uses_date_anchoring() {
        let profile = invoice_profile().unwrap();
        let header = row(&["Date", "Description", "Rate", "Quantity", "Amount"]);
        let map = locate_header(&header, &profile.columns, profile.min_matches).unwrap();
        let mut acc = TableAccumulator::new(TableKind::Single, &profile, map);
        acc.accept(&row(&["1/5/2024", "Fuel", "$2.00", "10", "$20.00"]));
        acc.accept(&row(&["", "diesel"]));
        acc.accept(&row(&["1/31/2024", "Total due", "", "", "$20.00"]));
        let region = acc.finish();
        assert_eq!(region.rows.len(), 1);
        assert_eq!(region.rows[0][1], "Fuel diesel");
    }
}
