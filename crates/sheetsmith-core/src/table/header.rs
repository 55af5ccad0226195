use crate::profile::schema::ColumnDef;
use serde::Serialize;
use std::collections::BTreeMap;

/// Where each canonical column sits in the PDF's own column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMap(BTreeMap<String, usize>);

impl ColumnMap {
    pub fn get(&self, key: &str) -> Option<usize> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, usize)> for ColumnMap {
    fn from_iter<I: IntoIterator<Item = (String, usize)>>(iter: I) -> Self {
        ColumnMap(iter.into_iter().collect())
    }
}

/// Try to read `row` as a header row for `columns`.
///
/// Each column takes the first cell that contains one of its aliases, trying
/// aliases in priority order. The row is a header when at least `min_matches`
/// columns were found; the returned map then holds only the found columns.
pub fn locate_header(row: &[String], columns: &[ColumnDef], min_matches: usize) -> Option<ColumnMap> {
    let lowered: Vec<String> = row.iter().map(|c| c.to_lowercase()).collect();

    let mut map = BTreeMap::new();
    for column in columns {
        for alias in &column.aliases {
            let alias = alias.to_lowercase();
            if let Some(idx) = lowered.iter().position(|cell| cell.contains(&alias)) {
                map.insert(column.key.clone(), idx);
                break;
            }
        }
    }

    if map.len() >= min_matches {
        Some(ColumnMap(map))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::builtin::statement_layout;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn full_prepay_header_matches() {
        let layout = statement_layout().unwrap();
        let header = row(&["Description", "Active Days", "Prepaid Quantity", "Monthly Rate", "Prepaid Amount"]);
        let map = locate_header(&header, &layout.prepay.columns, 4).unwrap();
        assert_eq!(map.len(), 5);
        assert_eq!(map.get("description"), Some(0));
        assert_eq!(map.get("prepaid amount"), Some(4));
    }

    #[test]
    fn aliases_tolerate_renamed_headers() {
        let layout = statement_layout().unwrap();
        let header = row(&["Item Description", "Days", "Qty", "Rate", "Amt"]);
        let map = locate_header(&header, &layout.prepay.columns, 4).unwrap();
        assert_eq!(map.get("active days"), Some(1));
        assert_eq!(map.get("prepaid quantity"), Some(2));
        assert_eq!(map.get("monthly rate"), Some(3));
        assert_eq!(map.get("prepaid amount"), Some(4));
    }

    #[test]
    fn alias_priority_beats_cell_order() {
        let layout = statement_layout().unwrap();
        // "amount" appears first, but "prepaid amount" is the preferred alias.
        let header = row(&["Description", "Amount Due", "Days", "Qty", "Rate", "Prepaid Amount"]);
        let map = locate_header(&header, &layout.prepay.columns, 4).unwrap();
        assert_eq!(map.get("prepaid amount"), Some(5));
    }

    #[test]
    fn threshold_is_monotone() {
        let layout = statement_layout().unwrap();
        let header = row(&["Description", "Active Days", "Quantity", "Notes"]);
        // Three of five columns present.
        for threshold in 1..=3 {
            assert!(locate_header(&header, &layout.prepay.columns, threshold).is_some());
        }
        for threshold in 4..=5 {
            assert!(locate_header(&header, &layout.prepay.columns, threshold).is_none());
        }
    }

    #[test]
    fn recon_header_needs_five_of_seven() {
        let layout = statement_layout().unwrap();
        let prepay_header = row(&["Description", "Active Days", "Prepaid Quantity", "Monthly Rate", "Prepaid Amount"]);
        assert!(locate_header(&prepay_header, &layout.recon.columns, 5).is_none());

        let recon_header = row(&[
            "Description",
            "Active Days",
            "Prepaid Quantity",
            "Actual Quantity",
            "Reconciled Quantity",
            "Monthly Rate",
            "Reconciliation Amount",
        ]);
        let map = locate_header(&recon_header, &layout.recon.columns, 5).unwrap();
        assert_eq!(map.len(), 7);
        assert_eq!(map.get("reconciliation amount"), Some(6));
    }

    #[test]
    fn data_row_is_not_a_header() {
        let layout = statement_layout().unwrap();
        let data = row(&["Truck 12", "30", "1", "$100.00", "$100.00"]);
        assert!(locate_header(&data, &layout.prepay.columns, 4).is_none());
    }
}
