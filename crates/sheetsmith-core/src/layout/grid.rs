use crate::extraction::{Fragment, PageFragments};
use crate::layout::rows::bucket_rows;
use serde::Serialize;

/// Fragments whose x positions are closer than this belong to one column.
pub const COLUMN_GAP: f32 = 20.0;

/// A best-effort table recovered from one page by column clustering.
#[derive(Debug, Clone, Serialize)]
pub struct GridTable {
    pub page_number: usize,
    pub columns: usize,
    pub rows: Vec<Vec<String>>,
}

/// Cluster the x positions of every fragment into column positions.
///
/// Positions are sorted; a gap of at least [`COLUMN_GAP`] starts a new
/// cluster. Each column sits at the mean of its cluster.
pub fn detect_columns(rows: &[Vec<&Fragment>]) -> Vec<f32> {
    let mut xs: Vec<f32> = rows.iter().flatten().map(|f| f.x).collect();
    if xs.is_empty() {
        return Vec::new();
    }
    xs.sort_by(f32::total_cmp);

    let mut columns = Vec::new();
    let mut cluster = vec![xs[0]];
    for pair in xs.windows(2) {
        if pair[1] - pair[0] < COLUMN_GAP {
            cluster.push(pair[1]);
        } else {
            columns.push(mean(&cluster));
            cluster = vec![pair[1]];
        }
    }
    columns.push(mean(&cluster));
    columns
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

fn nearest_column(x: f32, columns: &[f32]) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (idx, pos) in columns.iter().enumerate() {
        let dist = (x - pos).abs();
        if dist < best_dist {
            best_dist = dist;
            best = idx;
        }
    }
    best
}

/// Lay one page out as a grid. Pages with fewer than two columns or two
/// non-blank rows are not tables.
pub fn page_table(page: &PageFragments) -> Option<GridTable> {
    let rows = bucket_rows(&page.fragments);
    if rows.len() < 2 {
        return None;
    }

    let columns = detect_columns(&rows);
    if columns.len() < 2 {
        return None;
    }

    let data: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = vec![String::new(); columns.len()];
            for fragment in row {
                let cell = &mut cells[nearest_column(fragment.x, &columns)];
                if !cell.is_empty() {
                    cell.push(' ');
                }
                cell.push_str(&fragment.text);
            }
            cells.into_iter().map(|c| c.trim().to_string()).collect::<Vec<_>>()
        })
        .filter(|row: &Vec<String>| row.iter().any(|c| !c.is_empty()))
        .collect();

    if data.len() < 2 {
        return None;
    }

    Some(GridTable {
        page_number: page.page_number,
        columns: columns.len(),
        rows: data,
    })
}

/// Concatenate page tables, separated by one blank row.
pub fn combine(tables: &[GridTable]) -> Vec<Vec<String>> {
    let mut combined = Vec::new();
    for (idx, table) in tables.iter().enumerate() {
        if idx > 0 {
            combined.push(Vec::new());
        }
        combined.extend(table.rows.iter().cloned());
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(fragments: Vec<Fragment>) -> PageFragments {
        PageFragments {
            page_number: 1,
            fragments,
        }
    }

    #[test]
    fn clusters_nearby_positions() {
        let a = Fragment::new("a", 50.0, 700.0);
        let b = Fragment::new("b", 60.0, 680.0);
        let c = Fragment::new("c", 300.0, 700.0);
        let rows = vec![vec![&a, &c], vec![&b]];
        assert_eq!(detect_columns(&rows), vec![55.0, 300.0]);
    }

    #[test]
    fn two_column_page_becomes_table() {
        let table = page_table(&page(vec![
            Fragment::new("Item", 50.0, 700.0),
            Fragment::new("Cost", 300.0, 700.0),
            Fragment::new("Fuel", 52.0, 680.0),
            Fragment::new("$40.00", 305.0, 680.0),
        ]))
        .unwrap();
        assert_eq!(table.columns, 2);
        assert_eq!(
            table.rows,
            vec![vec!["Item", "Cost"], vec!["Fuel", "$40.00"]]
        );
    }

    #[test]
    fn collisions_are_space_joined() {
        let table = page_table(&page(vec![
            Fragment::new("Service", 50.0, 700.0),
            Fragment::new("Fee", 60.0, 700.0),
            Fragment::new("10", 300.0, 700.0),
            Fragment::new("Tax", 50.0, 680.0),
            Fragment::new("2", 300.0, 680.0),
        ]))
        .unwrap();
        assert_eq!(table.rows[0], vec!["Service Fee", "10"]);
    }

    #[test]
    fn single_column_page_is_not_a_table() {
        let result = page_table(&page(vec![
            Fragment::new("Dear customer,", 50.0, 700.0),
            Fragment::new("Thank you.", 55.0, 680.0),
        ]));
        assert!(result.is_none());
    }

    #[test]
    fn tables_are_separated_by_blank_row() {
        let t = GridTable {
            page_number: 1,
            columns: 2,
            rows: vec![vec!["a".into(), "b".into()]],
        };
        let combined = combine(&[t.clone(), t]);
        assert_eq!(combined.len(), 3);
        assert!(combined[1].is_empty());
    }
}
