use sheetsmith_core::batch::capacity::{CapacityRecord, METRICS};
use sheetsmith_core::sheet::CompiledSheet;
use sheetsmith_core::table::segment::{StatementTables, SummaryTable};
use sheetsmith_core::table::TableRegion;

/// Widest cell shown before truncation.
const MAX_CELL: usize = 40;

pub fn print_statement(tables: &StatementTables) {
    if let Some(summary) = &tables.summary {
        print_summary(summary);
    }
    for region in tables.regions() {
        print_region(region);
    }
}

fn print_summary(summary: &SummaryTable) {
    println!("=== {} ===\n", summary.sheet_name);
    let width = summary
        .sections
        .iter()
        .flat_map(|s| s.rows.iter().map(|r| r.description.chars().count()))
        .max()
        .unwrap_or(20)
        .min(MAX_CELL);

    for section in &summary.sections {
        println!("  {}", section.title);
        for line in &section.rows {
            println!(
                "    {:<width$}  {:>12}",
                clip(&line.description),
                line.amount,
                width = width
            );
        }
        println!();
    }
}

pub fn print_region(region: &TableRegion) {
    println!("=== {} ({} row(s)) ===\n", region.title, region.rows.len());
    print_grid(&region.header, &region.rows);
}

pub fn print_sheet(sheet: &CompiledSheet) {
    println!("=== {} ===\n", sheet.name);
    let rows: Vec<Vec<String>> = sheet
        .rows
        .iter()
        .map(|row| row.iter().map(|c| c.display()).collect())
        .collect();
    print_grid(&[], &rows);
}

pub fn print_capacity(records: &[CapacityRecord]) {
    println!(
        "  {:<10}  {:>5}  {:>8}  {:>9}  {:>8}",
        "Date", "Week", "Score", "Completed", "Dropped"
    );
    println!("  {}", "-".repeat(48));
    for r in records {
        let show = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "  {:<10}  {:>5}  {:>7.1}%  {:>9}  {:>8}",
            r.date.format("%Y-%m-%d"),
            r.week,
            r.reliability_score * 100.0,
            show(r.metrics[0]),
            show(r.metrics[2]),
        );
    }
    println!(
        "\n  {} record(s); {} metric(s) per record in the workbook",
        records.len(),
        METRICS.len()
    );
}

fn print_grid(header: &[String], rows: &[Vec<String>]) {
    let columns = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(clip(cell).chars().count());
        }
    }

    let line = |row: &[String]| {
        let cells: Vec<String> = (0..columns)
            .map(|i| {
                let cell = row.get(i).map(|c| clip(c)).unwrap_or_default();
                format!("{:<width$}", cell, width = widths[i])
            })
            .collect();
        println!("  {}", cells.join("  ").trim_end());
    };

    if !header.is_empty() {
        line(header);
        println!("  {}", "-".repeat(widths.iter().sum::<usize>() + 2 * columns.saturating_sub(1)));
    }
    for row in rows {
        line(row);
    }
    println!();
}

fn clip(cell: &str) -> String {
    if cell.chars().count() <= MAX_CELL {
        cell.to_string()
    } else {
        let mut s: String = cell.chars().take(MAX_CELL - 3).collect();
        s.push_str("...");
        s
    }
}
