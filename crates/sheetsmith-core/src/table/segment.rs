//! Document segmentation: one state machine walks every row of a statement,
//! page after page, and carves it into the summary block and the two detail
//! tables.

use crate::error::SheetsmithError;
use crate::layout::rows::{row_text, RawRow};
use crate::profile::schema::{StatementLayout, TableProfile};
use crate::table::header::locate_header;
use crate::table::merge::{Flow, TableAccumulator};
use crate::table::{TableKind, TableRegion};
use crate::values::looks_like_amount;
use serde::Serialize;

/// One `(description, amount)` line of the summary block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub description: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummarySection {
    pub title: String,
    pub rows: Vec<SummaryRow>,
}

/// The summary block: up to three titled sections.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryTable {
    pub sheet_name: String,
    pub amount_label: String,
    pub sections: Vec<SummarySection>,
}

impl SummaryTable {
    /// Number of `(description, amount)` lines, titles excluded.
    pub fn data_rows(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }

    /// Flatten to sheet rows: each section opens with a title row, and
    /// sections are separated by two blank rows.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        for (idx, section) in self.sections.iter().enumerate() {
            if idx > 0 {
                rows.push(Vec::new());
                rows.push(Vec::new());
            }
            rows.push(vec![section.title.clone(), self.amount_label.clone()]);
            for line in &section.rows {
                rows.push(vec![line.description.clone(), line.amount.clone()]);
            }
        }
        rows
    }
}

/// Everything recovered from one statement. Each table is optional, but a
/// successful conversion always has at least one.
#[derive(Debug, Clone, Serialize)]
pub struct StatementTables {
    pub summary: Option<SummaryTable>,
    pub prepay: Option<TableRegion>,
    pub recon: Option<TableRegion>,
}

impl StatementTables {
    pub fn table_count(&self) -> usize {
        usize::from(self.summary.is_some())
            + usize::from(self.prepay.is_some())
            + usize::from(self.recon.is_some())
    }

    pub fn data_rows(&self) -> usize {
        self.summary.as_ref().map_or(0, SummaryTable::data_rows)
            + self.regions().map(|r| r.rows.len()).sum::<usize>()
    }

    pub fn cell_count(&self) -> usize {
        let summary = self
            .summary
            .as_ref()
            .map_or(0, |s| s.to_rows().iter().map(Vec::len).sum());
        summary + self.regions().map(TableRegion::cell_count).sum::<usize>()
    }

    pub fn regions(&self) -> impl Iterator<Item = &TableRegion> {
        self.prepay.iter().chain(self.recon.iter())
    }
}

/// Split a summary row: the last amount-like cell is the amount, the cells
/// before it form the description. Without an amount the whole row is text.
pub fn parse_summary_row(row: &[String]) -> SummaryRow {
    let cells: Vec<&str> = row.iter().map(|c| c.trim()).collect();
    let join = |parts: &[&str]| {
        parts
            .iter()
            .filter(|p| !p.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    };

    match cells.iter().rposition(|c| looks_like_amount(c)) {
        Some(idx) => SummaryRow {
            description: join(&cells[..idx]),
            amount: cells[idx].to_string(),
        },
        None => SummaryRow {
            description: join(&cells[..]),
            amount: String::new(),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SummaryStage {
    Prepayment,
    Reconciliation,
    Total,
}

#[derive(Debug, Default)]
enum Phase<'p> {
    #[default]
    AwaitingSummary,
    Summary(SummaryStage),
    PrepaySearch,
    Prepay(TableAccumulator<'p>),
    ReconSearch,
    Recon(TableAccumulator<'p>),
    Done,
}

impl Phase<'_> {
    fn name(&self) -> &'static str {
        match self {
            Phase::AwaitingSummary => "awaiting-summary",
            Phase::Summary(SummaryStage::Prepayment) => "summary-prepayment",
            Phase::Summary(SummaryStage::Reconciliation) => "summary-reconciliation",
            Phase::Summary(SummaryStage::Total) => "summary-total",
            Phase::PrepaySearch => "prepay-header-search",
            Phase::Prepay(_) => "prepay",
            Phase::ReconSearch => "recon-header-search",
            Phase::Recon(_) => "recon",
            Phase::Done => "done",
        }
    }
}

/// State machine for multi-table statements.
///
/// Phases only move forward: summary, prepayment table, reconciliation
/// table. A header row seen early (before the summary sentinels complete)
/// jumps straight to its table.
pub struct StatementSegmenter<'p> {
    layout: &'p StatementLayout,
    phase: Phase<'p>,
    sections: Vec<SummarySection>,
    prepay: Option<TableRegion>,
    recon: Option<TableRegion>,
    header_seen: bool,
}

impl<'p> StatementSegmenter<'p> {
    pub fn new(layout: &'p StatementLayout) -> Self {
        StatementSegmenter {
            layout,
            phase: Phase::AwaitingSummary,
            sections: Vec::new(),
            prepay: None,
            recon: None,
            header_seen: false,
        }
    }

    /// Name of the active phase, for diagnostics.
    pub fn phase_name(&self) -> &'static str {
        self.phase.name()
    }

    /// Feed the rows of one page, in order.
    pub fn feed_page(&mut self, page_number: usize, rows: &[RawRow]) {
        tracing::debug!(page = page_number, rows = rows.len(), phase = self.phase_name(), "segmenting page");
        for row in rows {
            self.feed_row(row);
        }
    }

    pub fn feed_row(&mut self, row: &[String]) {
        let phase = std::mem::take(&mut self.phase);
        let before = phase.name();
        self.phase = self.advance(phase, row);
        if before != self.phase.name() {
            tracing::debug!(from = before, to = self.phase.name(), "phase transition");
        }
    }

    fn advance(&mut self, phase: Phase<'p>, row: &[String]) -> Phase<'p> {
        let layout = self.layout;
        let sentinels = &layout.sentinels;
        let text = row_text(row);
        let mentions = |phrase: &str| text.contains(&phrase.to_lowercase());

        match phase {
            Phase::AwaitingSummary => {
                if mentions(&sentinels.start) {
                    self.open_section(0);
                    Phase::Summary(SummaryStage::Prepayment)
                } else {
                    self.open_table(row).unwrap_or(Phase::AwaitingSummary)
                }
            }
            Phase::Summary(stage) => {
                if let Some(next) = self.open_table(row) {
                    return next;
                }
                match stage {
                    SummaryStage::Prepayment if mentions(&sentinels.reconciliation) => {
                        self.open_section(1);
                        Phase::Summary(SummaryStage::Reconciliation)
                    }
                    SummaryStage::Reconciliation if mentions(&sentinels.total) => {
                        self.open_section(2);
                        Phase::Summary(SummaryStage::Total)
                    }
                    SummaryStage::Total if mentions(&sentinels.end) => Phase::PrepaySearch,
                    _ => {
                        let line = parse_summary_row(row);
                        if !line.description.is_empty() || !line.amount.is_empty() {
                            if let Some(section) = self.sections.last_mut() {
                                section.rows.push(line);
                            }
                        }
                        Phase::Summary(stage)
                    }
                }
            }
            Phase::PrepaySearch => self.open_table(row).unwrap_or(Phase::PrepaySearch),
            Phase::Prepay(mut acc) => {
                if acc.is_stop(row) {
                    self.seal(acc);
                    // The stop row itself may already carry the next header.
                    return self.advance(Phase::ReconSearch, row);
                }
                if let Some(recon) = self.open_recon(row) {
                    self.seal(acc);
                    return recon;
                }
                acc.accept(row);
                Phase::Prepay(acc)
            }
            Phase::ReconSearch => self.open_recon(row).unwrap_or(Phase::ReconSearch),
            Phase::Recon(mut acc) => match acc.accept(row) {
                Flow::Continue => Phase::Recon(acc),
                Flow::Stop => {
                    self.seal(acc);
                    Phase::Done
                }
            },
            Phase::Done => Phase::Done,
        }
    }

    fn open_section(&mut self, idx: usize) {
        let title = self.layout.summary_titles[idx].clone();
        self.sections.push(SummarySection {
            title,
            rows: Vec::new(),
        });
    }

    /// Start whichever detail table `row` is the header of. The recon header
    /// is tried first: it also satisfies the looser prepay threshold.
    fn open_table(&mut self, row: &[String]) -> Option<Phase<'p>> {
        if let Some(recon) = self.open_recon(row) {
            return Some(recon);
        }
        let layout = self.layout;
        self.open(TableKind::Prepay, &layout.prepay, row).map(Phase::Prepay)
    }

    fn open_recon(&mut self, row: &[String]) -> Option<Phase<'p>> {
        let layout = self.layout;
        self.open(TableKind::Recon, &layout.recon, row).map(Phase::Recon)
    }

    fn open(&mut self, kind: TableKind, profile: &'p TableProfile, row: &[String]) -> Option<TableAccumulator<'p>> {
        let map = locate_header(row, &profile.columns, profile.min_matches)?;
        tracing::debug!(table = profile.name.as_str(), columns = map.len(), "header located");
        self.header_seen = true;
        Some(TableAccumulator::new(kind, profile, map))
    }

    fn seal(&mut self, acc: TableAccumulator<'p>) {
        let region = acc.finish();
        tracing::info!(table = region.title.as_str(), rows = region.rows.len(), "table sealed");
        if region.rows.is_empty() {
            return;
        }
        match region.kind {
            TableKind::Prepay => self.prepay = Some(region),
            TableKind::Recon => self.recon = Some(region),
            TableKind::Single => {}
        }
    }

    /// Seal whatever is open and return the recovered tables.
    pub fn finish(mut self) -> Result<StatementTables, SheetsmithError> {
        match std::mem::take(&mut self.phase) {
            Phase::Prepay(acc) | Phase::Recon(acc) => self.seal(acc),
            _ => {}
        }

        let summary = SummaryTable {
            sheet_name: self.layout.summary_sheet.clone(),
            amount_label: self.layout.summary_amount_label.clone(),
            sections: self.sections,
        };
        let tables = StatementTables {
            summary: (summary.data_rows() > 0).then_some(summary),
            prepay: self.prepay,
            recon: self.recon,
        };

        if tables.table_count() == 0 {
            return Err(if self.header_seen {
                SheetsmithError::HeadersWithoutData
            } else {
                SheetsmithError::NoTablesFound
            });
        }
        Ok(tables)
    }
}

/// Single-table scan: find the profile's header anywhere in the document,
/// then accumulate every following row.
pub struct TableScanner<'p> {
    profile: &'p TableProfile,
    acc: Option<TableAccumulator<'p>>,
    stopped: bool,
}

impl<'p> TableScanner<'p> {
    pub fn new(profile: &'p TableProfile) -> Self {
        TableScanner {
            profile,
            acc: None,
            stopped: false,
        }
    }

    pub fn feed_page(&mut self, page_number: usize, rows: &[RawRow]) {
        tracing::debug!(page = page_number, rows = rows.len(), header = self.acc.is_some(), "scanning page");
        for row in rows {
            self.feed_row(row);
        }
    }

    pub fn feed_row(&mut self, row: &[String]) {
        if self.stopped {
            return;
        }
        match self.acc.as_mut() {
            Some(acc) => {
                if acc.accept(row) == Flow::Stop {
                    self.stopped = true;
                }
            }
            None => {
                let profile = self.profile;
                if let Some(map) = locate_header(row, &profile.columns, profile.min_matches) {
                    tracing::debug!(table = profile.name.as_str(), "header located");
                    self.acc = Some(TableAccumulator::new(TableKind::Single, profile, map));
                }
            }
        }
    }

    pub fn finish(self) -> Result<TableRegion, SheetsmithError> {
        let acc = self.acc.ok_or(SheetsmithError::NoTablesFound)?;
        let region = acc.finish();
        if region.rows.is_empty() {
            return Err(SheetsmithError::HeadersWithoutData);
        }
        tracing::info!(table = region.title.as_str(), rows = region.rows.len(), "table sealed");
        Ok(region)
    }
}
