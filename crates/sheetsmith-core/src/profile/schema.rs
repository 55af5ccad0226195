use serde::{Deserialize, Serialize};

/// Describes one table: how to find its header, how to project and merge
/// its rows, and how to format it on export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableProfile {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Output worksheet name.
    pub sheet_name: String,
    /// Canonical columns, in output order.
    pub columns: Vec<ColumnDef>,
    /// Minimum number of columns that must match for a row to count as the header.
    pub min_matches: usize,
    /// Column that holds the row amount (stray totals are realigned into it).
    #[serde(default)]
    pub amount_column: Option<String>,
    /// Column checked for "total" when cleaning. Defaults to the first column.
    #[serde(default)]
    pub total_column: Option<String>,
    /// Phrases that end the table when they appear on a row without amounts.
    #[serde(default)]
    pub stop_phrases: Vec<String>,
    #[serde(default)]
    pub merge: MergeStrategy,
}

/// A canonical column of a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    pub key: String,
    /// Header text written to the output sheet.
    pub label: String,
    /// Substrings accepted in the PDF header, in priority order.
    pub aliases: Vec<String>,
    #[serde(default)]
    pub format: ColumnFormat,
    #[serde(default = "default_width")]
    pub width: f64,
}

fn default_width() -> f64 {
    15.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnFormat {
    #[default]
    Text,
    Number,
    Currency,
    Percent,
}

/// How wrapped lines are stitched back onto their record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Single-cell description lines continue the previous record.
    #[default]
    Continuation,
    /// Every record starts with an `M/D/YYYY` date; anything else continues
    /// the previous record's description.
    DateAnchored {
        date_column: String,
        description_column: String,
    },
}

impl TableProfile {
    pub fn keys(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.key.as_str()).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label.clone()).collect()
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }

    pub fn amount_index(&self) -> Option<usize> {
        self.amount_column.as_deref().and_then(|k| self.index_of(k))
    }

    pub fn total_index(&self) -> usize {
        self.total_column
            .as_deref()
            .and_then(|k| self.index_of(k))
            .unwrap_or(0)
    }
}

/// Sentinel phrases that carve the summary block into its three sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarySentinels {
    /// Opens the summary (first section).
    pub start: String,
    /// Opens the second section.
    pub reconciliation: String,
    /// Opens the third section.
    pub total: String,
    /// Closes the summary.
    pub end: String,
}

/// Layout of a multi-table monthly statement: a summary block followed by a
/// prepayment table and a prior-month reconciliation table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementLayout {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub sentinels: SummarySentinels,
    /// Title row text for each summary section.
    pub summary_titles: [String; 3],
    #[serde(default = "default_amount_label")]
    pub summary_amount_label: String,
    pub summary_sheet: String,
    #[serde(default = "default_summary_widths")]
    pub summary_widths: Vec<f64>,
    pub prepay: TableProfile,
    pub recon: TableProfile,
}

fn default_amount_label() -> String {
    "Amount".to_string()
}

fn default_summary_widths() -> Vec<f64> {
    vec![40.0, 20.0]
}
