use crate::error::SheetsmithError;
use crate::profile::schema::{StatementLayout, TableProfile};

pub const STATEMENT_JSON: &str = include_str!("../../../../profiles/statement.json");
pub const INVOICE_JSON: &str = include_str!("../../../../profiles/invoice.json");

/// Available predefined presets.
pub const PRESETS: &[&str] = &["statement", "invoice"];

/// A loaded preset: either a whole statement layout or a single table.
#[derive(Debug, Clone)]
pub enum Preset {
    Statement(StatementLayout),
    Table(TableProfile),
}

/// Load the built-in monthly statement layout.
pub fn statement_layout() -> Result<StatementLayout, SheetsmithError> {
    let layout: StatementLayout = serde_json::from_str(STATEMENT_JSON)?;
    Ok(layout)
}

/// Load the built-in invoice table profile.
pub fn invoice_profile() -> Result<TableProfile, SheetsmithError> {
    let profile: TableProfile = serde_json::from_str(INVOICE_JSON)?;
    Ok(profile)
}

/// Load a predefined preset by name.
pub fn load_preset(name: &str) -> Result<Preset, SheetsmithError> {
    match name {
        "statement" => statement_layout().map(Preset::Statement),
        "invoice" => invoice_profile().map(Preset::Table),
        _ => Err(SheetsmithError::ProfileInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}

/// Raw JSON of a preset, for display.
pub fn preset_json(name: &str) -> Option<&'static str> {
    match name {
        "statement" => Some(STATEMENT_JSON),
        "invoice" => Some(INVOICE_JSON),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::schema::{ColumnFormat, MergeStrategy};
    use crate::profile::{validate_layout, validate_profile};

    #[test]
    fn test_statement_preset_is_valid() {
        let layout = statement_layout().unwrap();
        validate_layout(&layout).unwrap();
        assert_eq!(layout.prepay.columns.len(), 5);
        assert_eq!(layout.prepay.min_matches, 4);
        assert_eq!(layout.prepay.amount_index(), Some(4));
        assert_eq!(layout.recon.columns.len(), 7);
        assert_eq!(layout.recon.min_matches, 5);
        assert_eq!(layout.recon.amount_index(), Some(6));
        assert!(layout.recon.stop_phrases.is_empty());
    }

    #[test]
    fn test_invoice_preset_is_valid() {
        let profile = invoice_profile().unwrap();
        validate_profile(&profile).unwrap();
        assert_eq!(profile.min_matches, profile.columns.len());
        assert_eq!(profile.total_index(), 1);
        assert_eq!(profile.columns[2].format, ColumnFormat::Currency);
        assert!(matches!(profile.merge, MergeStrategy::DateAnchored { .. }));
    }

    #[test]
    fn test_every_preset_loads() {
        for name in PRESETS {
            assert!(load_preset(name).is_ok(), "preset {name} failed");
            assert!(preset_json(name).is_some());
        }
    }

    #[test]
    fn test_unknown_preset() {
        assert!(load_preset("xyz").is_err());
    }
}
