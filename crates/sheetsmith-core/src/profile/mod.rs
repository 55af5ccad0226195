pub mod builtin;
pub mod schema;

use crate::error::SheetsmithError;
use schema::{MergeStrategy, StatementLayout, TableProfile};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::Path;

/// Load a table profile from a JSON file.
pub fn load_profile(path: &Path) -> Result<TableProfile, SheetsmithError> {
    let profile: TableProfile = read_json(path)?;
    validate_profile(&profile)?;
    Ok(profile)
}

/// Load a statement layout from a JSON file.
pub fn load_layout(path: &Path) -> Result<StatementLayout, SheetsmithError> {
    let layout: StatementLayout = read_json(path)?;
    validate_layout(&layout)?;
    Ok(layout)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SheetsmithError> {
    let content = std::fs::read_to_string(path).map_err(|e| SheetsmithError::ProfileLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| SheetsmithError::ProfileLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Parse a table profile from a JSON string (no file path context).
pub fn parse_profile_str(json: &str) -> Result<TableProfile, SheetsmithError> {
    let profile: TableProfile = serde_json::from_str(json)?;
    validate_profile(&profile)?;
    Ok(profile)
}

/// Parse a statement layout from a JSON string (no file path context).
pub fn parse_layout_str(json: &str) -> Result<StatementLayout, SheetsmithError> {
    let layout: StatementLayout = serde_json::from_str(json)?;
    validate_layout(&layout)?;
    Ok(layout)
}

/// Validate that a table profile is well-formed.
pub fn validate_profile(profile: &TableProfile) -> Result<(), SheetsmithError> {
    if profile.columns.is_empty() {
        return Err(SheetsmithError::ProfileInvalid(format!(
            "profile '{}' has no columns",
            profile.name
        )));
    }

    if profile.sheet_name.trim().is_empty() {
        return Err(SheetsmithError::ProfileInvalid(format!(
            "profile '{}' has an empty sheet name",
            profile.name
        )));
    }

    let mut seen = HashSet::new();
    for column in &profile.columns {
        if column.key.trim().is_empty() {
            return Err(SheetsmithError::ProfileInvalid(format!(
                "profile '{}' has a column with an empty key",
                profile.name
            )));
        }
        if !seen.insert(column.key.as_str()) {
            return Err(SheetsmithError::ProfileInvalid(format!(
                "profile '{}' defines column '{}' twice",
                profile.name, column.key
            )));
        }
        if column.aliases.is_empty() || column.aliases.iter().any(|a| a.trim().is_empty()) {
            return Err(SheetsmithError::ProfileInvalid(format!(
                "column '{}' needs at least one non-empty alias",
                column.key
            )));
        }
        if column.width <= 0.0 {
            return Err(SheetsmithError::ProfileInvalid(format!(
                "column '{}' has a non-positive width",
                column.key
            )));
        }
    }

    if profile.min_matches == 0 || profile.min_matches > profile.columns.len() {
        return Err(SheetsmithError::ProfileInvalid(format!(
            "profile '{}': min_matches must be between 1 and {} (got {})",
            profile.name,
            profile.columns.len(),
            profile.min_matches
        )));
    }

    let mut referenced: Vec<&str> = Vec::new();
    referenced.extend(profile.amount_column.as_deref());
    referenced.extend(profile.total_column.as_deref());
    if let MergeStrategy::DateAnchored {
        date_column,
        description_column,
    } = &profile.merge
    {
        referenced.push(date_column);
        referenced.push(description_column);
    }
    for key in referenced {
        if profile.index_of(key).is_none() {
            return Err(SheetsmithError::ProfileInvalid(format!(
                "profile '{}' references unknown column '{}'",
                profile.name, key
            )));
        }
    }

    Ok(())
}

/// Validate a statement layout and both of its table profiles.
pub fn validate_layout(layout: &StatementLayout) -> Result<(), SheetsmithError> {
    let sentinels = [
        &layout.sentinels.start,
        &layout.sentinels.reconciliation,
        &layout.sentinels.total,
        &layout.sentinels.end,
    ];
    if sentinels.iter().any(|s| s.trim().is_empty()) {
        return Err(SheetsmithError::ProfileInvalid(format!(
            "layout '{}' has an empty sentinel phrase",
            layout.name
        )));
    }

    if layout.summary_sheet.trim().is_empty() {
        return Err(SheetsmithError::ProfileInvalid(format!(
            "layout '{}' has an empty summary sheet name",
            layout.name
        )));
    }

    validate_profile(&layout.prepay)?;
    validate_profile(&layout.recon)?;

    let sheets = [&layout.summary_sheet, &layout.prepay.sheet_name, &layout.recon.sheet_name];
    let unique: HashSet<&&String> = sheets.iter().collect();
    if unique.len() != sheets.len() {
        return Err(SheetsmithError::ProfileInvalid(format!(
            "layout '{}' reuses a sheet name",
            layout.name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "name": "Test",
        "sheet_name": "Data",
        "columns": [
            { "key": "item", "label": "Item", "aliases": ["item"] },
            { "key": "cost", "label": "Cost", "aliases": ["cost", "amount"], "format": "currency" }
        ],
        "min_matches": 2,
        "amount_column": "cost"
    }"#;

    #[test]
    fn test_parse_valid_profile() {
        let p = parse_profile_str(MINIMAL).unwrap();
        assert_eq!(p.keys(), vec!["item", "cost"]);
        assert_eq!(p.amount_index(), Some(1));
        assert_eq!(p.total_index(), 0);
        assert_eq!(p.merge, MergeStrategy::Continuation);
        assert_eq!(p.columns[0].width, 15.0);
    }

    #[test]
    fn test_threshold_above_column_count_rejected() {
        let json = MINIMAL.replace("\"min_matches\": 2", "\"min_matches\": 3");
        assert!(matches!(
            parse_profile_str(&json),
            Err(SheetsmithError::ProfileInvalid(_))
        ));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let json = MINIMAL.replace("\"min_matches\": 2", "\"min_matches\": 0");
        assert!(parse_profile_str(&json).is_err());
    }

    #[test]
    fn test_unknown_amount_column_rejected() {
        let json = MINIMAL.replace("\"amount_column\": \"cost\"", "\"amount_column\": \"price\"");
        assert!(parse_profile_str(&json).is_err());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let json = MINIMAL.replace("\"key\": \"cost\"", "\"key\": \"item\"");
        assert!(parse_profile_str(&json).is_err());
    }

    #[test]
    fn test_empty_alias_list_rejected() {
        let json = MINIMAL.replace("\"aliases\": [\"item\"]", "\"aliases\": []");
        assert!(parse_profile_str(&json).is_err());
    }

    #[test]
    fn test_date_anchored_columns_must_exist() {
        let json = MINIMAL.replace(
            "\"amount_column\": \"cost\"",
            "\"merge\": { \"kind\": \"date_anchored\", \"date_column\": \"date\", \"description_column\": \"item\" }",
        );
        assert!(parse_profile_str(&json).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_profile(Path::new("/nonexistent/profile.json")).unwrap_err();
        assert!(matches!(err, SheetsmithError::ProfileLoad { .. }));
    }

    #[test]
    fn test_load_layout_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        std::fs::write(&path, builtin::STATEMENT_JSON).unwrap();
        let layout = load_layout(&path).unwrap();
        assert_eq!(layout.prepay.min_matches, 4);
    }
}
