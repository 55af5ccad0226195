use sheetsmith_core::error::SheetsmithError;
use sheetsmith_core::profile::builtin::{self, Preset};
use sheetsmith_core::profile::schema::TableProfile;
use sheetsmith_core::profile::{parse_layout_str, parse_profile_str};
use std::path::Path;

pub fn list() -> Result<(), SheetsmithError> {
    println!("Available presets:\n");
    for name in builtin::PRESETS {
        match builtin::load_preset(name)? {
            Preset::Statement(layout) => {
                println!("  {:<10} {} [statement layout]", name, layout.name);
                if let Some(ref desc) = layout.description {
                    println!("             {}", desc);
                }
                println!(
                    "             sheets: {}, {}, {}",
                    layout.summary_sheet, layout.prepay.sheet_name, layout.recon.sheet_name
                );
            }
            Preset::Table(profile) => {
                println!("  {:<10} {} [table profile]", name, profile.name);
                if let Some(ref desc) = profile.description {
                    println!("             {}", desc);
                }
                println!("             sheet: {}", profile.sheet_name);
            }
        }
        println!();
    }
    Ok(())
}

pub fn show(preset: &str) -> Result<(), SheetsmithError> {
    let json = builtin::preset_json(preset).ok_or_else(|| {
        SheetsmithError::ProfileInvalid(format!(
            "unknown preset '{preset}'. Available: {}",
            builtin::PRESETS.join(", ")
        ))
    })?;
    println!("{}", json.trim_end());
    Ok(())
}

/// Validate a file as a statement layout when it has sentinels, otherwise as
/// a single table profile.
pub fn validate(file: &Path) -> Result<(), SheetsmithError> {
    let content = std::fs::read_to_string(file).map_err(|e| SheetsmithError::ProfileLoad {
        path: file.to_path_buf(),
        reason: e.to_string(),
    })?;
    let value: serde_json::Value = serde_json::from_str(&content)?;

    if value.get("sentinels").is_some() {
        let layout = parse_layout_str(&content)?;
        println!("Valid statement layout: {}", layout.name);
        describe("prepay", &layout.prepay);
        describe("recon", &layout.recon);
    } else {
        let profile = parse_profile_str(&content)?;
        println!("Valid table profile: {}", profile.name);
        describe("table", &profile);
    }
    Ok(())
}

fn describe(role: &str, profile: &TableProfile) {
    println!(
        "  {:<7} sheet \"{}\", {} column(s), header needs {} match(es)",
        role,
        profile.sheet_name,
        profile.columns.len(),
        profile.min_matches
    );
}
