use serde::Serialize;
use sheetsmith_core::error::SheetsmithError;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), SheetsmithError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
