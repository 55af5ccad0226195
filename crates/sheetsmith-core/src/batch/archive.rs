use crate::batch::{BatchWarning, InputFile};
use crate::error::SheetsmithError;
use crate::sheet::reader::is_spreadsheet_name;
use std::io::{Cursor, Read};
use tracing::{debug, warn};

/// Replace every `.zip` upload with the spreadsheet entries it contains.
///
/// Directory entries and `__MACOSX` resource forks are skipped, as is any
/// entry that is not `.xlsx`, `.xls` or `.csv`. Non-archive uploads pass
/// through untouched, in order. An unreadable archive becomes a warning.
pub fn expand_uploads(uploads: Vec<InputFile>, warnings: &mut Vec<BatchWarning>) -> Vec<InputFile> {
    let mut files = Vec::with_capacity(uploads.len());
    for upload in uploads {
        if !upload.name.to_ascii_lowercase().ends_with(".zip") {
            files.push(upload);
            continue;
        }
        match list_entries(&upload.bytes) {
            Ok(entries) => {
                debug!(archive = %upload.name, entries = entries.len(), "expanded archive");
                files.extend(entries);
            }
            Err(e) => {
                warn!(archive = %upload.name, error = %e, "skipping unreadable archive");
                warnings.push(BatchWarning::new(upload.name, e));
            }
        }
    }
    files
}

/// Spreadsheet entries of a ZIP archive, in archive order.
pub fn list_entries(bytes: &[u8]) -> Result<Vec<InputFile>, SheetsmithError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| SheetsmithError::Archive(e.to_string()))?;

    let mut entries = Vec::new();
    for idx in 0..archive.len() {
        let mut entry = archive
            .by_index(idx)
            .map_err(|e| SheetsmithError::Archive(e.to_string()))?;
        let name = entry.name().to_string();
        if name.ends_with('/') || name.contains("__MACOSX") || !is_spreadsheet_name(&name) {
            continue;
        }
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        entries.push(InputFile::new(name, data));
    }
    Ok(entries)
}
