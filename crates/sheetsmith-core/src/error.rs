use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SheetsmithError {
    #[error("no input provided")]
    EmptyInput,

    #[error("unsupported file: {0}")]
    UnsupportedFile(String),

    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("no tables found; check PDF structure")]
    NoTablesFound,

    #[error("headers found but no data rows; the PDF structure might be non-standard")]
    HeadersWithoutData,

    #[error("no usable data: {0}")]
    NoUsableData(String),

    #[error("failed to load profile from {path}: {reason}")]
    ProfileLoad { path: PathBuf, reason: String },

    #[error("invalid profile: {0}")]
    ProfileInvalid(String),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
