pub mod pdftotext;

use serde::{Deserialize, Serialize};

use crate::error::SheetsmithError;

/// One positioned run of text from a PDF text layer.
///
/// `x` and `y` are in PDF user space: the origin is the bottom-left corner of
/// the page, so `y` grows upward and a larger `y` is visually higher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
}

impl Fragment {
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Fragment {
            text: text.into(),
            x,
            y,
            width: 0.0,
        }
    }
}

/// Positioned text extracted from a single page of a PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageFragments {
    pub page_number: usize,
    pub fragments: Vec<Fragment>,
}

/// Trait for PDF text-layer backends.
pub trait PdfExtractor: Send + Sync {
    /// Decode PDF bytes into per-page fragment lists, in page order.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageFragments>, SheetsmithError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Reject empty and non-PDF input before any decoding starts.
pub fn ensure_pdf(pdf_bytes: &[u8]) -> Result<(), SheetsmithError> {
    if pdf_bytes.is_empty() {
        return Err(SheetsmithError::EmptyInput);
    }
    let head = &pdf_bytes[..pdf_bytes.len().min(1024)];
    if !head.windows(5).any(|w| w == b"%PDF-") {
        return Err(SheetsmithError::UnsupportedFile(
            "expected a PDF document (missing %PDF- header)".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(ensure_pdf(&[]), Err(SheetsmithError::EmptyInput)));
    }

    #[test]
    fn non_pdf_is_unsupported() {
        let err = ensure_pdf(b"PK\x03\x04 not a pdf").unwrap_err();
        assert!(matches!(err, SheetsmithError::UnsupportedFile(_)));
    }

    #[test]
    fn pdf_header_accepted() {
        assert!(ensure_pdf(b"%PDF-1.7\n%...").is_ok());
    }
}
