//! Multi-file spreadsheet batches: upload flattening, report compilation and
//! the capacity roll-up.

pub mod archive;
pub mod capacity;
pub mod compile;

use serde::Serialize;
use std::fmt;

/// One uploaded or archive-extracted file.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        InputFile {
            name: name.into(),
            bytes,
        }
    }
}

/// A file that was skipped without failing the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchWarning {
    pub file: String,
    pub reason: String,
}

impl BatchWarning {
    pub fn new(file: impl Into<String>, reason: impl ToString) -> Self {
        BatchWarning {
            file: file.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for BatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipped {}: {}", self.file, self.reason)
    }
}
