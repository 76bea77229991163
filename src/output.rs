//! Run and per-document reports.

use crate::backend::BackendKind;
use crate::error::FileError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of converting one PDF.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReport {
    pub source: PathBuf,
    /// Page count reported by the backend; 0 when the document failed to open.
    pub page_count: usize,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub errors: Vec<FileError>,
}

impl DocumentReport {
    pub fn new(source: PathBuf) -> Self {
        Self {
            source,
            ..Default::default()
        }
    }

    /// True when the document could not be opened at all.
    pub fn open_failed(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e, FileError::OpenFailed { .. }))
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// `None` when no PDFs were found and no backend was probed.
    pub backend: Option<BackendKind>,
    pub dpi: u32,
    pub overwrite: bool,
    pub documents: Vec<DocumentReport>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn written_count(&self) -> usize {
        self.documents.iter().map(|d| d.written.len()).sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.documents.iter().map(|d| d.skipped.len()).sum()
    }

    pub fn error_count(&self) -> usize {
        self.documents.iter().map(|d| d.errors.len()).sum()
    }
}
