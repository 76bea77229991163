//! Error types for the pdf2png library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2PngError`] — **Fatal**: the run cannot proceed at all (no
//!   rendering backend installed, working directory unreadable, invalid
//!   configuration). Returned as `Err(Pdf2PngError)` from
//!   [`crate::convert::convert_directory`].
//!
//! * [`FileError`] — **Non-fatal**: one document failed to open, or one page
//!   failed to render or write. Stored inside
//!   [`crate::output::DocumentReport`]; every other file and page is still
//!   processed.

use crate::backend::BackendKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2png library.
#[derive(Debug, Error)]
pub enum Pdf2PngError {
    /// Neither PDFium nor Poppler could be used.
    ///
    /// `attempts` holds one `(backend, reason)` pair per probe, in probe order.
    #[error("{}", no_backend_message(.attempts))]
    NoBackendAvailable {
        attempts: Vec<(BackendKind, String)>,
    },

    /// The directory to scan could not be listed.
    #[error("Failed to list PDF files in '{}'", .path.display())]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

fn no_backend_message(attempts: &[(BackendKind, String)]) -> String {
    let mut msg = String::from(
        "No PDF rendering backend found. Install one of the following:\n\
         \x20 - PDFium:  run `pdf2png --install-pdfium`, \
         or set PDFIUM_LIB_PATH=/path/to/libpdfium\n\
         \x20 - Poppler: install pdftoppm (macOS: 'brew install poppler', \
         Debian/Ubuntu: 'apt install poppler-utils'), or set POPPLER_BIN=/path/to/pdftoppm",
    );
    for (kind, reason) in attempts {
        msg.push_str(&format!("\n  ({kind} unavailable: {reason})"));
    }
    msg
}

/// A non-fatal error for a single document or page.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileError {
    /// The backend could not open or parse the document; no page was rendered.
    #[error("Failed to open '{file}' with {backend}: {detail}")]
    OpenFailed {
        file: String,
        backend: BackendKind,
        detail: String,
    },

    /// A page could not be rasterised.
    #[error("Failed to render page {page} of '{file}': {detail}")]
    RenderFailed {
        file: String,
        page: usize,
        detail: String,
    },

    /// A rendered page could not be written as PNG.
    #[error("Failed to write '{}' (page {page}): {detail}", .path.display())]
    WriteFailed {
        path: PathBuf,
        page: usize,
        detail: String,
    },
}

impl FileError {
    /// 1-indexed page the error belongs to, `None` for document-level errors.
    pub fn page(&self) -> Option<usize> {
        match self {
            FileError::OpenFailed { .. } => None,
            FileError::RenderFailed { page, .. } | FileError::WriteFailed { page, .. } => {
                Some(*page)
            }
        }
    }
}
