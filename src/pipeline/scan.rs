//! Directory scanning: find the PDFs to convert.
//!
//! Only regular files directly inside the directory are considered; the
//! extension match is case-insensitive so `Report.PDF` qualifies while
//! `report.pdf.txt` does not.

use crate::error::Pdf2PngError;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const PDF_EXTENSION: &str = "pdf";

/// List candidate PDFs in `dir` (non-recursive, unordered).
pub fn scan_pdfs(dir: &Path) -> Result<Vec<PathBuf>, Pdf2PngError> {
    let entries = fs::read_dir(dir).map_err(|source| Pdf2PngError::ScanFailed {
        path: dir.to_path_buf(),
        source,
    })?;

    let pdfs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| is_pdf(p))
        .collect();

    debug!("Found {} PDF file(s) in {}", pdfs.len(), dir.display());
    Ok(pdfs)
}

fn is_pdf(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map(|e| e.eq_ignore_ascii_case(PDF_EXTENSION))
            .unwrap_or(false)
}

/// Sort into processing order: ascending by lower-cased file name.
///
/// Names that differ only in case fall back to their exact spelling so the
/// order never depends on how the file system enumerated them.
pub fn sort_for_processing(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| compare_names(a, b));
}

fn compare_names(a: &Path, b: &Path) -> Ordering {
    let a = file_name(a);
    let b = file_name(b);
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(&b))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
