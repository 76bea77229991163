//! Output naming: `<stem>_<NNNN>.png` next to the source PDF.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Extension of every generated image.
pub const OUTPUT_EXTENSION: &str = "png";

/// Minimum width of the zero-padded page number.
pub const PAGE_NUMBER_WIDTH: usize = 4;

/// File name for 1-indexed `page` of a document with the given stem.
///
/// Page numbers wider than four digits are written in full.
pub fn output_file_name(stem: &str, page: usize) -> String {
    format!("{stem}_{page:0width$}.{OUTPUT_EXTENSION}", width = PAGE_NUMBER_WIDTH)
}

/// Output path for 1-indexed `page` of `source`, in the same directory.
///
/// The stem is kept byte for byte, so names that are not valid UTF-8 still
/// map to distinct outputs.
pub fn output_path(source: &Path, page: usize) -> PathBuf {
    let mut name: OsString = source.file_stem().unwrap_or_default().to_os_string();
    name.push(format!(
        "_{page:0width$}.{OUTPUT_EXTENSION}",
        width = PAGE_NUMBER_WIDTH
    ));
    source.with_file_name(name)
}

/// Display name of a path (its final component) for notices.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
