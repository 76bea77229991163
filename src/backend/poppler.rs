//! Poppler adapter built on the `pdftoppm` executable.
//!
//! `pdftoppm` renders a whole document in one call, so [`PopplerBackend::open`]
//! does the rasterisation into a scratch [`TempDir`] and
//! [`PopplerDocument::render_page`] only decodes the page image. The scratch
//! directory lives exactly as long as the document handle.

use super::{BackendError, BackendKind, OpenDocument, RenderBackend};
use image::DynamicImage;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing::debug;

/// Environment variable naming the `pdftoppm` executable.
pub const POPPLER_BIN_ENV: &str = "POPPLER_BIN";

const PAGE_PREFIX: &str = "page";

pub struct PopplerBackend {
    program: OsString,
}

impl PopplerBackend {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check that `pdftoppm` (or `$POPPLER_BIN`) can be executed.
    pub fn probe() -> Result<Self, String> {
        let program =
            std::env::var_os(POPPLER_BIN_ENV).unwrap_or_else(|| OsString::from("pdftoppm"));

        // `-v` prints the version on stderr; some releases exit non-zero for
        // it, so only a failure to spawn means "not installed".
        let output = Command::new(&program)
            .arg("-v")
            .output()
            .map_err(|e| format!("{}: {e}", Path::new(&program).display()))?;

        let version = String::from_utf8_lossy(&output.stderr);
        debug!(
            "Found {}: {}",
            Path::new(&program).display(),
            version.lines().next().unwrap_or("").trim()
        );

        Ok(Self::new(program))
    }
}

impl RenderBackend for PopplerBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Poppler
    }

    fn open<'a>(
        &'a self,
        path: &Path,
        dpi: u32,
    ) -> Result<Box<dyn OpenDocument + 'a>, BackendError> {
        let scratch = tempfile::Builder::new().prefix("pdf2png-").tempdir()?;
        debug!("pdftoppm scratch dir: {}", scratch.path().display());

        // pdftoppm renders opaque RGB, so no alpha handling is needed here.
        let output = Command::new(&self.program)
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-png")
            .arg(path)
            .arg(scratch.path().join(PAGE_PREFIX))
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            return Err(BackendError::Engine(if detail.is_empty() {
                format!("pdftoppm exited with {}", output.status)
            } else {
                detail.to_string()
            }));
        }

        let pages = collect_page_images(scratch.path())?;
        debug!(
            "pdftoppm rendered {} ({} pages)",
            path.display(),
            pages.len()
        );

        Ok(Box::new(PopplerDocument {
            pages,
            _scratch: scratch,
        }))
    }
}

pub struct PopplerDocument {
    pages: Vec<PathBuf>,
    /// Kept alive until the document is dropped.
    _scratch: TempDir,
}

impl OpenDocument for PopplerDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn render_page(&mut self, index: usize) -> Result<DynamicImage, BackendError> {
        let path = self
            .pages
            .get(index)
            .ok_or_else(|| BackendError::Engine(format!("page index {index} out of range")))?;
        Ok(image::open(path)?)
    }
}

/// List `page-N.png` files in page order.
///
/// pdftoppm zero-pads the page number to the width of the page count
/// (`page-1.png` vs `page-001.png`), so the number is parsed rather than
/// relying on lexical order.
fn collect_page_images(dir: &Path) -> Result<Vec<PathBuf>, BackendError> {
    let mut numbered: Vec<(u32, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter_map(|p| page_number(&p).map(|n| (n, p)))
        .collect();

    numbered.sort_by_key(|(n, _)| *n);
    Ok(numbered.into_iter().map(|(_, p)| p).collect())
}

fn page_number(path: &Path) -> Option<u32> {
    if !path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("png"))
        .unwrap_or(false)
    {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix(PAGE_PREFIX)?
        .strip_prefix('-')?
        .parse()
        .ok()
}
