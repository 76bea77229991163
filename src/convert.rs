//! Batch conversion entry points.
//!
//! [`convert_directory`] is the whole run: scan, probe once, then
//! [`convert_document`] for every PDF in a fixed order. Failures that concern
//! a single document or page are recorded in its [`DocumentReport`] and the
//! run carries on; only the absence of any backend (or an unreadable
//! directory) stops it.

use crate::backend::{select_backend, BackendProbe, RenderBackend};
use crate::config::RunConfig;
use crate::error::{FileError, Pdf2PngError};
use crate::output::{DocumentReport, RunReport};
use crate::pipeline::{naming, scan, write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert every PDF directly inside `dir` to per-page PNGs.
///
/// `probes` are tried in order, only if at least one PDF was found; the
/// production list is [`crate::backend::default_probes`].
///
/// # Errors
/// - [`Pdf2PngError::ScanFailed`] if `dir` cannot be listed.
/// - [`Pdf2PngError::NoBackendAvailable`] if PDFs exist but no probe succeeds;
///   nothing is rendered in that case.
pub fn convert_directory(
    dir: &Path,
    config: &RunConfig,
    probes: &[BackendProbe],
) -> Result<RunReport, Pdf2PngError> {
    let start = Instant::now();
    let progress = config.progress();

    let mut pdfs = scan::scan_pdfs(dir)?;
    if pdfs.is_empty() {
        info!("No PDF files in {}", dir.display());
        progress.on_no_documents(dir);
        return Ok(RunReport {
            backend: None,
            dpi: config.dpi,
            overwrite: config.overwrite,
            documents: Vec::new(),
            duration_ms: start.elapsed().as_millis() as u64,
        });
    }

    let backend = select_backend(probes)?;
    scan::sort_for_processing(&mut pdfs);

    info!(
        "Converting {} PDF(s) with {} at {} DPI (overwrite: {})",
        pdfs.len(),
        backend.kind(),
        config.dpi,
        config.overwrite
    );
    progress.on_run_start(backend.kind(), config, pdfs.len());

    let total = pdfs.len();
    let mut documents = Vec::with_capacity(total);
    for (i, pdf) in pdfs.iter().enumerate() {
        progress.on_document_start(pdf, i + 1, total);
        let report = convert_document(backend.as_ref(), pdf, config);
        progress.on_document_complete(&report);
        documents.push(report);
    }

    let report = RunReport {
        backend: Some(backend.kind()),
        dpi: config.dpi,
        overwrite: config.overwrite,
        documents,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    progress.on_run_complete(&report);
    Ok(report)
}

/// Render every page of one PDF to `<stem>_NNNN.png` beside it.
///
/// Never fails as a whole: an unopenable document yields a report holding a
/// single [`FileError::OpenFailed`], and a failing page is recorded while the
/// remaining pages are still rendered. The document handle is dropped, and
/// its resources released, before this function returns.
pub fn convert_document(
    backend: &dyn RenderBackend,
    pdf_path: &Path,
    config: &RunConfig,
) -> DocumentReport {
    let progress = config.progress();

    let file = naming::display_name(pdf_path);
    let mut report = DocumentReport::new(pdf_path.to_path_buf());

    let mut document = match backend.open(pdf_path, config.dpi) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Cannot open {}: {}", pdf_path.display(), e);
            let err = FileError::OpenFailed {
                file,
                backend: backend.kind(),
                detail: e.to_string(),
            };
            progress.on_error(&err);
            report.errors.push(err);
            return report;
        }
    };

    report.page_count = document.page_count();
    debug!("{}: {} page(s)", file, report.page_count);

    for page in 1..=report.page_count {
        let output = naming::output_path(pdf_path, page);

        if output.exists() && !config.overwrite {
            progress.on_page_skipped(&output, page);
            report.skipped.push(output);
            continue;
        }

        let image = match document.render_page(page - 1) {
            Ok(image) => image,
            Err(e) => {
                warn!("Page {} of {} failed to render: {}", page, file, e);
                let err = FileError::RenderFailed {
                    file: file.clone(),
                    page,
                    detail: e.to_string(),
                };
                progress.on_error(&err);
                report.errors.push(err);
                continue;
            }
        };

        match write::write_png(&image, &output) {
            Ok(()) => {
                progress.on_page_written(pdf_path, &output, page);
                report.written.push(output);
            }
            Err(e) => {
                warn!("Writing {} failed: {}", output.display(), e);
                let err = FileError::WriteFailed {
                    path: output,
                    page,
                    detail: e.to_string(),
                };
                progress.on_error(&err);
                report.errors.push(err);
            }
        }
    }

    report
}
