//! Progress-callback trait for run, document, and page events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::RunConfigBuilder::progress_callback`] to observe a run as
//! it happens. The `pdf2png` binary uses this to print its `[INFO]`, `[OK]`,
//! `[SKIP]`, and `[ERROR]` notices; library callers can forward the same
//! events anywhere else.
//!
//! # Example
//!
//! ```rust
//! use pdf2png::{ConversionProgressCallback, RunConfig};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     written: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_written(&self, _source: &Path, output: &Path, _page: usize) {
//!         self.written.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("wrote {}", output.display());
//!     }
//! }
//!
//! let config = RunConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { written: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::backend::BackendKind;
use crate::config::RunConfig;
use crate::error::FileError;
use crate::output::{DocumentReport, RunReport};
use std::path::Path;
use std::sync::Arc;

/// Called by the converter as it processes a directory.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive in run order from a single thread.
pub trait ConversionProgressCallback: Send + Sync {
    /// The scan found no PDF files; nothing else will be reported.
    fn on_no_documents(&self, dir: &Path) {
        let _ = dir;
    }

    /// A backend was selected and `documents` files are about to be rendered.
    fn on_run_start(&self, backend: BackendKind, config: &RunConfig, documents: usize) {
        let _ = (backend, config, documents);
    }

    /// Processing of a document begins (`index` is 1-based).
    fn on_document_start(&self, path: &Path, index: usize, total: usize) {
        let _ = (path, index, total);
    }

    /// A PNG was written for 1-indexed `page` of `source`.
    fn on_page_written(&self, source: &Path, output: &Path, page: usize) {
        let _ = (source, output, page);
    }

    /// `output` already existed and overwriting is disabled.
    fn on_page_skipped(&self, output: &Path, page: usize) {
        let _ = (output, page);
    }

    /// A document failed to open, or a page failed to render or write.
    fn on_error(&self, error: &FileError) {
        let _ = error;
    }

    /// All pages of a document have been attempted.
    fn on_document_complete(&self, report: &DocumentReport) {
        let _ = report;
    }

    /// Every document has been attempted.
    fn on_run_complete(&self, report: &RunReport) {
        let _ = report;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`RunConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
