//! # pdf2png
//!
//! Batch-convert every PDF in a directory into per-page PNG images.
//!
//! Rasterisation is delegated to whichever engine is installed, probed at
//! runtime in priority order:
//!
//! 1. **PDFium** (`libpdfium`, bound through `pdfium-render`)
//! 2. **Poppler** (the `pdftoppm` executable)
//!
//! The crate itself only scans, names, and decides what to skip.
//!
//! ## Pipeline Overview
//!
//! ```text
//! directory
//!  │
//!  ├─ 1. Scan     *.pdf (case-insensitive), no recursion
//!  ├─ 2. Probe    PDFium → Poppler, once per run
//!  ├─ 3. Order    case-insensitive file name
//!  ├─ 4. Render   page by page at dpi / 72 scale, opaque RGB
//!  └─ 5. Write    <stem>_NNNN.png beside the PDF (skip existing unless overwrite)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2png::{convert_directory, default_probes, RunConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunConfig::builder().dpi(150).build()?;
//!     let report = convert_directory(&std::env::current_dir()?, &config, &default_probes())?;
//!     eprintln!(
//!         "{} written, {} skipped, {} failed",
//!         report.written_count(),
//!         report.skipped_count(),
//!         report.error_count()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2png` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{
    default_probes, scale_factor, select_backend, BackendKind, BackendProbe, OpenDocument,
    RenderBackend,
};
pub use config::{RunConfig, RunConfigBuilder, DEFAULT_DPI};
pub use convert::{convert_directory, convert_document};
pub use error::{FileError, Pdf2PngError};
pub use output::{DocumentReport, RunReport};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
