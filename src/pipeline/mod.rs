//! Pipeline stages for PDF-to-PNG conversion.
//!
//! Each submodule implements exactly one step and knows nothing about the
//! rendering backend, which keeps every stage testable without PDFium or
//! Poppler installed.
//!
//! ```text
//! scan ──▶ (backend render) ──▶ naming ──▶ write
//! (*.pdf)                      (stem_NNNN)  (atomic PNG)
//! ```
//!
//! 1. [`scan`]   — list `*.pdf` files in a directory and fix their order
//! 2. [`naming`] — derive the output path for each page
//! 3. [`write`]  — flatten to RGB and persist the PNG atomically

pub mod naming;
pub mod scan;
pub mod write;
