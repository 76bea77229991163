//! End-to-end tests against the real rendering engines.
//!
//! These need PDFium or Poppler on the machine, so they are gated behind the
//! `E2E_ENABLED` environment variable and do not run in CI unless explicitly
//! requested.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture --test-threads=1
//!
//! PDFium is initialised once per bind, so keep these on a single thread.
//!
//! Point `PDFIUM_LIB_PATH` or `POPPLER_BIN` at a specific engine to pin it.

use image::{ColorType, GenericImageView};
use pdf2png::{
    convert_directory, default_probes, select_backend, Pdf2PngError, RunConfig,
};
use std::path::Path;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test if E2E_ENABLED is not set or no backend can be bound.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        init_tracing();
        match select_backend(&default_probes()) {
            Ok(backend) => backend.kind(),
            Err(e) => {
                println!("SKIP — {e}");
                return;
            }
        }
    }};
}

/// Route library logs to the test harness (`RUST_LOG=pdf2png=debug`).
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// Write a PDF whose pages have the given sizes in points.
///
/// Each page draws a filled black square in its lower-left corner so the
/// output is not blank.
fn write_pdf(path: &Path, pages: &[(u32, u32)]) {
    let n = pages.len();
    let mut objects: Vec<String> = Vec::new();

    let kids: Vec<String> = (0..n).map(|i| format!("{} 0 R", 3 + 2 * i)).collect();
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        n
    ));

    for (i, (w, h)) in pages.iter().enumerate() {
        let content_id = 4 + 2 * i;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {w} {h}] /Contents {content_id} 0 R >>"
        ));
        let stream = "0 0 0 rg 0 0 20 20 re f\n";
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            stream.len(),
            stream
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref = out.len();
    out.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    out.push_str("0000000000 65535 f \n");
    for off in &offsets {
        out.push_str(&format!("{off:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref
    ));

    std::fs::write(path, out).expect("write test PDF");
}

fn assert_close(actual: u32, expected: u32, context: &str) {
    assert!(
        actual.abs_diff(expected) <= 1,
        "[{context}] expected ~{expected}px, got {actual}px"
    );
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn test_one_inch_page_at_144_dpi() {
    let kind = e2e_skip_unless_ready!();
    let dir = TempDir::new().unwrap();
    write_pdf(&dir.path().join("square.pdf"), &[(72, 72)]);

    let config = RunConfig::builder().dpi(144).build().unwrap();
    let report = convert_directory(dir.path(), &config, &default_probes())
        .expect("conversion should succeed");

    assert_eq!(report.backend, Some(kind));
    assert_eq!(report.written_count(), 1);
    assert_eq!(report.error_count(), 0);

    let img = image::open(dir.path().join("square_0001.png")).expect("valid PNG");
    let (w, h) = img.dimensions();
    assert_close(w, 144, "width");
    assert_close(h, 144, "height");
    assert_eq!(img.color(), ColorType::Rgb8);

    println!("[{kind}] ✓  square_0001.png {w}×{h}");
}

#[test]
fn test_multi_page_sizes_and_rerun() {
    let kind = e2e_skip_unless_ready!();
    let dir = TempDir::new().unwrap();
    write_pdf(&dir.path().join("mixed.pdf"), &[(612, 792), (144, 72), (72, 144)]);

    let config = RunConfig::builder().dpi(72).build().unwrap();
    let first = convert_directory(dir.path(), &config, &default_probes()).unwrap();
    assert_eq!(first.documents[0].page_count, 3);
    assert_eq!(first.written_count(), 3);

    let expected = [(612, 792), (144, 72), (72, 144)];
    for (i, (ew, eh)) in expected.iter().enumerate() {
        let name = format!("mixed_{:04}.png", i + 1);
        let (w, h) = image::open(dir.path().join(&name)).unwrap().dimensions();
        assert_close(w, *ew, &name);
        assert_close(h, *eh, &name);
    }

    let second = convert_directory(dir.path(), &config, &default_probes()).unwrap();
    assert_eq!(second.written_count(), 0);
    assert_eq!(second.skipped_count(), 3);

    println!("[{kind}] ✓  3 pages rendered, rerun skipped all");
}

#[test]
fn test_corrupt_pdf_is_reported_not_fatal() {
    let kind = e2e_skip_unless_ready!();
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a_garbage.pdf"), b"this is not a pdf").unwrap();
    write_pdf(&dir.path().join("b_fine.pdf"), &[(72, 72)]);

    let config = RunConfig::builder().dpi(72).build().unwrap();
    let report = convert_directory(dir.path(), &config, &default_probes()).unwrap();

    assert!(report.documents[0].open_failed(), "[{kind}] garbage should fail to open");
    assert_eq!(report.documents[1].written.len(), 1);
    assert!(dir.path().join("b_fine_0001.png").exists());
}

#[test]
fn test_no_pdfs_is_not_an_error() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
        return;
    }
    let dir = TempDir::new().unwrap();
    let result = convert_directory(dir.path(), &RunConfig::default(), &default_probes());
    match result {
        Ok(report) => assert!(report.backend.is_none()),
        Err(Pdf2PngError::NoBackendAvailable { .. }) => {
            panic!("backends must not be probed when there is nothing to convert")
        }
        Err(e) => panic!("unexpected error: {e}"),
    }
}
