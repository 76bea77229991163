//! Rendering backends and runtime capability probing.
//!
//! Rasterisation is delegated entirely to external engines. Two adapters
//! implement the same [`RenderBackend`] / [`OpenDocument`] interface:
//!
//! | Priority | Backend | Engine |
//! |----------|---------|--------|
//! | 1 | [`pdfium::PdfiumBackend`]   | `libpdfium` bound at runtime via `pdfium-render` |
//! | 2 | [`poppler::PopplerBackend`] | the `pdftoppm` executable |
//!
//! Neither is required at build time. [`select_backend`] walks an ordered
//! list of [`BackendProbe`]s once per run and keeps the first one that
//! yields a working handle; failures (including panics inside a probe) only
//! mean "unavailable". A panicking probe prints nothing; its message is
//! carried in the recorded reason.

pub mod pdfium;
pub mod poppler;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::error::Pdf2PngError;

/// PDF user-space units per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Scale applied to a page's point dimensions to reach `dpi`.
pub fn scale_factor(dpi: u32) -> f32 {
    dpi as f32 / POINTS_PER_INCH
}

/// Identifies a rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Pdfium,
    Poppler,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Pdfium => "pdfium",
            BackendKind::Poppler => "poppler",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image decode failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("{0}")]
    Engine(String),
}

/// A rendering engine that can open PDF documents.
pub trait RenderBackend {
    fn kind(&self) -> BackendKind;

    /// Open `path` for rendering at `dpi`.
    ///
    /// The returned handle owns every resource tied to the document; dropping
    /// it releases them.
    fn open<'a>(
        &'a self,
        path: &Path,
        dpi: u32,
    ) -> Result<Box<dyn OpenDocument + 'a>, BackendError>;
}

/// An opened document, valid until dropped.
pub trait OpenDocument {
    fn page_count(&self) -> usize;

    /// Rasterise one page (`index` is 0-based) at the DPI given to `open`.
    fn render_page(&mut self, index: usize) -> Result<DynamicImage, BackendError>;
}

type ProbeFn = Box<dyn Fn() -> Result<Box<dyn RenderBackend>, String>>;

/// One entry of the ordered probe list.
pub struct BackendProbe {
    kind: BackendKind,
    probe: ProbeFn,
}

impl BackendProbe {
    pub fn new(
        kind: BackendKind,
        probe: impl Fn() -> Result<Box<dyn RenderBackend>, String> + 'static,
    ) -> Self {
        Self {
            kind,
            probe: Box::new(probe),
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Run the probe; a panic is reported as a failure like any other.
    ///
    /// The panic hook is silenced for the duration of the call so the
    /// default hook does not print to stderr; the panic message ends up in
    /// the returned reason instead. The previous hook is restored afterwards.
    fn run(&self) -> Result<Box<dyn RenderBackend>, String> {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (self.probe)()));
        panic::set_hook(previous);

        match outcome {
            Ok(result) => result,
            Err(payload) => Err(panic_message(payload.as_ref())),
        }
    }
}

impl fmt::Debug for BackendProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendProbe")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("probe panicked: {detail}")
}

/// The production probe list: PDFium first, then Poppler.
pub fn default_probes() -> Vec<BackendProbe> {
    vec![
        BackendProbe::new(BackendKind::Pdfium, || {
            pdfium::PdfiumBackend::probe().map(|b| Box::new(b) as Box<dyn RenderBackend>)
        }),
        BackendProbe::new(BackendKind::Poppler, || {
            poppler::PopplerBackend::probe().map(|b| Box::new(b) as Box<dyn RenderBackend>)
        }),
    ]
}

/// Return the first backend whose probe succeeds, in list order.
pub fn select_backend(probes: &[BackendProbe]) -> Result<Box<dyn RenderBackend>, Pdf2PngError> {
    let mut attempts = Vec::with_capacity(probes.len());

    for probe in probes {
        match probe.run() {
            Ok(backend) => {
                info!("Selected backend: {}", probe.kind);
                return Ok(backend);
            }
            Err(reason) => {
                debug!("Backend {} unavailable: {}", probe.kind, reason);
                attempts.push((probe.kind, reason));
            }
        }
    }

    Err(Pdf2PngError::NoBackendAvailable { attempts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct NullBackend(BackendKind);

    impl RenderBackend for NullBackend {
        fn kind(&self) -> BackendKind {
            self.0
        }

        fn open<'a>(
            &'a self,
            _path: &Path,
            _dpi: u32,
        ) -> Result<Box<dyn OpenDocument + 'a>, BackendError> {
            Err(BackendError::Engine("null backend".into()))
        }
    }

    fn ok_probe(kind: BackendKind) -> BackendProbe {
        BackendProbe::new(kind, move || {
            Ok(Box::new(NullBackend(kind)) as Box<dyn RenderBackend>)
        })
    }

    fn failing_probe(kind: BackendKind, reason: &'static str) -> BackendProbe {
        BackendProbe::new(kind, move || Err(reason.to_string()))
    }

    #[test]
    fn scale_factor_is_dpi_over_72() {
        assert_eq!(scale_factor(72), 1.0);
        assert_eq!(scale_factor(144), 2.0);
        assert!((scale_factor(300) - 4.1667).abs() < 1e-3);
        for dpi in [1, 50, 96, 150, 600, 1200] {
            assert_eq!(scale_factor(dpi), dpi as f32 / 72.0);
        }
    }

    #[test]
    fn first_available_backend_wins() {
        let probes = vec![
            ok_probe(BackendKind::Pdfium),
            ok_probe(BackendKind::Poppler),
        ];
        let backend = select_backend(&probes).unwrap();
        assert_eq!(backend.kind(), BackendKind::Pdfium);
    }

    #[test]
    fn falls_through_to_second_backend() {
        let probes = vec![
            failing_probe(BackendKind::Pdfium, "library not found"),
            ok_probe(BackendKind::Poppler),
        ];
        let backend = select_backend(&probes).unwrap();
        assert_eq!(backend.kind(), BackendKind::Poppler);
    }

    #[test]
    fn later_probes_are_not_run_after_success() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let probes = vec![
            ok_probe(BackendKind::Pdfium),
            BackendProbe::new(BackendKind::Poppler, move || {
                counter.set(counter.get() + 1);
                Err("should not run".into())
            }),
        ];
        select_backend(&probes).unwrap();
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn panicking_probe_counts_as_unavailable() {
        let probes = vec![
            BackendProbe::new(BackendKind::Pdfium, || panic!("dlopen exploded")),
            ok_probe(BackendKind::Poppler),
        ];
        let backend = select_backend(&probes).unwrap();
        assert_eq!(backend.kind(), BackendKind::Poppler);
    }

    #[test]
    fn no_backend_collects_reasons_in_order() {
        let probes = vec![
            failing_probe(BackendKind::Pdfium, "no libpdfium"),
            BackendProbe::new(BackendKind::Poppler, || panic!("boom")),
        ];
        let err = match select_backend(&probes) {
            Err(e) => e,
            Ok(_) => panic!("expected NoBackendAvailable"),
        };
        match err {
            Pdf2PngError::NoBackendAvailable { attempts } => {
                assert_eq!(attempts.len(), 2);
                assert_eq!(
                    attempts[0],
                    (BackendKind::Pdfium, "no libpdfium".to_string())
                );
                assert_eq!(attempts[1].0, BackendKind::Poppler);
                assert!(attempts[1].1.contains("boom"), "got: {}", attempts[1].1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_probe_list_means_no_backend() {
        assert!(matches!(
            select_backend(&[]),
            Err(Pdf2PngError::NoBackendAvailable { .. })
        ));
    }

    #[test]
    fn backend_kind_serialises_lowercase() {
        assert_eq!(BackendKind::Pdfium.to_string(), "pdfium");
        assert_eq!(
            serde_json::to_string(&BackendKind::Poppler).unwrap(),
            "\"poppler\""
        );
    }
}
