//! Backend selection when one candidate panics while being checked.
//!
//! Kept in its own test binary: the panic hook is process-wide, and the
//! assertions below count every call to it.

use pdf2png::backend::BackendError;
use pdf2png::{select_backend, BackendKind, BackendProbe, OpenDocument, RenderBackend};
use std::panic;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

static HOOK_CALLS: AtomicUsize = AtomicUsize::new(0);

struct NullBackend;

impl RenderBackend for NullBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Poppler
    }

    fn open<'a>(
        &'a self,
        _path: &Path,
        _dpi: u32,
    ) -> Result<Box<dyn OpenDocument + 'a>, BackendError> {
        Err(BackendError::Engine("null backend".into()))
    }
}

#[test]
fn panicking_backend_is_silent_and_hook_is_restored() {
    panic::set_hook(Box::new(|_| {
        HOOK_CALLS.fetch_add(1, Ordering::SeqCst);
    }));

    let probes = vec![
        BackendProbe::new(BackendKind::Pdfium, || panic!("FPDF_InitLibrary crashed")),
        BackendProbe::new(BackendKind::Poppler, || {
            Ok(Box::new(NullBackend) as Box<dyn RenderBackend>)
        }),
    ];
    let backend = select_backend(&probes).unwrap();

    assert_eq!(backend.kind(), BackendKind::Poppler);
    assert_eq!(HOOK_CALLS.load(Ordering::SeqCst), 0);

    // The hook installed above is back in place for panics outside probing.
    let _ = panic::catch_unwind(|| panic!("after probing"));
    assert_eq!(HOOK_CALLS.load(Ordering::SeqCst), 1);

    let _ = panic::take_hook();
}
