//! PDFium adapter: open a document once, rasterise pages on demand.
//!
//! The document handle borrows the bound [`Pdfium`] instance, so a
//! [`PdfiumDocument`] can never outlive its backend; dropping it closes the
//! document inside pdfium.

use super::{scale_factor, BackendError, BackendKind, OpenDocument, RenderBackend};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

pub struct PdfiumBackend {
    pdfium: Pdfium,
}

impl PdfiumBackend {
    pub fn new(pdfium: Pdfium) -> Self {
        Self { pdfium }
    }

    /// Bind to an installed libpdfium. Never downloads.
    pub fn probe() -> Result<Self, String> {
        pdfium_probe::bind_installed_pdfium()
            .map(Self::new)
            .map_err(|e| e.to_string())
    }
}

impl RenderBackend for PdfiumBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Pdfium
    }

    fn open<'a>(
        &'a self,
        path: &Path,
        dpi: u32,
    ) -> Result<Box<dyn OpenDocument + 'a>, BackendError> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| BackendError::Engine(format!("{e:?}")))?;

        // White backdrop so transparent page regions flatten to opaque RGB.
        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(scale_factor(dpi))
            .set_clear_color(PdfColor::WHITE);

        let page_count = document.pages().len() as usize;
        debug!("pdfium opened {} ({} pages)", path.display(), page_count);

        Ok(Box::new(PdfiumDocument {
            document,
            render_config,
            page_count,
        }))
    }
}

pub struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
    render_config: PdfRenderConfig,
    page_count: usize,
}

impl OpenDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn render_page(&mut self, index: usize) -> Result<DynamicImage, BackendError> {
        let index = u16::try_from(index)
            .map_err(|_| BackendError::Engine(format!("page index {index} out of range")))?;

        let page = self
            .document
            .pages()
            .get(index)
            .map_err(|e| BackendError::Engine(format!("{e:?}")))?;

        let bitmap = page
            .render_with_config(&self.render_config)
            .map_err(|e| BackendError::Engine(format!("{e:?}")))?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} ({}x{} pt) → {}x{} px",
            index + 1,
            page.width().value,
            page.height().value,
            image.width(),
            image.height()
        );

        Ok(image)
    }
}
