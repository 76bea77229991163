//! Run configuration.
//!
//! Every setting that influences a run lives in [`RunConfig`], built through
//! [`RunConfigBuilder`]. The configuration is fixed for the whole run: all
//! documents are rendered with the same DPI and overwrite policy.

use crate::error::Pdf2PngError;
use crate::progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
use std::fmt;

/// Default output resolution in dots per inch.
pub const DEFAULT_DPI: u32 = 300;

/// Configuration for one batch run.
///
/// # Example
/// ```rust
/// use pdf2png::RunConfig;
///
/// let config = RunConfig::builder().dpi(150).overwrite(true).build().unwrap();
/// assert_eq!(config.dpi, 150);
/// ```
#[derive(Clone)]
pub struct RunConfig {
    /// Output resolution. Pages are scaled by `dpi / 72`. Default: 300.
    pub dpi: u32,

    /// Replace existing PNGs instead of skipping them. Default: false.
    pub overwrite: bool,

    /// Receives per-document and per-page events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            overwrite: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("dpi", &self.dpi)
            .field("overwrite", &self.overwrite)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl RunConfig {
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder {
            config: Self::default(),
        }
    }

    /// The configured callback, or a no-op one.
    pub(crate) fn progress(&self) -> &dyn ConversionProgressCallback {
        self.progress_callback
            .as_deref()
            .unwrap_or(&NoopProgressCallback)
    }
}

#[derive(Debug)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn overwrite(mut self, v: bool) -> Self {
        self.config.overwrite = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RunConfig, Pdf2PngError> {
        if self.config.dpi == 0 {
            return Err(Pdf2PngError::InvalidConfig(
                "DPI must be a positive integer, got 0".into(),
            ));
        }
        Ok(self.config)
    }
}
