//! CLI binary for pdf2png.
//!
//! A thin shim over the library crate: maps flags to `RunConfig`, converts
//! the current directory, and prints tagged notices for every event.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2png::{
    convert_directory, default_probes, BackendKind, ConversionProgressCallback, FileError,
    RunConfig, RunReport, DEFAULT_DPI,
};
use std::io::{self, IsTerminal};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── Console notices ──────────────────────────────────────────────────────────

/// Prints one tagged line per event: `[INFO]`, `[OK]`, `[SKIP]`, `[ERROR]`.
///
/// Lines go to stdout, or to stderr when stdout is reserved for `--json`.
struct ConsoleNotices {
    to_stderr: bool,
    color: bool,
}

impl ConsoleNotices {
    fn new(to_stderr: bool) -> Self {
        let color = if to_stderr {
            io::stderr().is_terminal()
        } else {
            io::stdout().is_terminal()
        };
        Self { to_stderr, color }
    }

    fn emit(&self, tag: &str, paint: fn(&str) -> String, message: &str) {
        let tag = if self.color {
            paint(tag)
        } else {
            tag.to_string()
        };
        if self.to_stderr {
            eprintln!("{tag} {message}");
        } else {
            println!("{tag} {message}");
        }
    }

    fn info(&self, message: &str) {
        self.emit("[INFO]", cyan, message);
    }

    fn error(&self, message: &str) {
        self.emit("[ERROR]", red, message);
    }
}

impl ConversionProgressCallback for ConsoleNotices {
    fn on_no_documents(&self, _dir: &Path) {
        self.info("No PDF files found in the current directory.");
    }

    fn on_run_start(&self, backend: BackendKind, config: &RunConfig, _documents: usize) {
        self.info(&format!("Using backend: {backend}"));
        self.info(&format!(
            "DPI: {} | Overwrite: {}",
            config.dpi, config.overwrite
        ));
    }

    fn on_page_written(&self, source: &Path, output: &Path, _page: usize) {
        // Padded so file names line up with the longer tags.
        self.emit(
            "[OK]  ",
            green,
            &format!("{} -> {}", file_name(source), file_name(output)),
        );
    }

    fn on_page_skipped(&self, output: &Path, _page: usize) {
        self.emit(
            "[SKIP]",
            dim,
            &format!("{} already exists", file_name(output)),
        );
    }

    fn on_error(&self, error: &FileError) {
        self.error(&error.to_string());
    }

    fn on_run_complete(&self, report: &RunReport) {
        self.info(&format!(
            "Done: {} written, {} skipped, {} failed",
            report.written_count(),
            report.skipped_count(),
            report.error_count()
        ));
    }
}

// ── CLI ──────────────────────────────────────────────────────────────────────

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert every PDF in the current directory at 300 DPI
  pdf2png

  # Lower resolution, replace PNGs from a previous run
  pdf2png --dpi 150 --overwrite

  # Machine-readable summary (notices move to stderr)
  pdf2png --json > report.json

  # Fetch PDFium once, then convert
  pdf2png --install-pdfium

OUTPUT:
  Each page of <name>.pdf becomes <name>_0001.png, <name>_0002.png, …
  next to the PDF. Existing PNGs are skipped unless --overwrite is given.

BACKENDS (first available wins):
  1. PDFium   libpdfium from PDFIUM_LIB_PATH, the pdf2png cache,
              the current directory, or the system library path
  2. Poppler  the pdftoppm executable (or POPPLER_BIN)

ENVIRONMENT VARIABLES:
  PDF2PNG_DPI             Default for --dpi
  PDF2PNG_OVERWRITE       Default for --overwrite
  PDFIUM_LIB_PATH         Path to an existing libpdfium
  PDFIUM_PROBE_CACHE_DIR  Override the pdfium cache directory
  POPPLER_BIN             Path to pdftoppm
  RUST_LOG                Tracing filter (e.g. pdf2png=debug)
"#;

/// Convert all PDFs in the current directory into PNGs.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2png",
    version,
    about = "Convert all PDFs in the current directory into PNGs",
    long_about = "Convert every PDF file in the current directory into one PNG per page, \
using PDFium if it is installed and Poppler's pdftoppm otherwise.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Output resolution (dots per inch).
    #[arg(long, env = "PDF2PNG_DPI", default_value_t = DEFAULT_DPI,
          value_parser = clap::value_parser!(u32).range(1..))]
    dpi: u32,

    /// Overwrite existing PNG files instead of skipping.
    #[arg(long, env = "PDF2PNG_OVERWRITE")]
    overwrite: bool,

    /// Print the run report as JSON on stdout.
    #[arg(long, env = "PDF2PNG_JSON")]
    json: bool,

    /// Download PDFium into the local cache before converting.
    #[arg(long)]
    install_pdfium: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2PNG_VERBOSE")]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Notices are the user-facing output; tracing stays quiet unless asked.
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let notices = Arc::new(ConsoleNotices::new(cli.json));

    match run(&cli, Arc::clone(&notices)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            notices.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, notices: Arc<ConsoleNotices>) -> Result<()> {
    if cli.install_pdfium {
        install_pdfium(&notices)?;
    }

    let dir = std::env::current_dir().context("Cannot determine the current directory")?;

    let config = RunConfig::builder()
        .dpi(cli.dpi)
        .overwrite(cli.overwrite)
        .progress_callback(notices)
        .build()?;

    let report = convert_directory(&dir, &config, &default_probes())?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    }

    Ok(())
}

/// Download PDFium into the probe cache, with a progress bar on stderr.
fn install_pdfium(notices: &ConsoleNotices) -> Result<()> {
    if let Some(path) = pdfium_probe::cached_pdfium_path() {
        notices.info(&format!("PDFium already installed at {}", path.display()));
        return Ok(());
    }

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("PDFium");
    bar.enable_steady_tick(Duration::from_millis(80));

    let progress = bar.clone();
    let path = pdfium_probe::install_pdfium(Some(&move |downloaded, total| {
        if let Some(t) = total {
            if progress.length() != Some(t) {
                progress.set_length(t);
            }
        }
        progress.set_position(downloaded);
    }))
    .context("Failed to download PDFium")?;

    bar.finish_and_clear();
    notices.info(&format!("PDFium installed at {}", path.display()));
    Ok(())
}
