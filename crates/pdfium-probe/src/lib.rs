//! # pdfium-probe
//!
//! Find an installed [PDFium](https://pdfium.googlesource.com/pdfium/)
//! shared library and bind `pdfium-render` to it, without ever touching the
//! network. Downloading a copy is a separate, explicit step
//! ([`install_pdfium`]) that populates the same cache the probe looks in.
//!
//! ## Search order
//!
//! [`bind_installed_pdfium`] tries, first match wins:
//!
//! 1. `PDFIUM_LIB_PATH` — explicit path to a pdfium library.
//! 2. The per-version cache directory ([`pdfium_cache_dir`]), filled by
//!    [`install_pdfium`].
//! 3. The current working directory (`./libpdfium.so` and friends).
//! 4. The operating system's library search path.
//!
//! Every failed candidate is recorded so the caller can show *why* PDFium
//! was judged unavailable.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pdfium_probe::{bind_installed_pdfium, install_pdfium};
//!
//! let pdfium = match bind_installed_pdfium() {
//!     Ok(p) => p,
//!     Err(_) => {
//!         let path = install_pdfium(None).expect("download failed");
//!         pdfium_probe::bind_pdfium_from_path(&path).expect("bind failed")
//!     }
//! };
//! # let _ = pdfium;
//! ```
//!
//! ## Environment variable overrides
//!
//! - `PDFIUM_LIB_PATH` — path to an existing pdfium library.
//! - `PDFIUM_PROBE_CACHE_DIR` — override the default cache directory.

use std::io::Read;
use std::path::{Path, PathBuf};

use pdfium_render::prelude::Pdfium;
use thiserror::Error;
use tracing::{debug, info};

// ── Public constants ─────────────────────────────────────────────────────────

/// The pdfium-binaries release tag used by [`install_pdfium`].
pub const PDFIUM_VERSION: &str = "7690";

/// Environment variable naming an explicit pdfium library path.
pub const LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Environment variable overriding the cache directory root.
pub const CACHE_DIR_ENV: &str = "PDFIUM_PROBE_CACHE_DIR";

const BASE_URL: &str = "https://github.com/bblanchon/pdfium-binaries/releases/download";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by pdfium-probe operations.
#[derive(Error, Debug)]
pub enum PdfiumProbeError {
    /// No prebuilt archive exists for this OS/architecture.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// Could not create the local cache directory.
    #[error("Cannot create the PDFium cache directory")]
    CacheDir(#[source] std::io::Error),

    /// Network download failed.
    #[error("Download failed: {0}")]
    Download(String),

    /// gzip/tar extraction failed.
    #[error("Archive extraction failed: {0}")]
    Extract(String),

    /// A library file was found but could not be loaded.
    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },

    /// Every search location was tried and none produced a usable library.
    #[error("PDFium library not found (tried: {})", .attempts.join("; "))]
    NotFound { attempts: Vec<String> },
}

// ── Platform metadata ────────────────────────────────────────────────────────

struct PlatformArchive {
    /// Asset filename in the GitHub release, e.g. `pdfium-mac-arm64.tgz`.
    archive_name: &'static str,
    /// Relative path inside the archive, e.g. `lib/libpdfium.dylib`.
    lib_path_in_archive: &'static str,
}

fn detect_platform() -> Result<PlatformArchive, PdfiumProbeError> {
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;

    let (archive_name, lib_path_in_archive) = match (os, arch) {
        ("macos", "aarch64") => ("pdfium-mac-arm64.tgz", "lib/libpdfium.dylib"),
        ("macos", "x86_64") => ("pdfium-mac-x64.tgz", "lib/libpdfium.dylib"),
        ("linux", "x86_64") => ("pdfium-linux-x64.tgz", "lib/libpdfium.so"),
        ("linux", "aarch64") => ("pdfium-linux-arm64.tgz", "lib/libpdfium.so"),
        ("windows", "x86_64") => ("pdfium-win-x64.tgz", "bin/pdfium.dll"),
        ("windows", "aarch64") => ("pdfium-win-arm64.tgz", "bin/pdfium.dll"),
        ("windows", "x86") => ("pdfium-win-x86.tgz", "bin/pdfium.dll"),
        (os, arch) => {
            return Err(PdfiumProbeError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            })
        }
    };

    Ok(PlatformArchive {
        archive_name,
        lib_path_in_archive,
    })
}

/// Platform file name of the pdfium shared library
/// (`libpdfium.so`, `libpdfium.dylib`, `pdfium.dll`).
pub fn library_file_name() -> String {
    format!(
        "{}pdfium{}",
        std::env::consts::DLL_PREFIX,
        std::env::consts::DLL_SUFFIX
    )
}

// ── Cache directory resolution ───────────────────────────────────────────────

/// Returns the per-version cache directory for the PDFium library.
///
/// Default locations:
/// - **macOS**: `~/Library/Caches/pdf2png/pdfium-{VERSION}/`
/// - **Linux**: `~/.cache/pdf2png/pdfium-{VERSION}/`
/// - **Windows**: `%LOCALAPPDATA%\pdf2png\pdfium-{VERSION}\`
///
/// Override the root by setting `PDFIUM_PROBE_CACHE_DIR`.
pub fn pdfium_cache_dir() -> PathBuf {
    if let Ok(override_dir) = std::env::var(CACHE_DIR_ENV) {
        return PathBuf::from(override_dir).join(format!("pdfium-{PDFIUM_VERSION}"));
    }

    let base = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir);

    base.join("pdf2png")
        .join(format!("pdfium-{PDFIUM_VERSION}"))
}

/// Returns the cached library path if [`install_pdfium`] already ran.
pub fn cached_pdfium_path() -> Option<PathBuf> {
    let p = pdfium_cache_dir().join(library_file_name());
    p.exists().then_some(p)
}

// ── Probing ──────────────────────────────────────────────────────────────────

/// File-system candidates in search order. The system search path is not a
/// file and is handled separately by [`bind_installed_pdfium`].
fn candidate_paths(
    env_override: Option<PathBuf>,
    cache_dir: &Path,
    cwd: Option<&Path>,
) -> Vec<PathBuf> {
    let lib_name = library_file_name();
    let mut candidates = Vec::with_capacity(3);
    if let Some(p) = env_override {
        candidates.push(p);
    }
    candidates.push(cache_dir.join(&lib_name));
    if let Some(dir) = cwd {
        candidates.push(dir.join(&lib_name));
    }
    candidates
}

/// Binds to an already-installed PDFium library.
///
/// Never downloads. See the [crate docs](crate) for the search order.
pub fn bind_installed_pdfium() -> Result<Pdfium, PdfiumProbeError> {
    let env_override = std::env::var_os(LIB_PATH_ENV).map(PathBuf::from);
    let cwd = std::env::current_dir().ok();
    let mut attempts = Vec::new();

    for path in candidate_paths(env_override, &pdfium_cache_dir(), cwd.as_deref()) {
        if !path.exists() {
            attempts.push(format!("{}: not present", path.display()));
            continue;
        }
        match bind_pdfium_from_path(&path) {
            Ok(pdfium) => {
                info!("Bound PDFium from {}", path.display());
                return Ok(pdfium);
            }
            Err(e) => {
                debug!("{e}");
                attempts.push(e.to_string());
            }
        }
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            info!("Bound PDFium from the system library path");
            Ok(Pdfium::new(bindings))
        }
        Err(e) => {
            attempts.push(format!("system library: {e}"));
            Err(PdfiumProbeError::NotFound { attempts })
        }
    }
}

/// Binds to a PDFium library at an explicit `path`.
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, PdfiumProbeError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| PdfiumProbeError::Bind {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

// ── Installation ─────────────────────────────────────────────────────────────

/// Downloads the platform PDFium library into [`pdfium_cache_dir`] unless it
/// is already there, and returns its path.
///
/// `on_progress` receives `(bytes_downloaded, total_size_option)` during the
/// download. Pass `None` to suppress progress callbacks.
pub fn install_pdfium(
    on_progress: Option<&dyn Fn(u64, Option<u64>)>,
) -> Result<PathBuf, PdfiumProbeError> {
    let platform = detect_platform()?;
    let cache_dir = pdfium_cache_dir();
    let lib_path = cache_dir.join(library_file_name());

    if lib_path.exists() {
        debug!("PDFium already cached at {}", lib_path.display());
        return Ok(lib_path);
    }

    let url = format!(
        "{}/chromium%2F{}/{}",
        BASE_URL, PDFIUM_VERSION, platform.archive_name
    );
    info!("Downloading PDFium from {url}");

    std::fs::create_dir_all(&cache_dir).map_err(PdfiumProbeError::CacheDir)?;

    let archive_bytes = download_bytes(&url, on_progress)?;
    extract_library(&archive_bytes, platform.lib_path_in_archive, &lib_path)?;

    Ok(lib_path)
}

/// Streams a URL into a `Vec<u8>`, calling `on_progress` every 64 KiB.
fn download_bytes(
    url: &str,
    on_progress: Option<&dyn Fn(u64, Option<u64>)>,
) -> Result<Vec<u8>, PdfiumProbeError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("pdfium-probe/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| PdfiumProbeError::Download(e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| PdfiumProbeError::Download(format!("GET {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(PdfiumProbeError::Download(format!(
            "HTTP {} for {url}",
            response.status()
        )));
    }

    let total = response.content_length();
    let mut buf = Vec::with_capacity(total.unwrap_or(0) as usize);
    let mut chunk = vec![0u8; 64 * 1024];
    let mut downloaded: u64 = 0;

    loop {
        match response.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                downloaded += n as u64;
                if let Some(cb) = on_progress {
                    cb(downloaded, total);
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(PdfiumProbeError::Download(format!("Read error: {e}"))),
        }
    }

    Ok(buf)
}

/// Extracts a single file from a gzipped tar archive into `dest_path`.
fn extract_library(
    archive_bytes: &[u8],
    lib_path_in_archive: &str,
    dest_path: &Path,
) -> Result<(), PdfiumProbeError> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let mut archive = Archive::new(GzDecoder::new(archive_bytes));
    let entries = archive
        .entries()
        .map_err(|e| PdfiumProbeError::Extract(e.to_string()))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| PdfiumProbeError::Extract(e.to_string()))?;
        let is_match = entry
            .path()
            .map(|p| p.to_string_lossy() == lib_path_in_archive)
            .map_err(|e| PdfiumProbeError::Extract(e.to_string()))?;

        if is_match {
            entry
                .unpack(dest_path)
                .map_err(|e| PdfiumProbeError::Extract(format!("Unpack failed: {e}")))?;
            return Ok(());
        }
    }

    Err(PdfiumProbeError::Extract(format!(
        "Library '{lib_path_in_archive}' not found in archive"
    )))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
