//! PNG output.
//!
//! Images are flattened to 8-bit RGB before encoding so every output is
//! opaque whatever the backend produced. The encoded bytes go to a temporary
//! file in the destination directory which is then renamed over `dest`: a run
//! killed mid-write leaves no truncated PNG behind for the skip check to trust.

use image::{DynamicImage, ImageError, ImageFormat, ImageResult};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Encode `image` as an opaque PNG at `dest`, replacing any existing file.
pub fn write_png(image: &DynamicImage, dest: &Path) -> ImageResult<()> {
    let rgb = match image {
        DynamicImage::ImageRgb8(_) => None,
        other => Some(DynamicImage::ImageRgb8(other.to_rgb8())),
    };
    let rgb = rgb.as_ref().unwrap_or(image);

    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut builder = tempfile::Builder::new();
    builder.prefix(".pdf2png-").suffix(".part");
    // Temp files default to 0600; outputs get the umask like any other file.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir)?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        rgb.write_to(&mut writer, ImageFormat::Png)?;
        writer.flush()?;
    }

    tmp.persist(dest).map_err(|e| ImageError::IoError(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ColorType, Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn output_is_opaque_rgb() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("page_0001.png");
        let rgba = RgbaImage::from_pixel(8, 5, Rgba([10, 20, 30, 0]));

        write_png(&DynamicImage::ImageRgba8(rgba), &dest).unwrap();

        let back = image::open(&dest).unwrap();
        assert_eq!(back.color(), ColorType::Rgb8);
        assert_eq!((back.width(), back.height()), (8, 5));
    }

    #[test]
    fn replaces_existing_file_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("doc_0001.png");
        std::fs::write(&dest, b"stale").unwrap();

        let img = DynamicImage::new_rgb8(3, 3);
        write_png(&img, &dest).unwrap();

        assert_ne!(std::fs::read(&dest).unwrap(), b"stale");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn output_mode_matches_ordinary_files() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("doc_0001.png");
        let reference = dir.path().join("reference.txt");
        std::fs::write(&reference, b"x").unwrap();

        write_png(&DynamicImage::new_rgb8(2, 2), &dest).unwrap();

        let mode = |p: &Path| {
            std::fs::metadata(p)
                .unwrap()
                .permissions()
                .mode()
                & 0o777
        };
        assert_eq!(mode(&dest), mode(&reference));
    }

    #[test]
    fn encoding_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        let img = DynamicImage::new_rgb8(16, 9);

        write_png(&img, &a).unwrap();
        write_png(&img, &b).unwrap();
        assert_eq!(std::fs::read(a).unwrap(), std::fs::read(b).unwrap());
    }
}
