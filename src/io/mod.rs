//! Reading and writing image files.
//!
//! The file extension picks the codec (case-insensitive):
//! - `png` → PNG
//! - `jpeg`, `jpg`, `jpe` → JPEG
//!
//! Unknown extensions are a no-op: [`imread`] returns `Ok(None)` and
//! [`imsave`] returns `Ok(false)`.

pub mod codec;

use std::fs;
use std::path::{Path, PathBuf};

pub use codec::{check_quality, decode, decode_as, encode, DecodedImage, PixelDepth, DEFAULT_JPEG_QUALITY};

use crate::error::Result;
use crate::image::Image;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpeg" | "jpg" | "jpe" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl From<ImageFormat> for image::ImageFormat {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

/// Load an image file; `Ok(None)` for unsupported extensions.
pub fn imread(path: impl AsRef<Path>) -> Result<Option<DecodedImage>> {
    let path = path.as_ref();
    let Some(format) = ImageFormat::from_path(path) else {
        log::debug!("imread: unsupported extension for {}", path.display());
        return Ok(None);
    };
    let bytes = fs::read(path)?;
    decode_as(&bytes, format).map(Some)
}

/// Save an image file; `Ok(false)` for unsupported extensions.
pub fn imsave<T: PixelDepth>(path: impl AsRef<Path>, image: &Image<T>, quality: Option<u8>) -> Result<bool> {
    let path = path.as_ref();
    let Some(format) = ImageFormat::from_path(path) else {
        log::debug!("imsave: unsupported extension for {}", path.display());
        return Ok(false);
    };
    let bytes = encode(image, format, quality)?;
    write_replacing(path, &bytes)?;
    Ok(true)
}

/// Sibling scratch path that `write_replacing` renames over `path`.
fn staging_path(path: &Path) -> PathBuf {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

/// Write `bytes` next to `path` and rename into place; the target is
/// either left untouched or fully replaced.
fn write_replacing(path: &Path, bytes: &[u8]) -> Result<()> {
    let staging = staging_path(path);
    if let Err(err) = fs::write(&staging, bytes).and_then(|()| fs::rename(&staging, path)) {
        let _ = fs::remove_file(&staging);
        return Err(err.into());
    }
    Ok(())
}
