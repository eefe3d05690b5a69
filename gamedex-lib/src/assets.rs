//! Game archive listing and logo/screenshot rendering.

use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::AssetError;

/// Directory inside a game archive that holds the playable files.
const CONTENT_PREFIX: &str = "content/";

/// Default JPEG quality when none (or an invalid one) is requested.
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

// ── Archives ────────────────────────────────────────────────────────────────

/// List the files under `content/` in a game zip, with the prefix removed.
pub fn list_archive_content(path: &Path) -> Result<Vec<String>, AssetError> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut files = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        if let Some(name) = entry.name().strip_prefix(CONTENT_PREFIX) {
            if !name.is_empty() {
                files.push(name.to_string());
            }
        }
    }
    Ok(files)
}

// ── Images ──────────────────────────────────────────────────────────────────

/// Which image set to read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Logo,
    Screenshot,
}

impl ImageKind {
    fn dir_name(&self) -> &'static str {
        match self {
            Self::Logo => "Logos",
            Self::Screenshot => "Screenshots",
        }
    }
}

/// Where an entry's image lives: `<root>/<Kind>/<id[0..2]>/<id[2..4]>/<id>.png`.
///
/// Returns `None` for anything that is not a 36-character id.
pub fn image_path(root: &Path, kind: ImageKind, id: &str) -> Option<PathBuf> {
    if id.len() != 36 {
        return None;
    }
    let first = id.get(0..2)?;
    let second = id.get(2..4)?;
    Some(
        root.join(kind.dir_name())
            .join(first)
            .join(second)
            .join(format!("{id}.png")),
    )
}

/// Requested downscale. Width wins over height when both are given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resize {
    #[default]
    Original,
    Width(u32),
    Height(u32),
}

/// Output encoding for a rendered image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageEncoding {
    #[default]
    Png,
    Jpeg { quality: u8 },
}

impl ImageEncoding {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }
}

/// Resize and encoding options decoded from request parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageRequest {
    pub resize: Resize,
    pub encoding: ImageEncoding,
}

impl ImageRequest {
    /// Decode raw `width`, `height`, `format`, and `quality` values.
    ///
    /// Invalid values fall back silently: no resize, PNG, quality 80.
    pub fn from_params(
        width: Option<&str>,
        height: Option<&str>,
        format: Option<&str>,
        quality: Option<&str>,
    ) -> Self {
        let positive = |v: &str| v.parse::<u32>().ok().filter(|n| *n > 0);
        let resize = match (width, height) {
            (Some(w), _) => positive(w).map_or(Resize::Original, Resize::Width),
            (None, Some(h)) => positive(h).map_or(Resize::Original, Resize::Height),
            (None, None) => Resize::Original,
        };

        let encoding = if format.is_some_and(|f| f.eq_ignore_ascii_case("jpeg")) {
            let quality = quality
                .and_then(|q| q.parse::<u8>().ok())
                .filter(|q| *q <= 100)
                .unwrap_or(DEFAULT_JPEG_QUALITY);
            ImageEncoding::Jpeg { quality }
        } else {
            ImageEncoding::Png
        };

        Self { resize, encoding }
    }
}

/// Open `path`, or `fallback` when `path` is absent or missing.
pub fn open_image(path: Option<&Path>, fallback: &Path) -> Result<DynamicImage, AssetError> {
    let file = match path.filter(|p| p.is_file()) {
        Some(p) => p,
        None if fallback.is_file() => {
            if let Some(p) = path {
                log::debug!("{} not found, serving {}", p.display(), fallback.display());
            }
            fallback
        }
        None => return Err(AssetError::NotFound),
    };
    Ok(image::open(file)?)
}

/// Downscale keeping the aspect ratio. Requests larger than the image, or
/// that would collapse the other side to zero, leave it untouched.
pub fn resize_image(image: DynamicImage, resize: Resize) -> DynamicImage {
    let (w, h) = (image.width(), image.height());
    match resize {
        Resize::Width(width) if width <= w => {
            let height = (h as f32 * (width as f32 / w as f32)) as u32;
            if height > 0 {
                return image.resize_exact(width, height, FilterType::Triangle);
            }
            image
        }
        Resize::Height(height) if height <= h => {
            let width = (w as f32 * (height as f32 / h as f32)) as u32;
            if width > 0 {
                return image.resize_exact(width, height, FilterType::Triangle);
            }
            image
        }
        _ => image,
    }
}

/// Encode an image into bytes.
pub fn encode_image(image: &DynamicImage, encoding: ImageEncoding) -> Result<Vec<u8>, AssetError> {
    let mut buf = Vec::new();
    match encoding {
        ImageEncoding::Png => {
            image.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
        }
        ImageEncoding::Jpeg { quality } => {
            // JPEG has no alpha channel
            let rgb = image.to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.max(1));
            encoder.encode_image(&rgb)?;
        }
    }
    Ok(buf)
}

/// Open, resize and encode in one step.
pub fn render_image(
    path: Option<&Path>,
    fallback: &Path,
    request: ImageRequest,
) -> Result<Vec<u8>, AssetError> {
    let image = open_image(path, fallback)?;
    let image = resize_image(image, request.resize);
    encode_image(&image, request.encoding)
}

#[cfg(test)]
#[path = "tests/assets_tests.rs"]
mod tests;
