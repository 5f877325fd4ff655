//! Pure Rust image processing backend.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | decoder header plus EXIF orientation (no full decode) |
//! | Decode (JPEG, PNG) | `image::ImageReader` with format guessed from content |
//! | Orient | `DynamicImage::apply_orientation` from the EXIF tag |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::oriented_dimensions;
use super::params::OptimizeParams;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::path::Path;

/// Pure Rust backend using the `image` crate.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open a decoder for `path`. Only the header is read.
///
/// The format is sniffed from the content, so a photo with a misleading
/// extension still decodes.
fn open_decoder(path: &Path) -> Result<impl ImageDecoder, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .into_decoder()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Unreadable or missing orientation metadata means the raster is upright.
fn orientation_of(decoder: &mut impl ImageDecoder) -> Orientation {
    decoder.orientation().unwrap_or(Orientation::NoTransforms)
}

/// Load and decode an image from disk, turned upright per its EXIF tag.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    let mut decoder = open_decoder(path)?;
    let orientation = orientation_of(&mut decoder);
    let mut img = DynamicImage::from_decoder(decoder).map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
    })?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Encode as baseline JPEG. Alpha is dropped; JPEG has no transparency.
fn save_jpeg(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality as u8);
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

impl ImageBackend for RustBackend {
    /// Dimensions as displayed, so quarter-turned photos report portrait sizes.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let mut decoder = open_decoder(path)?;
        let (raw_width, raw_height) = decoder.dimensions();
        let orientation = orientation_of(&mut decoder);
        let (width, height) = oriented_dimensions(raw_width, raw_height, orientation);
        Ok(Dimensions { width, height })
    }

    fn optimize(&self, params: &OptimizeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let resized = if img.width() == params.width && img.height() == params.height {
            img
        } else {
            img.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };
        save_jpeg(&resized, &params.output, params.quality.value())
    }
}
