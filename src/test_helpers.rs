//! Shared test utilities.
//!
//! Synthetic images are generated with the `image` crate so tests never need
//! binary fixtures, and [`setup_library`] lays out a small photo library in a
//! temp directory:
//!
//! ```text
//! library/
//! ├── Holidays/      2 images
//! ├── Camera/        3 images
//! ├── Screenshots/   1 PNG
//! └── Empty/         no images (not an album)
//! ```

use image::{ExtendedColorType, ImageEncoder, Luma, Rgb, Rgba};
use lopdf::{Document, Object};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =========================================================================
// Synthetic images
// =========================================================================

/// Create a small valid RGB JPEG with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    image::codecs::jpeg::JpegEncoder::new(std::io::BufWriter::new(file))
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
}

/// Create an RGB JPEG whose EXIF Orientation tag is `orientation` (1-8).
///
/// The stored raster is `width`×`height`; viewers rotate it for display.
pub fn create_oriented_jpeg(path: &Path, width: u32, height: u32, orientation: u16) {
    let img = image::RgbImage::from_fn(width, height, |x, _| Rgb([(x % 256) as u8, 0, 0]));
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut jpeg)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();

    // Big-endian TIFF header with a single IFD0 entry.
    let mut app1 = b"Exif\0\0MM\0\x2a\0\0\0\x08".to_vec();
    app1.extend_from_slice(&1u16.to_be_bytes());
    app1.extend_from_slice(&0x0112u16.to_be_bytes());
    app1.extend_from_slice(&3u16.to_be_bytes());
    app1.extend_from_slice(&1u32.to_be_bytes());
    app1.extend_from_slice(&orientation.to_be_bytes());
    app1.extend_from_slice(&[0, 0]);
    app1.extend_from_slice(&0u32.to_be_bytes());

    let mut bytes = jpeg[..2].to_vec();
    bytes.extend_from_slice(&[0xFF, 0xE1]);
    bytes.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
    bytes.extend_from_slice(&app1);
    bytes.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, bytes).unwrap();
}

/// Create a single-channel JPEG.
pub fn create_gray_jpeg(path: &Path, width: u32, height: u32) {
    let img = image::GrayImage::from_fn(width, height, |x, _| Luma([(x % 256) as u8]));
    let file = std::fs::File::create(path).unwrap();
    image::codecs::jpeg::JpegEncoder::new(std::io::BufWriter::new(file))
        .write_image(img.as_raw(), width, height, ExtendedColorType::L8)
        .unwrap();
}

/// Create an RGBA PNG with a horizontal alpha gradient.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(y % 256) as u8, 64, (x % 256) as u8, (x * 255 / width.max(1)) as u8])
    });
    let file = std::fs::File::create(path).unwrap();
    image::codecs::png::PngEncoder::new(std::io::BufWriter::new(file))
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
        .unwrap();
}

// =========================================================================
// PDF inspection
// =========================================================================

/// MediaBox width/height of every page, in page order.
pub fn page_sizes(bytes: &[u8]) -> Vec<(i64, i64)> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|page_id| {
            let page = doc.get_object(*page_id).unwrap().as_dict().unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            let int = |o: &Object| o.as_i64().unwrap();
            (int(&media_box[2]), int(&media_box[3]))
        })
        .collect()
}

// =========================================================================
// Library fixture
// =========================================================================

/// Build the fixture library described in the module docs.
///
/// Returns the temp dir guard and the library root inside it.
pub fn setup_library() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("library");

    let holidays = root.join("Holidays");
    std::fs::create_dir_all(&holidays).unwrap();
    create_test_jpeg(&holidays.join("beach.jpg"), 40, 30);
    create_test_jpeg(&holidays.join("dunes.jpg"), 30, 40);

    let camera = root.join("Camera");
    std::fs::create_dir_all(&camera).unwrap();
    for i in 1..=3 {
        create_test_jpeg(&camera.join(format!("IMG_000{i}.jpg")), 20 * i, 10 * i);
    }

    let screenshots = root.join("Screenshots");
    std::fs::create_dir_all(&screenshots).unwrap();
    create_test_png(&screenshots.join("shot.png"), 16, 24);

    let empty = root.join("Empty");
    std::fs::create_dir_all(&empty).unwrap();
    std::fs::write(empty.join("notes.txt"), "nothing here").unwrap();

    (tmp, root)
}
