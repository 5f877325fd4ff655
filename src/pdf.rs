//! PDF assembly: one page per image, in selection order.
//!
//! Each page is exactly the size of its image in pixels (one PDF unit per
//! pixel) and the image fills it from the origin. A watermark string is drawn
//! near the lower-left corner in Helvetica at low opacity.
//!
//! ## Embedding
//!
//! | Input | XObject |
//! |---|---|
//! | JPEG (`.jpg`, `.jpeg`) | original bytes, `DCTDecode`; color space from the SOF header |
//! | PNG (`.png`) | decoded to RGB, `FlateDecode`, alpha as a soft mask |
//!
//! The format is chosen from the filename suffix (case-insensitive). Any
//! other suffix aborts the whole assembly before a single page is built.
//!
//! An EXIF orientation tag is honored without touching the raster: the page
//! takes the upright size and the `cm` matrix turns or mirrors the image onto
//! it.
//! Nothing is returned until every page has been added and the document
//! serialized.

use crate::config::WatermarkConfig;
use crate::imaging::oriented_dimensions;
use crate::types::ImageRef;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::codecs::jpeg::JpegDecoder;
use image::codecs::png::PngDecoder;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("No images to assemble")]
    Empty,
    #[error("Unsupported image format: {0} (only JPEG and PNG are supported)")]
    UnsupportedFormat(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("Failed to encode PDF: {0}")]
    Encode(String),
}

/// Raster encodings accepted by the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

/// Detect the encoding from the filename suffix.
pub fn detect_kind(path: &Path) -> Option<ImageKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some(ImageKind::Jpeg),
        "png" => Some(ImageKind::Png),
        _ => None,
    }
}

/// Watermark drawn on every page.
#[derive(Debug, Clone)]
pub struct Watermark {
    pub text: String,
    pub font_size: f32,
    pub opacity: f32,
    pub margin: f32,
}

impl Default for Watermark {
    fn default() -> Self {
        Self::from(&WatermarkConfig::default())
    }
}

impl From<&WatermarkConfig> for Watermark {
    fn from(config: &WatermarkConfig) -> Self {
        Self {
            text: config.text.clone(),
            font_size: config.font_size,
            opacity: config.opacity,
            margin: config.margin,
        }
    }
}

/// Assembly progress after an image has been embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
}

impl Progress {
    pub fn fraction(self) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        self.processed as f32 / self.total as f32
    }
}

/// Build a PDF from `images` and return the serialized bytes.
///
/// `on_progress` is called once per image, after its page is appended.
pub fn assemble(
    images: &[ImageRef],
    watermark: &Watermark,
    mut on_progress: impl FnMut(Progress),
) -> Result<Vec<u8>, AssembleError> {
    if images.is_empty() {
        return Err(AssembleError::Empty);
    }
    let kinds = images
        .iter()
        .map(|image| {
            detect_kind(&image.path).ok_or_else(|| AssembleError::UnsupportedFormat(image.path.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut builder = PdfBuilder::new(watermark);
    let total = images.len();
    for (i, (image, kind)) in images.iter().zip(kinds).enumerate() {
        let bytes = std::fs::read(&image.path).map_err(|source| AssembleError::Io {
            path: image.path.clone(),
            source,
        })?;
        let xobject = match kind {
            ImageKind::Jpeg => jpeg_xobject(&image.path, bytes)?,
            ImageKind::Png => png_xobject(&image.path, &bytes)?,
        };
        builder.add_image_page(xobject);
        debug!(page = i + 1, source = %image.path.display(), "embedded image");
        on_progress(Progress {
            processed: i + 1,
            total,
        });
    }

    builder.finish()
}

/// An image ready to be placed: the XObject stream plus an optional soft mask.
///
/// `width` and `height` are the stored raster size, before `orientation`.
struct ImageXObject {
    width: u32,
    height: u32,
    orientation: Orientation,
    stream: Stream,
    smask: Option<Stream>,
}

struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    gstate_id: ObjectId,
    pages: Vec<ObjectId>,
    watermark: Watermark,
}

impl PdfBuilder {
    fn new(watermark: &Watermark) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let gstate_id = doc.add_object(dictionary! {
            "Type" => "ExtGState",
            "ca" => Object::Real(watermark.opacity),
            "CA" => Object::Real(watermark.opacity),
        });
        Self {
            doc,
            pages_id,
            font_id,
            gstate_id,
            pages: Vec::new(),
            watermark: watermark.clone(),
        }
    }

    fn add_image_page(&mut self, xobject: ImageXObject) {
        let ImageXObject {
            width,
            height,
            orientation,
            mut stream,
            smask,
        } = xobject;
        if let Some(mask) = smask {
            let mask_id = self.doc.add_object(mask);
            stream.dict.set("SMask", mask_id);
        }
        let image_id = self.doc.add_object(stream);

        let (page_width, page_height) = oriented_dimensions(width, height, orientation);
        let content = page_content(placement(width, height, orientation), &self.watermark);
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(i64::from(page_width)),
                Object::Integer(i64::from(page_height)),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
                "Font" => dictionary! { "F1" => self.font_id },
                "ExtGState" => dictionary! { "GS0" => self.gstate_id },
            },
        });
        self.pages.push(page_id);
    }

    fn finish(mut self) -> Result<Vec<u8>, AssembleError> {
        let kids: Vec<Object> = self.pages.iter().map(|id| Object::Reference(*id)).collect();
        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        let info_id = self.doc.add_object(dictionary! {
            "Producer" => Object::string_literal(concat!("photo-pdf ", env!("CARGO_PKG_VERSION"))),
            "Title" => Object::string_literal("Photos"),
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.trailer.set("Info", info_id);

        let mut buf = Vec::new();
        self.doc
            .save_to(&mut buf)
            .map_err(|e| AssembleError::Encode(e.to_string()))?;
        Ok(buf)
    }
}

/// `cm` operands mapping the image's unit square onto the upright page.
fn placement(width: u32, height: u32, orientation: Orientation) -> [i64; 6] {
    let (w, h) = (i64::from(width), i64::from(height));
    match orientation {
        Orientation::FlipHorizontal => [-w, 0, 0, h, w, 0],
        Orientation::Rotate180 => [-w, 0, 0, -h, w, h],
        Orientation::FlipVertical => [w, 0, 0, -h, 0, h],
        Orientation::Rotate90 => [0, -w, h, 0, 0, w],
        Orientation::Rotate270 => [0, w, -h, 0, h, 0],
        Orientation::Rotate90FlipH => [0, -w, -h, 0, h, w],
        Orientation::Rotate270FlipH => [0, w, h, 0, 0, 0],
        _ => [w, 0, 0, h, 0, 0],
    }
}

/// Content stream: the image placed to fill the page, then the watermark.
fn page_content(matrix: [i64; 6], watermark: &Watermark) -> String {
    let [a, b, c, d, e, f] = matrix;
    let mut content = format!("q\n{a} {b} {c} {d} {e} {f} cm\n/Im0 Do\nQ\n");
    if !watermark.text.is_empty() {
        content.push_str(&format!(
            "q\n/GS0 gs\n0 0 0 rg\nBT\n/F1 {} Tf\n{} {} Td\n({}) Tj\nET\nQ\n",
            watermark.font_size,
            watermark.margin,
            watermark.margin,
            escape_pdf_text(&watermark.text)
        ));
    }
    content
}

/// Escape a string for a PDF literal. Helvetica is used with WinAnsi, so
/// characters outside printable ASCII are replaced.
fn escape_pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Frame header fields needed to embed a JPEG without decoding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JpegFrame {
    width: u32,
    height: u32,
    components: u8,
}

/// Walk JPEG markers up to the first start-of-frame.
fn read_jpeg_frame(bytes: &[u8]) -> Option<JpegFrame> {
    if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
        return None;
    }
    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        // Fill bytes and standalone markers carry no length.
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }
        let len = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            let seg = bytes.get(pos + 4..pos + 2 + len)?;
            if seg.len() < 6 {
                return None;
            }
            return Some(JpegFrame {
                height: u16::from_be_bytes([seg[1], seg[2]]) as u32,
                width: u16::from_be_bytes([seg[3], seg[4]]) as u32,
                components: seg[5],
            });
        }
        pos += 2 + len;
    }
    None
}

fn jpeg_xobject(path: &Path, bytes: Vec<u8>) -> Result<ImageXObject, AssembleError> {
    let frame = read_jpeg_frame(&bytes).ok_or_else(|| AssembleError::Decode {
        path: path.to_path_buf(),
        message: "missing JPEG frame header".into(),
    })?;
    if frame.width == 0 || frame.height == 0 {
        return Err(AssembleError::Decode {
            path: path.to_path_buf(),
            message: format!("invalid size {}x{}", frame.width, frame.height),
        });
    }
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(frame.width),
        "Height" => i64::from(frame.height),
        "BitsPerComponent" => 8,
        "Filter" => "DCTDecode",
    };
    match frame.components {
        1 => dict.set("ColorSpace", "DeviceGray"),
        3 => dict.set("ColorSpace", "DeviceRGB"),
        4 => {
            // Adobe-style CMYK JPEGs store inverted values.
            dict.set("ColorSpace", "DeviceCMYK");
            dict.set(
                "Decode",
                [1, 0, 1, 0, 1, 0, 1, 0]
                    .into_iter()
                    .map(Object::Integer)
                    .collect::<Vec<_>>(),
            );
        }
        n => {
            return Err(AssembleError::Decode {
                path: path.to_path_buf(),
                message: format!("unsupported JPEG component count {n}"),
            });
        }
    }
    let orientation = JpegDecoder::new(Cursor::new(bytes.as_slice()))
        .and_then(|mut decoder| decoder.orientation())
        .unwrap_or(Orientation::NoTransforms);
    Ok(ImageXObject {
        width: frame.width,
        height: frame.height,
        orientation,
        stream: Stream::new(dict, bytes),
        smask: None,
    })
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, AssembleError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| AssembleError::Encode(format!("deflate failed: {e}")))
}

fn flate_image(width: u32, height: u32, color_space: &str, data: Vec<u8>) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        data,
    )
}

fn png_xobject(path: &Path, bytes: &[u8]) -> Result<ImageXObject, AssembleError> {
    let decode_error = |e: image::ImageError| AssembleError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut decoder = PngDecoder::new(Cursor::new(bytes)).map_err(decode_error)?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let img = DynamicImage::from_decoder(decoder).map_err(decode_error)?;
    let (width, height) = (img.width(), img.height());

    if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        let mut alpha = Vec::with_capacity((width * height) as usize);
        for pixel in rgba.pixels() {
            rgb.extend_from_slice(&pixel.0[..3]);
            alpha.push(pixel.0[3]);
        }
        Ok(ImageXObject {
            width,
            height,
            orientation,
            stream: flate_image(width, height, "DeviceRGB", deflate(&rgb)?),
            smask: Some(flate_image(width, height, "DeviceGray", deflate(&alpha)?)),
        })
    } else {
        let rgb = img.to_rgb8();
        Ok(ImageXObject {
            width,
            height,
            orientation,
            stream: flate_image(width, height, "DeviceRGB", deflate(rgb.as_raw())?),
            smask: None,
        })
    }
}
