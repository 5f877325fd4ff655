//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use image::metadata::Orientation;

/// Calculate output dimensions for a width cap, preserving aspect ratio.
///
/// Images already within the cap keep their size; wider images are scaled
/// so the width equals `max_width`. The height never rounds down to zero.
///
/// # Examples
/// ```
/// # use photo_pdf::imaging::fit_within_width;
/// assert_eq!(fit_within_width((4000, 3000), 1600), (1600, 1200));
/// assert_eq!(fit_within_width((800, 600), 1600), (800, 600));
/// ```
pub fn fit_within_width(original: (u32, u32), max_width: u32) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    if orig_w <= max_width || orig_w == 0 {
        return original;
    }
    let ratio = max_width as f64 / orig_w as f64;
    let height = ((orig_h as f64 * ratio).round() as u32).max(1);
    (max_width, height)
}

/// Displayed size of a `width`×`height` raster once `orientation` is applied.
///
/// Quarter turns (EXIF orientations 5-8) swap the axes.
///
/// # Examples
/// ```
/// # use photo_pdf::imaging::oriented_dimensions;
/// use image::metadata::Orientation;
/// assert_eq!(oriented_dimensions(4000, 3000, Orientation::Rotate90), (3000, 4000));
/// assert_eq!(oriented_dimensions(4000, 3000, Orientation::Rotate180), (4000, 3000));
/// ```
pub fn oriented_dimensions(width: u32, height: u32, orientation: Orientation) -> (u32, u32) {
    match orientation {
        Orientation::Rotate90
        | Orientation::Rotate270
        | Orientation::Rotate90FlipH
        | Orientation::Rotate270FlipH => (height, width),
        _ => (width, height),
    }
}
