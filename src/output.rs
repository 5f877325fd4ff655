//! CLI output formatting.
//!
//! Every listing leads with a 1-based positional index and the entity's
//! name; filesystem paths follow as indented `Source:` context lines. The
//! index shown for an asset is the position `compose` expects.
//!
//! # Output Format
//!
//! ## Albums
//!
//! ```text
//! Albums
//! 001 Camera (3 photos)
//!     Source: photos/Camera
//! 002 Holidays (2 photos)
//!     Source: photos/Holidays
//! ```
//!
//! ## Album assets
//!
//! ```text
//! Camera (3 photos)
//!     001 IMG_0001.jpg
//!     002 IMG_0002.jpg
//! ```
//!
//! ## Create
//!
//! ```text
//! Optimizing 2 photos
//!     page 1/2
//!     page 2/2
//! Saved File 4.pdf
//!     Source: .photo-pdf/recent_pdfs/File 4.pdf
//! ```
//!
//! ## Recent PDFs
//!
//! ```text
//! Recent PDFs
//! 001 File 4.pdf
//!     Source: .photo-pdf/recent_pdfs/File 4.pdf
//! ```
//!
//! # Architecture
//!
//! Each listing has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::screen::{Notice, NoticeKind, ScreenEvent};
use crate::types::{Album, ImageRef, OutputFile};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn photo_count(n: usize) -> String {
    if n == 1 {
        "1 photo".to_string()
    } else {
        format!("{n} photos")
    }
}

/// Asset line: index, filename, and pixel size when known.
///
/// ```text
/// 001 beach.jpg (4032x3024)
/// 002 dunes.jpg
/// ```
fn asset_line(index: usize, image: &ImageRef) -> String {
    match (image.width, image.height) {
        (Some(w), Some(h)) => format!(
            "{} {} ({}x{})",
            format_index(index),
            image.display_name(),
            w,
            h
        ),
        _ => format!("{} {}", format_index(index), image.display_name()),
    }
}

// ============================================================================
// Library
// ============================================================================

pub fn format_albums(albums: &[Album]) -> Vec<String> {
    if albums.is_empty() {
        return vec!["No albums found".to_string()];
    }
    let mut lines = vec!["Albums".to_string()];
    for (i, album) in albums.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            album.title,
            photo_count(album.asset_count)
        ));
        lines.push(format!("{}Source: {}", indent(1), album.path.display()));
    }
    lines
}

pub fn print_albums(albums: &[Album]) {
    for line in format_albums(albums) {
        println!("{}", line);
    }
}

pub fn format_album_assets(album: &Album, assets: &[ImageRef]) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", album.title, photo_count(assets.len()))];
    for (i, asset) in assets.iter().enumerate() {
        lines.push(format!("{}{}", indent(1), asset_line(i + 1, asset)));
    }
    lines
}

pub fn print_album_assets(album: &Album, assets: &[ImageRef]) {
    for line in format_album_assets(album, assets) {
        println!("{}", line);
    }
}

// ============================================================================
// Create
// ============================================================================

/// Format a single create progress event as display lines.
pub fn format_screen_event(event: &ScreenEvent) -> Vec<String> {
    match event {
        ScreenEvent::Optimizing { count } => {
            vec![format!("Optimizing {}", photo_count(*count))]
        }
        ScreenEvent::Assembling(progress) => vec![format!(
            "{}page {}/{}",
            indent(1),
            progress.processed,
            progress.total
        )],
        ScreenEvent::Saved(file) => vec![
            format!("Saved {}", file.name),
            format!("{}Source: {}", indent(1), file.path.display()),
        ],
    }
}

// ============================================================================
// Recent PDFs
// ============================================================================

pub fn format_registry(entries: &[OutputFile]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["No PDFs yet".to_string()];
    }
    let mut lines = vec!["Recent PDFs".to_string()];
    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), entry.name));
        lines.push(format!("{}Source: {}", indent(1), entry.path.display()));
    }
    lines
}

pub fn print_registry(entries: &[OutputFile]) {
    for line in format_registry(entries) {
        println!("{}", line);
    }
}

// ============================================================================
// Notices
// ============================================================================

fn notice_label(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::PermissionDenied => "permission denied",
        NoticeKind::SelectionLimit => "selection limit",
        NoticeKind::EmptySelection => "nothing selected",
        NoticeKind::UnsupportedFormat => "unsupported format",
        NoticeKind::NotFound => "not found",
        NoticeKind::Io => "error",
        NoticeKind::Share => "share failed",
        NoticeKind::Busy => "busy",
    }
}

pub fn format_notice(notice: &Notice) -> String {
    format!("{}: {}", notice_label(notice.kind), notice.message)
}

/// Notices go to stderr.
pub fn print_notice(notice: &Notice) {
    eprintln!("{}", format_notice(notice));
}
