//! # photo-pdf
//!
//! Pick photos from a photo library and assemble them into a single PDF, one
//! page per photo. Generated documents are kept in a recent list from which
//! they can be shared or deleted.
//!
//! # Architecture: One Screen, Linear Pipeline
//!
//! All state lives in one owned [`screen::Screen`]. Creating a document walks
//! a fixed pipeline:
//!
//! ```text
//! 1. Select     picker paths or album grid   →  Selection      (ordered, unique, capped in albums)
//! 2. Optimize   Selection                    →  optimized/     (≤1600px wide JPEG, parallel)
//! 3. Assemble   optimized images             →  PDF bytes      (in memory, all or nothing)
//! 4. Persist    PDF bytes                    →  recent_pdfs/File N.pdf
//! 5. Register   File N.pdf                   →  shared media index, then the registry
//! ```
//!
//! The output directory is the source of truth for the recent list; the
//! in-memory [`registry::Registry`] only mirrors it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`screen`] | The owned state object: selection, album view, registry, notices |
//! | [`library`] | Album discovery and picker path resolution over the library directory |
//! | [`selection`] | Ordered, unique, optionally capped set of images |
//! | [`imaging`] | Resize + JPEG recompress behind the `ImageBackend` trait |
//! | [`pdf`] | Page-per-image PDF assembly with watermark, via `lopdf` |
//! | [`naming`] | `File <N>.pdf` naming rule and recent-list ordering |
//! | [`store`] | The output directory: list, save, delete |
//! | [`registry`] | In-memory recent-PDF list |
//! | [`platform`] | Library permission, share, and media index behind the `Platform` trait |
//! | [`config`] | `config.toml` loading, merging, and validation |
//! | [`types`] | Shared types (`ImageRef`, `Album`, `OutputFile`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Names Over Timestamps
//!
//! Output names are `File <N>.pdf` with `N` one past the largest number in the
//! output directory. The recent list is ordered by that number, never by
//! filesystem times, so copying the directory elsewhere keeps the order.
//!
//! ## Failures Leave State Untouched
//!
//! Every screen operation either applies completely or not at all. The PDF is
//! built in memory and only written once every page is in place; a file the
//! media index refuses is removed again. Clearing the list is the one
//! exception: deletions are best effort and the registry is re-read from disk
//! afterwards, so it always matches what is actually stored.
//!
//! ## Optimization Never Fails a Create
//!
//! A photo that cannot be resized is embedded as is. Only assembly and storage
//! errors reach the user.

pub mod config;
pub mod imaging;
pub mod library;
pub mod naming;
pub mod output;
pub mod pdf;
pub mod platform;
pub mod registry;
pub mod screen;
pub mod selection;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
