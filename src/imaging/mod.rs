//! Image processing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | decoder header + EXIF orientation |
//! | **Optimize** | upright decode, Lanczos3 resize, JPEG encode |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{fit_within_width, oriented_dimensions};
pub use operations::{OptimizeConfig, get_dimensions, optimize_batch, optimize_image};
pub use params::{OptimizeParams, Quality};
pub use rust_backend::RustBackend;
