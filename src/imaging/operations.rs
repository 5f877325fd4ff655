//! High-level image operations.
//!
//! These functions combine calculations with backend execution. Optimization
//! is best effort: any failure hands back the original reference so one bad
//! photo never aborts a selection.

use super::backend::{BackendError, ImageBackend};
use super::calculations::fit_within_width;
use super::params::{OptimizeParams, Quality};
use crate::types::ImageRef;
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Configuration for pre-assembly optimization.
#[derive(Debug, Clone)]
pub struct OptimizeConfig {
    pub max_width: u32,
    pub quality: Quality,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            max_width: 1600,
            quality: Quality::new(80),
        }
    }
}

impl From<&crate::config::OptimizeConfig> for OptimizeConfig {
    fn from(config: &crate::config::OptimizeConfig) -> Self {
        Self {
            max_width: config.max_width,
            quality: Quality::new(config.quality),
        }
    }
}

/// Plan an optimize operation without executing it.
///
/// `index` keeps output names unique when two sources share a file stem.
pub fn plan_optimize(
    source: &Path,
    original_dims: (u32, u32),
    output_dir: &Path,
    index: usize,
    config: &OptimizeConfig,
) -> OptimizeParams {
    let (width, height) = fit_within_width(original_dims, config.max_width);
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    OptimizeParams {
        source: source.to_path_buf(),
        output: output_dir.join(format!("{:03}-{}.jpg", index, stem)),
        width,
        height,
        quality: config.quality,
    }
}

fn try_optimize(
    backend: &impl ImageBackend,
    image: &ImageRef,
    output_dir: &Path,
    index: usize,
    config: &OptimizeConfig,
) -> Result<ImageRef> {
    let dims = get_dimensions(backend, &image.path)?;
    let params = plan_optimize(&image.path, dims, output_dir, index, config);
    backend.optimize(&params)?;

    Ok(ImageRef {
        path: params.output,
        filename: image.filename.clone(),
        width: Some(params.width),
        height: Some(params.height),
    })
}

/// Resize and recompress one image, falling back to the original on error.
pub fn optimize_image(
    backend: &impl ImageBackend,
    image: &ImageRef,
    output_dir: &Path,
    index: usize,
    config: &OptimizeConfig,
) -> ImageRef {
    match try_optimize(backend, image, output_dir, index, config) {
        Ok(optimized) => {
            debug!(source = %image.path.display(), output = %optimized.path.display(), "optimized image");
            optimized
        }
        Err(e) => {
            warn!(source = %image.path.display(), error = %e, "optimization failed, using original");
            image.clone()
        }
    }
}

/// Optimize a whole selection in parallel.
///
/// The result has the same length and order as `images`.
pub fn optimize_batch(
    backend: &impl ImageBackend,
    images: &[ImageRef],
    output_dir: &Path,
    config: &OptimizeConfig,
) -> Vec<ImageRef> {
    if let Err(e) = std::fs::create_dir_all(output_dir) {
        warn!(dir = %output_dir.display(), error = %e, "cannot create optimization dir, using originals");
        return images.to_vec();
    }
    images
        .par_iter()
        .enumerate()
        .map(|(index, image)| optimize_image(backend, image, output_dir, index, config))
        .collect()
}
