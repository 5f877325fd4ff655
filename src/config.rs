//! Application configuration.
//!
//! Loaded from `config.toml` in the data directory. The file is sparse: user
//! values are merged on top of the stock defaults, unknown keys are rejected
//! to catch typos early, and the merged result is validated.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [library]
//! root = "photos"                  # Photo library root (albums are its directories)
//! max_selection = 20               # Cap for the album-browsing flow
//! camera_albums = ["Camera", "Camera Roll", "DCIM"]  # Listed first, in this order
//!
//! [optimize]
//! enabled = true
//! max_width = 1600                 # Wider images are scaled down
//! quality = 80                     # JPEG quality (1-100)
//!
//! [watermark]
//! text = "Made with photo-pdf"
//! font_size = 12.0
//! opacity = 0.3
//! margin = 10.0
//!
//! [output]
//! dir_name = "recent_pdfs"         # Subdirectory of the data directory
//!
//! [media]
//! shared_dir = "/srv/shared"       # Copy new PDFs here (omit to skip)
//!
//! [share]
//! command = "xdg-open"             # Opener used by `share` (omit for platform default)
//!
//! [processing]
//! max_processes = 4                # Max parallel optimizer workers (omit for auto)
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub library: LibraryConfig,
    pub optimize: OptimizeConfig,
    pub watermark: WatermarkConfig,
    pub output: OutputConfig,
    pub media: MediaConfig,
    pub share: ShareConfig,
    pub processing: ProcessingConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.library.max_selection == 0 {
            return Err(ConfigError::Validation(
                "library.max_selection must be at least 1".into(),
            ));
        }
        if self.optimize.max_width == 0 {
            return Err(ConfigError::Validation(
                "optimize.max_width must be at least 1".into(),
            ));
        }
        if !(1..=100).contains(&self.optimize.quality) {
            return Err(ConfigError::Validation(
                "optimize.quality must be 1-100".into(),
            ));
        }
        if !(self.watermark.opacity > 0.0 && self.watermark.opacity <= 1.0) {
            return Err(ConfigError::Validation(
                "watermark.opacity must be in (0, 1]".into(),
            ));
        }
        if !(self.watermark.font_size.is_finite() && self.watermark.font_size > 0.0) {
            return Err(ConfigError::Validation(
                "watermark.font_size must be a positive number".into(),
            ));
        }
        if !(self.watermark.margin.is_finite() && self.watermark.margin >= 0.0) {
            return Err(ConfigError::Validation(
                "watermark.margin must be a non-negative number".into(),
            ));
        }
        let dir = &self.output.dir_name;
        if dir.is_empty() || dir.contains('/') || dir.contains('\\') || dir == ".." {
            return Err(ConfigError::Validation(
                "output.dir_name must be a plain directory name".into(),
            ));
        }
        Ok(())
    }
}

/// Photo library settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LibraryConfig {
    pub root: PathBuf,
    /// Selection cap for the album-browsing flow.
    pub max_selection: usize,
    /// Album names that sort before all others (case-insensitive).
    pub camera_albums: Vec<String>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("photos"),
            max_selection: 20,
            camera_albums: vec!["Camera".into(), "Camera Roll".into(), "DCIM".into()],
        }
    }
}

/// Pre-assembly resize/recompress settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizeConfig {
    pub enabled: bool,
    pub max_width: u32,
    pub quality: u32,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_width: 1600,
            quality: 80,
        }
    }
}

/// Text stamped on every generated page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatermarkConfig {
    pub text: String,
    pub font_size: f32,
    pub opacity: f32,
    /// Distance from the left and bottom page edges.
    pub margin: f32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            text: "Made with photo-pdf".into(),
            font_size: 12.0,
            opacity: 0.3,
            margin: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub dir_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir_name: "recent_pdfs".into(),
        }
    }
}

/// Shared media index. When `shared_dir` is unset, registration is skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaConfig {
    pub shared_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShareConfig {
    pub command: Option<String>,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel optimizer workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(dir)?)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# photo-pdf configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Photo library
# ---------------------------------------------------------------------------
[library]
# Root directory of the photo library. Each directory holding images is an album.
root = "photos"

# Maximum number of images selectable while browsing albums.
max_selection = 20

# Albums listed before all others, in this order (case-insensitive).
camera_albums = ["Camera", "Camera Roll", "DCIM"]

# ---------------------------------------------------------------------------
# Image optimization before assembly
# ---------------------------------------------------------------------------
[optimize]
enabled = true

# Images wider than this are scaled down, keeping the aspect ratio.
max_width = 1600

# JPEG quality (1 = worst, 100 = best).
quality = 80

# ---------------------------------------------------------------------------
# Watermark stamped in the lower-left corner of every page
# ---------------------------------------------------------------------------
[watermark]
text = "Made with photo-pdf"
font_size = 12.0
opacity = 0.3
margin = 10.0

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Generated PDFs are stored in this subdirectory of the data directory.
dir_name = "recent_pdfs"

# ---------------------------------------------------------------------------
# Shared media index
# ---------------------------------------------------------------------------
[media]
# New PDFs are copied here so other applications can find them.
# shared_dir = "/path/to/shared/documents"

# ---------------------------------------------------------------------------
# Sharing
# ---------------------------------------------------------------------------
[share]
# Command that receives the PDF path. Defaults to the platform opener.
# command = "xdg-open"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel optimizer workers. Omit to use all CPU cores.
# max_processes = 4
"##
}
