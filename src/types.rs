//! Shared types passed between the acquisition, imaging, assembly and
//! storage modules.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// A selectable photo.
///
/// Identity is the path: two references with the same path are the same
/// image, whatever metadata they carry.
#[derive(Debug, Clone, Serialize)]
pub struct ImageRef {
    pub path: PathBuf,
    /// Filename the user picked, kept when optimization replaces `path`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl ImageRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned());
        Self {
            path,
            filename,
            width: None,
            height: None,
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Name shown to the user: the original filename, or the path.
    pub fn display_name(&self) -> String {
        self.filename
            .clone()
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn same_image(&self, other: &ImageRef) -> bool {
        self.path == other.path
    }
}

/// A browsable album: a directory of the photo library with at least one image.
#[derive(Debug, Clone, Serialize)]
pub struct Album {
    pub title: String,
    pub path: PathBuf,
    pub asset_count: usize,
}

/// A generated PDF on persistent storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    pub name: String,
    pub path: PathBuf,
}

impl OutputFile {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_string();
        Some(Self {
            name,
            path: path.to_path_buf(),
        })
    }
}
