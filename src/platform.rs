//! Host collaborators: library permission, share sheet, shared media index.
//!
//! The [`Platform`] trait is the seam between the screen and the operating
//! system. [`DesktopPlatform`] is the production implementation:
//!
//! | Operation | Desktop behavior |
//! |---|---|
//! | Library access | root must be a readable directory |
//! | Share | run the opener command (`share.command`, else `xdg-open` / `open`) with the file |
//! | Register media | copy into `media.shared_dir`; skipped when unset |

use crate::config::AppConfig;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Access to the photo library was denied: {0}")]
    AccessDenied(String),
    #[error("Share failed: {0}")]
    Share(String),
    #[error("Media registration failed: {0}")]
    MediaRegistration(String),
}

pub trait Platform {
    /// Ask for permission to read the photo library rooted at `root`.
    fn request_library_access(&self, root: &Path) -> Result<(), PlatformError>;

    /// Hand a file to the system share facility.
    fn share(&self, file: &Path) -> Result<(), PlatformError>;

    /// Make a newly written file visible to the shared media index.
    fn register_media(&self, file: &Path) -> Result<(), PlatformError>;
}

#[cfg(target_os = "macos")]
const DEFAULT_OPENER: &str = "open";
#[cfg(not(target_os = "macos"))]
const DEFAULT_OPENER: &str = "xdg-open";

#[derive(Debug, Clone, Default)]
pub struct DesktopPlatform {
    share_command: Option<String>,
    shared_dir: Option<PathBuf>,
}

impl DesktopPlatform {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            share_command: config.share.command.clone(),
            shared_dir: config.media.shared_dir.clone(),
        }
    }

    fn opener(&self) -> &str {
        self.share_command.as_deref().unwrap_or(DEFAULT_OPENER)
    }
}

impl Platform for DesktopPlatform {
    fn request_library_access(&self, root: &Path) -> Result<(), PlatformError> {
        std::fs::read_dir(root)
            .map(|_| ())
            .map_err(|e| PlatformError::AccessDenied(format!("{}: {}", root.display(), e)))
    }

    fn share(&self, file: &Path) -> Result<(), PlatformError> {
        let opener = self.opener();
        debug!(opener, file = %file.display(), "sharing");
        let status = Command::new(opener)
            .arg(file)
            .status()
            .map_err(|e| PlatformError::Share(format!("cannot run {opener}: {e}")))?;
        if !status.success() {
            return Err(PlatformError::Share(format!("{opener} exited with {status}")));
        }
        Ok(())
    }

    fn register_media(&self, file: &Path) -> Result<(), PlatformError> {
        let Some(shared_dir) = &self.shared_dir else {
            debug!(file = %file.display(), "no shared media directory configured");
            return Ok(());
        };
        let name = file
            .file_name()
            .ok_or_else(|| PlatformError::MediaRegistration(format!("no file name: {}", file.display())))?;
        std::fs::create_dir_all(shared_dir)
            .and_then(|_| std::fs::copy(file, shared_dir.join(name)))
            .map_err(|e| PlatformError::MediaRegistration(format!("{}: {}", shared_dir.display(), e)))?;
        info!(file = %file.display(), shared_dir = %shared_dir.display(), "registered with media index");
        Ok(())
    }
}
