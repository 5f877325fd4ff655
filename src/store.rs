//! Persistent storage for generated PDFs.
//!
//! One flat directory (`<data_dir>/recent_pdfs` by default) holds every
//! generated document. The directory is the source of truth: the in-memory
//! registry is rebuilt from [`OutputStore::list`] whenever it may have
//! drifted.

use crate::naming::{next_output_name, recent_order};
use crate::types::OutputFile;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to delete {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Not a stored PDF name: {0}")]
    InvalidName(String),
    #[error("No output number left after the largest existing File <N>.pdf")]
    NamesExhausted,
    #[error("Refusing to overwrite existing {0}")]
    AlreadyExists(PathBuf),
}

#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

fn is_pdf_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}

impl OutputStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Every regular `.pdf` file in the directory, newest first.
    ///
    /// A missing directory is an empty store.
    pub fn list(&self) -> Result<Vec<OutputFile>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut files: Vec<OutputFile> = fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|e| OutputFile::from_path(&e.path()))
            .filter(|f| is_pdf_name(&f.name))
            .collect();
        files.sort_by(|a, b| recent_order(&a.name, &b.name));
        Ok(files)
    }

    /// Write `bytes` under the next free `File <N>.pdf` name.
    ///
    /// The bytes go to a hidden temporary sibling first and are renamed into
    /// place, so a failed write never leaves a partial `File <N>.pdf`. An
    /// existing file is never replaced.
    pub fn save(&self, bytes: &[u8]) -> Result<OutputFile, StoreError> {
        fs::create_dir_all(&self.dir)?;
        let existing = self.list()?;
        let name = next_output_name(existing.iter().map(|f| f.name.as_str()))
            .ok_or(StoreError::NamesExhausted)?;
        let path = self.dir.join(&name);
        if path.exists() {
            return Err(StoreError::AlreadyExists(path));
        }
        let tmp = self.dir.join(format!(".{name}.part"));

        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        };
        if let Err(source) = write() {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::Write { path, source });
        }

        info!(name = %name, bytes = bytes.len(), "saved PDF");
        Ok(OutputFile { name, path })
    }

    /// Remove one stored document by name.
    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        if name.contains(['/', '\\']) || !is_pdf_name(name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        let path = self.dir.join(name);
        fs::remove_file(&path).map_err(|source| StoreError::Delete { path, source })?;
        debug!(name, "deleted PDF");
        Ok(())
    }
}
