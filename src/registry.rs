//! In-memory list of recently generated PDFs.
//!
//! The registry mirrors the output directory and never touches storage
//! itself. Each transition is a plain mutation applied only after the
//! matching storage operation has succeeded, so a failed operation leaves
//! the list exactly as it was.

use crate::types::OutputFile;

#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<OutputFile>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[OutputFile] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&OutputFile> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Replace everything with a fresh storage listing.
    pub fn replace(&mut self, entries: Vec<OutputFile>) {
        self.entries = entries;
    }

    /// Record a newly created document at the front.
    pub fn insert_front(&mut self, file: OutputFile) {
        self.entries.retain(|e| e.name != file.name);
        self.entries.insert(0, file);
    }

    /// Drop the entry with `name`; returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        self.entries.len() != before
    }
}
