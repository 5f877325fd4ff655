//! The in-progress set of images destined for one PDF.
//!
//! Ordered by insertion, unique by path, optionally capped. The picker flow
//! uses an uncapped selection; the album-browsing flow caps it (20 by
//! default). Every mutation either fully applies or leaves the set untouched.

use crate::types::ImageRef;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("You can select up to {0} images")]
    LimitReached(usize),
}

/// Outcome of [`Selection::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    items: Vec<ImageRef>,
    limit: Option<usize>,
}

impl Selection {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn capped(limit: usize) -> Self {
        Self {
            items: Vec::new(),
            limit: Some(limit),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn items(&self) -> &[ImageRef] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, image: &ImageRef) -> bool {
        self.items.iter().any(|i| i.same_image(image))
    }

    /// Append an image. Already-selected images are a no-op.
    pub fn add(&mut self, image: ImageRef) -> Result<(), SelectionError> {
        if self.contains(&image) {
            return Ok(());
        }
        if let Some(limit) = self.limit {
            if self.items.len() >= limit {
                return Err(SelectionError::LimitReached(limit));
            }
        }
        self.items.push(image);
        Ok(())
    }

    /// Add several images, all or nothing.
    pub fn extend(&mut self, images: Vec<ImageRef>) -> Result<(), SelectionError> {
        let mut next = self.clone();
        for image in images {
            next.add(image)?;
        }
        *self = next;
        Ok(())
    }

    /// Grid tap: deselect when present, otherwise select.
    pub fn toggle(&mut self, image: ImageRef) -> Result<Toggled, SelectionError> {
        if self.remove(&image) {
            return Ok(Toggled::Removed);
        }
        self.add(image).map(|_| Toggled::Added)
    }

    /// Remove an image; returns whether it was present.
    pub fn remove(&mut self, image: &ImageRef) -> bool {
        let before = self.items.len();
        self.items.retain(|i| !i.same_image(image));
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
