//! The screen: one owned state object driving the whole workflow.
//!
//! ```text
//! pick_images ─┐
//!              ├─> selection ─> create_pdf: optimize ─> assemble ─> save ─> register ─> registry
//! open_library ┘                                                                          │
//!   open_album / toggle_asset                                 share / delete / clear_all <─┘
//! ```
//!
//! Every operation is a method taking `&mut self`. On failure the method
//! returns the error *and* stores a [`Notice`] describing it; the notice stays
//! until [`Screen::acknowledge`]. A failed operation never changes the
//! selection, the album view or the registry.
//!
//! While a create is running `loading` is set and any other operation is
//! refused with [`ScreenError::Busy`].

use crate::config::AppConfig;
use crate::imaging::{ImageBackend, OptimizeConfig, optimize_batch};
use crate::library::{self, LibraryError};
use crate::pdf::{self, AssembleError, Progress, Watermark};
use crate::platform::{Platform, PlatformError};
use crate::registry::Registry;
use crate::selection::{Selection, SelectionError, Toggled};
use crate::store::{OutputStore, StoreError};
use crate::types::{Album, ImageRef, OutputFile};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Scratch directory for optimized copies, under the data directory.
const OPTIMIZED_DIR: &str = "optimized";

#[derive(Error, Debug)]
pub enum ScreenError {
    #[error("Another operation is still running")]
    Busy,
    #[error("No PDF named {0}")]
    NotFound(String),
    #[error("No photo at position {0} in this album")]
    NoSuchAsset(usize),
    #[error("Some files could not be deleted: {}", .0.join("; "))]
    ClearIncomplete(Vec<String>),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Assemble(#[from] AssembleError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Category of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    PermissionDenied,
    SelectionLimit,
    EmptySelection,
    UnsupportedFormat,
    NotFound,
    Io,
    Share,
    Busy,
}

/// A blocking message shown to the user until acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl ScreenError {
    pub fn notice_kind(&self) -> NoticeKind {
        match self {
            ScreenError::Busy => NoticeKind::Busy,
            ScreenError::NotFound(_) | ScreenError::NoSuchAsset(_) => NoticeKind::NotFound,
            ScreenError::Library(LibraryError::UnknownAlbum(_)) => NoticeKind::NotFound,
            ScreenError::Selection(SelectionError::LimitReached(_)) => NoticeKind::SelectionLimit,
            ScreenError::Platform(PlatformError::AccessDenied(_)) => NoticeKind::PermissionDenied,
            ScreenError::Platform(PlatformError::Share(_)) => NoticeKind::Share,
            ScreenError::Assemble(AssembleError::UnsupportedFormat(_)) => {
                NoticeKind::UnsupportedFormat
            }
            ScreenError::Assemble(AssembleError::Empty) => NoticeKind::EmptySelection,
            _ => NoticeKind::Io,
        }
    }
}

impl From<&ScreenError> for Notice {
    fn from(err: &ScreenError) -> Self {
        Self {
            kind: err.notice_kind(),
            message: err.to_string(),
        }
    }
}

/// Progress reported while a PDF is being created.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenEvent {
    Optimizing { count: usize },
    Assembling(Progress),
    Saved(OutputFile),
}

pub struct Screen<B, P> {
    config: AppConfig,
    data_dir: PathBuf,
    backend: B,
    platform: P,
    store: OutputStore,
    registry: Registry,
    selection: Selection,
    albums: Vec<Album>,
    current_album: Option<usize>,
    assets: Vec<ImageRef>,
    loading: bool,
    notice: Option<Notice>,
    events: Option<Sender<ScreenEvent>>,
}

impl<B: ImageBackend, P: Platform> Screen<B, P> {
    /// Outputs live in `<data_dir>/<output.dir_name>`.
    pub fn new(config: AppConfig, data_dir: impl Into<PathBuf>, backend: B, platform: P) -> Self {
        let data_dir = data_dir.into();
        let store = OutputStore::new(data_dir.join(&config.output.dir_name));
        Self {
            config,
            data_dir,
            backend,
            platform,
            store,
            registry: Registry::new(),
            selection: Selection::unbounded(),
            albums: Vec::new(),
            current_album: None,
            assets: Vec::new(),
            loading: false,
            notice: None,
            events: None,
        }
    }

    /// Send [`ScreenEvent`]s to `tx` during create.
    pub fn with_events(mut self, tx: Sender<ScreenEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    // ------------------------------------------------------------------
    // State accessors
    // ------------------------------------------------------------------

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn current_album(&self) -> Option<&Album> {
        self.current_album.and_then(|i| self.albums.get(i))
    }

    /// Photos of the album being browsed.
    pub fn assets(&self) -> &[ImageRef] {
        &self.assets
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Dismiss the current notice.
    pub fn acknowledge(&mut self) {
        self.notice = None;
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    fn raise(&mut self, err: ScreenError) -> ScreenError {
        debug!(error = %err, "operation failed");
        self.notice = Some(Notice::from(&err));
        err
    }

    fn ensure_idle(&mut self) -> Result<(), ScreenError> {
        if self.loading {
            return Err(self.raise(ScreenError::Busy));
        }
        Ok(())
    }

    fn emit(&self, event: ScreenEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    // ------------------------------------------------------------------
    // Image acquisition
    // ------------------------------------------------------------------

    /// Picker flow: replace the selection with `paths`, uncapped.
    ///
    /// Dimensions are filled in when the backend can read them.
    pub fn pick_images(&mut self, paths: &[PathBuf]) -> Result<(), ScreenError> {
        self.ensure_idle()?;
        let picked = match library::resolve_picked(paths) {
            Ok(picked) => picked,
            Err(e) => return Err(self.raise(e.into())),
        };
        let picked: Vec<ImageRef> = picked
            .into_iter()
            .map(|image| match self.backend.identify(&image.path) {
                Ok(dims) => image.with_dimensions(dims.width, dims.height),
                Err(_) => image,
            })
            .collect();

        let mut selection = Selection::unbounded();
        if let Err(e) = selection.extend(picked) {
            return Err(self.raise(e.into()));
        }
        debug!(count = selection.len(), "picked images");
        self.selection = selection;
        Ok(())
    }

    /// Album flow: ask for library access, list the albums and show the first.
    ///
    /// Starts a fresh selection capped at `library.max_selection`.
    pub fn open_library(&mut self) -> Result<(), ScreenError> {
        self.ensure_idle()?;
        let root = self.config.library.root.clone();
        if let Err(e) = self.platform.request_library_access(&root) {
            return Err(self.raise(e.into()));
        }
        let loaded = library::list_albums(&root, &self.config.library.camera_albums)
            .and_then(|albums| {
                let assets = match albums.first() {
                    Some(first) => library::album_assets(first)?,
                    None => Vec::new(),
                };
                Ok((albums, assets))
            });
        let (albums, assets) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => return Err(self.raise(e.into())),
        };

        info!(albums = albums.len(), root = %root.display(), "opened library");
        self.current_album = if albums.is_empty() { None } else { Some(0) };
        self.albums = albums;
        self.assets = assets;
        self.selection = Selection::capped(self.config.library.max_selection);
        Ok(())
    }

    /// Switch the browsed album. The selection carries over.
    pub fn open_album(&mut self, title: &str) -> Result<(), ScreenError> {
        self.ensure_idle()?;
        let loaded = library::album_index(&self.albums, title)
            .and_then(|index| Ok((index, library::album_assets(&self.albums[index])?)));
        match loaded {
            Ok((index, assets)) => {
                self.current_album = Some(index);
                self.assets = assets;
                Ok(())
            }
            Err(e) => Err(self.raise(e.into())),
        }
    }

    /// Grid tap on the asset at `index` of the current album.
    pub fn toggle_asset(&mut self, index: usize) -> Result<Toggled, ScreenError> {
        self.ensure_idle()?;
        let Some(asset) = self.assets.get(index).cloned() else {
            return Err(self.raise(ScreenError::NoSuchAsset(index)));
        };
        match self.selection.toggle(asset) {
            Ok(toggled) => Ok(toggled),
            Err(e) => Err(self.raise(e.into())),
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Optimize, assemble, save and register the selection as a new PDF.
    ///
    /// On success the file is at the front of the registry and the selection
    /// is cleared.
    pub fn create_pdf(&mut self) -> Result<OutputFile, ScreenError> {
        self.ensure_idle()?;
        if self.selection.is_empty() {
            return Err(self.raise(AssembleError::Empty.into()));
        }

        self.loading = true;
        let result = self.run_create();
        self.loading = false;

        match result {
            Ok(file) => {
                info!(name = %file.name, pages = self.selection.len(), "created PDF");
                self.registry.insert_front(file.clone());
                self.selection.clear();
                self.emit(ScreenEvent::Saved(file.clone()));
                Ok(file)
            }
            Err(e) => Err(self.raise(e)),
        }
    }

    fn run_create(&mut self) -> Result<OutputFile, ScreenError> {
        let images = self.selection.items().to_vec();
        let optimized_dir = self.data_dir.join(OPTIMIZED_DIR);

        let prepared = if self.config.optimize.enabled {
            self.emit(ScreenEvent::Optimizing {
                count: images.len(),
            });
            let config = OptimizeConfig::from(&self.config.optimize);
            optimize_batch(&self.backend, &images, &optimized_dir, &config)
        } else {
            images
        };

        let watermark = Watermark::from(&self.config.watermark);
        let assembled = pdf::assemble(&prepared, &watermark, |p| {
            self.emit(ScreenEvent::Assembling(p))
        });
        if self.config.optimize.enabled {
            remove_scratch(&optimized_dir);
        }
        let bytes = assembled?;

        let file = self.store.save(&bytes)?;
        if let Err(e) = self.platform.register_media(&file.path) {
            if let Err(rm) = std::fs::remove_file(&file.path) {
                warn!(file = %file.path.display(), error = %rm, "could not remove unregistered PDF");
            }
            return Err(e.into());
        }
        Ok(file)
    }

    // ------------------------------------------------------------------
    // Recent PDFs
    // ------------------------------------------------------------------

    /// Rebuild the registry from the output directory.
    pub fn load_recent(&mut self) -> Result<(), ScreenError> {
        self.ensure_idle()?;
        match self.store.list() {
            Ok(files) => {
                debug!(count = files.len(), "loaded recent PDFs");
                self.registry.replace(files);
                Ok(())
            }
            Err(e) => Err(self.raise(e.into())),
        }
    }

    fn lookup(&mut self, name: &str) -> Result<OutputFile, ScreenError> {
        match self.registry.find(name) {
            Some(file) => Ok(file.clone()),
            None => Err(self.raise(ScreenError::NotFound(name.to_string()))),
        }
    }

    pub fn share(&mut self, name: &str) -> Result<(), ScreenError> {
        self.ensure_idle()?;
        let file = self.lookup(name)?;
        self.platform
            .share(&file.path)
            .map_err(|e| self.raise(e.into()))
    }

    /// Delete one PDF from storage, then from the registry.
    pub fn delete(&mut self, name: &str) -> Result<(), ScreenError> {
        self.ensure_idle()?;
        let file = self.lookup(name)?;
        if let Err(e) = self.store.delete(&file.name) {
            return Err(self.raise(e.into()));
        }
        self.registry.remove(&file.name);
        Ok(())
    }

    /// Delete every registered PDF.
    ///
    /// Deletions are attempted one by one and failures collected. The
    /// directory is then listed again and the registry set to what is
    /// actually left, whether or not every deletion succeeded.
    pub fn clear_all(&mut self) -> Result<(), ScreenError> {
        self.ensure_idle()?;
        let mut failures = Vec::new();
        for entry in self.registry.entries().to_vec() {
            if let Err(e) = self.store.delete(&entry.name) {
                failures.push(format!("{}: {}", entry.name, e));
            }
        }

        match self.store.list() {
            Ok(remaining) => self.registry.replace(remaining),
            Err(e) => return Err(self.raise(e.into())),
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(self.raise(ScreenError::ClearIncomplete(failures)))
        }
    }
}

fn remove_scratch(dir: &Path) {
    if let Err(e) = std::fs::remove_dir_all(dir) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(dir = %dir.display(), error = %e, "could not remove optimized copies");
        }
    }
}
