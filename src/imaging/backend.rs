//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the rest of the
//! crate needs from an image service: identify (pixel dimensions) and
//! optimize (resize + JPEG recompress).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::OptimizeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `Sync` so a single backend can serve rayon workers in a batch.
pub trait ImageBackend: Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Resize to the given dimensions and write a JPEG at the given quality.
    fn optimize(&self, params: &OptimizeParams) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock backend that records operations without executing them.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        /// Dimensions returned by `identify`, keyed by file name.
        pub dimensions: Mutex<HashMap<String, Dimensions>>,
        /// File names whose `optimize` call fails.
        pub failing: Mutex<Vec<String>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Optimize {
            source: String,
            output: String,
            width: u32,
            height: u32,
            quality: u32,
        },
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(entries: &[(&str, u32, u32)]) -> Self {
            let backend = Self::new();
            {
                let mut dims = backend.dimensions.lock().unwrap();
                for (name, width, height) in entries {
                    dims.insert(
                        name.to_string(),
                        Dimensions {
                            width: *width,
                            height: *height,
                        },
                    );
                }
            }
            backend
        }

        pub fn fail_on(self, name: &str) -> Self {
            self.failing.lock().unwrap().push(name.to_string());
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            let name = file_name(path);
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(name.clone()));
            self.dimensions
                .lock()
                .unwrap()
                .get(&name)
                .copied()
                .ok_or_else(|| BackendError::ProcessingFailed(format!("No mock dimensions for {name}")))
        }

        fn optimize(&self, params: &OptimizeParams) -> Result<(), BackendError> {
            let source = file_name(&params.source);
            self.operations.lock().unwrap().push(RecordedOp::Optimize {
                source: source.clone(),
                output: params.output.to_string_lossy().to_string(),
                width: params.width,
                height: params.height,
                quality: params.quality.value(),
            });
            if self.failing.lock().unwrap().contains(&source) {
                return Err(BackendError::ProcessingFailed(format!(
                    "mock failure for {source}"
                )));
            }
            Ok(())
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::with_dimensions(&[("image.jpg", 800, 600)]);

        let result = backend.identify(Path::new("/test/image.jpg")).unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "image.jpg"));
    }

    #[test]
    fn mock_identify_unknown_file_errors() {
        let backend = MockBackend::new();
        assert!(backend.identify(Path::new("/missing.jpg")).is_err());
    }

    #[test]
    fn mock_optimize_failure_is_recorded() {
        let backend = MockBackend::new().fail_on("bad.jpg");
        let result = backend.optimize(&OptimizeParams {
            source: "/bad.jpg".into(),
            output: "/out.jpg".into(),
            width: 10,
            height: 10,
            quality: super::super::params::Quality::new(80),
        });
        assert!(result.is_err());
        assert_eq!(backend.get_operations().len(), 1);
    }
}
