//! Image rendering backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the contract the pipeline needs from an image
//! codec: identify dimensions, hand over the raw embedded EXIF blob, and
//! render one resized, re-encoded rendition.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use the
//! [`MockBackend`](tests::MockBackend) below.

use super::params::RenderParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image rendering backends.
///
/// `Sync` so one backend can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Decoded pixel dimensions of the stored image (before orientation).
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Raw EXIF blob embedded in the file, if any.
    fn read_exif(&self, path: &Path) -> Result<Option<Vec<u8>>, BackendError>;

    /// Render one rendition and return the dimensions that were written.
    fn render(&self, params: &RenderParams) -> Result<Dimensions, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::calculations::calculate_fit_width;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock backend that records operations instead of decoding pixels.
    ///
    /// Dimensions and EXIF blobs are looked up by file name. Files with no
    /// registered dimensions fail to identify, which is how tests model a
    /// corrupt image. `render` writes a small placeholder so the pipeline can
    /// stat output sizes. Uses Mutex (not RefCell) so it is Sync and works
    /// with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        pub dimensions: Mutex<HashMap<String, Dimensions>>,
        pub exif: Mutex<HashMap<String, Vec<u8>>>,
        pub failing_renders: Mutex<Vec<String>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        ReadExif(String),
        Render {
            source: String,
            output: String,
            max_width: u32,
            quality: u32,
            auto_orient: bool,
        },
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_image(self, filename: &str, width: u32, height: u32) -> Self {
            self.dimensions
                .lock()
                .unwrap()
                .insert(filename.to_string(), Dimensions { width, height });
            self
        }

        pub fn with_exif(self, filename: &str, blob: &[u8]) -> Self {
            self.exif
                .lock()
                .unwrap()
                .insert(filename.to_string(), blob.to_vec());
            self
        }

        pub fn failing_render(self, filename: &str) -> Self {
            self.failing_renders
                .lock()
                .unwrap()
                .push(filename.to_string());
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn render_count(&self) -> usize {
            self.get_operations()
                .iter()
                .filter(|op| matches!(op, RecordedOp::Render { .. }))
                .count()
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
                .ok_or_else(|| BackendError::ProcessingFailed(format!("cannot decode {name}")))
        }

        fn read_exif(&self, path: &Path) -> Result<Option<Vec<u8>>, BackendError> {
            let name = file_name(path);
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::ReadExif(name.clone()));
            Ok(self.exif.lock().unwrap().get(&name).cloned())
        }

        fn render(&self, params: &RenderParams) -> Result<Dimensions, BackendError> {
            let source = file_name(&params.source);
            self.operations.lock().unwrap().push(RecordedOp::Render {
                source: source.clone(),
                output: params.output.to_string_lossy().to_string(),
                max_width: params.max_width,
                quality: params.quality.value(),
                auto_orient: params.auto_orient,
            });

            if self.failing_renders.lock().unwrap().contains(&source) {
                return Err(BackendError::ProcessingFailed(format!(
                    "encode failed for {source}"
                )));
            }
            let dims = self
                .dimensions
                .lock()
                .unwrap()
                .get(&source)
                .copied()
                .ok_or_else(|| {
                    BackendError::ProcessingFailed(format!("cannot decode {source}"))
                })?;

            std::fs::write(&params.output, b"rendition")?;
            let (width, height) = calculate_fit_width((dims.width, dims.height), params.max_width);
            Ok(Dimensions { width, height })
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::new().with_image("image.jpg", 800, 600);

        let result = backend.identify(Path::new("/test/image.jpg")).unwrap();
        assert_eq!(result, Dimensions { width: 800, height: 600 });

        let ops = backend.get_operations();
        assert_eq!(ops, vec![RecordedOp::Identify("image.jpg".into())]);
    }

    #[test]
    fn mock_unknown_image_fails_identify() {
        let backend = MockBackend::new();
        assert!(backend.identify(Path::new("/test/corrupt.jpg")).is_err());
    }

    #[test]
    fn mock_render_writes_output_and_fits_width() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("a.webp");
        let backend = MockBackend::new().with_image("a.jpg", 4000, 3000);

        let dims = backend
            .render(&RenderParams {
                source: "/src/a.jpg".into(),
                output: output.clone(),
                max_width: 800,
                quality: crate::imaging::Quality::new(80),
                auto_orient: true,
            })
            .unwrap();

        assert_eq!(dims, Dimensions { width: 800, height: 600 });
        assert!(output.exists());
        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Render { max_width: 800, quality: 80, auto_orient: true, .. }
        ));
    }

    #[test]
    fn mock_failing_render_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = MockBackend::new()
            .with_image("bad.jpg", 100, 100)
            .failing_render("bad.jpg");

        let result = backend.render(&RenderParams {
            source: "/src/bad.jpg".into(),
            output: tmp.path().join("bad.webp"),
            max_width: 800,
            quality: crate::imaging::Quality::default(),
            auto_orient: true,
        });
        assert!(result.is_err());
    }
}
