//! Cover image optimizer.
//!
//! Converts the JPEG/PNG files in one directory (recommendation covers by
//! default) into a single web rendition written next to each original:
//!
//! ```text
//! recommendations/dune.jpg  ──►  recommendations/dune.webp   (dune.jpg removed)
//! ```
//!
//! The original is deleted only after its rendition was written. A file that
//! fails to convert is reported and left in place, so re-running retries it.
//! When two originals share a stem (`cover.jpg`, `cover.png`) only the first
//! is converted; the other is kept with a warning.

use crate::config::PhotosConfig;
use crate::imaging::{
    BackendError, ImageBackend, Quality, RenditionConfig, RustBackend, create_rendition,
    reduction_percent,
};
use crate::scan::{self, ScanError, SourceFile};
use log::warn;
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// One original replaced by its rendition.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub source_name: String,
    pub output_name: String,
    /// Size of the original in bytes.
    pub before: u64,
    /// Size of the rendition in bytes.
    pub after: u64,
}

impl Conversion {
    pub fn reduction_percent(&self) -> i64 {
        reduction_percent(self.before, self.after)
    }
}

/// A file that could not be converted and was kept.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeFailure {
    pub source_name: String,
    pub error: String,
}

/// Everything an optimize run did, in filename order.
#[derive(Debug, Default)]
pub struct OptimizeReport {
    pub converted: Vec<Conversion>,
    pub failed: Vec<OptimizeFailure>,
}

impl OptimizeReport {
    /// True when the directory had nothing to convert.
    pub fn is_empty(&self) -> bool {
        self.converted.is_empty() && self.failed.is_empty()
    }
}

/// Optimize with the pure-Rust image backend.
pub fn optimize(config: &PhotosConfig, root: &Path) -> Result<OptimizeReport, OptimizeError> {
    optimize_with_backend(&RustBackend::new(), config, root)
}

/// Optimize with a specific backend (allows testing with mock).
pub fn optimize_with_backend(
    backend: &impl ImageBackend,
    config: &PhotosConfig,
    root: &Path,
) -> Result<OptimizeReport, OptimizeError> {
    let dir = config.paths(root).optimize_dir;
    let files = scan::scan_sources(&dir, scan::OPTIMIZE_EXTENSIONS)?;
    let skipped: Vec<String> = scan::stem_collisions(&files)
        .into_iter()
        .map(|(first, later)| {
            warn!("Skipping {later}: it would overwrite the rendition of {first}");
            later.to_string()
        })
        .collect();
    let files: Vec<&SourceFile> = files
        .iter()
        .filter(|f| !skipped.contains(&f.filename))
        .collect();

    let rendition = RenditionConfig {
        label: "optimize",
        max_width: config.optimize.width,
        quality: Quality::new(config.optimize.quality),
        format: config.output.format,
        auto_orient: config.processing.auto_orient,
    };

    let results: Vec<(String, Result<Conversion, OptimizeError>)> = files
        .par_iter()
        .map(|file| {
            (
                file.filename.clone(),
                convert_file(backend, file, &dir, &rendition),
            )
        })
        .collect();

    let mut report = OptimizeReport::default();
    for (source_name, result) in results {
        match result {
            Ok(conversion) => report.converted.push(conversion),
            Err(e) => report.failed.push(OptimizeFailure {
                source_name,
                error: e.to_string(),
            }),
        }
    }
    Ok(report)
}

fn convert_file(
    backend: &impl ImageBackend,
    file: &SourceFile,
    dir: &Path,
    rendition: &RenditionConfig,
) -> Result<Conversion, OptimizeError> {
    let before = fs::metadata(&file.path)?.len();
    let generated = create_rendition(backend, &file.path, dir, "", &file.stem, rendition)?;
    let after = fs::metadata(&generated.path)?.len();
    fs::remove_file(&file.path)?;

    let output_name = generated
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Conversion {
        source_name: file.filename.clone(),
        output_name,
        before,
        after,
    })
}
