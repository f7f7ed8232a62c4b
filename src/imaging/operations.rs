//! High-level image operations.
//!
//! These functions combine naming and configuration with backend execution:
//! they decide where a rendition lives and what it is called, then hand the
//! pixel work to an [`ImageBackend`].

use super::backend::{BackendError, ImageBackend};
use super::params::{OutputFormat, Quality, RenderParams};
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// One rendition scale (thumbnail or display) as the pipeline sees it.
#[derive(Debug, Clone)]
pub struct RenditionConfig {
    /// Short label used in progress output and cache keys.
    pub label: &'static str,
    pub max_width: u32,
    pub quality: Quality,
    pub format: OutputFormat,
    pub auto_orient: bool,
}

/// A rendition that exists on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedRendition {
    /// Where the file was written.
    pub path: PathBuf,
    /// Public URL: `url_base` + `/` + file name.
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// `<stem>.<format extension>`: the name every rendition of `stem` gets.
pub fn rendition_filename(stem: &str, format: OutputFormat) -> String {
    format!("{}.{}", stem, format.extension())
}

/// Join a URL base and a file name with exactly one slash.
pub fn rendition_url(url_base: &str, filename: &str) -> String {
    format!("{}/{}", url_base.trim_end_matches('/'), filename)
}

/// Plan a rendition without executing it.
pub fn plan_rendition(
    source: &Path,
    output_dir: &Path,
    stem: &str,
    config: &RenditionConfig,
) -> RenderParams {
    RenderParams {
        source: source.to_path_buf(),
        output: output_dir.join(rendition_filename(stem, config.format)),
        max_width: config.max_width,
        quality: config.quality,
        auto_orient: config.auto_orient,
    }
}

/// Render one rendition of `source` into `output_dir`.
pub fn create_rendition(
    backend: &impl ImageBackend,
    source: &Path,
    output_dir: &Path,
    url_base: &str,
    stem: &str,
    config: &RenditionConfig,
) -> Result<GeneratedRendition> {
    let params = plan_rendition(source, output_dir, stem, config);
    let dims = backend.render(&params)?;
    let filename = rendition_filename(stem, config.format);

    Ok(GeneratedRendition {
        url: rendition_url(url_base, &filename),
        path: params.output,
        width: dims.width,
        height: dims.height,
    })
}
