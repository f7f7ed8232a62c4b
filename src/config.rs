//! Pipeline configuration module.
//!
//! Handles loading, validating, and merging `photos.toml`. The file lives at
//! the project root; every path in it is relative to that root (absolute
//! paths are used as-is).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [source]
//! dir = "photos-source"                       # Original photographs
//! sidecar = "photos-source/metadata.json"     # Captions and tags, keyed by filename
//! preview = "photos-source/_preview.html"     # Editing aid
//!
//! [output]
//! manifest = "src/data/photos.json"           # Consumed by the site build
//! format = "webp"                             # webp | avif
//!
//! [thumbnail]
//! width = 800
//! quality = 80
//! dir = "public/assets/img/photography/thumbs"
//! url = "/assets/img/photography/thumbs"
//!
//! [display]
//! width = 1920
//! quality = 85
//! dir = "public/assets/img/photography/display"
//! url = "/assets/img/photography/display"
//!
//! [processing]
//! auto_orient = true        # Apply EXIF orientation before resizing
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//!
//! [optimize]
//! dir = "public/assets/img/recommendations"
//! width = 800
//! quality = 80
//! ```
//!
//! ## Partial Configuration
//!
//! The file is sparse. Override just the values you want:
//!
//! ```toml
//! [display]
//! quality = 90
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{OutputFormat, Quality, RenditionConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the project root.
pub const CONFIG_FILE: &str = "photos.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Pipeline configuration loaded from `photos.toml`.
///
/// All sections have defaults; the file only needs the values it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhotosConfig {
    /// Where originals, the sidecar and the preview live.
    pub source: SourceConfig,
    /// Manifest location and rendition encoding.
    pub output: OutputConfig,
    /// Small rendition used in grids.
    pub thumbnail: RenditionSettings,
    /// Large rendition used in the lightbox.
    pub display: RenditionSettings,
    /// Parallelism and orientation handling.
    pub processing: ProcessingConfig,
    /// Cover optimizer settings (`optimize` command).
    pub optimize: OptimizeConfig,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            output: OutputConfig::default(),
            thumbnail: RenditionSettings {
                width: 800,
                quality: 80,
                dir: "public/assets/img/photography/thumbs".to_string(),
                url: "/assets/img/photography/thumbs".to_string(),
            },
            display: RenditionSettings {
                width: 1920,
                quality: 85,
                dir: "public/assets/img/photography/display".to_string(),
                url: "/assets/img/photography/display".to_string(),
            },
            processing: ProcessingConfig::default(),
            optimize: OptimizeConfig::default(),
        }
    }
}

impl PhotosConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, quality) in [
            ("thumbnail.quality", self.thumbnail.quality),
            ("display.quality", self.display.quality),
            ("optimize.quality", self.optimize.quality),
        ] {
            if !(1..=100).contains(&quality) {
                return Err(ConfigError::Validation(format!("{name} must be 1-100")));
            }
        }
        for (name, width) in [
            ("thumbnail.width", self.thumbnail.width),
            ("display.width", self.display.width),
            ("optimize.width", self.optimize.width),
        ] {
            if width == 0 {
                return Err(ConfigError::Validation(format!("{name} must be non-zero")));
            }
        }
        if self.thumbnail.dir == self.display.dir {
            return Err(ConfigError::Validation(
                "thumbnail.dir and display.dir must differ".into(),
            ));
        }
        Ok(())
    }

    /// Render settings for the thumbnail scale.
    pub fn thumbnail_rendition(&self) -> RenditionConfig {
        self.thumbnail
            .to_rendition("thumb", self.output.format, self.processing.auto_orient)
    }

    /// Render settings for the display scale.
    pub fn display_rendition(&self) -> RenditionConfig {
        self.display
            .to_rendition("display", self.output.format, self.processing.auto_orient)
    }

    /// Resolve every configured path against the project root.
    pub fn paths(&self, root: &Path) -> ResolvedPaths {
        ResolvedPaths {
            source_dir: root.join(&self.source.dir),
            sidecar: root.join(&self.source.sidecar),
            preview: root.join(&self.source.preview),
            manifest: root.join(&self.output.manifest),
            thumbnail_dir: root.join(&self.thumbnail.dir),
            display_dir: root.join(&self.display.dir),
            optimize_dir: root.join(&self.optimize.dir),
        }
    }
}

/// Source-side locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Directory of original photographs (scanned non-recursively).
    pub dir: String,
    /// JSON sidecar with user captions and tags.
    pub sidecar: String,
    /// Generated HTML preview page.
    pub preview: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            dir: "photos-source".to_string(),
            sidecar: "photos-source/metadata.json".to_string(),
            preview: "photos-source/_preview.html".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Manifest JSON read by the site build.
    pub manifest: String,
    /// Encoding for both renditions.
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            manifest: "src/data/photos.json".to_string(),
            format: OutputFormat::Webp,
        }
    }
}

/// One rendition scale.
///
/// No container default: `thumbnail` and `display` have different stock
/// values, and partial sections are filled by merging onto the stock table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenditionSettings {
    /// Maximum output width in pixels. Smaller sources are not upscaled.
    pub width: u32,
    /// Lossy encoding quality (1-100).
    pub quality: u32,
    /// Output directory.
    pub dir: String,
    /// Public URL prefix for files in `dir`.
    pub url: String,
}

impl RenditionSettings {
    fn to_rendition(
        &self,
        label: &'static str,
        format: OutputFormat,
        auto_orient: bool,
    ) -> RenditionConfig {
        RenditionConfig {
            label,
            max_width: self.width,
            quality: Quality::new(self.quality),
            format,
            auto_orient,
        }
    }
}

/// Parallel processing and orientation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Apply the EXIF orientation tag before resizing.
    pub auto_orient: bool,
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            auto_orient: true,
            max_processes: None,
        }
    }
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Cover optimizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizeConfig {
    /// Directory whose JPEG/PNG files are converted in place.
    pub dir: String,
    pub width: u32,
    pub quality: u32,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            dir: "public/assets/img/recommendations".to_string(),
            width: 800,
            quality: 80,
        }
    }
}

/// Config paths joined onto the project root.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPaths {
    pub source_dir: PathBuf,
    pub sidecar: PathBuf,
    pub preview: PathBuf,
    pub manifest: PathBuf,
    pub thumbnail_dir: PathBuf,
    pub display_dir: PathBuf,
    pub optimize_dir: PathBuf,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(PhotosConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `photos.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PhotosConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PhotosConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `photos.toml` in the given project root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<PhotosConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `photos.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Photo Ingest Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Paths are relative to the project root.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Source photographs
# ---------------------------------------------------------------------------
[source]
# Directory of original photographs. Only .jpg .jpeg .png .webp .tiff files
# directly inside it are processed (subdirectories are ignored).
dir = "photos-source"

# Captions and tags, keyed by original filename. New photos get an empty
# entry; existing entries are never overwritten.
sidecar = "photos-source/metadata.json"

# HTML page showing every photo with its current caption and tags.
preview = "photos-source/_preview.html"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# JSON manifest consumed by the site build. Rewritten on every run.
manifest = "src/data/photos.json"

# Rendition encoding: "webp" or "avif".
format = "webp"

# ---------------------------------------------------------------------------
# Thumbnail rendition (grids)
# ---------------------------------------------------------------------------
[thumbnail]
# Maximum width in pixels. Smaller originals keep their size.
width = 800
# Lossy encoding quality (1 = worst, 100 = best).
quality = 80
dir = "public/assets/img/photography/thumbs"
url = "/assets/img/photography/thumbs"

# ---------------------------------------------------------------------------
# Display rendition (lightbox)
# ---------------------------------------------------------------------------
[display]
width = 1920
quality = 85
dir = "public/assets/img/photography/display"
url = "/assets/img/photography/display"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Rotate/flip according to the EXIF orientation tag before resizing.
auto_orient = true

# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Cover optimizer (`photo-ingest optimize`)
# ---------------------------------------------------------------------------
[optimize]
# JPEG/PNG files in this directory are converted and the originals removed.
dir = "public/assets/img/recommendations"
width = 800
quality = 80
"##
}
