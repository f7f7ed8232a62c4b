//! Parameter types for image operations.
//!
//! These structs describe *what* to render, not *how*. They sit between
//! [`operations`](super::operations), which decides which renditions a photo
//! gets, and the [`backend`](super::backend), which does the pixel work.
//!
//! - [`Quality`]: lossy encoding quality (1–100). Clamped on construction.
//! - [`OutputFormat`]: target encoding; picks the rendition file extension.
//! - [`RenderParams`]: one rendition: source, output path, width cap, quality.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Encoding written for every rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Webp,
    Avif,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Webp => "webp",
            OutputFormat::Avif => "avif",
        }
    }
}

/// Parameters for a single rendition.
///
/// Height is never given: the backend derives it from the (oriented) source
/// so the aspect ratio is preserved, and `max_width` is only an upper bound.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub max_width: u32,
    pub quality: Quality,
    /// Rotate/flip according to the EXIF orientation tag before resizing.
    pub auto_orient: bool,
}
