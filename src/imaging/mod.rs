//! Image processing: decode, orient, resize, encode, and EXIF facts.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageDecoder::dimensions` |
//! | **EXIF blob** | `ImageDecoder::exif_metadata` |
//! | **EXIF facts** | byte-pattern heuristics + `kamadak-exif` |
//! | **Rendition** | orient → Lanczos3 resize → WebP/AVIF |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining naming, config and backend
//! - **EXIF parser**: [`parse_exif`], best-effort and infallible

pub mod backend;
mod calculations;
pub mod exif_parser;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{calculate_fit_width, reduction_percent};
pub use exif_parser::{ExifFacts, parse_exif};
pub use operations::{
    GeneratedRendition, RenditionConfig, create_rendition, get_dimensions, rendition_filename,
    rendition_url,
};
pub use params::{OutputFormat, Quality, RenderParams};
pub use rust_backend::RustBackend;
