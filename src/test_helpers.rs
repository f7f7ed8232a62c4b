//! Shared test utilities for the photo-ingest test suite.
//!
//! Synthetic images are generated with the `image` crate so tests never
//! depend on binary fixtures checked into the repository.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let site = TempDir::new().unwrap();
//! let source = source_dir(site.path());
//! create_test_jpeg(&source.join("sunset.jpg"), 400, 300);
//! create_test_jpeg_with_exif(&source.join("dated.jpg"), 400, 300, &camera_exif("2023:07:14 18:42:05"));
//! ```

use std::path::{Path, PathBuf};

/// Write a gradient JPEG of the given size.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save(path).unwrap();
}

/// Write a JPEG carrying `exif` as its APP1 payload (after `Exif\0\0`).
pub fn create_test_jpeg_with_exif(path: &Path, width: u32, height: u32, exif: &[u8]) {
    create_test_jpeg(path, width, height);
    let jpeg = std::fs::read(path).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "expected SOI marker");

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(exif);
    let segment_len = u16::try_from(payload.len() + 2).unwrap();

    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, out).unwrap();
}

/// A minimal valid little-endian TIFF (empty IFD0) followed by the byte
/// patterns a Sony body writes for make, model and capture time.
pub fn camera_exif(datetime: &str) -> Vec<u8> {
    let mut blob = b"II*\0".to_vec();
    blob.extend_from_slice(&8u32.to_le_bytes());
    blob.extend_from_slice(&0u16.to_le_bytes());
    blob.extend_from_slice(&0u32.to_le_bytes());
    blob.extend_from_slice(b"SONY\0ILCE-7M3\0");
    blob.extend_from_slice(datetime.as_bytes());
    blob.push(0);
    blob
}

/// Create and return `<root>/photos-source`, the default source directory.
pub fn source_dir(root: &Path) -> PathBuf {
    let dir = root.join("photos-source");
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    serde_json::from_str(&content).unwrap()
}
