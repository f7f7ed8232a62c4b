//! # Photo Ingest
//!
//! Prepares a folder of original photographs for a statically built site.
//! The originals stay where they are; everything the site needs is derived
//! from them and from a small, hand-edited caption file.
//!
//! # Architecture: One Pass, Three Outputs
//!
//! ```text
//! photos-source/*.jpg ─► scan ─► per file (parallel) ─► sort ─► photos.json
//!                                  │ identify                    metadata.json
//!                                  │ EXIF facts                  _preview.html
//!                                  │ thumb + display renditions
//!                                  └ sidecar caption / tags
//! ```
//!
//! The run is a pure function of its inputs: the same originals, sidecar and
//! config always produce a byte-identical manifest. The sidecar is the only
//! file a person edits, so the pipeline only ever adds to it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`process`] | The pipeline: scan, render, merge metadata, sort, write outputs |
//! | [`optimize`] | Second command: convert cover JPEG/PNGs to web renditions in place |
//! | [`config`] | `photos.toml` loading, merging onto stock defaults, validation |
//! | [`scan`] | Non-recursive, extension-filtered listing of a source directory |
//! | [`metadata`] | The caption/tag sidecar: tolerant load, additive save, field resolution |
//! | [`preview`] | HTML page pairing thumbnails with filenames, rendered with Maud |
//! | [`cache`] | Content-addressed rendition cache for fast re-runs |
//! | [`imaging`] | Pure-Rust decode, resize and encode; heuristic EXIF extraction |
//! | [`types`] | Manifest record types serialized to `photos.json` |
//! | [`naming`] | Filename stems, extensions and human-readable alt text |
//! | [`output`] | CLI output formatting: per-photo size report and run summary |
//!
//! # Design Decisions
//!
//! ## Filename Is Identity
//!
//! A photo is identified by its source filename: it keys the sidecar, and its
//! stem names both renditions. Renaming a file orphans its caption (the old
//! entry is kept, never pruned) and the cache copies the old renditions to
//! the new name instead of re-encoding.
//!
//! ## Heuristic EXIF
//!
//! Date and camera are found by scanning the raw EXIF bytes for patterns
//! rather than walking IFDs. Camera bodies disagree on where they put things;
//! the strings themselves are stable. Exposure values, which are binary
//! rationals, go through `kamadak-exif`.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate (Lanczos3 resampling) and
//! `libwebp` for lossy WebP. No ImageMagick, no sharp, no Node: a single
//! binary processes a photo folder on any machine.
//!
//! ## Failures Stay Local
//!
//! A corrupt original is logged and skipped. It gets no manifest record and
//! no sidecar placeholder, but it still appears on the preview page so the
//! problem is visible. Only configuration errors, an unreadable source
//! directory or an unwritable manifest stop a run.

pub mod cache;
pub mod config;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod optimize;
pub mod output;
pub mod preview;
pub mod process;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
