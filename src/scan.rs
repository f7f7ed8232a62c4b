//! Source directory scanning.
//!
//! Only the top level of a directory is considered: subdirectories (and
//! anything inside them) are ignored. Entries are kept when they are regular
//! files, symlinks being followed, and their extension is on the allow-list,
//! compared case-insensitively. The result is sorted by filename, which is
//! the order placeholders are added to the sidecar.
//!
//! ```text
//! photos-source/
//! ├── metadata.json        # sidecar, not an image
//! ├── _preview.html        # preview, not an image
//! ├── IMG_01.JPG           # kept
//! ├── sunset.jpg           # kept
//! ├── notes.TXT            # skipped
//! └── rejects/             # skipped, never descended into
//! ```

use crate::naming;
use log::warn;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot read directory {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Extensions the photo pipeline accepts.
pub const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "tiff"];

/// Extensions the cover optimizer converts.
pub const OPTIMIZE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// An original file found in a scanned directory.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Identity of the photo: the sidecar key.
    pub filename: String,
    /// Filename minus extension: names the renditions.
    pub stem: String,
}

impl SourceFile {
    fn new(path: PathBuf, filename: String) -> Self {
        let stem = naming::file_stem(&filename).to_string();
        Self {
            path,
            filename,
            stem,
        }
    }
}

/// List the files directly in `dir` whose extension is in `allowed`.
///
/// Fails only when `dir` itself cannot be read. Unreadable entries (such as
/// dangling symlinks) are logged and skipped.
pub fn scan_sources(dir: &Path, allowed: &[&str]) -> Result<Vec<SourceFile>, ScanError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ScanError::Unreadable {
                    path: dir.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().into_owned();
        if !naming::has_extension(&filename, allowed) {
            continue;
        }
        files.push(SourceFile::new(entry.into_path(), filename));
    }

    Ok(files)
}

/// Pairs of files whose stems are identical and would therefore overwrite
/// each other's renditions. Each pair is `(first, later)` in scan order.
pub fn stem_collisions(files: &[SourceFile]) -> Vec<(&str, &str)> {
    let mut first_by_stem: HashMap<&str, &str> = HashMap::new();
    let mut collisions = Vec::new();
    for file in files {
        match first_by_stem.get(file.stem.as_str()) {
            Some(first) => collisions.push((*first, file.filename.as_str())),
            None => {
                first_by_stem.insert(&file.stem, &file.filename);
            }
        }
    }
    collisions
}
