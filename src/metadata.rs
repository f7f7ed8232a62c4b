//! Sidecar metadata: user captions and tags, merged with derived facts.
//!
//! The sidecar is a JSON object keyed by original filename:
//!
//! ```json
//! {
//!   "sunset.jpg": { "caption": "Golden hour", "tags": ["sea", "evening"] },
//!   "IMG_0042.jpg": { "caption": "", "tags": [] }
//! }
//! ```
//!
//! The pipeline only ever *adds* to it. New files get an empty placeholder so
//! the user can fill it in; existing entries are written back exactly as
//! parsed (key order and fields this tool does not know about included), and
//! entries for files that disappeared from the source directory are kept.
//! A malformed entry only loses its own caption and tags.
//!
//! ## Resolution priority
//!
//! ```text
//! alt: resolve(&[caption, humanized filename stem])
//! ```

use log::warn;
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty (after trimming) value.
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Caption and tags read from one sidecar entry.
///
/// Reading is lenient per entry: a missing, `null` or non-string caption is
/// empty, non-string tags are dropped, and a non-object entry reads as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SidecarEntry {
    pub caption: String,
    pub tags: Vec<String>,
}

impl SidecarEntry {
    fn from_value(value: &Value) -> Self {
        let caption = value
            .get("caption")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let tags = value
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        Self { caption, tags }
    }

    fn placeholder() -> Value {
        json!({"caption": "", "tags": []})
    }
}

/// The sidecar file, loaded into memory.
///
/// Entries are kept as the raw JSON the user wrote, in file order, so saving
/// reproduces them exactly. Placeholders are appended after them.
#[derive(Debug)]
pub struct SidecarStore {
    path: PathBuf,
    entries: Map<String, Value>,
    /// The file existed but could not be parsed; never overwrite it.
    unparsed: bool,
}

impl SidecarStore {
    /// Load the sidecar at `path`.
    ///
    /// A missing file is an empty store. A file that is not a JSON object is
    /// logged and also treated as empty, with the store marked so that
    /// [`save`](Self::save) leaves the broken file alone.
    pub fn load(path: &Path) -> Self {
        let (entries, unparsed) = match fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (Map::new(), false),
            Err(e) => {
                warn!("Could not read sidecar {}: {}", path.display(), e);
                (Map::new(), true)
            }
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(entries)) => (entries, false),
                Ok(_) => {
                    warn!(
                        "Sidecar {} is not a JSON object (captions and tags ignored this run)",
                        path.display()
                    );
                    (Map::new(), true)
                }
                Err(e) => {
                    warn!(
                        "Could not parse sidecar {}: {} (captions and tags ignored this run)",
                        path.display(),
                        e
                    );
                    (Map::new(), true)
                }
            },
        };
        Self {
            path: path.to_path_buf(),
            entries,
            unparsed,
        }
    }

    pub fn get(&self, filename: &str) -> Option<SidecarEntry> {
        self.entries.get(filename).map(SidecarEntry::from_value)
    }

    /// Append an empty placeholder for `filename` unless an entry exists.
    ///
    /// Returns `true` when a placeholder was added.
    pub fn ensure_entry(&mut self, filename: &str) -> bool {
        if self.entries.contains_key(filename) {
            return false;
        }
        self.entries
            .insert(filename.to_string(), SidecarEntry::placeholder());
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_unparsed(&self) -> bool {
        self.unparsed
    }

    /// Write the sidecar back as pretty JSON, keys in file order.
    ///
    /// Returns `Ok(false)` without touching the disk when the original file
    /// could not be parsed.
    pub fn save(&self) -> Result<bool, MetadataError> {
        if self.unparsed {
            warn!(
                "Leaving unreadable sidecar {} untouched; fix it and re-run to record new photos",
                self.path.display()
            );
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json + "\n")?;
        Ok(true)
    }
}
