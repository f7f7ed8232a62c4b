//! Rendition cache for incremental runs.
//!
//! Encoding is the slow part of the pipeline; decoding, EXIF parsing and the
//! sidecar merge are cheap and always run. This module lets the pipeline skip
//! the encode when the source bytes and the rendition parameters are the same
//! as on a previous run, so editing a caption and re-running is fast.
//!
//! ## Cache keys
//!
//! The cache is **content-addressed**: lookups go by `source_hash` plus
//! `params_hash`, not by output path, so renaming a source file reuses the
//! existing rendition (copied to the new name) instead of re-encoding it.
//!
//! - **`source_hash`**: SHA-256 of the source file contents. Content-based
//!   rather than mtime-based so it survives `git checkout`.
//! - **`params_hash`**: SHA-256 of the rendition kind, width, quality, output
//!   format and orientation flag.
//!
//! A hit also requires the previously written file to still exist.
//!
//! ## Storage
//!
//! Each rendition directory carries its own `.cache-manifest.json`, keyed by
//! file name within that directory.
//!
//! ## Bypassing the cache
//!
//! `process --no-cache` starts from an empty manifest: every rendition is
//! re-encoded and the manifest is rebuilt from scratch.

use crate::imaging::RenditionConfig;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Name of the cache manifest file within a rendition directory.
const MANIFEST_FILENAME: &str = ".cache-manifest.json";

/// Bump to invalidate every existing cache when the key computation changes.
const MANIFEST_VERSION: u32 = 1;

/// Content hashes identifying one rendition.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_hash: String,
    pub params_hash: String,
}

impl CacheEntry {
    fn content_key(&self) -> String {
        format!("{}:{}", self.source_hash, self.params_hash)
    }
}

/// On-disk manifest mapping rendition file names to their hashes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
    /// `"{source_hash}:{params_hash}"` → file name. Rebuilt on load.
    #[serde(skip)]
    content_index: HashMap<String, String>,
}

impl CacheManifest {
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
            content_index: HashMap::new(),
        }
    }

    /// Load from a rendition directory. Missing, corrupt or outdated
    /// manifests load as empty.
    pub fn load(dir: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(manifest_path(dir)) else {
            return Self::empty();
        };
        let Ok(mut manifest) = serde_json::from_str::<Self>(&content) else {
            return Self::empty();
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest.content_index = manifest
            .entries
            .iter()
            .map(|(name, entry)| (entry.content_key(), name.clone()))
            .collect();
        manifest
    }

    pub fn save(&self, dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(manifest_path(dir), json)
    }

    /// File name of a rendition with this content, if it is still on disk.
    pub fn find_cached(&self, entry: &CacheEntry, dir: &Path) -> Option<&str> {
        let name = self.content_index.get(&entry.content_key())?;
        dir.join(name).exists().then_some(name.as_str())
    }

    /// Record `name` as holding `entry`'s content. An older entry for the
    /// same content under another name is dropped.
    pub fn insert(&mut self, name: String, entry: CacheEntry) {
        let key = entry.content_key();
        if let Some(old) = self.content_index.get(&key)
            && *old != name
        {
            self.entries.remove(old.as_str());
        }
        self.content_index.insert(key, name.clone());
        self.entries.insert(name, entry);
    }
}

/// How a rendition came to exist on this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reuse {
    /// Already at the expected path.
    Hit,
    /// Found under another name and copied.
    Copied,
}

/// Cache for one rendition directory, shareable across rayon workers.
pub struct RenditionCache {
    dir: PathBuf,
    enabled: bool,
    manifest: Mutex<CacheManifest>,
}

impl RenditionCache {
    /// Open the cache for `dir`. A disabled cache never reports a hit but
    /// still records what gets encoded.
    pub fn open(dir: &Path, enabled: bool) -> Self {
        let manifest = if enabled {
            CacheManifest::load(dir)
        } else {
            CacheManifest::empty()
        };
        Self {
            dir: dir.to_path_buf(),
            enabled,
            manifest: Mutex::new(manifest),
        }
    }

    fn manifest(&self) -> std::sync::MutexGuard<'_, CacheManifest> {
        self.manifest.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make `output` hold the cached rendition for `entry`, if there is one.
    ///
    /// A failed copy counts as a miss.
    pub fn try_reuse(&self, entry: &CacheEntry, output: &Path) -> Option<Reuse> {
        if !self.enabled {
            return None;
        }
        let name = file_name(output);
        let stored = self.manifest().find_cached(entry, &self.dir)?.to_string();
        if stored == name {
            return Some(Reuse::Hit);
        }
        std::fs::copy(self.dir.join(&stored), output).ok()?;
        self.manifest().insert(name, entry.clone());
        Some(Reuse::Copied)
    }

    /// Record a freshly encoded rendition.
    pub fn record(&self, entry: CacheEntry, output: &Path) {
        self.manifest().insert(file_name(output), entry);
    }

    pub fn save(&self) -> io::Result<()> {
        self.manifest().save(&self.dir)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// SHA-256 hash of everything that affects a rendition's encoded bytes.
pub fn hash_rendition_params(config: &RenditionConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(config.label.as_bytes());
    hasher.update(b"\0");
    hasher.update(config.max_width.to_le_bytes());
    hasher.update(config.quality.value().to_le_bytes());
    hasher.update(config.format.extension().as_bytes());
    hasher.update([u8::from(config.auto_orient)]);
    format!("{:x}", hasher.finalize())
}

/// Summary of cache performance for a run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CacheStats {
    pub hits: u32,
    pub copies: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn copy(&mut self) {
        self.copies += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.copies + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.hits, self.copies) {
            (0, 0) => write!(f, "{} encoded", self.misses),
            (hits, 0) => write!(
                f,
                "{} cached, {} encoded ({} total)",
                hits,
                self.misses,
                self.total()
            ),
            (hits, copies) => write!(
                f,
                "{} cached, {} copied, {} encoded ({} total)",
                hits,
                copies,
                self.misses,
                self.total()
            ),
        }
    }
}

/// Path of the cache manifest inside a rendition directory.
pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILENAME)
}
