//! The photo pipeline.
//!
//! Turns a directory of original photographs into what the site build
//! consumes, plus two editing aids:
//!
//! ```text
//! photos-source/*.jpg ──┬─► thumbs/<stem>.webp      (800px, q80)
//!                       ├─► display/<stem>.webp     (1920px, q85)
//!                       ├─► src/data/photos.json    (manifest, rewritten)
//!                       ├─► photos-source/metadata.json  (sidecar, additive)
//!                       └─► photos-source/_preview.html
//! ```
//!
//! ## Per-file work
//!
//! Each file is identified, its EXIF blob parsed, both renditions rendered
//! (or reused from the [`cache`](crate::cache)), and a [`PhotoRecord`] built
//! by merging derived facts with the sidecar entry. Files are processed in
//! parallel with [rayon](https://docs.rs/rayon); a file that fails is logged
//! and skipped without affecting the others.
//!
//! ## Ordering
//!
//! Records are sorted after the parallel phase: dated photos first, newest
//! first; undated photos last. Ties go to the thumbnail URL, so the manifest
//! is identical across runs over the same inputs.
//!
//! Sidecar placeholders for new files are added after the parallel phase in
//! filename order.

use crate::cache::{self, CacheEntry, CacheStats, RenditionCache, Reuse};
use crate::config::{PhotosConfig, ResolvedPaths};
use crate::imaging::{
    BackendError, ImageBackend, RenditionConfig, RustBackend, create_rendition, get_dimensions,
    parse_exif, reduction_percent, rendition_filename, rendition_url,
};
use crate::metadata::{MetadataError, SidecarStore, resolve};
use crate::naming::humanize_stem;
use crate::preview::{self, PreviewCard};
use crate::scan::{self, ScanError, SourceFile};
use crate::types::{PhotoExif, PhotoRecord};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Sidecar error: {0}")]
    Metadata(#[from] MetadataError),
}

/// How a rendition came to be on disk after this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantStatus {
    /// Reused from a previous run at the same path.
    Cached,
    /// Reused from a previous run under another name.
    Copied,
    /// Freshly encoded.
    Encoded,
}

impl From<Reuse> for VariantStatus {
    fn from(reuse: Reuse) -> Self {
        match reuse {
            Reuse::Hit => VariantStatus::Cached,
            Reuse::Copied => VariantStatus::Copied,
        }
    }
}

/// One rendition of a processed photo, as reported in progress output.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantInfo {
    /// `"thumb"` or `"display"`.
    pub label: &'static str,
    pub size: u64,
    pub status: VariantStatus,
}

/// Progress events emitted while files are processed.
///
/// Events arrive in completion order, not filename order.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    /// Sent once, before any file is processed.
    Started {
        image_count: usize,
        source_dir: PathBuf,
    },
    ImageProcessed {
        filename: String,
        width: u32,
        height: u32,
        original_size: u64,
        thumb: VariantInfo,
        display: VariantInfo,
        /// Non-empty sidecar caption.
        caption: Option<String>,
    },
    ImageFailed {
        filename: String,
        error: String,
    },
}

/// What a run found to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The source directory did not exist; it was created empty.
    SourceCreated,
    /// The source directory has no supported images.
    NoImages,
    /// At least one file was attempted.
    Processed,
}

/// Aggregate sizes for the end-of-run summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub processed: usize,
    pub failed: usize,
    /// Every matched source file, including ones that failed.
    pub original_bytes: u64,
    pub thumbnail_bytes: u64,
    pub display_bytes: u64,
}

impl RunSummary {
    /// Initial page load saving: `(original − thumbnails) / original`.
    pub fn reduction_percent(&self) -> i64 {
        reduction_percent(self.original_bytes, self.thumbnail_bytes)
    }
}

#[derive(Debug)]
pub struct ProcessResult {
    pub outcome: ProcessOutcome,
    /// Manifest contents, in manifest order.
    pub records: Vec<PhotoRecord>,
    pub summary: RunSummary,
    pub cache_stats: CacheStats,
    /// Entries in the sidecar after the run.
    pub sidecar_entries: usize,
    /// False when the sidecar on disk was unparseable and left alone.
    pub sidecar_written: bool,
    pub paths: ResolvedPaths,
}

impl ProcessResult {
    fn empty(outcome: ProcessOutcome, paths: ResolvedPaths) -> Self {
        Self {
            outcome,
            records: Vec::new(),
            summary: RunSummary::default(),
            cache_stats: CacheStats::default(),
            sidecar_entries: 0,
            sidecar_written: false,
            paths,
        }
    }
}

/// Run the pipeline with the pure-Rust image backend.
pub fn process(
    config: &PhotosConfig,
    root: &Path,
    use_cache: bool,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let backend = RustBackend::new();
    process_with_backend(&backend, config, root, use_cache, progress)
}

/// One rendition scale: where it goes and how it is encoded.
struct Target {
    config: RenditionConfig,
    dir: PathBuf,
    url: String,
    params_hash: String,
    cache: RenditionCache,
}

impl Target {
    fn new(config: RenditionConfig, dir: &Path, url: &str, use_cache: bool) -> Self {
        Self {
            params_hash: cache::hash_rendition_params(&config),
            cache: RenditionCache::open(dir, use_cache),
            dir: dir.to_path_buf(),
            url: url.to_string(),
            config,
        }
    }

    fn filename(&self, stem: &str) -> String {
        rendition_filename(stem, self.config.format)
    }
}

/// A rendition that exists on disk after this run.
struct Rendition {
    url: String,
    size: u64,
    status: VariantStatus,
}

/// Everything the sequential phase needs from one successful file.
struct Processed {
    record: PhotoRecord,
    original_size: u64,
    thumb: Rendition,
    display: Rendition,
}

/// Run the pipeline with a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    config: &PhotosConfig,
    root: &Path,
    use_cache: bool,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let paths = config.paths(root);

    if !paths.source_dir.exists() {
        fs::create_dir_all(&paths.source_dir)?;
        write_manifest(&paths.manifest, &[])?;
        return Ok(ProcessResult::empty(ProcessOutcome::SourceCreated, paths));
    }

    let files = scan::scan_sources(&paths.source_dir, scan::SOURCE_EXTENSIONS)?;
    if files.is_empty() {
        write_manifest(&paths.manifest, &[])?;
        return Ok(ProcessResult::empty(ProcessOutcome::NoImages, paths));
    }
    for (first, later) in scan::stem_collisions(&files) {
        warn!("{first} and {later} have the same name stem; their renditions overwrite each other");
    }

    if let Some(tx) = &progress {
        tx.send(ProcessEvent::Started {
            image_count: files.len(),
            source_dir: paths.source_dir.clone(),
        })
        .ok();
    }

    let mut sidecar = SidecarStore::load(&paths.sidecar);
    if !sidecar.is_empty() {
        info!("Loaded metadata for {} photo(s) from {}", sidecar.len(), paths.sidecar.display());
    }

    fs::create_dir_all(&paths.thumbnail_dir)?;
    fs::create_dir_all(&paths.display_dir)?;
    let thumb = Target::new(
        config.thumbnail_rendition(),
        &paths.thumbnail_dir,
        &config.thumbnail.url,
        use_cache,
    );
    let display = Target::new(
        config.display_rendition(),
        &paths.display_dir,
        &config.display.url,
        use_cache,
    );

    let results: Vec<Result<Processed, ProcessError>> = files
        .par_iter()
        .map(|file| {
            let result = process_file(backend, file, &sidecar, &thumb, &display);
            match &result {
                Ok(processed) => {
                    if let Some(tx) = &progress {
                        tx.send(processed_event(file, processed)).ok();
                    }
                }
                // Reported once: as a progress line when someone is listening,
                // otherwise through the log.
                Err(e) => match &progress {
                    Some(tx) => {
                        tx.send(ProcessEvent::ImageFailed {
                            filename: file.filename.clone(),
                            error: e.to_string(),
                        })
                        .ok();
                    }
                    None => error!("Error processing {}: {}", file.filename, e),
                },
            }
            result
        })
        .collect();

    let mut summary = RunSummary::default();
    let mut cache_stats = CacheStats::default();
    let mut records = Vec::with_capacity(files.len());

    for (file, result) in files.iter().zip(results) {
        match result {
            Ok(processed) => {
                sidecar.ensure_entry(&file.filename);
                summary.processed += 1;
                summary.original_bytes += processed.original_size;
                summary.thumbnail_bytes += processed.thumb.size;
                summary.display_bytes += processed.display.size;
                for status in [processed.thumb.status, processed.display.status] {
                    match status {
                        VariantStatus::Cached => cache_stats.hit(),
                        VariantStatus::Copied => cache_stats.copy(),
                        VariantStatus::Encoded => cache_stats.miss(),
                    }
                }
                records.push(processed.record);
            }
            Err(_) => {
                summary.failed += 1;
                if let Ok(meta) = fs::metadata(&file.path) {
                    summary.original_bytes += meta.len();
                }
            }
        }
    }

    records.sort_by(compare_records);

    write_manifest(&paths.manifest, &records)?;
    let sidecar_written = sidecar.save()?;

    for target in [&thumb, &display] {
        if let Err(e) = target.cache.save() {
            warn!("Could not save cache manifest in {}: {}", target.dir.display(), e);
        }
    }

    let cards = preview_cards(&files, &records, &sidecar, &thumb, &paths.preview);
    let sidecar_name = paths
        .sidecar
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if let Err(e) = preview::write_preview(&paths.preview, &cards, &sidecar_name) {
        warn!("Could not write preview {}: {}", paths.preview.display(), e);
    }

    Ok(ProcessResult {
        outcome: ProcessOutcome::Processed,
        records,
        summary,
        cache_stats,
        sidecar_entries: sidecar.len(),
        sidecar_written,
        paths,
    })
}

fn process_file(
    backend: &impl ImageBackend,
    file: &SourceFile,
    sidecar: &SidecarStore,
    thumb: &Target,
    display: &Target,
) -> Result<Processed, ProcessError> {
    let original_size = fs::metadata(&file.path)?.len();
    let (width, height) = get_dimensions(backend, &file.path)?;

    let blob = backend.read_exif(&file.path).unwrap_or_else(|e| {
        debug!("No EXIF read from {}: {}", file.filename, e);
        None
    });
    let facts = parse_exif(blob.as_deref());

    let source_hash = cache::hash_file(&file.path)?;
    let thumb_rendition = render_target(backend, file, &source_hash, thumb)?;
    let display_rendition = render_target(backend, file, &source_hash, display)?;

    let entry = sidecar.get(&file.filename).unwrap_or_default();
    let caption = entry.caption.trim().to_string();
    let humanized = humanize_stem(&file.stem);
    let alt = resolve(&[Some(caption.as_str()), Some(humanized.as_str())])
        .unwrap_or_else(|| file.filename.clone());

    let record = PhotoRecord {
        thumb: thumb_rendition.url.clone(),
        display: display_rendition.url.clone(),
        alt,
        caption,
        date: facts.date,
        camera: facts.camera,
        tags: entry.tags,
        exif: PhotoExif {
            focal_length: facts.focal_length,
            aperture: facts.aperture,
            iso: facts.iso,
            shutter: facts.shutter,
            width,
            height,
        },
    };

    Ok(Processed {
        record,
        original_size,
        thumb: thumb_rendition,
        display: display_rendition,
    })
}

/// Produce one rendition, reusing a cached encode when the source and
/// parameters are unchanged.
fn render_target(
    backend: &impl ImageBackend,
    file: &SourceFile,
    source_hash: &str,
    target: &Target,
) -> Result<Rendition, ProcessError> {
    let filename = target.filename(&file.stem);
    let output = target.dir.join(&filename);
    let entry = CacheEntry {
        source_hash: source_hash.to_string(),
        params_hash: target.params_hash.clone(),
    };

    let status = match target.cache.try_reuse(&entry, &output) {
        Some(reuse) => reuse.into(),
        None => {
            create_rendition(
                backend,
                &file.path,
                &target.dir,
                &target.url,
                &file.stem,
                &target.config,
            )?;
            target.cache.record(entry, &output);
            VariantStatus::Encoded
        }
    };

    Ok(Rendition {
        url: rendition_url(&target.url, &filename),
        size: fs::metadata(&output)?.len(),
        status,
    })
}

fn processed_event(file: &SourceFile, processed: &Processed) -> ProcessEvent {
    let caption = &processed.record.caption;
    ProcessEvent::ImageProcessed {
        filename: file.filename.clone(),
        width: processed.record.exif.width,
        height: processed.record.exif.height,
        original_size: processed.original_size,
        thumb: VariantInfo {
            label: "thumb",
            size: processed.thumb.size,
            status: processed.thumb.status,
        },
        display: VariantInfo {
            label: "display",
            size: processed.display.size,
            status: processed.display.status,
        },
        caption: (!caption.is_empty()).then(|| caption.clone()),
    }
}

/// Manifest order: dated records first (newest first), then undated ones;
/// ties broken by thumbnail URL.
pub fn compare_records(a: &PhotoRecord, b: &PhotoRecord) -> Ordering {
    let by_date = match (&a.date, &b.date) {
        (Some(a_date), Some(b_date)) => b_date.cmp(a_date),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_date.then_with(|| a.thumb.cmp(&b.thumb))
}

/// Write the manifest as pretty JSON, creating parent directories.
fn write_manifest(path: &Path, records: &[PhotoRecord]) -> Result<(), ProcessError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json + "\n")?;
    Ok(())
}

fn preview_cards(
    files: &[SourceFile],
    records: &[PhotoRecord],
    sidecar: &SidecarStore,
    thumb: &Target,
    preview_path: &Path,
) -> Vec<PreviewCard> {
    let dates: HashMap<&str, &str> = records
        .iter()
        .filter_map(|r| Some((r.thumb.as_str(), r.date.as_deref()?)))
        .collect();
    let preview_dir = preview_path.parent().unwrap_or(Path::new("."));

    files
        .iter()
        .map(|file| {
            let filename = thumb.filename(&file.stem);
            let thumb_path = thumb.dir.join(&filename);
            let thumb_src = preview::relative_url(preview_dir, &thumb_path)
                .unwrap_or_else(|_| thumb_path.to_string_lossy().into_owned());
            let url = rendition_url(&thumb.url, &filename);
            let entry = sidecar.get(&file.filename).unwrap_or_default();
            PreviewCard {
                filename: file.filename.clone(),
                thumb_src,
                date: dates.get(url.as_str()).map(|d| d.to_string()),
                caption: entry.caption.trim().to_string(),
                tags: entry.tags,
            }
        })
        .collect()
}
