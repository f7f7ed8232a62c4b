//! CLI output formatting for both commands.
//!
//! Output is **photo-centric**: each source file gets one line naming it,
//! its pixel size and what processing did to its byte size. Rendition
//! status (cached, copied) appears as an indented context line only when a
//! rendition was not freshly encoded, so a cold run reads like a size
//! report and a warm run shows what was skipped.
//!
//! # Output Format
//!
//! ## Process
//!
//! ```text
//! Found 2 image(s) in photos-source
//!   DSC01234.jpg: 6000x4000 | original 12.4 MB -> thumb 86 KB + display 412 KB (96% smaller) [Golden hour]
//!   DSC01240.jpg: 4000x6000 | original 9.8 MB -> thumb 71 KB + display 388 KB (95% smaller)
//!       thumb: cached, display: cached
//!
//! Wrote 2 photo(s) to src/data/photos.json
//! Wrote 2 entries to photos-source/metadata.json
//!
//! --- Summary ---
//!   Originals:     22.2 MB
//!   Thumbnails:    157 KB (grid view)
//!   Display:       800 KB (lightbox)
//!   Page load:     157 KB (was 22.2 MB)
//!   Reduction:     99% smaller for initial page load
//!
//! Open photos-source/_preview.html in your browser to see thumbnails + filenames.
//! Edit photos-source/metadata.json to add captions and tags, then run again.
//! Cache: 2 cached, 2 encoded (4 total)
//! ```
//!
//! ## Optimize
//!
//! ```text
//! dune.jpg → dune.webp  (412KB → 61KB, 85% smaller)
//!
//! Converted 1 image(s).
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects. Paths are shown relative to the project root.

use crate::imaging::reduction_percent;
use crate::optimize::OptimizeReport;
use crate::process::{ProcessEvent, ProcessOutcome, ProcessResult, VariantInfo, VariantStatus};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Human-readable byte size: `512 B`, `86 KB`, `12.4 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes < KIB {
        format!("{} B", bytes)
    } else if bytes < MIB {
        format!("{} KB", (bytes as f64 / KIB as f64).round() as u64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

/// Display a path relative to `root` when it lies inside it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn status_str(status: VariantStatus) -> &'static str {
    match status {
        VariantStatus::Cached => "cached",
        VariantStatus::Copied => "copied",
        VariantStatus::Encoded => "encoded",
    }
}

/// `thumb: cached, display: copied`, or `None` when both were encoded.
fn reuse_line(variants: [&VariantInfo; 2]) -> Option<String> {
    if variants.iter().all(|v| v.status == VariantStatus::Encoded) {
        return None;
    }
    let parts: Vec<String> = variants
        .iter()
        .map(|v| format!("{}: {}", v.label, status_str(v.status)))
        .collect();
    Some(parts.join(", "))
}

// ============================================================================
// Process output
// ============================================================================

/// Format a single process progress event as display lines.
pub fn format_process_event(event: &ProcessEvent, root: &Path) -> Vec<String> {
    match event {
        ProcessEvent::Started {
            image_count,
            source_dir,
        } => vec![format!(
            "Found {} image(s) in {}",
            image_count,
            display_path(source_dir, root)
        )],
        ProcessEvent::ImageProcessed {
            filename,
            width,
            height,
            original_size,
            thumb,
            display,
            caption,
        } => {
            let savings =
                reduction_percent(*original_size, thumb.size.saturating_add(display.size));
            let mut line = format!(
                "  {}: {}x{} | original {} -> thumb {} + display {} ({}% smaller)",
                filename,
                width,
                height,
                format_bytes(*original_size),
                format_bytes(thumb.size),
                format_bytes(display.size),
                savings
            );
            if let Some(caption) = caption {
                line.push_str(&format!(" [{}]", caption));
            }

            let mut lines = vec![line];
            if let Some(reuse) = reuse_line([thumb, display]) {
                lines.push(format!("      {}", reuse));
            }
            lines
        }
        ProcessEvent::ImageFailed { filename, error } => {
            vec![format!("  Error processing {}: {}", filename, error)]
        }
    }
}

/// Format the end-of-run report.
pub fn format_process_result(result: &ProcessResult, root: &Path) -> Vec<String> {
    let paths = &result.paths;
    let source = display_path(&paths.source_dir, root);
    let manifest = display_path(&paths.manifest, root);

    match result.outcome {
        ProcessOutcome::SourceCreated => {
            return vec![
                format!("Source directory not found: {}", source),
                "Creating directory...".to_string(),
                format!(
                    "Wrote empty {}. Drop your photos into {}/ and run again.",
                    manifest, source
                ),
            ];
        }
        ProcessOutcome::NoImages => {
            return vec![
                format!("No image files found in {}", source),
                format!("Wrote empty {}", manifest),
            ];
        }
        ProcessOutcome::Processed => {}
    }

    let sidecar = display_path(&paths.sidecar, root);
    let summary = &result.summary;
    let mut lines = vec![
        String::new(),
        format!("Wrote {} photo(s) to {}", result.records.len(), manifest),
    ];
    if result.sidecar_written {
        lines.push(format!(
            "Wrote {} entries to {}",
            result.sidecar_entries, sidecar
        ));
    } else {
        lines.push(format!("Left {} untouched (could not be parsed)", sidecar));
    }
    if summary.failed > 0 {
        lines.push(format!("Skipped {} file(s) that failed to process", summary.failed));
    }

    lines.push(String::new());
    lines.push("--- Summary ---".to_string());
    lines.push(format!(
        "  Originals:     {}",
        format_bytes(summary.original_bytes)
    ));
    lines.push(format!(
        "  Thumbnails:    {} (grid view)",
        format_bytes(summary.thumbnail_bytes)
    ));
    lines.push(format!(
        "  Display:       {} (lightbox)",
        format_bytes(summary.display_bytes)
    ));
    lines.push(format!(
        "  Page load:     {} (was {})",
        format_bytes(summary.thumbnail_bytes),
        format_bytes(summary.original_bytes)
    ));
    lines.push(format!(
        "  Reduction:     {}% smaller for initial page load",
        summary.reduction_percent()
    ));

    lines.push(String::new());
    lines.push(format!(
        "Open {} in your browser to see thumbnails + filenames.",
        display_path(&paths.preview, root)
    ));
    lines.push(format!(
        "Edit {} to add captions and tags, then run again.",
        sidecar
    ));
    lines.push(format!("Cache: {}", result.cache_stats));
    lines
}

/// Print a process progress event to stdout.
pub fn print_process_event(event: &ProcessEvent, root: &Path) {
    for line in format_process_event(event, root) {
        println!("{}", line);
    }
}

/// Print the end-of-run report to stdout.
pub fn print_process_result(result: &ProcessResult, root: &Path) {
    for line in format_process_result(result, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Optimize output
// ============================================================================

/// Format an optimize run: one line per converted file, then a count.
pub fn format_optimize_report(report: &OptimizeReport) -> Vec<String> {
    if report.is_empty() {
        return vec!["No JPG/PNG files to convert.".to_string()];
    }

    let mut lines: Vec<String> = report
        .converted
        .iter()
        .map(|c| {
            format!(
                "{} \u{2192} {}  ({}KB \u{2192} {}KB, {}% smaller)",
                c.source_name,
                c.output_name,
                (c.before as f64 / 1024.0).round() as u64,
                (c.after as f64 / 1024.0).round() as u64,
                c.reduction_percent()
            )
        })
        .collect();
    for failure in &report.failed {
        lines.push(format!(
            "{}: kept, conversion failed ({})",
            failure.source_name, failure.error
        ));
    }

    lines.push(String::new());
    lines.push(format!("Converted {} image(s).", report.converted.len()));
    lines
}

/// Print optimize output to stdout.
pub fn print_optimize_report(report: &OptimizeReport) {
    for line in format_optimize_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
