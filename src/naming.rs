//! Filename helpers shared by the scanner, the pipeline and the optimizer.
//!
//! A source file's *stem* (name without its last extension) names its
//! renditions and, humanized, serves as the fallback `alt` text:
//! - `golden-hour_beach.jpg` → stem `golden-hour_beach` → "golden hour beach"
//! - `IMG_0042.JPG` → stem `IMG_0042` → "IMG 0042"

/// Filename without its last extension. Dotfiles keep their full name.
pub fn file_stem(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(0) | None => filename,
        Some(dot) => &filename[..dot],
    }
}

/// Lowercased last extension, without the dot.
pub fn extension(filename: &str) -> Option<String> {
    match filename.rfind('.') {
        Some(0) | None => None,
        Some(dot) => Some(filename[dot + 1..].to_ascii_lowercase()),
    }
}

/// Whether `filename`'s extension is one of `allowed` (lowercase, no dot).
pub fn has_extension(filename: &str, allowed: &[&str]) -> bool {
    extension(filename).is_some_and(|ext| allowed.contains(&ext.as_str()))
}

/// Display text for a stem: `-` and `_` become spaces.
pub fn humanize_stem(stem: &str) -> String {
    stem.replace(['-', '_'], " ")
}
