//! End-to-end runs of both commands with the real image backend.
//!
//! Sources are small synthetic JPEGs generated with the `image` crate; EXIF
//! is spliced in as an APP1 segment so the whole decode → EXIF → render path
//! is exercised.

use photo_ingest::config::PhotosConfig;
use photo_ingest::optimize::optimize;
use photo_ingest::process::{ProcessOutcome, process};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 96])
    });
    img.save(path).unwrap();
}

/// JPEG whose EXIF block names a Sony body and a capture time.
fn write_dated_jpeg(path: &Path, width: u32, height: u32, datetime: &str) {
    write_jpeg(path, width, height);

    let mut tiff = b"II*\0".to_vec();
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&0u16.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(b"SONY\0ILCE-7M3\0");
    tiff.extend_from_slice(datetime.as_bytes());
    tiff.push(0);

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);
    let jpeg = fs::read(path).unwrap();
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&u16::try_from(payload.len() + 2).unwrap().to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    fs::write(path, out).unwrap();
}

fn source_dir(root: &Path) -> PathBuf {
    let dir = root.join("photos-source");
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn process_builds_every_output() {
    let site = TempDir::new().unwrap();
    let source = source_dir(site.path());
    write_dated_jpeg(&source.join("DSC01234.jpg"), 1200, 800, "2023:07:14 18:42:05");
    write_jpeg(&source.join("sunset.jpg"), 600, 400);
    fs::write(source.join("notes.txt"), "not a photo").unwrap();

    let result = process(&PhotosConfig::default(), site.path(), true, None).unwrap();
    assert_eq!(result.outcome, ProcessOutcome::Processed);
    assert_eq!(result.summary.processed, 2);

    let manifest = read_json(&site.path().join("src/data/photos.json"));
    assert_eq!(manifest.as_array().unwrap().len(), 2);

    let dated = &manifest[0];
    assert_eq!(dated["thumb"], "/assets/img/photography/thumbs/DSC01234.webp");
    assert_eq!(dated["date"], "2023-07-14");
    assert_eq!(dated["camera"], "SONY ILCE-7M3");
    assert_eq!(dated["alt"], "DSC01234");
    assert_eq!(dated["exif"]["width"], 1200);
    assert_eq!(dated["exif"]["height"], 800);

    let undated = &manifest[1];
    assert_eq!(undated["alt"], "sunset");
    assert_eq!(undated["date"], "");

    let thumb = site.path().join("public/assets/img/photography/thumbs/DSC01234.webp");
    let display = site.path().join("public/assets/img/photography/display/DSC01234.webp");
    assert_eq!(image::image_dimensions(&thumb).unwrap(), (800, 533));
    assert_eq!(image::image_dimensions(&display).unwrap(), (1200, 800));

    assert_eq!(
        read_json(&source.join("metadata.json")),
        json!({
            "DSC01234.jpg": {"caption": "", "tags": []},
            "sunset.jpg": {"caption": "", "tags": []}
        })
    );

    let preview = fs::read_to_string(source.join("_preview.html")).unwrap();
    assert!(preview.contains("../public/assets/img/photography/thumbs/sunset.webp"));
}

#[test]
fn captions_survive_and_reruns_are_stable() {
    let site = TempDir::new().unwrap();
    let source = source_dir(site.path());
    write_jpeg(&source.join("beach.jpg"), 300, 200);
    fs::write(
        source.join("metadata.json"),
        r#"{"beach.jpg": {"caption": "Low tide", "tags": ["sea"], "location": "Porto"}}"#,
    )
    .unwrap();

    process(&PhotosConfig::default(), site.path(), true, None).unwrap();
    let manifest_path = site.path().join("src/data/photos.json");
    let first = fs::read(&manifest_path).unwrap();

    let rerun = process(&PhotosConfig::default(), site.path(), true, None).unwrap();
    assert_eq!(fs::read(&manifest_path).unwrap(), first);
    assert_eq!(rerun.cache_stats.hits, 2);

    let manifest = read_json(&manifest_path);
    assert_eq!(manifest[0]["alt"], "Low tide");
    assert_eq!(manifest[0]["tags"], json!(["sea"]));
    assert_eq!(
        read_json(&source.join("metadata.json"))["beach.jpg"],
        json!({"caption": "Low tide", "tags": ["sea"], "location": "Porto"})
    );
}

#[test]
fn corrupt_original_does_not_stop_the_run() {
    let site = TempDir::new().unwrap();
    let source = source_dir(site.path());
    write_jpeg(&source.join("good.jpg"), 200, 100);
    fs::write(source.join("broken.jpg"), b"definitely not a jpeg").unwrap();

    let result = process(&PhotosConfig::default(), site.path(), true, None).unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.summary.failed, 1);
    let sidecar = read_json(&source.join("metadata.json"));
    assert!(sidecar.get("broken.jpg").is_none());
}

#[test]
fn panorama_beyond_webp_limits_fails_alone() {
    let site = TempDir::new().unwrap();
    let source = source_dir(site.path());
    write_jpeg(&source.join("good.jpg"), 64, 48);
    write_jpeg(&source.join("tall.jpg"), 40, 17000);

    let result = process(&PhotosConfig::default(), site.path(), true, None).unwrap();

    assert_eq!(result.summary.processed, 1);
    assert_eq!(result.summary.failed, 1);
    let photos = read_json(&site.path().join("src/data/photos.json"));
    assert_eq!(photos.as_array().unwrap().len(), 1);
    assert_eq!(photos[0]["thumb"], "/assets/img/photography/thumbs/good.webp");
}

#[test]
fn missing_source_directory_is_created() {
    let site = TempDir::new().unwrap();

    let result = process(&PhotosConfig::default(), site.path(), true, None).unwrap();

    assert_eq!(result.outcome, ProcessOutcome::SourceCreated);
    assert!(site.path().join("photos-source").is_dir());
    assert_eq!(read_json(&site.path().join("src/data/photos.json")), json!([]));
}

#[test]
fn photos_toml_overrides_defaults() {
    let site = TempDir::new().unwrap();
    fs::write(
        site.path().join("photos.toml"),
        "[thumbnail]\nwidth = 100\n\n[output]\nmanifest = \"data/photos.json\"\n",
    )
    .unwrap();
    let source = source_dir(site.path());
    write_jpeg(&source.join("a.jpg"), 400, 200);

    let config = photo_ingest::config::load_config(site.path()).unwrap();
    process(&config, site.path(), true, None).unwrap();

    assert!(site.path().join("data/photos.json").exists());
    let thumb = site.path().join("public/assets/img/photography/thumbs/a.webp");
    assert_eq!(image::image_dimensions(&thumb).unwrap(), (100, 50));
}

#[test]
fn optimize_replaces_covers() {
    let site = TempDir::new().unwrap();
    let covers = site.path().join("public/assets/img/recommendations");
    fs::create_dir_all(&covers).unwrap();
    write_jpeg(&covers.join("dune.jpg"), 1000, 1500);
    fs::write(covers.join("keep.webp"), b"already converted").unwrap();

    let report = optimize(&PhotosConfig::default(), site.path()).unwrap();

    assert_eq!(report.converted.len(), 1);
    assert_eq!(report.converted[0].output_name, "dune.webp");
    assert!(!covers.join("dune.jpg").exists());
    assert_eq!(
        image::image_dimensions(covers.join("dune.webp")).unwrap(),
        (800, 1200)
    );
    assert_eq!(fs::read(covers.join("keep.webp")).unwrap(), b"already converted");
}
