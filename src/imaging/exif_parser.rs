//! Best-effort EXIF fact extraction from a raw metadata blob.
//!
//! Two passes over the same bytes:
//!
//! 1. **Heuristic pass** (date, camera). The blob is scanned as flat bytes,
//!    one Latin-1 character per byte. EXIF stores these values as ASCII with
//!    null separators, so no IFD walking is needed:
//!    - the first `YYYY:MM:DD HH:MM:SS` wins and becomes `YYYY-MM-DD`;
//!    - camera anchors are tried in a fixed order, each a manufacturer string
//!      followed by a null-terminated model. First anchor that matches wins.
//! 2. **Structured pass** (focal length, aperture, ISO, shutter) through
//!    `kamadak-exif`. Only runs on blobs that parse as a TIFF structure.
//!
//! Neither pass can fail the caller: anything unexpected yields absent fields.

use regex::bytes::Regex;
use std::sync::LazyLock;

/// Facts derived from an image's embedded EXIF blob. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExifFacts {
    /// Capture date as `YYYY-MM-DD`.
    pub date: Option<String>,
    /// `"<Manufacturer> <Model>"`.
    pub camera: Option<String>,
    /// e.g. `"50 mm"`.
    pub focal_length: Option<String>,
    /// e.g. `"f/2.8"`.
    pub aperture: Option<String>,
    pub iso: Option<u32>,
    /// e.g. `"1/250"`.
    pub shutter: Option<String>,
}

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)([0-9]{4}):([0-9]{2}):([0-9]{2}) [0-9]{2}:[0-9]{2}:[0-9]{2}")
        .expect("date pattern is valid")
});

/// Camera anchors in priority order. Overlapping blobs can match several of
/// these; the order decides.
static CAMERA_ANCHORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?-u)SONY\x00([^\x00]+)",
        r"(?-u)Canon\x00([^\x00]+)",
        r"(?-u)NIKON[^\x00]*\x00([^\x00]+)",
        r"(?-u)FUJIFILM\x00([^\x00]+)",
        r"(?-u)Panasonic\x00([^\x00]+)",
        r"(?-u)OLYMPUS[^\x00]*\x00([^\x00]+)",
        r"(?-u)RICOH[^\x00]*\x00([^\x00]+)",
        r"(?-u)LEICA[^\x00]*\x00([^\x00]+)",
        r"(?-u)Apple\x00([^\x00]+)",
        r"(?i-u)samsung\x00([^\x00]+)",
        r"(?-u)Google\x00([^\x00]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("camera anchor is valid"))
    .collect()
});

static MANUFACTURER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i-u)(SONY|Canon|NIKON|FUJIFILM|Panasonic|OLYMPUS|RICOH|LEICA|Apple|samsung|Google)")
        .expect("manufacturer pattern is valid")
});

/// Decode bytes one-to-one as Latin-1.
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Parse whatever can be recovered from `blob`. `None` yields empty facts.
pub fn parse_exif(blob: Option<&[u8]>) -> ExifFacts {
    let Some(bytes) = blob else {
        return ExifFacts::default();
    };

    let mut facts = ExifFacts {
        date: find_date(bytes),
        camera: find_camera(bytes),
        ..ExifFacts::default()
    };
    fill_exposure(bytes, &mut facts);
    facts
}

fn find_date(bytes: &[u8]) -> Option<String> {
    let caps = DATE_PATTERN.captures(bytes)?;
    Some(format!(
        "{}-{}-{}",
        latin1(&caps[1]),
        latin1(&caps[2]),
        latin1(&caps[3])
    ))
}

fn find_camera(bytes: &[u8]) -> Option<String> {
    let model = CAMERA_ANCHORS
        .iter()
        .find_map(|anchor| anchor.captures(bytes))
        .map(|caps| latin1(&caps[1]).trim().to_string())?;

    match MANUFACTURER.captures(bytes) {
        Some(make) => Some(format!("{} {}", latin1(&make[1]), model)),
        None => Some(model),
    }
}

const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Structured pass for exposure values. Silently does nothing when the blob
/// isn't a TIFF-structured EXIF payload.
fn fill_exposure(bytes: &[u8], facts: &mut ExifFacts) {
    let tiff = bytes.strip_prefix(EXIF_HEADER).unwrap_or(bytes);
    let Ok(exif) = exif::Reader::new().read_raw(tiff.to_vec()) else {
        return;
    };

    let field = |tag| exif.get_field(tag, exif::In::PRIMARY);

    facts.focal_length = field(exif::Tag::FocalLength)
        .and_then(|f| first_rational(&f.value))
        .map(|mm| format!("{} mm", trim_float(mm)));
    facts.aperture = field(exif::Tag::FNumber)
        .and_then(|f| first_rational(&f.value))
        .map(|n| format!("f/{}", trim_float(n)));
    facts.iso = field(exif::Tag::PhotographicSensitivity).and_then(|f| f.value.get_uint(0));
    facts.shutter = field(exif::Tag::ExposureTime).and_then(|f| match &f.value {
        exif::Value::Rational(v) => v.first().and_then(format_shutter),
        _ => None,
    });
}

fn first_rational(value: &exif::Value) -> Option<f64> {
    match value {
        exif::Value::Rational(v) => v
            .first()
            .filter(|r| r.denom != 0)
            .map(|r| r.to_f64()),
        _ => None,
    }
}

/// `1/250` for fractions of a second, `2` or `0.5`-style for the rest.
fn format_shutter(r: &exif::Rational) -> Option<String> {
    if r.denom == 0 || r.num == 0 {
        return None;
    }
    if r.num < r.denom {
        let denom = (r.denom as f64 / r.num as f64).round() as u64;
        Some(format!("1/{denom}"))
    } else {
        Some(trim_float(r.to_f64()))
    }
}

/// Format with at most one decimal, dropping a trailing `.0`.
fn trim_float(v: f64) -> String {
    let s = format!("{:.1}", v);
    s.strip_suffix(".0").map(String::from).unwrap_or(s)
}
