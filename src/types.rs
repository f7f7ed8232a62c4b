//! Shared types written to the manifest.
//!
//! The JSON shape is consumed by the site build, so field names are
//! camelCase and absent text facts are written as `""` rather than omitted.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One published photo: the unit of the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Public URL of the thumbnail rendition.
    pub thumb: String,
    /// Public URL of the display rendition.
    pub display: String,
    /// Never empty: caption, else the humanized filename stem.
    pub alt: String,
    pub caption: String,
    /// Capture date as `YYYY-MM-DD`.
    #[serde(with = "empty_as_none")]
    pub date: Option<String>,
    #[serde(with = "empty_as_none")]
    pub camera: Option<String>,
    pub tags: Vec<String>,
    pub exif: PhotoExif,
}

/// Exposure facts and decoded source dimensions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoExif {
    #[serde(with = "empty_as_none")]
    pub focal_length: Option<String>,
    #[serde(with = "empty_as_none")]
    pub aperture: Option<String>,
    pub iso: Option<u32>,
    #[serde(with = "empty_as_none")]
    pub shutter: Option<String>,
    pub width: u32,
    pub height: u32,
}

/// `None` ⇄ `""` for optional text fields.
mod empty_as_none {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(d)?;
        Ok(value.filter(|s| !s.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PhotoRecord {
        PhotoRecord {
            thumb: "/thumbs/sunset.webp".into(),
            display: "/display/sunset.webp".into(),
            alt: "sunset".into(),
            caption: String::new(),
            date: None,
            camera: Some("SONY ILCE-7M3".into()),
            tags: vec!["sea".into()],
            exif: PhotoExif {
                width: 4000,
                height: 3000,
                ..PhotoExif::default()
            },
        }
    }

    #[test]
    fn absent_text_facts_serialize_as_empty_strings() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["date"], "");
        assert_eq!(json["camera"], "SONY ILCE-7M3");
        assert_eq!(json["exif"]["focalLength"], "");
        assert_eq!(json["exif"]["shutter"], "");
        assert!(json["exif"]["iso"].is_null());
        assert_eq!(json["exif"]["width"], 4000);
    }

    #[test]
    fn empty_strings_read_back_as_none() {
        let json = serde_json::to_string(&record()).unwrap();
        let back: PhotoRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.date, None);
        assert_eq!(back, record());
    }
}
