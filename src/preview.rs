//! HTML preview page for editing the sidecar.
//!
//! Source files usually have camera names (`DSC01234.JPG`), so the page shows
//! each file's thumbnail next to its filename and current caption and tags.
//! It is written next to the sidecar and opened straight from disk, so image
//! paths are relative to the page's own directory.
//!
//! Every scanned file gets a card, including files that failed to process;
//! their thumbnail simply does not load.

use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::path::{Component, Path, PathBuf};

const CSS: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif; max-width: 1200px; margin: 0 auto; padding: 20px; background: #f5f5f5; }
h1 { font-size: 20px; color: #333; }
p { color: #666; font-size: 14px; }
code { background: #e8e8e8; padding: 2px 6px; border-radius: 4px; font-size: 13px; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 16px; margin-top: 20px; }
.card { border: 1px solid #ddd; border-radius: 8px; overflow: hidden; background: #fff; }
.card img { width: 100%; height: 200px; object-fit: cover; }
.card-body { padding: 8px; }
.filename { font-size: 13px; word-break: break-all; }
.date { font-size: 11px; color: #666; margin-top: 2px; }
.meta { font-size: 11px; color: #0d7377; margin-top: 4px; }
.tag { background: #e0f2f1; padding: 1px 6px; border-radius: 10px; font-size: 10px; margin-right: 4px; }
.empty { color: #999; }
"#;

/// Everything one card shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewCard {
    pub filename: String,
    /// Thumbnail path relative to the preview page.
    pub thumb_src: String,
    pub date: Option<String>,
    pub caption: String,
    pub tags: Vec<String>,
}

/// Render the full preview document.
///
/// `sidecar_name` is the sidecar's file name, shown in the instructions.
pub fn render_preview(cards: &[PreviewCard], sidecar_name: &str) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "Photo Preview - edit " (sidecar_name) " to add captions and tags" }
                style { (PreEscaped(CSS)) }
            }
            body {
                h1 { "Photo Preview" }
                p {
                    "Use this page to identify your photos by filename, then edit "
                    code { (sidecar_name) }
                    " to add captions and tags."
                }
                p {
                    "After editing, run "
                    code { "photo-ingest process" }
                    " again to update the site."
                }
                div.grid {
                    @for card in cards {
                        (render_card(card))
                    }
                }
            }
        }
    }
}

fn render_card(card: &PreviewCard) -> Markup {
    html! {
        div.card {
            img src=(card.thumb_src) alt=(card.filename);
            div.card-body {
                strong.filename { (card.filename) }
                @if let Some(date) = &card.date {
                    div.date { (date) }
                }
                div.meta {
                    "caption: "
                    @if card.caption.is_empty() {
                        em.empty { "empty" }
                    } @else {
                        "\"" (card.caption) "\""
                    }
                }
                div.meta {
                    "tags: "
                    @if card.tags.is_empty() {
                        em.empty { "none" }
                    } @else {
                        @for tag in &card.tags {
                            span.tag { (tag) }
                        }
                    }
                }
            }
        }
    }
}

/// Write the preview document to `path`, creating its directory.
pub fn write_preview(path: &Path, cards: &[PreviewCard], sidecar_name: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_preview(cards, sidecar_name).into_string())
}

/// Relative URL from directory `from` to file `to`, with `/` separators.
///
/// Both paths are made absolute against the current directory first; the
/// comparison is purely lexical.
pub fn relative_url(from: &Path, to: &Path) -> std::io::Result<String> {
    let from = normalize(&std::path::absolute(from)?);
    let to = normalize(&std::path::absolute(to)?);

    let from_parts: Vec<Component> = from.components().collect();
    let to_parts: Vec<Component> = to.components().collect();
    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = std::iter::repeat_n("..".to_string(), from_parts.len() - common);
    let downs = to_parts[common..]
        .iter()
        .map(|c| c.as_os_str().to_string_lossy().into_owned());
    Ok(ups.chain(downs).collect::<Vec<_>>().join("/"))
}

/// Resolve `.` and `..` lexically.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(filename: &str) -> PreviewCard {
        PreviewCard {
            filename: filename.to_string(),
            thumb_src: format!("../public/thumbs/{}.webp", crate::naming::file_stem(filename)),
            date: None,
            caption: String::new(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn document_has_doctype_and_one_card_per_file() {
        let html = render_preview(&[card("a.jpg"), card("b.jpg")], "metadata.json").into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(html.matches("class=\"card\"").count(), 2);
        assert!(html.contains("src=\"../public/thumbs/a.webp\""));
        assert!(html.contains("<code>metadata.json</code>"));
    }

    #[test]
    fn empty_caption_and_tags_show_placeholders() {
        let html = render_card(&card("a.jpg")).into_string();
        assert!(html.contains("<em class=\"empty\">empty</em>"));
        assert!(html.contains("<em class=\"empty\">none</em>"));
        assert!(!html.contains("class=\"date\""));
    }

    #[test]
    fn caption_tags_and_date_are_rendered() {
        let mut c = card("a.jpg");
        c.caption = "Golden hour".into();
        c.tags = vec!["sea".into(), "evening".into()];
        c.date = Some("2023-07-14".into());

        let html = render_card(&c).into_string();
        assert!(html.contains("&quot;Golden hour&quot;") || html.contains("\"Golden hour\""));
        assert!(html.contains("<span class=\"tag\">sea</span>"));
        assert!(html.contains("<span class=\"tag\">evening</span>"));
        assert!(html.contains("<div class=\"date\">2023-07-14</div>"));
    }

    #[test]
    fn user_text_is_escaped() {
        let mut c = card("a.jpg");
        c.caption = "<script>alert(1)</script>".into();
        let html = render_card(&c).into_string();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn relative_url_climbs_out_of_source_dir() {
        let url = relative_url(
            Path::new("/site/photos-source"),
            Path::new("/site/public/assets/img/photography/thumbs/a.webp"),
        )
        .unwrap();
        assert_eq!(url, "../public/assets/img/photography/thumbs/a.webp");
    }

    #[test]
    fn relative_url_same_directory() {
        let url = relative_url(Path::new("/site/out"), Path::new("/site/out/a.webp")).unwrap();
        assert_eq!(url, "a.webp");
    }

    #[test]
    fn relative_url_normalizes_dot_segments() {
        let url = relative_url(
            Path::new("/site/./photos-source"),
            Path::new("/site/photos-source/../thumbs/a.webp"),
        )
        .unwrap();
        assert_eq!(url, "../thumbs/a.webp");
    }

    #[test]
    fn write_preview_creates_parent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested/_preview.html");
        write_preview(&path, &[card("a.jpg")], "metadata.json").unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("a.jpg"));
    }
}
