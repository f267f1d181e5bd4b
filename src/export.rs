//! Export Serializer.
//!
//! Both exports walk the container in its current order and never mutate
//! it. Positions and fallback captions are computed from the walk itself,
//! so two exports of an unchanged gallery are byte-identical.
//!
//! ## HTML
//!
//! One block per item, concatenated, ready to paste into the host page's
//! grid container:
//!
//! ```html
//! <div class="image-item"><img src="images/01.jpg" alt="Photography work 1" loading="lazy"></div>
//! ```
//!
//! ## JSON
//!
//! ```json
//! [
//!   {
//!     "source": "images/01.jpg",
//!     "altText": "Photography work 1",
//!     "position": 1
//!   }
//! ]
//! ```
//!
//! `position` is the 1-based rank at export time.

use crate::config::ExportConfig;
use crate::gallery::GalleryContainer;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const HTML_MIME: &str = "text/html";
pub const JSON_MIME: &str = "application/json";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One exported item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub source: String,
    pub alt_text: String,
    pub position: usize,
}

/// A file offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub mime: &'static str,
    pub body: String,
}

impl Download {
    /// Save into `dir` under the download's filename.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.body)?;
        Ok(path)
    }
}

/// Ordered records with freshly computed positions.
pub fn records(gallery: &GalleryContainer, caption_prefix: &str) -> Vec<ExportRecord> {
    gallery
        .iter()
        .enumerate()
        .map(|(idx, item)| ExportRecord {
            source: item.source.clone(),
            alt_text: item.caption(idx, caption_prefix),
            position: idx + 1,
        })
        .collect()
}

/// The markup fragment: one `.image-item` per item.
pub fn html_fragment(gallery: &GalleryContainer, caption_prefix: &str) -> Markup {
    html! {
        @for (idx, item) in gallery.iter().enumerate() {
            div.image-item {
                img src=(item.source) alt=(item.caption(idx, caption_prefix)) loading="lazy";
            }
            "\n"
        }
    }
}

pub fn export_html(
    gallery: &GalleryContainer,
    caption_prefix: &str,
    config: &ExportConfig,
) -> Download {
    Download {
        filename: config.html_filename.clone(),
        mime: HTML_MIME,
        body: html_fragment(gallery, caption_prefix).into_string(),
    }
}

pub fn export_json(
    gallery: &GalleryContainer,
    caption_prefix: &str,
    config: &ExportConfig,
) -> Result<Download, ExportError> {
    // serde_json's pretty printer indents with two spaces.
    let body = serde_json::to_string_pretty(&records(gallery, caption_prefix))?;
    Ok(Download {
        filename: config.json_filename.clone(),
        mime: JSON_MIME,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::NewItem;
    use crate::render::scan_markup;
    use crate::test_helpers::container_of;

    const PREFIX: &str = "Photography work";

    #[test]
    fn json_positions_are_one_based_rank() {
        let g = container_of(&["a.jpg", "b.jpg", "c.jpg"]);
        let recs = records(&g, PREFIX);
        let positions: Vec<usize> = recs.iter().map(|r| r.position).collect();
        assert_eq!(positions, [1, 2, 3]);
        assert_eq!(recs[2].source, "c.jpg");
    }

    #[test]
    fn json_uses_camel_case_and_two_space_indent() {
        let mut g = GalleryContainer::new();
        g.push(NewItem::new("a.jpg").with_alt("Dawn"));
        let download = export_json(&g, PREFIX, &ExportConfig::default()).unwrap();
        assert_eq!(
            download.body,
            "[\n  {\n    \"source\": \"a.jpg\",\n    \"altText\": \"Dawn\",\n    \
             \"position\": 1\n  }\n]"
        );
        assert_eq!(download.filename, "gallery.json");
        assert_eq!(download.mime, "application/json");
    }

    #[test]
    fn json_export_is_idempotent() {
        let g = container_of(&["a.jpg", "b.jpg"]);
        let first = export_json(&g, PREFIX, &ExportConfig::default()).unwrap();
        let second = export_json(&g, PREFIX, &ExportConfig::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn json_export_parses_back() {
        let g = container_of(&["a.jpg", "b.jpg"]);
        let download = export_json(&g, PREFIX, &ExportConfig::default()).unwrap();
        let parsed: Vec<ExportRecord> = serde_json::from_str(&download.body).unwrap();
        assert_eq!(parsed, records(&g, PREFIX));
    }

    #[test]
    fn fallback_caption_follows_export_rank() {
        let mut g = GalleryContainer::new();
        g.push(NewItem::new("a.jpg").with_alt("Named"));
        g.push(NewItem::new("b.jpg"));
        let recs = records(&g, PREFIX);
        assert_eq!(recs[1].alt_text, "Photography work 2");
    }

    #[test]
    fn html_fragment_has_one_block_per_item() {
        let g = container_of(&["a.jpg", "b.jpg"]);
        let download = export_html(&g, PREFIX, &ExportConfig::default());
        assert_eq!(download.mime, "text/html");
        assert_eq!(download.filename, "gallery.html");
        assert_eq!(download.body.matches("class=\"image-item\"").count(), 2);
        assert_eq!(download.body.matches("loading=\"lazy\"").count(), 2);
        assert!(download.body.find("a.jpg").unwrap() < download.body.find("b.jpg").unwrap());
        assert!(!download.body.contains("data-item"));
    }

    #[test]
    fn html_escapes_captions() {
        let mut g = GalleryContainer::new();
        g.push(NewItem::new("a.jpg").with_alt("<b>\"Rock\" & Roll</b>"));
        let body = html_fragment(&g, PREFIX).into_string();
        assert!(!body.contains("<b>"));
        assert!(body.contains("&amp;"));
    }

    #[test]
    fn html_export_reads_back_as_markup() {
        let mut g = GalleryContainer::new();
        g.push(NewItem::new("a.jpg").with_alt("A & B"));
        g.push(NewItem::new("b.jpg"));
        let body = html_fragment(&g, PREFIX).into_string();
        let items = scan_markup(&body);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].alt.as_deref(), Some("A & B"));
        assert_eq!(items[1].alt.as_deref(), Some("Photography work 2"));
    }

    #[test]
    fn exports_do_not_mutate() {
        let g = container_of(&["a.jpg", "b.jpg"]);
        let before = g.clone();
        export_html(&g, PREFIX, &ExportConfig::default());
        export_json(&g, PREFIX, &ExportConfig::default()).unwrap();
        assert_eq!(g, before);
    }

    #[test]
    fn empty_gallery_exports() {
        let g = GalleryContainer::new();
        assert_eq!(export_json(&g, PREFIX, &ExportConfig::default()).unwrap().body, "[]");
        assert_eq!(export_html(&g, PREFIX, &ExportConfig::default()).body, "");
    }

    #[test]
    fn download_writes_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let g = container_of(&["a.jpg"]);
        let download = export_html(&g, PREFIX, &ExportConfig::default());
        let path = download.write_to(&tmp.path().join("out")).unwrap();
        assert_eq!(path.file_name().unwrap(), "gallery.html");
        assert_eq!(std::fs::read_to_string(path).unwrap(), download.body);
    }
}
