//! Gallery Renderer: builds the initial container.
//!
//! Two entry paths:
//!
//! 1. **Convention**: [`render_from_convention`] produces `image_count` items
//!    sourced from `<path_prefix><NN>.<extension>`, captioned
//!    `"<caption_prefix> <i>"`, in ascending index order.
//! 2. **Existing markup**: when a statically authored page already contains
//!    `.image-item` blocks, [`adopt_markup`] reads them in document order and
//!    the convention is skipped. This is also how a previously exported
//!    `gallery.html` is loaded back for another editing pass.
//!
//! [`initial_gallery`] picks between the two.

use crate::config::GridConfig;
use crate::gallery::{GalleryContainer, NewItem};
use crate::naming;
use regex::Regex;
use std::sync::LazyLock;

/// Opening tag of an `.image-item` block followed by its `<img>`.
static ITEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?is)<div\b[^>]*\bclass\s*=\s*["'][^"']*\bimage-item\b[^"']*["'][^>]*>"#,
        r#"\s*(<img\b[^>]*>)"#,
    ))
    .expect("image item regex should compile")
});

/// One `name="value"` / `name='value'` / `name=value` attribute.
static ATTR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("attribute regex should compile")
});

/// Render the convention grid: `image_count` items in ascending index order.
pub fn render_from_convention(grid: &GridConfig) -> GalleryContainer {
    let mut container = GalleryContainer::new();
    for i in 1..=grid.image_count {
        let source = naming::image_path(&grid.path_prefix, i, &grid.extension);
        let caption = format!("{} {}", grid.caption_prefix, i);
        container.push(NewItem::new(source).with_alt(caption));
    }
    log::debug!("rendered {} items from convention", container.len());
    container
}

/// An `<img>` found inside an `.image-item` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupItem {
    pub src: String,
    pub alt: Option<String>,
}

/// Find every `.image-item` image in document order.
///
/// Items without a `src` are skipped. An absent or empty `alt` is kept as
/// `None` so the positional fallback applies.
pub fn scan_markup(markup: &str) -> Vec<MarkupItem> {
    ITEM_PATTERN
        .captures_iter(markup)
        .filter_map(|caps| {
            let tag = caps.get(1)?.as_str();
            let mut src = None;
            let mut alt = None;
            for attr in ATTR_PATTERN.captures_iter(tag) {
                let name = attr[1].to_ascii_lowercase();
                let value = attr
                    .get(2)
                    .or_else(|| attr.get(3))
                    .or_else(|| attr.get(4))
                    .map(|m| decode_entities(m.as_str()))
                    .unwrap_or_default();
                match name.as_str() {
                    "src" => src = Some(value),
                    "alt" => alt = Some(value).filter(|a| !a.is_empty()),
                    _ => {}
                }
            }
            let src = src.filter(|s| !s.is_empty())?;
            Some(MarkupItem { src, alt })
        })
        .collect()
}

/// Treat the items already present in `markup` as the initial container.
pub fn adopt_markup(markup: &str) -> GalleryContainer {
    let mut container = GalleryContainer::new();
    for item in scan_markup(markup) {
        let mut new = NewItem::new(item.src);
        new.alt_text = item.alt;
        container.push(new);
    }
    log::debug!("adopted {} items from markup", container.len());
    container
}

/// Existing markup wins when it contains at least one item; otherwise the
/// convention grid is rendered.
pub fn initial_gallery(markup: Option<&str>, grid: &GridConfig) -> GalleryContainer {
    match markup {
        Some(m) if !scan_markup(m).is_empty() => adopt_markup(m),
        _ => render_from_convention(grid),
    }
}

/// Decode the handful of entities maud and hand-written pages emit.
fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{alts, sources};

    fn grid(count: usize) -> GridConfig {
        GridConfig {
            image_count: count,
            ..GridConfig::default()
        }
    }

    #[test]
    fn convention_renders_in_ascending_order() {
        let c = render_from_convention(&grid(3));
        assert_eq!(sources(&c), ["images/01.jpg", "images/02.jpg", "images/03.jpg"]);
    }

    #[test]
    fn convention_captions_use_index() {
        let c = render_from_convention(&grid(2));
        assert_eq!(
            alts(&c),
            [Some("Photography work 1"), Some("Photography work 2")]
        );
    }

    #[test]
    fn convention_default_is_twelve_items() {
        let c = render_from_convention(&GridConfig::default());
        assert_eq!(c.len(), 12);
        assert_eq!(c.at(11).unwrap().source, "images/12.jpg");
    }

    #[test]
    fn zero_count_renders_empty() {
        assert!(render_from_convention(&grid(0)).is_empty());
    }

    #[test]
    fn scan_reads_items_in_document_order() {
        let html = r#"
<div class="gallery" id="gallery">
  <div class="image-item"><img src="b.jpg" alt="Bee" loading="lazy"></div>
  <div class="image-item" draggable="true">
    <img loading="lazy" alt='Ant' src='a.jpg'>
  </div>
</div>"#;
        let items = scan_markup(html);
        assert_eq!(
            items,
            vec![
                MarkupItem {
                    src: "b.jpg".into(),
                    alt: Some("Bee".into()),
                },
                MarkupItem {
                    src: "a.jpg".into(),
                    alt: Some("Ant".into()),
                },
            ]
        );
    }

    #[test]
    fn scan_ignores_images_outside_items() {
        let html = r#"<header><img src="logo.png"></header>
<div class="image-item"><img src="x.jpg"></div>"#;
        let items = scan_markup(html);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].src, "x.jpg");
        assert_eq!(items[0].alt, None);
    }

    #[test]
    fn scan_decodes_entities() {
        let html = concat!(
            r#"<div class="image-item">"#,
            r#"<img src="a.jpg?x=1&amp;y=2" alt="Rock &amp; Roll"></div>"#,
        );
        let items = scan_markup(html);
        assert_eq!(items[0].src, "a.jpg?x=1&y=2");
        assert_eq!(items[0].alt.as_deref(), Some("Rock & Roll"));
    }

    #[test]
    fn scan_skips_items_without_src() {
        let html = r#"<div class="image-item"><img alt="nothing"></div>"#;
        assert!(scan_markup(html).is_empty());
    }

    #[test]
    fn empty_alt_becomes_none() {
        let html = r#"<div class="image-item"><img src="a.jpg" alt=""></div>"#;
        assert_eq!(scan_markup(html)[0].alt, None);
    }

    #[test]
    fn class_list_with_other_classes_matches() {
        let html = r#"<div class="card image-item dragging"><img src="a.jpg"></div>"#;
        assert_eq!(scan_markup(html).len(), 1);
    }

    #[test]
    fn initial_gallery_prefers_existing_markup() {
        let html = r#"<div class="image-item"><img src="only.jpg"></div>"#;
        let c = initial_gallery(Some(html), &grid(5));
        assert_eq!(sources(&c), ["only.jpg"]);
    }

    #[test]
    fn initial_gallery_falls_back_to_convention() {
        let c = initial_gallery(Some("<main></main>"), &grid(2));
        assert_eq!(c.len(), 2);
        let c = initial_gallery(None, &grid(1));
        assert_eq!(sources(&c), ["images/01.jpg"]);
    }
}
