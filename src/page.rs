//! Host page markup.
//!
//! The editor core drives a page that exposes a fixed set of element ids.
//! [`render_page`] emits such a page around a gallery; [`check_host_markup`]
//! verifies a hand-authored page exposes them before anything is wired, so
//! an incomplete page fails up front with the missing id instead of
//! half-working.
//!
//! ## Host Elements
//!
//! | Id | Element |
//! |----|---------|
//! | `site-header` | scroll-reactive header (optional) |
//! | `gallery` | grid container holding `.image-item` blocks |
//! | `editor-panel` | editor controls, hidden outside edit mode |
//! | `editor-toggle` | enter/exit edit mode button |
//! | `drop-zone` | file drop target |
//! | `file-input` | `<input type="file" accept="image/*" multiple>` |
//! | `browse-button` | opens the file picker |
//! | `clear-gallery` | empties the grid after confirmation |
//! | `export-html` | downloads the HTML fragment |
//! | `export-json` | downloads the JSON arrangement |

use crate::config::GalleryConfig;
use crate::editor::{ENTER_LABEL, EXIT_LABEL};
use crate::gallery::GalleryContainer;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;

pub const HEADER_ID: &str = "site-header";
pub const GRID_ID: &str = "gallery";
pub const PANEL_ID: &str = "editor-panel";
pub const TOGGLE_ID: &str = "editor-toggle";
pub const DROP_ZONE_ID: &str = "drop-zone";
pub const FILE_INPUT_ID: &str = "file-input";
pub const BROWSE_ID: &str = "browse-button";
pub const CLEAR_ID: &str = "clear-gallery";
pub const EXPORT_HTML_ID: &str = "export-html";
pub const EXPORT_JSON_ID: &str = "export-json";

/// Ids every host page must expose. The header is optional.
pub const REQUIRED_IDS: [&str; 9] = [
    GRID_ID,
    PANEL_ID,
    TOGGLE_ID,
    DROP_ZONE_ID,
    FILE_INPUT_ID,
    BROWSE_ID,
    CLEAR_ID,
    EXPORT_HTML_ID,
    EXPORT_JSON_ID,
];

const CSS: &str = include_str!("../static/style.css");

static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bid\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("id attribute regex should compile")
});

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MarkupError {
    #[error("host page is missing required element #{0}")]
    MissingElement(&'static str),
}

/// What a host page exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostElements {
    pub has_header: bool,
}

/// Fail fast on the first required id the page lacks.
pub fn check_host_markup(markup: &str) -> Result<HostElements, MarkupError> {
    let ids: HashSet<&str> = ID_PATTERN
        .captures_iter(markup)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
        .map(|m| m.as_str())
        .collect();
    for id in REQUIRED_IDS {
        if !ids.contains(id) {
            return Err(MarkupError::MissingElement(id));
        }
    }
    Ok(HostElements {
        has_header: ids.contains(HEADER_ID),
    })
}

/// Render the full host page around `gallery`.
///
/// In edit mode the panel and banner are visible, grid items carry
/// `draggable="true"`, and the toggle offers to exit.
pub fn render_page(gallery: &GalleryContainer, config: &GalleryConfig, editing: bool) -> Markup {
    let caption_prefix = &config.gallery.caption_prefix;
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Gallery" }
                style { (PreEscaped(CSS)) }
            }
            body class=[editing.then_some("editing")] {
                header.site-header id=(HEADER_ID) {
                    button.editor-toggle id=(TOGGLE_ID) type="button" {
                        (if editing { EXIT_LABEL } else { ENTER_LABEL })
                    }
                }
                @if editing {
                    div.editor-banner { (config.editor.banner) }
                }
                section.editor-panel id=(PANEL_ID) hidden[!editing] {
                    div.drop-zone id=(DROP_ZONE_ID) {
                        p { "Drop images here" }
                        input id=(FILE_INPUT_ID) type="file" accept="image/*" multiple hidden;
                        button id=(BROWSE_ID) type="button" { "Browse files" }
                    }
                    div.editor-actions {
                        button id=(CLEAR_ID) type="button" { "Clear gallery" }
                        button id=(EXPORT_HTML_ID) type="button" { "Export HTML" }
                        button id=(EXPORT_JSON_ID) type="button" { "Export JSON" }
                    }
                }
                main.gallery id=(GRID_ID) {
                    (grid_items(gallery, caption_prefix, editing))
                }
            }
        }
    }
}

/// Grid blocks carry `data-item` in both modes so clicks map back to an id.
fn grid_items(gallery: &GalleryContainer, caption_prefix: &str, editing: bool) -> Markup {
    html! {
        @for (idx, item) in gallery.iter().enumerate() {
            div.image-item draggable=[editing.then_some("true")] data-item=(item.id.get()) {
                img src=(item.source) alt=(item.caption(idx, caption_prefix)) loading="lazy";
                @if let Some(size) = &item.size_label {
                    span.image-size { (size) }
                }
            }
            "\n"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{render_from_convention, scan_markup};
    use crate::test_helpers::container_of;

    #[test]
    fn rendered_page_exposes_every_host_element() {
        let g = container_of(&["a.jpg"]);
        let page = render_page(&g, &GalleryConfig::default(), false).into_string();
        let host = check_host_markup(&page).unwrap();
        assert!(host.has_header);
    }

    #[test]
    fn missing_element_is_reported_by_id() {
        let page = r#"<main id="gallery"></main><div id="editor-panel"></div>"#;
        assert_eq!(
            check_host_markup(page),
            Err(MarkupError::MissingElement(TOGGLE_ID))
        );
    }

    #[test]
    fn header_is_optional() {
        let page = REQUIRED_IDS
            .iter()
            .map(|id| format!("<div id='{id}'></div>"))
            .collect::<String>();
        let host = check_host_markup(&page).unwrap();
        assert!(!host.has_header);
    }

    #[test]
    fn viewing_page_hides_panel_and_offers_enter() {
        let g = container_of(&["a.jpg"]);
        let page = render_page(&g, &GalleryConfig::default(), false).into_string();
        assert!(page.contains(ENTER_LABEL));
        assert!(page.contains(r#"id="editor-panel" hidden"#));
        assert!(!page.contains("draggable"));
        assert!(!page.contains("EDITOR MODE"));
    }

    #[test]
    fn viewing_grid_carries_item_ids() {
        let g = container_of(&["a.jpg", "b.jpg"]);
        let page = render_page(&g, &GalleryConfig::default(), false).into_string();
        let b = g.at(1).unwrap().id.get();
        assert!(page.contains(&format!(r#"<div class="image-item" data-item="{b}">"#)));
        assert_eq!(page.matches("data-item=").count(), 2);
    }

    #[test]
    fn editing_page_shows_banner_and_draggable_items() {
        let g = container_of(&["a.jpg", "b.jpg"]);
        let page = render_page(&g, &GalleryConfig::default(), true).into_string();
        assert!(page.contains(EXIT_LABEL));
        assert!(!page.contains(r#"id="editor-panel" hidden"#));
        assert!(page.contains("EDITOR MODE"));
        assert_eq!(page.matches("draggable=\"true\"").count(), 2);
    }

    #[test]
    fn page_grid_reads_back_in_order() {
        let config = GalleryConfig::default();
        let g = render_from_convention(&config.gallery);
        for editing in [false, true] {
            let page = render_page(&g, &config, editing).into_string();
            let items = scan_markup(&page);
            assert_eq!(items.len(), 12);
            assert_eq!(items[0].src, "images/01.jpg");
            assert_eq!(items[11].alt.as_deref(), Some("Photography work 12"));
        }
    }
}
