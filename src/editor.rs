//! Editor Mode Controller.
//!
//! Holds the page-lifetime edit flag. It starts off unless the page was
//! loaded with the activation query flag (`?edit=true` by default), and
//! afterwards changes only through [`EditorModeController::toggle`].
//!
//! The controller gates the drag engine: entering edit mode (re)activates
//! it over whatever the gallery holds at that moment, including items
//! ingested since the last activation; leaving edit mode deactivates it.

use crate::gallery::{GalleryContainer, ItemId};
use crate::reorder::DragReorderEngine;
use url::Url;

/// Toggle label while viewing: the action a click would perform.
pub const ENTER_LABEL: &str = "Enter edit mode";
/// Toggle label while editing.
pub const EXIT_LABEL: &str = "Exit edit mode";

/// Base used to resolve relative locations like `?edit=true`.
const LOCATION_BASE: &str = "http://localhost/";

/// Whether `location` carries `<flag>=true` in its query string.
///
/// Accepts absolute URLs, relative URLs, and bare query strings. Anything
/// unparseable counts as "no flag".
pub fn activation_requested(location: &str, flag: &str) -> bool {
    let parsed = Url::parse(location).or_else(|_| {
        Url::parse(LOCATION_BASE).and_then(|base| base.join(location))
    });
    match parsed {
        Ok(url) => url.query_pairs().any(|(k, v)| k == flag && v == "true"),
        Err(e) => {
            log::debug!("ignoring unparseable location {location:?}: {e}");
            false
        }
    }
}

/// State change produced by a toggle, for the rendering adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeChange {
    pub editing: bool,
    pub toggle_label: &'static str,
    /// Items that just became draggable.
    pub wired: Vec<ItemId>,
    /// Items that stopped being draggable.
    pub unwired: Vec<ItemId>,
    /// A drag abandoned by leaving edit mode.
    pub drag_cancelled: Option<ItemId>,
}

#[derive(Debug, Default)]
pub struct EditorModeController {
    editing: bool,
}

impl EditorModeController {
    /// A controller in viewing mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize at page load. If `location` requests edit mode, edit mode
    /// is entered right away (and the engine activated) before anything is
    /// painted.
    pub fn at_load(
        location: Option<&str>,
        flag: &str,
        engine: &mut DragReorderEngine,
        gallery: &GalleryContainer,
    ) -> (Self, Option<ModeChange>) {
        let mut controller = Self::new();
        let requested = location.is_some_and(|loc| activation_requested(loc, flag));
        if requested {
            log::debug!("activation flag present, starting in edit mode");
            let change = controller.toggle(engine, gallery);
            return (controller, Some(change));
        }
        (controller, None)
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// The editor control panel is shown exactly while editing.
    pub fn panel_visible(&self) -> bool {
        self.editing
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.editing { EXIT_LABEL } else { ENTER_LABEL }
    }

    /// Flip edit mode and gate the drag engine accordingly.
    pub fn toggle(
        &mut self,
        engine: &mut DragReorderEngine,
        gallery: &GalleryContainer,
    ) -> ModeChange {
        self.editing = !self.editing;
        let (wired, unwired, drag_cancelled) = if self.editing {
            (engine.activate(gallery), Vec::new(), None)
        } else {
            let (unwired, dropped) = engine.deactivate();
            (Vec::new(), unwired, dropped)
        };
        log::debug!("edit mode {}", if self.editing { "on" } else { "off" });
        ModeChange {
            editing: self.editing,
            toggle_label: self.toggle_label(),
            wired,
            unwired,
            drag_cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::NewItem;
    use crate::test_helpers::container_of;

    #[test]
    fn flag_in_absolute_url() {
        assert!(activation_requested("https://example.com/?edit=true", "edit"));
        assert!(activation_requested(
            "https://example.com/portfolio/index.html?x=1&edit=true#top",
            "edit"
        ));
    }

    #[test]
    fn flag_in_relative_location() {
        assert!(activation_requested("?edit=true", "edit"));
        assert!(activation_requested("index.html?edit=true", "edit"));
    }

    #[test]
    fn flag_must_be_exactly_true() {
        assert!(!activation_requested("https://example.com/?edit=1", "edit"));
        assert!(!activation_requested("https://example.com/?edit", "edit"));
        assert!(!activation_requested("https://example.com/?edit=TRUE", "edit"));
        assert!(!activation_requested("https://example.com/", "edit"));
    }

    #[test]
    fn custom_flag_name() {
        assert!(activation_requested("/?admin=true", "admin"));
        assert!(!activation_requested("/?edit=true", "admin"));
    }

    #[test]
    fn load_without_flag_starts_viewing() {
        let g = container_of(&["A"]);
        let mut engine = DragReorderEngine::new();
        let (c, change) = EditorModeController::at_load(Some("/"), "edit", &mut engine, &g);
        assert!(!c.is_editing());
        assert!(!c.panel_visible());
        assert_eq!(c.toggle_label(), ENTER_LABEL);
        assert!(change.is_none());
        assert!(!engine.is_active());
    }

    #[test]
    fn load_with_flag_starts_editing() {
        let g = container_of(&["A", "B"]);
        let mut engine = DragReorderEngine::new();
        let (c, change) =
            EditorModeController::at_load(Some("/?edit=true"), "edit", &mut engine, &g);
        assert!(c.is_editing());
        assert!(c.panel_visible());
        let change = change.unwrap();
        assert_eq!(change.wired.len(), 2);
        assert_eq!(change.toggle_label, EXIT_LABEL);
        assert!(engine.is_active());
    }

    #[test]
    fn toggle_round_trip_gates_engine() {
        let g = container_of(&["A", "B"]);
        let mut engine = DragReorderEngine::new();
        let mut c = EditorModeController::new();

        let on = c.toggle(&mut engine, &g);
        assert!(on.editing);
        assert_eq!(on.toggle_label, EXIT_LABEL);
        assert!(engine.is_draggable(g.at(0).unwrap().id));

        let off = c.toggle(&mut engine, &g);
        assert!(!off.editing);
        assert_eq!(off.toggle_label, ENTER_LABEL);
        assert_eq!(off.unwired.len(), 2);
        assert!(!engine.is_draggable(g.at(0).unwrap().id));
    }

    #[test]
    fn reentering_wires_items_added_while_viewing() {
        let mut g = container_of(&["A"]);
        let mut engine = DragReorderEngine::new();
        let mut c = EditorModeController::new();
        c.toggle(&mut engine, &g);
        c.toggle(&mut engine, &g);
        let b = g.push(NewItem::new("B"));
        let on = c.toggle(&mut engine, &g);
        assert!(on.wired.contains(&b));
        assert_eq!(on.wired.len(), 2);
    }
}
