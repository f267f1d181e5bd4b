//! Lightbox Viewer: the full-screen overlay state machine.
//!
//! ```text
//!            activate(item)
//!   Closed ─────────────────▶ Open { item }
//!      ▲                          │
//!      └──── overlay click ───────┤
//!      └──── Escape key ──────────┘
//! ```
//!
//! The lightbox owns exactly one keyboard subscription and holds it only
//! while open. Every path back to `Closed` releases it, so repeated
//! open/close cycles never accumulate Escape listeners.

use crate::gallery::{GalleryItem, ItemId};

/// Keys the lightbox cares about. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Key::Escape,
            _ => Key::Other,
        }
    }
}

/// The enlarged copy shown in the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub item: ItemId,
    pub source: String,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LightboxState {
    #[default]
    Closed,
    Open(Overlay),
}

/// Why the overlay went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    OverlayClick,
    Escape,
}

/// Result of an image activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// A new overlay opened. The activation must not propagate to the
    /// drag engine.
    Opened(Overlay),
    /// An overlay was already open; nothing changed.
    AlreadyOpen,
}

#[derive(Debug, Default)]
pub struct Lightbox {
    state: LightboxState,
    key_subscribed: bool,
}

impl Lightbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LightboxState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, LightboxState::Open(_))
    }

    /// Number of live Escape listeners: 1 while open, 0 otherwise.
    pub fn escape_listeners(&self) -> usize {
        usize::from(self.key_subscribed)
    }

    /// Open the overlay for `item`, captioned with `caption`.
    ///
    /// Guarded: activating while an overlay is already open is ignored.
    pub fn activate(&mut self, item: &GalleryItem, caption: String) -> Activation {
        if self.is_open() {
            log::debug!("lightbox already open, ignoring activation of {}", item.id);
            return Activation::AlreadyOpen;
        }
        let overlay = Overlay {
            item: item.id,
            source: item.source.clone(),
            caption,
        };
        self.state = LightboxState::Open(overlay.clone());
        self.key_subscribed = true;
        log::debug!("lightbox opened on {}", item.id);
        Activation::Opened(overlay)
    }

    /// A click anywhere on the overlay closes it.
    pub fn click_overlay(&mut self) -> Option<Dismissal> {
        self.close(Dismissal::OverlayClick)
    }

    /// Keyboard input. Only Escape, and only while open, does anything.
    pub fn key_down(&mut self, key: Key) -> Option<Dismissal> {
        if !self.key_subscribed || key != Key::Escape {
            return None;
        }
        self.close(Dismissal::Escape)
    }

    /// Close without a user gesture, e.g. when the shown item disappears.
    pub fn force_close(&mut self) -> bool {
        self.close(Dismissal::OverlayClick).is_some()
    }

    fn close(&mut self, cause: Dismissal) -> Option<Dismissal> {
        if !self.is_open() {
            return None;
        }
        self.state = LightboxState::Closed;
        self.key_subscribed = false;
        log::debug!("lightbox closed ({:?})", cause);
        Some(cause)
    }
}
