//! # Gal Editor
//!
//! A static image gallery with an in-place editor. Visitors see a grid and a
//! click-to-enlarge lightbox; in edit mode the grid can be reordered by drag
//! and drop, extended with local image files, and exported as an HTML
//! fragment or a JSON arrangement.
//!
//! # Architecture: Headless Core, Thin Adapter
//!
//! Every piece of editor behaviour lives in plain state machines that never
//! see a view:
//!
//! ```text
//! host input ──► EditorSession::handle(Event) ──► Vec<Effect> ──► adapter
//!                 │
//!                 ├── GalleryContainer      ordered items, ItemId-keyed
//!                 ├── EditorModeController  edit flag, gates the engine
//!                 ├── DragReorderEngine     dragged item + insert side
//!                 ├── Lightbox              Closed / Open, Escape flag
//!                 ├── DropZone              highlight
//!                 └── Ingestor              background reads, completion order
//! ```
//!
//! The adapter (a page script, the CLI, a test) keeps its own id → view map
//! and applies effects to it. Reordering and export read the container, never
//! a view, so the whole editor is testable without a browser.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`gallery`] | Ordered item container with stable [`gallery::ItemId`]s |
//! | [`render`] | Builds the initial gallery from the naming convention or existing markup |
//! | [`lightbox`] | Full-screen overlay state machine |
//! | [`reorder`] | Drag-and-drop reordering with the insert-side rule |
//! | [`ingest`] | Reads local files into data-URI items on a worker pool |
//! | [`editor`] | Edit mode flag, activation query flag, toggle label |
//! | [`export`] | HTML fragment and JSON arrangement downloads |
//! | [`session`] | Owns all of the above, turns events into effects |
//! | [`arrange`] | Scripted steps replayed against a session (CLI) |
//! | [`page`] | Host page rendering and element checks, using Maud |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`naming`] | `images/NN.jpg` convention |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Identity Over Position
//!
//! Items are addressed by an [`gallery::ItemId`] allocated by the container
//! and never reused. Position is only ever the item's current index, read at
//! the moment it is needed. Nothing caches an index across events, so a file
//! that finishes loading mid-drag cannot skew the drop.
//!
//! ## Completion-Order Ingest
//!
//! Multiple files are read in parallel and appended as each read finishes,
//! not in selection order. Completions rejoin the session only through
//! [`session::EditorSession::pump_ingest`], the single point where
//! background work touches the gallery.
//!
//! ## Captions
//!
//! Convention items carry `Photography work N` from the moment they are
//! rendered; ingested items carry their file name. Only items adopted from
//! markup without an `alt` fall back to a positional label, computed from
//! their rank at export time.
//!
//! ## Maud For Markup
//!
//! The host page and the HTML export are generated with
//! [Maud](https://maud.lambda.xyz/): malformed markup is a build error and
//! every interpolated caption is escaped.

pub mod arrange;
pub mod config;
pub mod editor;
pub mod export;
pub mod gallery;
pub mod ingest;
pub mod lightbox;
pub mod naming;
pub mod output;
pub mod page;
pub mod render;
pub mod reorder;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;
