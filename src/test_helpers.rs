//! Shared test utilities for the gal-editor test suite.
//!
//! Provides gallery builders, bulk extractors, and in-memory file sources so
//! module tests can describe a gallery as a list of sources and assert on
//! order without touching a filesystem.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut gallery = container_of(&["A", "B", "C"]);
//! let c = id_at(&gallery, 2);
//! assert_eq!(sources(&gallery), ["A", "B", "C"]);
//! ```

use crate::config::GalleryConfig;
use crate::gallery::{GalleryContainer, ItemId, NewItem};
use crate::ingest::{Completion, FileSource, Ingestor, MemoryFile};
use crate::session::{EditorSession, Effect};
use std::sync::mpsc::{self, Receiver, Sender};

// =========================================================================
// Builders
// =========================================================================

/// A container holding one item per source, in order, with no alt text.
pub fn container_of(srcs: &[&str]) -> GalleryContainer {
    let mut gallery = GalleryContainer::new();
    for src in srcs {
        gallery.push(NewItem::new(*src));
    }
    gallery
}

/// A session over `srcs` with stock config, loaded at `location`.
pub fn session_with(srcs: &[&str], location: Option<&str>) -> (EditorSession, Vec<Effect>) {
    EditorSession::load(GalleryConfig::default(), container_of(srcs), location)
        .expect("session should load")
}

/// A PNG-typed in-memory file of `len` bytes.
pub fn memory_image(name: &str, len: usize) -> MemoryFile {
    MemoryFile::new(name, "image/png", vec![0u8; len])
}

pub fn boxed(file: impl FileSource) -> Box<dyn FileSource> {
    Box::new(file)
}

/// A PNG-typed file whose read blocks until the test releases it.
pub struct GateFile {
    name: String,
    gate: Receiver<()>,
}

impl FileSource for GateFile {
    fn name(&self) -> &str {
        &self.name
    }
    fn media_type(&self) -> &str {
        "image/png"
    }
    fn read(&self) -> std::io::Result<Vec<u8>> {
        let _ = self.gate.recv();
        Ok(self.name.as_bytes().to_vec())
    }
}

/// A gated file and the sender that releases its read.
pub fn gate_file(name: &str) -> (GateFile, Sender<()>) {
    let (tx, rx) = mpsc::channel();
    (
        GateFile {
            name: name.to_string(),
            gate: rx,
        },
        tx,
    )
}

// =========================================================================
// Lookups: panics with a clear message on miss
// =========================================================================

/// Id of the item at `index`. Panics if out of range.
pub fn id_at(gallery: &GalleryContainer, index: usize) -> ItemId {
    gallery.at(index).map(|item| item.id).unwrap_or_else(|| {
        panic!(
            "no item at index {index}. Gallery holds {:?}",
            sources(gallery)
        )
    })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All sources in container order.
pub fn sources(gallery: &GalleryContainer) -> Vec<&str> {
    gallery.iter().map(|i| i.source.as_str()).collect()
}

/// All alt texts in container order.
pub fn alts(gallery: &GalleryContainer) -> Vec<Option<&str>> {
    gallery.iter().map(|i| i.alt_text.as_deref()).collect()
}

/// Block until every in-flight read has completed, returning completions in
/// the order they arrived.
pub fn drain(ingestor: &mut Ingestor) -> Vec<Completion> {
    std::iter::from_fn(|| ingestor.next_completion(true)).collect()
}
