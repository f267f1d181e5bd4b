//! The editor session: one page's worth of state, driven by input events.
//!
//! [`EditorSession`] owns the gallery and every state machine that acts on
//! it. Host input arrives as [`Event`]s (or, for file payloads, through
//! [`EditorSession::drop_files`] / [`EditorSession::select_files`]); each
//! call returns the [`Effect`]s a rendering adapter must apply to its
//! id → view mapping. The session itself never touches a view, which is what
//! lets the whole editor run headless in tests.
//!
//! ## Threading
//!
//! Everything here runs on the thread that owns the session. File reads run
//! on the ingest pool, and their results only enter the gallery when the
//! owner calls [`EditorSession::pump_ingest`]: that call is the single point
//! where asynchronous work rejoins the event loop. Handlers look indices up
//! when they run and never carry them across calls.

use crate::config::{self, GalleryConfig};
use crate::editor::EditorModeController;
use crate::export::{self, Download, ExportError};
use crate::gallery::{GalleryContainer, ItemId};
use crate::ingest::{Completion, DropZone, FileSource, IngestError, Ingestor, ReadTask};
use crate::lightbox::{Activation, Dismissal, Key, Lightbox, Overlay};
use crate::reorder::{DragReorderEngine, DragStart, DropOutcome};
use thiserror::Error;

/// Scroll offset (px) past which the header switches to its compact style.
pub const HEADER_SCROLL_THRESHOLD: f64 = 50.0;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Discrete host input.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ImageClicked(ItemId),
    OverlayClicked,
    KeyDown(Key),
    DragStart(ItemId),
    DragOver(ItemId),
    Drop(ItemId),
    DragEnd(ItemId),
    ToggleEditor,
    DropZoneDragOver,
    DropZoneDragLeave,
    BrowseClicked,
    ExportHtmlClicked,
    ExportJsonClicked,
    Scrolled(f64),
}

/// A change the rendering adapter must reflect.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    OverlayOpened(Overlay),
    OverlayClosed(Dismissal),
    /// The drop target suppressed the platform's "no drop" default.
    DropAccepted(ItemId),
    DraggingMarked(ItemId),
    DraggingCleared(ItemId),
    ItemMoved {
        item: ItemId,
        from: usize,
        to: usize,
    },
    ItemAppended(ItemId),
    Draggable(ItemId, bool),
    EditorPanelVisible(bool),
    ToggleLabel(&'static str),
    DropZoneHighlighted(bool),
    OpenFilePicker,
    GalleryCleared(usize),
    HeaderCompact(bool),
    Download(Download),
}

/// Counters for the ingest work a session has seen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub appended: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct EditorSession {
    config: GalleryConfig,
    gallery: GalleryContainer,
    editor: EditorModeController,
    engine: DragReorderEngine,
    lightbox: Lightbox,
    drop_zone: DropZone,
    ingestor: Ingestor,
    pending: Vec<ReadTask>,
    header_compact: bool,
    stats: IngestStats,
}

impl EditorSession {
    /// Start a session over `gallery`, reading the activation flag from
    /// `location` once. Effects of entering edit mode at load are returned
    /// so the adapter can apply them before first paint.
    pub fn load(
        config: GalleryConfig,
        gallery: GalleryContainer,
        location: Option<&str>,
    ) -> Result<(Self, Vec<Effect>), SessionError> {
        let ingestor = Ingestor::new(config::effective_workers(&config.ingest))?;
        let mut engine = DragReorderEngine::new();
        let (editor, change) = EditorModeController::at_load(
            location,
            &config.editor.query_flag,
            &mut engine,
            &gallery,
        );
        let mut effects = Vec::new();
        if let Some(change) = change {
            effects.push(Effect::EditorPanelVisible(change.editing));
            effects.push(Effect::ToggleLabel(change.toggle_label));
            effects.extend(change.wired.into_iter().map(|id| Effect::Draggable(id, true)));
        }
        let session = Self {
            config,
            gallery,
            editor,
            engine,
            lightbox: Lightbox::new(),
            drop_zone: DropZone::default(),
            ingestor,
            pending: Vec::new(),
            header_compact: false,
            stats: IngestStats::default(),
        };
        Ok((session, effects))
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn gallery(&self) -> &GalleryContainer {
        &self.gallery
    }

    pub fn is_editing(&self) -> bool {
        self.editor.is_editing()
    }

    pub fn editor(&self) -> &EditorModeController {
        &self.editor
    }

    pub fn engine(&self) -> &DragReorderEngine {
        &self.engine
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    pub fn drop_zone(&self) -> &DropZone {
        &self.drop_zone
    }

    pub fn ingest_stats(&self) -> IngestStats {
        self.stats
    }

    pub fn ingest_in_flight(&self) -> usize {
        self.ingestor.in_flight()
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        log::trace!("event {:?}", event);
        match event {
            Event::ImageClicked(id) => self.activate_image(id),
            Event::OverlayClicked => self
                .lightbox
                .click_overlay()
                .map(Effect::OverlayClosed)
                .into_iter()
                .collect(),
            Event::KeyDown(key) => self
                .lightbox
                .key_down(key)
                .map(Effect::OverlayClosed)
                .into_iter()
                .collect(),
            Event::DragStart(id) => match self.engine.drag_start(id) {
                DragStart::Started { superseded } => superseded
                    .map(Effect::DraggingCleared)
                    .into_iter()
                    .chain([Effect::DraggingMarked(id)])
                    .collect(),
                DragStart::Inert => Vec::new(),
            },
            Event::DragOver(id) => {
                if self.engine.drag_over(id) {
                    vec![Effect::DropAccepted(id)]
                } else {
                    Vec::new()
                }
            }
            Event::Drop(id) => match self.engine.drop_on(&mut self.gallery, id) {
                DropOutcome::Moved { item, from, to } => vec![Effect::ItemMoved { item, from, to }],
                outcome => {
                    log::debug!("drop on {} ignored: {:?}", id, outcome);
                    Vec::new()
                }
            },
            Event::DragEnd(id) => self
                .engine
                .drag_end(id)
                .map(Effect::DraggingCleared)
                .into_iter()
                .collect(),
            Event::ToggleEditor => self.toggle_editor(),
            Event::DropZoneDragOver if self.is_editing() => {
                self.highlight_effect(|zone| zone.drag_over())
            }
            Event::DropZoneDragLeave => self.highlight_effect(|zone| zone.drag_leave()),
            Event::BrowseClicked if self.is_editing() => vec![Effect::OpenFilePicker],
            Event::ExportHtmlClicked if self.is_editing() => {
                vec![Effect::Download(self.export_html())]
            }
            Event::ExportJsonClicked if self.is_editing() => match self.export_json() {
                Ok(download) => vec![Effect::Download(download)],
                Err(e) => {
                    log::warn!("JSON export failed: {e}");
                    Vec::new()
                }
            },
            Event::Scrolled(offset) => {
                let compact = offset > HEADER_SCROLL_THRESHOLD;
                if compact == self.header_compact {
                    return Vec::new();
                }
                self.header_compact = compact;
                vec![Effect::HeaderCompact(compact)]
            }
            Event::DropZoneDragOver
            | Event::BrowseClicked
            | Event::ExportHtmlClicked
            | Event::ExportJsonClicked => Vec::new(),
        }
    }

    /// Files released over the drop zone.
    pub fn drop_files(&mut self, files: Vec<Box<dyn FileSource>>) -> Vec<Effect> {
        let mut effects = self.highlight_effect(|zone| zone.drop_files());
        effects.extend(self.submit(files));
        effects
    }

    /// Files chosen through the file picker.
    pub fn select_files(&mut self, files: Vec<Box<dyn FileSource>>) -> Vec<Effect> {
        self.submit(files)
    }

    /// Apply finished reads to the gallery, in completion order.
    ///
    /// With `block = false` only reads that already finished are applied;
    /// with `block = true` this waits until nothing is in flight.
    pub fn pump_ingest(&mut self, block: bool) -> Vec<Effect> {
        let mut effects = Vec::new();
        while let Some(completion) = self.ingestor.next_completion(block) {
            effects.extend(self.apply_completion(completion));
        }
        if self.ingestor.in_flight() == 0 {
            self.pending.clear();
        }
        effects
    }

    /// Cancel every read that has not been handed back yet. Reads that
    /// already finished still arrive on the next pump.
    pub fn cancel_pending_reads(&mut self) -> usize {
        let cancelled = self.pending.iter().filter(|t| !t.is_cancelled()).count();
        for task in &self.pending {
            task.cancel();
        }
        log::debug!("cancelled {} pending reads", cancelled);
        cancelled
    }

    /// Empty the gallery if `confirm` (shown the item count) agrees.
    /// Declining leaves everything untouched.
    pub fn clear(&mut self, confirm: impl FnOnce(usize) -> bool) -> Vec<Effect> {
        if !self.is_editing() {
            return Vec::new();
        }
        if !confirm(self.gallery.len()) {
            log::debug!("clear declined");
            return Vec::new();
        }
        let mut effects = Vec::new();
        if self.lightbox.force_close() {
            effects.push(Effect::OverlayClosed(Dismissal::OverlayClick));
        }
        for id in self.gallery.ids().collect::<Vec<_>>() {
            self.engine.unwire(id);
        }
        let removed = self.gallery.clear();
        effects.push(Effect::GalleryCleared(removed));
        effects
    }

    pub fn export_html(&self) -> Download {
        export::export_html(
            &self.gallery,
            &self.config.gallery.caption_prefix,
            &self.config.export,
        )
    }

    pub fn export_json(&self) -> Result<Download, ExportError> {
        export::export_json(
            &self.gallery,
            &self.config.gallery.caption_prefix,
            &self.config.export,
        )
    }

    fn activate_image(&mut self, id: ItemId) -> Vec<Effect> {
        // The click is consumed here and never reaches the drag engine.
        let Some(index) = self.gallery.index_of(id) else {
            return Vec::new();
        };
        let item = &self.gallery.items()[index];
        let caption = item.caption(index, &self.config.gallery.caption_prefix);
        match self.lightbox.activate(item, caption) {
            Activation::Opened(overlay) => vec![Effect::OverlayOpened(overlay)],
            Activation::AlreadyOpen => Vec::new(),
        }
    }

    fn toggle_editor(&mut self) -> Vec<Effect> {
        let change = self.editor.toggle(&mut self.engine, &self.gallery);
        let mut effects = vec![
            Effect::EditorPanelVisible(change.editing),
            Effect::ToggleLabel(change.toggle_label),
        ];
        effects.extend(change.wired.into_iter().map(|id| Effect::Draggable(id, true)));
        effects.extend(change.drag_cancelled.map(Effect::DraggingCleared));
        effects.extend(change.unwired.into_iter().map(|id| Effect::Draggable(id, false)));
        if !change.editing && self.drop_zone.drag_leave() {
            effects.push(Effect::DropZoneHighlighted(false));
        }
        effects
    }

    fn highlight_effect(&mut self, f: impl FnOnce(&mut DropZone) -> bool) -> Vec<Effect> {
        if f(&mut self.drop_zone) {
            vec![Effect::DropZoneHighlighted(self.drop_zone.is_highlighted())]
        } else {
            Vec::new()
        }
    }

    fn submit(&mut self, files: Vec<Box<dyn FileSource>>) -> Vec<Effect> {
        if !self.is_editing() {
            log::debug!("ignoring {} files outside edit mode", files.len());
            return Vec::new();
        }
        let submission = self.ingestor.submit(files);
        self.stats.skipped += submission.skipped.len();
        log::debug!(
            "submitted {} reads, skipped {}",
            submission.tasks.len(),
            submission.skipped.len()
        );
        self.pending.extend(submission.tasks);
        Vec::new()
    }

    fn apply_completion(&mut self, completion: Completion) -> Vec<Effect> {
        match completion {
            Ok(file) => {
                let id = self.gallery.push(file.into_new_item());
                self.stats.appended += 1;
                let mut effects = vec![Effect::ItemAppended(id)];
                if self.engine.wire(id) {
                    effects.push(Effect::Draggable(id, true));
                }
                effects
            }
            Err(IngestError::Cancelled(name)) => {
                log::debug!("dropped cancelled read of {name}");
                Vec::new()
            }
            Err(e) => {
                self.stats.failed += 1;
                log::warn!("{e}");
                Vec::new()
            }
        }
    }
}
