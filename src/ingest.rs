//! File ingestion: local image files become new gallery items.
//!
//! Files arrive from the drop zone or the file picker as [`FileSource`]s.
//! Each one whose declared media type starts with `image/` is read on the
//! ingest thread pool and encoded as a `data:` URI. Everything else is
//! skipped without comment.
//!
//! ## Completion order
//!
//! Reads run independently. [`Ingestor::next_completion`] hands results back
//! in the order the reads *finish*, not the order they were submitted, and
//! the session appends items in that same order. Selecting `a.jpg, b.jpg`
//! may well produce `b.jpg, a.jpg` in the grid.
//!
//! ## Cancellation
//!
//! Every accepted file gets a [`ReadTask`] handle. Cancelling it before the
//! read starts skips the read; cancelling while it runs discards the result.
//! Either way the completion still arrives, as [`IngestError::Cancelled`], so
//! the in-flight count always drains to zero.

use crate::gallery::NewItem;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use thiserror::Error;
use walkdir::WalkDir;

/// Media types accepted by ingestion start with this prefix.
pub const IMAGE_TYPE_PREFIX: &str = "image/";

/// Declared type for local files whose extension is not a known image format.
const UNKNOWN_TYPE: &str = "application/octet-stream";

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("read of {0} was cancelled")]
    Cancelled(String),
    #[error("failed to start ingest workers: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Human-readable size: bytes below 1 KiB, then KiB, then MiB, two decimals.
///
/// ```
/// use gal_editor::ingest::format_size;
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(2048), "2.00 KB");
/// assert_eq!(format_size(3 * 1048576), "3.00 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    if bytes < KIB {
        format!("{} bytes", bytes)
    } else if bytes < MIB {
        format!("{:.2} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / MIB as f64)
    }
}

pub fn is_image_type(media_type: &str) -> bool {
    media_type.starts_with(IMAGE_TYPE_PREFIX)
}

/// Encode bytes as `data:<media_type>;base64,<payload>`.
pub fn data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
}

/// A file offered for ingestion: a name, a declared type, and a way to read it.
///
/// Implementations are moved onto a worker thread, hence `Send + 'static`.
pub trait FileSource: Send + 'static {
    fn name(&self) -> &str;

    /// Declared media type, e.g. `image/jpeg`. Not sniffed from content.
    fn media_type(&self) -> &str;

    /// Read the full content.
    fn read(&self) -> std::io::Result<Vec<u8>>;
}

/// A file on the local filesystem. The media type is declared from the
/// extension, the way a browser's file picker reports it.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
    media_type: String,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = mime_guess::from_path(&path)
            .first_raw()
            .unwrap_or(UNKNOWN_TYPE)
            .to_string();
        Self {
            path,
            name,
            media_type,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileSource for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn read(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}

/// A file already held in memory, e.g. the payload of a browser drop event.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }
}

impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn read(&self) -> std::io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

/// Expand a path into local files: a file is taken as-is, a directory is
/// walked recursively in file-name order. Hidden entries are skipped.
pub fn collect_files(path: &Path) -> Result<Vec<LocalFile>, IngestError> {
    if !path.is_dir() {
        // Surface a missing path now rather than as a failed read later.
        std::fs::metadata(path)?;
        return Ok(vec![LocalFile::new(path)]);
    }
    let mut files = Vec::new();
    let walker = WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
    for entry in walker {
        let entry = entry.map_err(|e| {
            IngestError::Io(
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
            )
        })?;
        if entry.file_type().is_file() {
            files.push(LocalFile::new(entry.into_path()));
        }
    }
    Ok(files)
}

/// Successful read of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedFile {
    pub name: String,
    pub media_type: String,
    pub size: u64,
    pub data_uri: String,
}

impl IngestedFile {
    pub fn size_label(&self) -> String {
        format_size(self.size)
    }

    /// The gallery item this file becomes: data URI source, file name caption.
    pub fn into_new_item(self) -> NewItem {
        let label = self.size_label();
        NewItem::new(self.data_uri)
            .with_alt(self.name)
            .with_size_label(label)
    }
}

/// Shared cancellation flag for one read.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handle to one submitted read.
#[derive(Debug, Clone)]
pub struct ReadTask {
    pub name: String,
    token: CancelToken,
}

impl ReadTask {
    pub fn cancel(&self) {
        log::debug!("cancelling read of {}", self.name);
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Outcome of handing a set of files to the ingestor.
#[derive(Debug, Default)]
pub struct Submission {
    /// Reads started, one per accepted image.
    pub tasks: Vec<ReadTask>,
    /// Names of files skipped because they are not images.
    pub skipped: Vec<String>,
}

pub type Completion = Result<IngestedFile, IngestError>;

/// Runs file reads on a dedicated rayon pool and collects their results.
pub struct Ingestor {
    pool: rayon::ThreadPool,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    in_flight: usize,
}

impl Ingestor {
    pub fn new(workers: usize) -> Result<Self, IngestError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("ingest-{i}"))
            .build()?;
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            pool,
            tx,
            rx,
            in_flight: 0,
        })
    }

    /// Start reading every image among `files`; skip the rest.
    pub fn submit(&mut self, files: Vec<Box<dyn FileSource>>) -> Submission {
        let mut submission = Submission::default();
        for file in files {
            if !is_image_type(file.media_type()) {
                log::debug!(
                    "skipping {} ({}): not an image",
                    file.name(),
                    file.media_type()
                );
                submission.skipped.push(file.name().to_string());
                continue;
            }
            let token = CancelToken::default();
            submission.tasks.push(ReadTask {
                name: file.name().to_string(),
                token: token.clone(),
            });
            let tx = self.tx.clone();
            self.in_flight += 1;
            self.pool.spawn(move || {
                let result = read_file(file.as_ref(), &token);
                // The receiver lives as long as the ingestor; a send error only
                // means the ingestor was dropped and nobody wants the result.
                let _ = tx.send(result);
            });
        }
        submission
    }

    /// Reads submitted but not yet handed back.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Next finished read, in completion order.
    ///
    /// With `block = false` returns `None` when nothing has finished yet;
    /// with `block = true` waits unless nothing is in flight.
    pub fn next_completion(&mut self, block: bool) -> Option<Completion> {
        if self.in_flight == 0 {
            return None;
        }
        let next = if block {
            self.rx.recv().ok()
        } else {
            self.rx.try_recv().ok()
        };
        if next.is_some() {
            self.in_flight -= 1;
        }
        next
    }
}

fn read_file(file: &dyn FileSource, token: &CancelToken) -> Completion {
    let name = file.name().to_string();
    if token.is_cancelled() {
        return Err(IngestError::Cancelled(name));
    }
    let bytes = file.read().map_err(|source| IngestError::Read {
        name: name.clone(),
        source,
    })?;
    if token.is_cancelled() {
        return Err(IngestError::Cancelled(name));
    }
    log::trace!("read {} ({} bytes)", name, bytes.len());
    Ok(IngestedFile {
        size: bytes.len() as u64,
        data_uri: data_uri(file.media_type(), &bytes),
        media_type: file.media_type().to_string(),
        name,
    })
}

/// The drop zone's highlight state.
///
/// Highlighted from drag-enter until the gesture leaves the zone or drops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DropZone {
    highlighted: bool,
}

impl DropZone {
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Returns `true` if the highlight changed.
    pub fn drag_over(&mut self) -> bool {
        !std::mem::replace(&mut self.highlighted, true)
    }

    /// Returns `true` if the highlight changed.
    pub fn drag_leave(&mut self) -> bool {
        std::mem::replace(&mut self.highlighted, false)
    }

    /// Dropping always ends the highlight.
    pub fn drop_files(&mut self) -> bool {
        self.drag_leave()
    }
}
