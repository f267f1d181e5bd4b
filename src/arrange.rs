//! Scripted editing.
//!
//! The `arrange` command replays a list of steps against one
//! [`EditorSession`], the same way a user would drive the page: a move is a
//! full drag gesture, an import is a file-picker selection followed by
//! waiting for every read to land.
//!
//! ```text
//! move=4:2        drag the 4th item onto the 2nd (1-based)
//! import=shots/   read every file under shots/ (non-images skipped)
//! toggle          flip edit mode
//! clear           empty the gallery (asks first)
//! ```

use crate::gallery::ItemId;
use crate::ingest::{self, FileSource, IngestError};
use crate::session::{EditorSession, Effect, Event, IngestStats};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StepError {
    #[error("unrecognized step '{0}' (expected move=FROM:ONTO, import=PATH, toggle or clear)")]
    Unrecognized(String),
    #[error("invalid move '{0}': positions must be FROM:ONTO, both 1-based")]
    BadMove(String),
    #[error("position {position} is out of range (gallery holds {len} images)")]
    OutOfRange { position: usize, len: usize },
    #[error("import path does not exist: {0}")]
    MissingPath(PathBuf),
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// 1-based positions.
    Move { from: usize, onto: usize },
    Import(PathBuf),
    Toggle,
    Clear,
}

impl FromStr for Step {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some(("move", positions)) => {
                let bad = || StepError::BadMove(positions.to_string());
                let (from, onto) = positions.split_once(':').ok_or_else(bad)?;
                let from: usize = from.trim().parse().map_err(|_| bad())?;
                let onto: usize = onto.trim().parse().map_err(|_| bad())?;
                if from == 0 || onto == 0 {
                    return Err(bad());
                }
                Ok(Step::Move { from, onto })
            }
            Some(("import", path)) if !path.is_empty() => Ok(Step::Import(PathBuf::from(path))),
            None if s == "toggle" => Ok(Step::Toggle),
            None if s == "clear" => Ok(Step::Clear),
            _ => Err(StepError::Unrecognized(s.to_string())),
        }
    }
}

/// What a replayed step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepReport {
    /// 0-based positions, as reported by the drag engine.
    Moved {
        item: ItemId,
        from: usize,
        to: usize,
    },
    /// The gesture was a no-op (viewing mode, or dropped onto itself).
    NotMoved,
    Imported(IngestStats),
    /// Files are only accepted in edit mode.
    ImportIgnored,
    Toggled { editing: bool },
    Cleared(usize),
    ClearDeclined,
}

/// Replay one step. `confirm` is consulted for `clear` with the item count.
pub fn apply(
    session: &mut EditorSession,
    step: &Step,
    confirm: impl FnOnce(usize) -> bool,
) -> Result<StepReport, StepError> {
    match step {
        Step::Move { from, onto } => {
            let len = session.gallery().len();
            let id_at = |position: usize| {
                position
                    .checked_sub(1)
                    .and_then(|index| session.gallery().at(index))
                    .map(|item| item.id)
                    .ok_or(StepError::OutOfRange { position, len })
            };
            let dragged = id_at(*from)?;
            let target = id_at(*onto)?;
            session.handle(Event::DragStart(dragged));
            session.handle(Event::DragOver(target));
            let moved = session
                .handle(Event::Drop(target))
                .into_iter()
                .find_map(|e| match e {
                    Effect::ItemMoved { item, from, to } => {
                        Some(StepReport::Moved { item, from, to })
                    }
                    _ => None,
                });
            session.handle(Event::DragEnd(dragged));
            Ok(moved.unwrap_or(StepReport::NotMoved))
        }
        Step::Import(path) => {
            if !session.is_editing() {
                log::warn!("import of {} ignored outside edit mode", path.display());
                return Ok(StepReport::ImportIgnored);
            }
            let files = local_files(path)?;
            let before = session.ingest_stats();
            session.select_files(files);
            session.pump_ingest(true);
            let after = session.ingest_stats();
            Ok(StepReport::Imported(IngestStats {
                appended: after.appended - before.appended,
                skipped: after.skipped - before.skipped,
                failed: after.failed - before.failed,
            }))
        }
        Step::Toggle => {
            session.handle(Event::ToggleEditor);
            Ok(StepReport::Toggled {
                editing: session.is_editing(),
            })
        }
        Step::Clear => {
            let effects = session.clear(confirm);
            Ok(effects
                .into_iter()
                .find_map(|e| match e {
                    Effect::GalleryCleared(n) => Some(StepReport::Cleared(n)),
                    _ => None,
                })
                .unwrap_or(StepReport::ClearDeclined))
        }
    }
}

/// A single file, or every file under a directory in name order.
fn local_files(path: &Path) -> Result<Vec<Box<dyn FileSource>>, StepError> {
    if !path.exists() {
        return Err(StepError::MissingPath(path.to_path_buf()));
    }
    Ok(ingest::collect_files(path)?
        .into_iter()
        .map(|f| Box::new(f) as Box<dyn FileSource>)
        .collect())
}
