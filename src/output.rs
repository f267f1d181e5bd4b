//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each gallery item is
//! shown by its position and caption, with the image source as secondary
//! context on an indented `Source:` line. Items without alt text are shown
//! by file name in parentheses: the file name *is* the identity there.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! Gallery (3 images)
//! 001 Dawn
//!     Source: images/01.jpg
//! 002 (02.jpg)
//! 003 sunset.png
//!     Source: data:image/png (2.00 KB)
//! ```
//!
//! ## Arrange
//!
//! ```text
//! Edit mode on
//! Imported 2 files (1 skipped, 0 failed)
//! Moved 004 → 002 (04.jpg)
//! Exported gallery.html → out/gallery.html
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::arrange::StepReport;
use crate::gallery::{GalleryContainer, GalleryItem, ItemId};
use crate::naming::file_name;
use crate::page::HostElements;
use crate::session::IngestStats;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Item header: alt text when present, file name in parens otherwise.
///
/// ```text
/// 001 The Sunset
/// 002 (02.jpg)
/// ```
fn item_line(index: usize, item: &GalleryItem) -> String {
    match item.alt_text.as_deref() {
        Some(alt) if !alt.is_empty() => format!("{} {}", format_index(index), alt),
        _ => format!("{} ({})", format_index(index), short_source(item)),
    }
}

/// Inline data URIs are summarized by media type and size.
fn source_display(item: &GalleryItem) -> String {
    match item.source.strip_prefix("data:") {
        Some(rest) => {
            let media_type = rest.split([';', ',']).next().unwrap_or_default();
            match &item.size_label {
                Some(size) => format!("data:{} ({})", media_type, size),
                None => format!("data:{}", media_type),
            }
        }
        None => item.source.clone(),
    }
}

fn short_source(item: &GalleryItem) -> String {
    if item.source.starts_with("data:") {
        source_display(item)
    } else {
        file_name(&item.source).to_string()
    }
}

// ============================================================================
// List
// ============================================================================

/// Format the gallery in display order.
pub fn format_gallery(gallery: &GalleryContainer) -> Vec<String> {
    let mut lines = vec![format!("Gallery ({} images)", gallery.len())];
    for (i, item) in gallery.iter().enumerate() {
        lines.push(item_line(i + 1, item));
        if item.alt_text.as_deref().is_some_and(|a| !a.is_empty()) {
            lines.push(format!("{}Source: {}", indent(1), source_display(item)));
        }
    }
    lines
}

pub fn print_gallery(gallery: &GalleryContainer) {
    for line in format_gallery(gallery) {
        println!("{}", line);
    }
}

// ============================================================================
// Arrange
// ============================================================================

pub fn format_mode(editing: bool) -> String {
    format!("Edit mode {}", if editing { "on" } else { "off" })
}

pub fn format_import(stats: &IngestStats) -> String {
    let files = if stats.appended == 1 { "file" } else { "files" };
    format!(
        "Imported {} {} ({} skipped, {} failed)",
        stats.appended, files, stats.skipped, stats.failed
    )
}

/// Format a completed move using 1-based positions.
pub fn format_move(gallery: &GalleryContainer, item: ItemId, from: usize, to: usize) -> String {
    let label = gallery
        .get(item)
        .map(|i| match i.alt_text.as_deref() {
            Some(alt) if !alt.is_empty() => alt.to_string(),
            _ => short_source(i),
        })
        .unwrap_or_else(|| item.to_string());
    format!(
        "Moved {} → {} ({})",
        format_index(from + 1),
        format_index(to + 1),
        label
    )
}

pub fn format_clear(removed: usize) -> String {
    format!("Cleared {} images", removed)
}

/// One line per replayed step.
pub fn format_step(gallery: &GalleryContainer, report: &StepReport) -> String {
    match report {
        StepReport::Moved { item, from, to } => format_move(gallery, *item, *from, *to),
        StepReport::NotMoved => "Move ignored (edit mode off or dropped onto itself)".to_string(),
        StepReport::Imported(stats) => format_import(stats),
        StepReport::ImportIgnored => "Import ignored (edit mode off)".to_string(),
        StepReport::Toggled { editing } => format_mode(*editing),
        StepReport::Cleared(removed) => format_clear(*removed),
        StepReport::ClearDeclined => "Clear declined".to_string(),
    }
}

pub fn format_export(filename: &str, path: &Path) -> String {
    format!("Exported {} → {}", filename, path.display())
}

// ============================================================================
// Render / check
// ============================================================================

pub fn format_render(gallery: &GalleryContainer, path: &Path, editing: bool) -> Vec<String> {
    let mode = if editing { " (edit mode)" } else { "" };
    vec![format!(
        "Rendered {} images{} → {}",
        gallery.len(),
        mode,
        path.display()
    )]
}

pub fn format_host_check(path: &Path, host: &HostElements) -> Vec<String> {
    let mut lines = vec![format!("{}: all required elements present", path.display())];
    if !host.has_header {
        lines.push(format!("{}no #site-header (scroll styling disabled)", indent(1)));
    }
    lines
}
