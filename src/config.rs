//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. A config file is
//! optional and sparse: stock defaults are the base layer, and whatever the
//! file specifies is merged on top.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [gallery]
//! image_count = 12                    # Images rendered from the naming convention
//! path_prefix = "images/"             # Prefix before the two-digit index
//! extension = "jpg"                   # File extension after the index
//! caption_prefix = "Photography work" # Fallback caption: "<prefix> <rank>"
//!
//! [editor]
//! query_flag = "edit"                 # ?edit=true enters edit mode at load
//! banner = "EDITOR MODE"              # Banner text while editing
//!
//! [export]
//! html_filename = "gallery.html"
//! json_filename = "gallery.json"
//!
//! [ingest]
//! max_workers = 4                     # Parallel file readers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Largest count the two-digit naming convention can express.
pub const MAX_CONVENTION_COUNT: usize = 99;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Naming convention and captions for the rendered grid.
    pub gallery: GridConfig,
    /// Edit-mode activation and banner.
    pub editor: EditorConfig,
    /// Download filenames for exports.
    pub export: ExportConfig,
    /// File ingestion worker settings.
    pub ingest: IngestConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gallery.image_count > MAX_CONVENTION_COUNT {
            return Err(ConfigError::Validation(format!(
                "gallery.image_count must be at most {MAX_CONVENTION_COUNT}"
            )));
        }
        if self.gallery.extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::Validation(
                "gallery.extension must not be empty".into(),
            ));
        }
        if self.editor.query_flag.is_empty() {
            return Err(ConfigError::Validation(
                "editor.query_flag must not be empty".into(),
            ));
        }
        if self.export.html_filename.is_empty() || self.export.json_filename.is_empty() {
            return Err(ConfigError::Validation(
                "export filenames must not be empty".into(),
            ));
        }
        if self.ingest.max_workers == Some(0) {
            return Err(ConfigError::Validation(
                "ingest.max_workers must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Naming convention for the initial grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Number of images rendered from the convention.
    pub image_count: usize,
    /// Path prefix before the zero-padded index (e.g. `"images/"`).
    pub path_prefix: String,
    /// Extension after the index, without the dot.
    pub extension: String,
    /// Fallback caption prefix, rendered as `"<prefix> <rank>"`.
    pub caption_prefix: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            image_count: 12,
            path_prefix: "images/".to_string(),
            extension: "jpg".to_string(),
            caption_prefix: "Photography work".to_string(),
        }
    }
}

/// Edit-mode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Query parameter that, set to `true`, activates edit mode at load.
    pub query_flag: String,
    /// Banner text displayed while edit mode is on.
    pub banner: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            query_flag: "edit".to_string(),
            banner: "EDITOR MODE".to_string(),
        }
    }
}

/// Export download names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub html_filename: String,
    pub json_filename: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            html_filename: "gallery.html".to_string(),
            json_filename: "gallery.json".to_string(),
        }
    }
}

/// File ingestion settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// Maximum number of parallel file readers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,
}

/// Resolve the effective reader count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_workers(config: &IngestConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_workers.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(GalleryConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(dir)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    log::debug!("loaded config from {}", dir.display());
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# gal-editor configuration
# ========================
#
# Place this file as config.toml in the gallery directory (see --source).
# Every key is optional; anything left out keeps the value shown here.
# Unknown keys are rejected.

[gallery]
# How many images the grid renders from the naming convention.
# Image i (1-based) is loaded from <path_prefix><i, two digits>.<extension>,
# so the default grid is images/01.jpg .. images/12.jpg. At most 99.
image_count = 12
path_prefix = "images/"
extension = "jpg"
# Caption used when an image has none: "<caption_prefix> <rank>".
caption_prefix = "Photography work"

[editor]
# Opening the page with ?<query_flag>=true starts in edit mode.
query_flag = "edit"
# Banner shown in the corner while edit mode is on.
banner = "EDITOR MODE"

[export]
html_filename = "gallery.html"
json_filename = "gallery.json"

[ingest]
# Parallel file readers for imports. Omit to use every CPU core;
# larger values are clamped to the core count.
# max_workers = 4
"##
}
