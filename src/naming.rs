//! Filename convention for convention-rendered galleries.
//!
//! Images live at `<path-prefix><NN>.<ext>` where `NN` is the 1-based index,
//! zero-padded to two digits:
//!
//! - `images/01.jpg`
//! - `images/02.jpg`
//! - ...
//! - `images/12.jpg`
//!
//! Indices above 99 are still formatted (`images/100.jpg`) but config
//! validation keeps `image_count` within the two-digit range.

/// Build the source path for a 1-based image index.
///
/// ```
/// use gal_editor::naming::image_path;
/// assert_eq!(image_path("images/", 3, "jpg"), "images/03.jpg");
/// ```
pub fn image_path(prefix: &str, index: usize, extension: &str) -> String {
    format!("{}{:02}.{}", prefix, index, extension.trim_start_matches('.'))
}

/// File name component of a path or URL, used when a caption is derived
/// from where an image came from.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
