//! Common Utilities Module
//!
//! Small path helpers shared by the scanner and the cleanup code.

use std::path::{Path, PathBuf};

/// Lowercase extension of `path`, or an empty string.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use album_utils::common_utils::get_extension_lowercase;
///
/// assert_eq!(get_extension_lowercase(Path::new("01 Intro.FLAC")), "flac");
/// assert_eq!(get_extension_lowercase(Path::new("noext")), "");
/// ```
pub fn get_extension_lowercase(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Case-insensitive extension test; `extensions` are lowercase, without dots.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use album_utils::common_utils::has_extension;
///
/// let extensions = &["flac".to_string()];
/// assert!(has_extension(Path::new("track.Flac"), extensions));
/// assert!(!has_extension(Path::new("track.opus"), extensions));
/// ```
pub fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    let ext = get_extension_lowercase(path);
    !ext.is_empty() && extensions.iter().any(|e| e.as_ref() == ext)
}

/// `dir/<stem>.<extension>` for a file name inside `dir`.
///
/// Only the last extension is replaced, so `a.b.flac` becomes `a.b.opus`.
pub fn sibling_with_extension(dir: &Path, file_name: &str, extension: &str) -> PathBuf {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };
    dir.join(format!("{}.{}", stem, extension))
}

/// `dir/<prefix><file name>`, e.g. the `._track.flac` resource-fork file.
pub fn prefixed_sibling(file: &Path, prefix: &str) -> Option<PathBuf> {
    let name = file.file_name()?.to_string_lossy();
    let sidecar = format!("{}{}", prefix, name);
    Some(match file.parent() {
        Some(parent) => parent.join(sidecar),
        None => PathBuf::from(sidecar),
    })
}
