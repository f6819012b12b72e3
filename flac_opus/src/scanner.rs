//! Album discovery.
//!
//! An album is any directory below the collection root that directly holds
//! at least one source file. Files are grouped by their immediate parent
//! only, so nested discs are albums of their own.

use crate::config::SIDECAR_PREFIX;
use album_utils::{has_extension, AppError};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Album {
    pub path: PathBuf,
    pub relative_path: String,
    /// Sorted file names, no directory part.
    pub source_files: Vec<String>,
    /// Every non-directory entry in the album directory.
    pub total_files: usize,
}

impl Album {
    pub fn source_count(&self) -> usize {
        self.source_files.len()
    }

    pub fn source_path(&self, file_name: &str) -> PathBuf {
        self.path.join(file_name)
    }
}

#[derive(Default)]
struct DirEntryGroup {
    sources: Vec<String>,
    total: usize,
}

/// Walk `root` and return its albums sorted by relative path.
///
/// The root itself is never an album. Any traversal error aborts the scan.
pub fn scan_albums<S: AsRef<str>>(root: &Path, extensions: &[S]) -> Result<Vec<Album>, AppError> {
    if !root.is_dir() {
        return Err(AppError::scan(root, "not an existing directory"));
    }

    info!(root = %root.display(), "Scanning for albums");

    let mut groups: HashMap<PathBuf, DirEntryGroup> = HashMap::new();

    // Depth 1 holds the root's own files and the top-level album dirs.
    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            AppError::scan(path, e.to_string())
        })?;

        if entry.file_type().is_dir() || entry.depth() < 2 {
            continue;
        }

        let Some(parent) = entry.path().parent() else {
            continue;
        };
        let group = groups.entry(parent.to_path_buf()).or_default();
        group.total += 1;

        if !has_extension(entry.path(), extensions) {
            continue;
        }
        match entry.file_name().to_str() {
            // AppleDouble sidecars carry the source extension but no audio.
            Some(name) if name.starts_with(SIDECAR_PREFIX) => {}
            Some(name) => group.sources.push(name.to_string()),
            None => warn!(
                file = %entry.path().display(),
                "Skipping source file with non-UTF-8 name"
            ),
        }
    }

    let mut albums: Vec<Album> = groups
        .into_iter()
        .filter(|(_, group)| !group.sources.is_empty())
        .filter_map(|(path, mut group)| {
            let relative_path = path.strip_prefix(root).ok()?.to_string_lossy().to_string();
            group.sources.sort();
            Some(Album {
                path,
                relative_path,
                source_files: group.sources,
                total_files: group.total,
            })
        })
        .collect();

    albums.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    debug!(count = albums.len(), "Scan complete");
    Ok(albums)
}

/// Numbered catalog listing.
pub fn display_albums(albums: &[Album], source_label: &str) {
    if albums.is_empty() {
        println!("No albums with {} files found!", source_label);
        return;
    }

    println!(
        "\nFound {} albums with {} files:\n",
        albums.len(),
        source_label
    );
    let header = format!("{} Files", source_label);
    println!("{:<4} {:<12} Album Path", "#", header);
    println!("{}", "-".repeat(80));

    for (i, album) in albums.iter().enumerate() {
        println!(
            "{:<4} {:<12} {}",
            i + 1,
            album.source_count(),
            album.relative_path
        );
    }
}
