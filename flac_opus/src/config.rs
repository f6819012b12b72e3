//! Converter configuration, fixed for the whole run.

use std::path::{Path, PathBuf};

pub const DEFAULT_SOURCE_EXTENSION: &str = "flac";
pub const TARGET_EXTENSION: &str = "opus";
pub const DEFAULT_BITRATE: &str = "160k";
pub const DEFAULT_ENCODER: &str = "opusenc";
pub const DEFAULT_WORKERS: usize = 4;
/// macOS AppleDouble resource files: `._<name>` next to `<name>`.
pub const SIDECAR_PREFIX: &str = "._";

#[derive(Debug, Clone)]
pub struct ConverterConfig {
    pub music_root: PathBuf,
    /// Lowercase, no leading dot.
    pub source_extensions: Vec<String>,
    pub target_extension: String,
    pub bitrate: String,
    pub encoder: PathBuf,
    pub workers: usize,
    pub sidecar_prefix: String,
    pub show_progress: bool,
}

impl ConverterConfig {
    pub fn new(music_root: impl Into<PathBuf>) -> Self {
        Self {
            music_root: music_root.into(),
            source_extensions: vec![DEFAULT_SOURCE_EXTENSION.to_string()],
            target_extension: TARGET_EXTENSION.to_string(),
            bitrate: DEFAULT_BITRATE.to_string(),
            encoder: PathBuf::from(DEFAULT_ENCODER),
            workers: DEFAULT_WORKERS,
            sidecar_prefix: SIDECAR_PREFIX.to_string(),
            show_progress: true,
        }
    }

    pub fn with_source_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let exts: Vec<String> = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        if !exts.is_empty() {
            self.source_extensions = exts;
        }
        self
    }

    pub fn with_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.bitrate = bitrate.into();
        self
    }

    pub fn with_encoder(mut self, encoder: impl Into<PathBuf>) -> Self {
        self.encoder = encoder.into();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Label used in listings, e.g. "FLAC".
    pub fn source_label(&self) -> String {
        self.source_extensions
            .iter()
            .map(|e| e.to_uppercase())
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn root(&self) -> &Path {
        &self.music_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConverterConfig::new("/music");
        assert_eq!(config.source_extensions, vec!["flac".to_string()]);
        assert_eq!(config.target_extension, "opus");
        assert_eq!(config.bitrate, "160k");
        assert_eq!(config.encoder, PathBuf::from("opusenc"));
        assert_eq!(config.workers, 4);
        assert_eq!(config.sidecar_prefix, "._");
        assert_eq!(config.source_label(), "FLAC");
    }

    #[test]
    fn test_extensions_are_normalized() {
        let config = ConverterConfig::new("/music").with_source_extensions([".FLAC", "wav", ""]);
        assert_eq!(config.source_extensions, vec!["flac", "wav"]);
        assert_eq!(config.source_label(), "FLAC/WAV");
    }

    #[test]
    fn test_empty_extension_list_keeps_default() {
        let config = ConverterConfig::new("/music").with_source_extensions(Vec::<String>::new());
        assert_eq!(config.source_extensions, vec!["flac"]);
    }

    #[test]
    fn test_workers_at_least_one() {
        assert_eq!(ConverterConfig::new("/m").with_workers(0).workers, 1);
        assert_eq!(ConverterConfig::new("/m").with_workers(8).workers, 8);
    }
}
