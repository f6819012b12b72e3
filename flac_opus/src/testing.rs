//! In-process encoder double for tests.
//!
//! ```rust,ignore
//! use flac_opus::testing::FakeEncoder;
//!
//! let encoder = FakeEncoder::new().failing(["02.flac"]);
//! // ... run an album ...
//! assert_eq!(encoder.calls(), 3);
//! ```

use crate::encoder::Encoder;
use album_utils::AppError;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Behaviour is chosen per source file name.
///
/// - default: writes the target and succeeds
/// - `failing`: writes a partial target, then fails with exit code 1
/// - `panicking`: panics mid-conversion
/// - `silent`: reports success without writing anything
#[derive(Debug, Default)]
pub struct FakeEncoder {
    failing: HashSet<String>,
    panicking: HashSet<String>,
    silent: HashSet<String>,
    unavailable: bool,
    calls: AtomicUsize,
    converted: Mutex<Vec<PathBuf>>,
}

fn names<I, S>(files: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    files.into_iter().map(Into::into).collect()
}

impl FakeEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing = names(files);
        self
    }

    pub fn panicking<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.panicking = names(files);
        self
    }

    pub fn silent<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.silent = names(files);
        self
    }

    /// Make `probe` fail.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Number of `convert` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Sources successfully converted, in completion order.
    pub fn converted(&self) -> Vec<PathBuf> {
        self.converted
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

impl Encoder for FakeEncoder {
    fn name(&self) -> String {
        "fake-opusenc".to_string()
    }

    fn probe(&self) -> Result<String, AppError> {
        if self.unavailable {
            return Err(AppError::EncoderUnavailable {
                tool: self.name(),
                reason: "not installed".to_string(),
            });
        }
        Ok("fake-opusenc".to_string())
    }

    fn convert(&self, source: &Path, dest: &Path) -> Result<(), AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if self.panicking.contains(&file_name) {
            panic!("fake encoder crashed on {}", file_name);
        }

        let failure = |detail: String| AppError::ConversionFailure {
            file: source.to_path_buf(),
            exit_code: Some(1),
            detail,
        };

        if self.failing.contains(&file_name) {
            fs::write(dest, b"OggS-partial").map_err(|e| failure(e.to_string()))?;
            return Err(failure("Error: corrupt FLAC stream".to_string()));
        }

        if !self.silent.contains(&file_name) {
            fs::write(dest, b"OggS").map_err(|e| failure(e.to_string()))?;
            if let Ok(mut converted) = self.converted.lock() {
                converted.push(source.to_path_buf());
            }
        }
        Ok(())
    }
}
