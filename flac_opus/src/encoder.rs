//! External encoder gateway (`opusenc`).
//!
//! A failed conversion is an ordinary per-file result. Only the pre-flight
//! probe can stop the run.

use album_utils::logging::{combine_output, log_external_tool};
use album_utils::AppError;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use tracing::{debug, info};

/// Lines of encoder stderr kept in a failure detail.
const STDERR_TAIL_LINES: usize = 5;

pub trait Encoder: Send + Sync {
    /// Display name of the tool.
    fn name(&self) -> String;

    /// Check the encoder can be launched; returns its version banner.
    fn probe(&self) -> Result<String, AppError>;

    /// Encode `source` into `dest`, blocking until the encoder exits.
    fn convert(&self, source: &Path, dest: &Path) -> Result<(), AppError>;
}

#[derive(Debug, Clone)]
pub struct OpusEncoder {
    binary: PathBuf,
    bitrate: String,
}

impl OpusEncoder {
    pub fn new(binary: impl Into<PathBuf>, bitrate: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            bitrate: bitrate.into(),
        }
    }

    fn tool_name(&self) -> String {
        self.binary.to_string_lossy().to_string()
    }

    /// Command line as text, for the log.
    pub fn conversion_args(&self, source: &Path, dest: &Path) -> Vec<String> {
        vec![
            "--bitrate".to_string(),
            self.bitrate.clone(),
            source.to_string_lossy().to_string(),
            dest.to_string_lossy().to_string(),
        ]
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

impl Encoder for OpusEncoder {
    fn name(&self) -> String {
        self.tool_name()
    }

    fn probe(&self) -> Result<String, AppError> {
        let tool = self.tool_name();
        let unavailable = |reason: String| AppError::EncoderUnavailable {
            tool: tool.clone(),
            reason,
        };

        let resolved = which::which(&self.binary).map_err(|e| unavailable(e.to_string()))?;
        debug!(tool = %tool, path = %resolved.display(), "Encoder located");

        let output = Command::new(&resolved)
            .arg("--version")
            .output()
            .map_err(|e| unavailable(e.to_string()))?;

        if !output.status.success() {
            return Err(unavailable(format!(
                "--version exited with {:?}",
                output.status.code()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let banner = if stdout.trim().is_empty() { stderr } else { stdout };
        let version = banner
            .split_whitespace()
            .next()
            .unwrap_or(tool.as_str())
            .to_string();

        info!(tool = %tool, version = %version, "Encoder available");
        Ok(version)
    }

    fn convert(&self, source: &Path, dest: &Path) -> Result<(), AppError> {
        let tool = self.tool_name();
        let args = self.conversion_args(source, dest);
        let start = Instant::now();

        // Paths go to the child as `OsStr`; `args` is the lossy form for the log.
        let output = Command::new(&self.binary)
            .arg("--bitrate")
            .arg(&self.bitrate)
            .arg(source)
            .arg(dest)
            .output()
            .map_err(|e| AppError::ConversionFailure {
                file: source.to_path_buf(),
                exit_code: None,
                detail: format!("failed to launch {}: {}", tool, e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let exit_code = output.status.code();
        log_external_tool(
            &tool,
            &args,
            &combine_output(&stdout, &stderr),
            exit_code,
            start.elapsed(),
        );

        if output.status.success() {
            return Ok(());
        }

        let detail = match stderr_tail(&stderr) {
            tail if tail.is_empty() => "encoder exited unsuccessfully".to_string(),
            tail => tail,
        };
        Err(AppError::ConversionFailure {
            file: source.to_path_buf(),
            exit_code,
            detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_args() {
        let encoder = OpusEncoder::new("opusenc", "160k");
        let args = encoder.conversion_args(Path::new("/m/a/01.flac"), Path::new("/m/a/01.opus"));
        assert_eq!(args, vec!["--bitrate", "160k", "/m/a/01.flac", "/m/a/01.opus"]);
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let stderr = (1..=8).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        assert_eq!(stderr_tail(&stderr), "line 4\nline 5\nline 6\nline 7\nline 8");
        assert_eq!(stderr_tail("\n\n"), "");
    }

    #[test]
    fn test_probe_missing_binary_is_unavailable() {
        let encoder = OpusEncoder::new("definitely-not-an-encoder-xyz", "160k");
        let err = encoder.probe().unwrap_err();
        assert!(matches!(err, AppError::EncoderUnavailable { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_convert_missing_binary_is_per_file_failure() {
        let encoder = OpusEncoder::new("definitely-not-an-encoder-xyz", "160k");
        let err = encoder
            .convert(Path::new("/tmp/in.flac"), Path::new("/tmp/out.opus"))
            .unwrap_err();
        match err {
            AppError::ConversionFailure { exit_code, detail, .. } => {
                assert_eq!(exit_code, None);
                assert!(detail.contains("failed to launch"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[cfg(unix)]
    mod scripted {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        fn script(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake-opusenc");
            fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn test_probe_reports_first_word() {
            let temp = TempDir::new().unwrap();
            let bin = script(temp.path(), "echo 'opusenc opus-tools 0.2'");
            let version = OpusEncoder::new(bin, "160k").probe().unwrap();
            assert_eq!(version, "opusenc");
        }

        #[test]
        fn test_probe_failing_version_is_unavailable() {
            let temp = TempDir::new().unwrap();
            let bin = script(temp.path(), "exit 2");
            let err = OpusEncoder::new(bin, "160k").probe().unwrap_err();
            assert!(matches!(err, AppError::EncoderUnavailable { .. }));
        }

        #[test]
        fn test_convert_success_by_exit_status() {
            let temp = TempDir::new().unwrap();
            let bin = script(temp.path(), "cp \"$3\" \"$4\"");
            let source = temp.path().join("01.flac");
            let dest = temp.path().join("01.opus");
            fs::write(&source, b"flac").unwrap();

            OpusEncoder::new(bin, "160k").convert(&source, &dest).unwrap();
            assert_eq!(fs::read(&dest).unwrap(), b"flac");
        }

        #[test]
        fn test_convert_passes_non_utf8_paths_through() {
            use std::ffi::OsStr;
            use std::os::unix::ffi::OsStrExt;

            let temp = TempDir::new().unwrap();
            let bin = script(temp.path(), "cp \"$3\" \"$4\"");
            let album = temp.path().join(OsStr::from_bytes(b"alb\xff"));
            // Some filesystems reject names that are not valid UTF-8.
            if fs::create_dir(&album).is_err() {
                return;
            }
            let source = album.join("01.flac");
            let dest = album.join("01.opus");
            fs::write(&source, b"flac").unwrap();

            OpusEncoder::new(bin, "160k").convert(&source, &dest).unwrap();
            assert_eq!(fs::read(&dest).unwrap(), b"flac");
        }

        #[test]
        fn test_convert_nonzero_exit_carries_stderr() {
            let temp = TempDir::new().unwrap();
            let bin = script(temp.path(), "echo 'Error parsing input file' >&2\nexit 3");
            let err = OpusEncoder::new(bin, "160k")
                .convert(&temp.path().join("01.flac"), &temp.path().join("01.opus"))
                .unwrap_err();
            match err {
                AppError::ConversionFailure { exit_code, detail, .. } => {
                    assert_eq!(exit_code, Some(3));
                    assert_eq!(detail, "Error parsing input file");
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }
}
