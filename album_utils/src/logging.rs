//! Logging Module
//!
//! tracing-based logging shared by the converter binaries:
//! - log file in the system temp directory, rotated daily
//! - only the newest N log files are kept
//! - stderr only shows warnings so it does not garble interactive prompts
//! - structured records for external encoder invocations
//!
//! # Examples
//!
//! ```no_run
//! use album_utils::logging::{LogConfig, init_logging};
//! use tracing::info;
//!
//! init_logging("flac_opus", LogConfig::default()).expect("Failed to initialize logging");
//! info!(album = "Artist/Album", "Album processed");
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    filter::filter_fn, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Target of external tool records. These go to the log file only; the
/// caller already reports the failed file on the console.
pub const EXTERNAL_TOOL_TARGET: &str = "album_utils::external_tool";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory for log files (system temp dir by default)
    pub log_dir: PathBuf,
    /// Number of log files to keep, default 5
    pub max_files: usize,
    /// File log level, default Info
    pub level: Level,
    /// Minimum level echoed to stderr, default Warn
    pub stderr_level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: std::env::temp_dir(),
            max_files: 5,
            level: Level::INFO,
            stderr_level: Level::WARN,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.log_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_stderr_level(mut self, level: Level) -> Self {
        self.stderr_level = level;
        self
    }
}

/// Build the default filter directive: the program crate plus this crate.
fn default_directive(program_name: &str, level: Level) -> String {
    format!("{}={},album_utils={}", program_name, level, level)
}

/// Whether a record is echoed to stderr.
fn stderr_visible(target: &str, level: &Level, min_level: Level) -> bool {
    *level <= min_level && target != EXTERNAL_TOOL_TARGET
}

/// Initialise the global subscriber.
///
/// The log file is named `{program_name}.log` (plus the daily suffix added by
/// `tracing-appender`). `RUST_LOG` overrides the configured level.
///
/// May only be called once per process.
pub fn init_logging(program_name: &str, config: LogConfig) -> Result<()> {
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

    let log_file_name = format!("{}.log", program_name);
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(log_file_name.as_str())
        .build(&config.log_dir)
        .with_context(|| format!("Failed to open log file in {:?}", config.log_dir))?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(program_name, config.level)));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    let stderr_level = config.stderr_level;
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_line_number(false)
        .with_filter(filter_fn(move |meta| {
            stderr_visible(meta.target(), meta.level(), stderr_level)
        }));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Logging already initialized")?;

    tracing::info!(
        program = program_name,
        log_dir = ?config.log_dir,
        log_file = %log_file_name,
        max_files = config.max_files,
        level = ?config.level,
        "Logging system initialized"
    );

    cleanup_old_logs(&config.log_dir, program_name, config.max_files)?;

    Ok(())
}

/// Delete all but the newest `max_files` log files belonging to `program_name`.
fn cleanup_old_logs(log_dir: &Path, program_name: &str, max_files: usize) -> Result<()> {
    use std::fs;

    let entries = fs::read_dir(log_dir)
        .with_context(|| format!("Failed to read log directory: {:?}", log_dir))?;

    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let Some(file_name) = path.file_name() else {
            continue;
        };
        let file_name_str = file_name.to_string_lossy();
        if file_name_str.starts_with(program_name) && file_name_str.contains(".log") {
            if let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) {
                log_files.push((path, modified));
            }
        }
    }

    if log_files.len() > max_files {
        log_files.sort_by(|a, b| b.1.cmp(&a.1));

        for (path, _) in log_files.iter().skip(max_files) {
            if let Err(e) = fs::remove_file(path) {
                tracing::warn!(path = ?path, error = %e, "Failed to remove old log file");
            } else {
                tracing::debug!(path = ?path, "Removed old log file");
            }
        }
    }

    Ok(())
}

/// Record one external tool invocation (encoder, probe).
pub fn log_external_tool(
    tool_name: &str,
    args: &[String],
    output: &str,
    exit_code: Option<i32>,
    duration: Duration,
) {
    let command = format!("{} {}", tool_name, args.join(" "));

    match exit_code {
        Some(0) => {
            tracing::info!(
                target: EXTERNAL_TOOL_TARGET,
                tool = tool_name,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                exit_code = 0,
                "External tool completed successfully"
            );
            tracing::debug!(target: EXTERNAL_TOOL_TARGET, tool = tool_name, output = %output, "External tool output");
        }
        Some(code) => {
            tracing::error!(
                target: EXTERNAL_TOOL_TARGET,
                tool = tool_name,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                exit_code = code,
                output = %output,
                "External tool failed"
            );
        }
        None => {
            tracing::error!(
                target: EXTERNAL_TOOL_TARGET,
                tool = tool_name,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                output = %output,
                "External tool terminated without exit code"
            );
        }
    }
}

/// Merge captured stdout/stderr into one string for the log.
pub fn combine_output(stdout: &str, stderr: &str) -> String {
    if !stdout.is_empty() && !stderr.is_empty() {
        format!("STDOUT:\n{}\n\nSTDERR:\n{}", stdout, stderr)
    } else if !stdout.is_empty() {
        stdout.to_string()
    } else {
        stderr.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.max_files, 5);
        assert_eq!(config.level, Level::INFO);
        assert_eq!(config.stderr_level, Level::WARN);
    }

    #[test]
    fn test_log_config_builder() {
        let temp_dir = TempDir::new().unwrap();
        let config = LogConfig::new()
            .with_log_dir(temp_dir.path())
            .with_max_files(3)
            .with_level(Level::DEBUG)
            .with_stderr_level(Level::ERROR);

        assert_eq!(config.log_dir, temp_dir.path());
        assert_eq!(config.max_files, 3);
        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.stderr_level, Level::ERROR);
    }

    #[test]
    fn test_default_directive_covers_both_crates() {
        let directive = default_directive("flac_opus", Level::DEBUG);
        assert_eq!(directive, "flac_opus=DEBUG,album_utils=DEBUG");
    }

    #[test]
    fn test_stderr_shows_warnings_but_not_tool_records() {
        assert!(stderr_visible("flac_opus::cleanup", &Level::WARN, Level::WARN));
        assert!(stderr_visible("flac_opus", &Level::ERROR, Level::WARN));
        assert!(!stderr_visible("flac_opus", &Level::INFO, Level::WARN));
        assert!(!stderr_visible(EXTERNAL_TOOL_TARGET, &Level::ERROR, Level::WARN));
    }

    #[test]
    fn test_unusable_log_dir_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let not_a_dir = temp_dir.path().join("taken");
        fs::write(&not_a_dir, "file").unwrap();

        let result = init_logging("flac_opus", LogConfig::new().with_log_dir(&not_a_dir));
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("Failed to create log directory"), "{}", message);
    }

    #[test]
    fn test_cleanup_old_logs() {
        let temp_dir = TempDir::new().unwrap();
        let program_name = "test_program";

        for i in 0..10 {
            let file_path = temp_dir.path().join(format!("{}.log.{}", program_name, i));
            fs::write(&file_path, format!("log content {}", i)).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        fs::write(temp_dir.path().join("unrelated.txt"), "keep").unwrap();

        cleanup_old_logs(temp_dir.path(), program_name, 3).unwrap();

        let remaining: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(program_name))
            .collect();

        assert_eq!(remaining.len(), 3);
        assert!(temp_dir.path().join("unrelated.txt").exists());
    }

    #[test]
    fn test_combine_output() {
        assert_eq!(combine_output("out", ""), "out");
        assert_eq!(combine_output("", "err"), "err");
        assert!(combine_output("out", "err").contains("STDERR:\nerr"));
    }

    #[test]
    fn test_log_external_tool_accepts_all_exit_kinds() {
        let args = vec!["--bitrate".to_string(), "160k".to_string()];
        log_external_tool("opusenc", &args, "", Some(0), Duration::from_millis(5));
        log_external_tool("opusenc", &args, "boom", Some(1), Duration::from_millis(5));
        log_external_tool("opusenc", &args, "", None, Duration::from_millis(5));
    }
}
