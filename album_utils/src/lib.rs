//! Shared Utilities for the flac-opus album converter
//!
//! - Logging to a rotating file plus warnings on stderr
//! - Error taxonomy (`AppError`) and error reporting
//! - Batch counters and the end-of-pass summary report
//! - Progress bars, byte/duration formatting, disk space
//! - Operator prompts and Ctrl-C handling

pub mod app_error;
pub mod batch;
pub mod common_utils;
pub mod disk_space;
pub mod error_handler;
pub mod interrupt;
pub mod logging;
pub mod progress;
pub mod prompt;
pub mod report;

pub use app_error::AppError;
pub use batch::BatchResult;
pub use common_utils::{has_extension, prefixed_sibling, sibling_with_extension};
pub use disk_space::{disk_usage, display_disk_space, DiskUsage};
pub use error_handler::{report_error, report_recoverable, ErrorCategory};
pub use progress::{create_progress_bar, format_bytes, format_duration};
pub use prompt::{is_negative, ConsolePrompter, Prompter, ScriptedPrompter};
pub use report::{print_banner, print_summary_report};
