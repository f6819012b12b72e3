//! Unified Error Handler Module
//!
//! ## Error categories
//! - Recoverable: report the offending item and continue
//! - Fatal: propagated to `main`, which reports it and exits non-zero
//! - Optional: best-effort operation failed, log and continue
//!
//! `report_recoverable()` prints a contained error to stderr and the log.
//! `report_error()` prints the error chain to stderr and the log.
//! `install_panic_handler()` records panics before the default hook runs.

use std::fmt;
use std::panic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Recoverable,
    Fatal,
    Optional,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Recoverable => write!(f, "RECOVERABLE"),
            ErrorCategory::Fatal => write!(f, "FATAL"),
            ErrorCategory::Optional => write!(f, "OPTIONAL"),
        }
    }
}

/// Report an error that only affects one item; the caller carries on.
pub fn report_recoverable<E: std::error::Error + ?Sized>(
    context: &str,
    error: &E,
    suggestion: Option<&str>,
) {
    eprintln!("⚠️  {}: {}", context, error);
    if let Some(s) = suggestion {
        eprintln!("   → {}", s);
    }
    tracing::warn!(
        category = %ErrorCategory::Recoverable,
        context,
        error = %error,
        "Recoverable error"
    );
}

/// Print an error and its `source()` chain to stderr and the log.
pub fn report_error<E: std::error::Error + ?Sized>(error: &E) {
    eprintln!("❌ Error: {}", error);
    tracing::error!("Error occurred: {}", error);

    let mut source = error.source();
    let mut level = 1;
    while let Some(err) = source {
        eprintln!("   {}. Caused by: {}", level, err);
        tracing::error!("  Caused by (level {}): {}", level, err);
        source = err.source();
        level += 1;
    }
}

pub fn install_panic_handler() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let payload = panic_info.payload();
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic payload".to_string()
        };

        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "Unknown location".to_string());

        tracing::error!("PANIC: {} at {}", message, location);

        default_hook(panic_info);
    }));
}
