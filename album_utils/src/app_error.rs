//! AppError - the converter's error taxonomy
//!
//! Only `ScanError` and `EncoderUnavailable` are fatal; every other kind is
//! contained where it happens and reported with the offending item.

use crate::error_handler::ErrorCategory;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Cannot scan {}: {reason}", path.display())]
    ScanError { path: PathBuf, reason: String },

    #[error("Encoder unavailable: {tool} ({reason})")]
    EncoderUnavailable { tool: String, reason: String },

    #[error("Invalid selection '{token}': {reason}")]
    ParseError { token: String, reason: String },

    #[error("Invalid selections: {}", format_indices(invalid))]
    ValidationError { invalid: Vec<usize> },

    #[error("Conversion failed for {}{}: {detail}", file.display(), format_exit_code(*exit_code))]
    ConversionFailure {
        file: PathBuf,
        exit_code: Option<i32>,
        detail: String,
    },

    #[error("Error deleting {}: {source}", path.display())]
    DeletionFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_exit_code(code: Option<i32>) -> String {
    code.map(|c| format!(" (exit code: {})", c))
        .unwrap_or_default()
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::ScanError { .. } | AppError::EncoderUnavailable { .. } => {
                ErrorCategory::Fatal
            }
            AppError::ParseError { .. }
            | AppError::ValidationError { .. }
            | AppError::ConversionFailure { .. } => ErrorCategory::Recoverable,
            AppError::DeletionFailure { .. } => ErrorCategory::Optional,
            AppError::Io(_) => ErrorCategory::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Fatal
    }

    /// Message shown to the operator, with install hints where they help.
    pub fn user_message(&self) -> String {
        match self {
            AppError::EncoderUnavailable { tool, .. } => format!(
                "❌ Error: {} not found. Please install opus-tools:\n\
                 \x20 macOS: brew install opus-tools\n\
                 \x20 Ubuntu/Debian: sudo apt install opus-tools\n\
                 \x20 Other: Check your package manager or download from opus-codec.org",
                tool
            ),
            other => format!("❌ {}", other),
        }
    }

    pub fn scan(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        AppError::ScanError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn parse(token: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::ParseError {
            token: token.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_kinds() {
        assert!(AppError::scan("/music", "missing").is_fatal());
        assert!(AppError::EncoderUnavailable {
            tool: "opusenc".to_string(),
            reason: "not on PATH".to_string(),
        }
        .is_fatal());
    }

    #[test]
    fn test_recoverable_kinds() {
        assert_eq!(
            AppError::parse("x", "not a number").category(),
            ErrorCategory::Recoverable
        );
        assert_eq!(
            AppError::ValidationError { invalid: vec![0, 6] }.category(),
            ErrorCategory::Recoverable
        );
        let failure = AppError::ConversionFailure {
            file: PathBuf::from("01.flac"),
            exit_code: Some(1),
            detail: "bad header".to_string(),
        };
        assert_eq!(failure.category(), ErrorCategory::Recoverable);
    }

    #[test]
    fn test_deletion_failure_is_optional() {
        let err = AppError::DeletionFailure {
            path: PathBuf::from("/music/a/01.flac"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.category(), ErrorCategory::Optional);
        assert!(err.to_string().contains("01.flac"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_validation_message_lists_indices() {
        let err = AppError::ValidationError { invalid: vec![0, 6] };
        assert_eq!(err.to_string(), "Invalid selections: 0, 6");
    }

    #[test]
    fn test_conversion_failure_message() {
        let err = AppError::ConversionFailure {
            file: PathBuf::from("01.flac"),
            exit_code: Some(2),
            detail: "bad header".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Conversion failed for 01.flac (exit code: 2): bad header"
        );

        let err = AppError::ConversionFailure {
            file: PathBuf::from("01.flac"),
            exit_code: None,
            detail: "killed".to_string(),
        };
        assert_eq!(err.to_string(), "Conversion failed for 01.flac: killed");
    }

    #[test]
    fn test_encoder_unavailable_user_message_has_hints() {
        let err = AppError::EncoderUnavailable {
            tool: "opusenc".to_string(),
            reason: "not on PATH".to_string(),
        };
        let msg = err.user_message();
        assert!(msg.contains("opusenc not found"));
        assert!(msg.contains("brew install opus-tools"));
        assert!(msg.contains("apt install opus-tools"));
    }

    #[test]
    fn test_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let app_error: AppError = io_error.into();
        assert!(matches!(app_error, AppError::Io(_)));
    }
}
