use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure surfaced by the export entry point.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Form not found: {0}")]
    NotFound(String),

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to encode {format} export: {message}")]
    EncodingFailure { format: String, message: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Who is responsible for an export failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Bad form id or format identifier. Not retried.
    Caller,
    /// Encoder rejected the data. Deterministic, so not retried either.
    Encoding,
    /// The storage collaborator failed.
    Storage,
}

impl ExportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::UnsupportedFormat(_) => ErrorKind::Caller,
            Self::EncodingFailure { .. } => ErrorKind::Encoding,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    pub fn is_caller_error(&self) -> bool {
        self.kind() == ErrorKind::Caller
    }

    /// Returns a user-facing message (hides internal details).
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => "Form not found".into(),
            Self::UnsupportedFormat(format) => format!("Unsupported format: {format}"),
            Self::EncodingFailure { format, .. } => {
                format!("Failed to export data as {format}")
            }
            Self::Storage(_) => "Failed to load form data".into(),
        }
    }
}
