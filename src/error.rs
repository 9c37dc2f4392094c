use std::io;
use thiserror::Error;

/// Failure kinds surfaced by the roster/attendance core. The IPC layer maps
/// each variant to a wire error code; nothing here is swallowed or retried.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{kind} already exists: {key}")]
    Duplicate { kind: &'static str, key: String },
    #[error("unknown section: {0}")]
    UnknownSection(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("teacher {teacher} is not authorized for section {section}")]
    Authorization { teacher: String, section: String },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CoreError {
    /// Stable code used both on the wire and in tests.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Duplicate { .. } => "duplicate",
            CoreError::UnknownSection(_) => "unknown_section",
            CoreError::NotFound(_) => "not_found",
            CoreError::Authorization { .. } => "not_authorized",
            CoreError::Validation(_) => "validation_failed",
            CoreError::Storage(_) | CoreError::Io(_) => "storage_failed",
        }
    }
}
