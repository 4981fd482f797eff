// src/core/store.rs

use crate::core::document::DocumentError;
use std::fmt;
use thiserror::Error;

/// The two record collections the tool manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Task,
    Profile,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Task => "Task",
            Self::Profile => "Profile",
        })
    }
}

/// Errors shared by the task and profile stores.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} '{name}' not found.")]
    NotFound { kind: RecordKind, name: String },
    #[error("{kind} '{name}' already exists.")]
    DuplicateKey { kind: RecordKind, name: String },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Trims and checks a record name.
pub fn validate_name(kind: RecordKind, raw: &str) -> StoreResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(StoreError::InvalidInput(format!(
            "{} name cannot be empty.",
            kind
        )));
    }
    if name.contains(char::is_control) {
        return Err(StoreError::InvalidInput(format!(
            "{} name '{}' contains control characters.",
            kind,
            name.escape_default()
        )));
    }
    if kind == RecordKind::Profile && !is_file_stem(name) {
        return Err(StoreError::InvalidInput(format!(
            "{} name '{}' cannot contain path separators.",
            kind, name
        )));
    }
    Ok(name.to_string())
}

/// Whether `name` can be used as a file name inside a directory without
/// leaving it.
pub fn is_file_stem(name: &str) -> bool {
    !name.contains(['/', '\\']) && name != "." && name != ".."
}
