//! # Document Layer
//!
//! JSON documents are the sole source of truth for every store. This module
//! loads them with structural validation and writes them back atomically: the
//! new content goes to a temporary file in the same directory, which is then
//! renamed over the original, so an interrupted write never truncates a
//! document.

use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Document '{path}' does not exist.")]
    Missing { path: PathBuf },
    #[error("Could not access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Document '{path}' is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Document '{path}' failed validation: {reason}")]
    Invalid { path: PathBuf, reason: String },
    #[error("Could not replace '{path}': {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
    #[error("Failed to serialize document '{path}': {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type DocumentResult<T> = Result<T, DocumentError>;

/// Reads and deserializes a JSON document.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> DocumentResult<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            DocumentError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            DocumentError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    parse_json(path, &content)
}

/// Deserializes JSON text, attributing failures to `path`.
pub fn parse_json<T: DeserializeOwned>(path: &Path, content: &str) -> DocumentResult<T> {
    serde_json::from_str(content).map_err(|e| DocumentError::Corrupt {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Serializes `value` as pretty JSON and atomically replaces `path` with it.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> DocumentResult<()> {
    let mut content = serde_json::to_string_pretty(value).map_err(|e| {
        DocumentError::Serialize {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    content.push('\n');
    atomic_write(path, content.as_bytes())
}

/// Writes `data` to a sibling temp file, then renames it over `path`.
pub fn atomic_write(path: &Path, data: &[u8]) -> DocumentResult<()> {
    let io_err = |source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(io_err)?;

    let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
    temp.write_all(data).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|e| DocumentError::Persist {
        path: path.to_path_buf(),
        source: e,
    })?;
    log::trace!("Wrote {} bytes to '{}'", data.len(), path.display());
    Ok(())
}

/// Rejects collections whose records share a name.
pub fn ensure_unique_names<'a, I>(path: &Path, kind: &str, names: I) -> DocumentResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(DocumentError::Invalid {
                path: path.to_path_buf(),
                reason: format!("a {} has an empty name", kind),
            });
        }
        if !seen.insert(name) {
            return Err(DocumentError::Invalid {
                path: path.to_path_buf(),
                reason: format!("{} '{}' is defined more than once", kind, name),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskDocument;
    use tempfile::tempdir;

    #[test]
    fn test_missing_document_is_reported_as_missing() {
        let dir = tempdir().unwrap();
        let result = load_json::<TaskDocument>(&dir.path().join("tasks.json"));
        assert!(matches!(result, Err(DocumentError::Missing { .. })));
    }

    #[test]
    fn test_malformed_document_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "{ \"tasks\": [ { \"name\": ").unwrap();
        let result = load_json::<TaskDocument>(&path);
        assert!(matches!(result, Err(DocumentError::Corrupt { .. })));
    }

    #[test]
    fn test_save_replaces_content_and_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, "old").unwrap();

        save_json(&path, &serde_json::json!({ "tasks": [] })).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"tasks\""));
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temp file should have been renamed away");
    }

    #[test]
    fn test_duplicate_names_fail_validation() {
        let path = Path::new("tasks.json");
        assert!(ensure_unique_names(path, "task", ["vim", "git"]).is_ok());
        let err = ensure_unique_names(path, "task", ["vim", "vim"]).unwrap_err();
        assert!(err.to_string().contains("'vim' is defined more than once"));
    }
}
