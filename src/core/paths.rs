// src/core/paths.rs

use crate::constants::{APP_DIR, SETTINGS_FILENAME};
use lazy_static::lazy_static;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

lazy_static! {
    static ref CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not find system data directory.")]
    DataDirNotFound,
    #[error("Could not create directory at '{path}': {source}")]
    DirCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not expand path '{path}': {reason}")]
    Expansion { path: String, reason: String },
}

/// Returns the application configuration directory (`~/.config/setupkit`),
/// creating it if needed. The result is cached after the first call.
pub fn get_config_dir() -> Result<PathBuf, PathError> {
    let mut cached = CONFIG_DIR.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(path) = &*cached {
        return Ok(path.clone());
    }

    let config_path = dirs::config_dir()
        .ok_or(PathError::ConfigDirNotFound)?
        .join(APP_DIR);
    ensure_dir(&config_path)?;

    *cached = Some(config_path.clone());
    Ok(config_path)
}

/// Path of `config.toml` inside the configuration directory.
pub fn get_settings_path() -> Result<PathBuf, PathError> {
    get_config_dir().map(|dir| dir.join(SETTINGS_FILENAME))
}

/// Default location of the JSON documents (`~/.local/share/setupkit`).
pub fn default_data_dir() -> Result<PathBuf, PathError> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or(PathError::DataDirNotFound)
}

/// Expands `~` and environment variables in a user-supplied path. Existing
/// paths are canonicalized without the Windows `\\?\` prefix.
pub fn resolve_user_path(raw: &str) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(raw.trim()).map_err(|e| PathError::Expansion {
        path: raw.to_string(),
        reason: e.to_string(),
    })?;
    let path = PathBuf::from(expanded.into_owned());
    Ok(dunce::canonicalize(&path).unwrap_or(path))
}

pub fn ensure_dir(path: &Path) -> Result<(), PathError> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| PathError::DirCreation {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_user_path_expands_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let resolved = resolve_user_path("~/setupkit-nonexistent-dir").unwrap();
        assert!(resolved.starts_with(dunce::simplified(&home)) || resolved.starts_with(&home));
        assert!(resolved.ends_with("setupkit-nonexistent-dir"));
    }

    #[test]
    fn test_ensure_dir_creates_nested_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();
    }
}
