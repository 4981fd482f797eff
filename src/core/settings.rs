//! # Settings
//!
//! User settings live in `<config_dir>/setupkit/config.toml` and are written
//! with defaults on first run. Values are layered: built-in defaults, then the
//! file, then environment, then command-line flags (applied by the CLI layer).
//!
//! Language selection: `SETUPKIT_LANG` overrides everything in the file. The
//! POSIX `LANG` variable is only consulted when the file does not set a
//! language, since it is present on nearly every system.

use crate::constants::FALLBACK_LANGUAGE;
use crate::core::document::{self, DocumentError};
use crate::core::paths::{self, PathError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Could not read settings '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Settings file '{path}' is invalid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Path(#[from] PathError),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// How prompts are rendered.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    /// Rich prompts when stdin and stdout are terminals, plain text otherwise.
    #[default]
    Auto,
    Dialog,
    Plain,
}

/// Where to fetch a core document from when it is missing locally.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct DocumentSources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Preferred language code. Detected from the environment when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Directory holding the JSON documents. `~` and `$VARS` are expanded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Ask for missing UI strings and persist the answers.
    pub interactive_strings: bool,
    /// Record fallback-installed tasks only when the install succeeded.
    pub strict_fallback: bool,
    pub ui: UiMode,
    /// `host:port` probed before any download.
    pub connectivity_probe: String,
    pub documents: DocumentSources,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: None,
            data_dir: None,
            interactive_strings: true,
            strict_fallback: false,
            ui: UiMode::Auto,
            connectivity_probe: "1.1.1.1:443".to_string(),
            documents: DocumentSources::default(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, writing the defaults there first if the
    /// file does not exist.
    pub fn load_or_create(path: &Path) -> SettingsResult<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(path, &content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let defaults = Self::default();
                defaults.save(path)?;
                log::info!("Wrote default settings to '{}'", path.display());
                Ok(defaults)
            }
            Err(source) => Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn parse(path: &Path, content: &str) -> SettingsResult<Self> {
        toml::from_str(content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> SettingsResult<()> {
        let content = toml::to_string_pretty(self)?;
        document::atomic_write(path, content.as_bytes())?;
        Ok(())
    }

    /// The directory holding the JSON documents.
    pub fn data_dir(&self) -> SettingsResult<PathBuf> {
        match self.data_dir.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Ok(paths::resolve_user_path(raw)?),
            _ => Ok(paths::default_data_dir()?),
        }
    }

    /// Picks the active language from the file value and the environment.
    ///
    /// `app_env` is the value of `SETUPKIT_LANG`, `posix_env` the value of
    /// `LANG`. Falls back to English.
    pub fn resolve_language(&self, app_env: Option<&str>, posix_env: Option<&str>) -> String {
        app_env
            .and_then(parse_language_tag)
            .or_else(|| self.language.as_deref().and_then(parse_language_tag))
            .or_else(|| posix_env.and_then(parse_language_tag))
            .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string())
    }
}

/// Reduces a locale tag such as `es_ES.UTF-8` or `pt-BR` to its primary
/// language subtag (`es`, `pt`). `C` and `POSIX` carry no language.
pub fn parse_language_tag(raw: &str) -> Option<String> {
    let mut normalized = raw
        .trim()
        .split('=')
        .next_back()
        .unwrap_or(raw)
        .replace('_', "-")
        .to_ascii_lowercase();

    if let Some(idx) = normalized.find('@') {
        normalized.truncate(idx);
    }
    if let Some(idx) = normalized.find('.') {
        normalized.truncate(idx);
    }

    let primary = normalized.split('-').next().unwrap_or_default();
    match primary {
        "" | "c" | "posix" => None,
        tag if tag.len() <= 3 && tag.chars().all(|c| c.is_ascii_alphabetic()) => {
            Some(tag.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_first_run_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("setupkit").join("config.toml");
        let settings = Settings::load_or_create(&path).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(path.exists());

        let reloaded = Settings::load_or_create(&path).unwrap();
        assert_eq!(reloaded, settings);
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_missing_keys() {
        let content = r#"
            language = "es"
            strict_fallback = true
            ui = "plain"

            [documents]
            tasks_url = "https://example.org/tasks.json"
        "#;
        let settings = Settings::parse(Path::new("config.toml"), content).unwrap();
        assert_eq!(settings.language.as_deref(), Some("es"));
        assert!(settings.strict_fallback);
        assert!(settings.interactive_strings);
        assert_eq!(settings.ui, UiMode::Plain);
        assert_eq!(
            settings.documents.tasks_url.as_deref(),
            Some("https://example.org/tasks.json")
        );
        assert!(settings.documents.language_url.is_none());
    }

    #[test]
    fn test_invalid_file_is_a_parse_error() {
        let err = Settings::parse(Path::new("config.toml"), "ui = \"fancy\"").unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn test_language_layering() {
        let mut settings = Settings::default();
        assert_eq!(settings.resolve_language(None, None), "en");
        assert_eq!(settings.resolve_language(None, Some("es_ES.UTF-8")), "es");

        settings.language = Some("fr".into());
        assert_eq!(settings.resolve_language(None, Some("es_ES.UTF-8")), "fr");
        assert_eq!(settings.resolve_language(Some("de"), Some("es_ES.UTF-8")), "de");
    }

    #[test]
    fn test_parse_language_tag() {
        assert_eq!(parse_language_tag("pt-BR").as_deref(), Some("pt"));
        assert_eq!(parse_language_tag("sr_RS@latin").as_deref(), Some("sr"));
        assert_eq!(parse_language_tag("LC_ALL=it_IT.UTF-8").as_deref(), Some("it"));
        assert_eq!(parse_language_tag("C.UTF-8"), None);
        assert_eq!(parse_language_tag("POSIX"), None);
        assert_eq!(parse_language_tag("  "), None);
    }
}
