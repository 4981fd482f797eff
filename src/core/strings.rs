//! # Localized String Store
//!
//! Every user-facing string goes through this store. The language document is a
//! nested JSON object (`namespace.key.lang = text`) that is flattened into dotted
//! keys on load.
//!
//! Resolution is pure: [`LocalizedStrings::resolve`] never prompts and never
//! fails. When the interactive layer wants missing entries filled in, it calls
//! [`LocalizedStrings::resolve_or_supply`] with a [`MissingTranslation`] handler;
//! a supplied answer is written back into the document and the table reloaded.

use crate::constants::FALLBACK_LANGUAGE;
use crate::core::document::{self, DocumentError};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StringsError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("Language document '{path}' must be a JSON object at the top level.")]
    NotAnObject { path: PathBuf },
    #[error("Key '{key}' conflicts with an existing entry of a different shape.")]
    KeyConflict { key: String },
    #[error("Key '{key}' is not a valid dotted key.")]
    InvalidKey { key: String },
}

pub type StringsResult<T> = Result<T, StringsError>;

/// Where a resolved text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// An entry for the current language.
    Current,
    /// The English entry, used because the current language has none.
    Fallback,
    /// No entry at all; the key itself, made readable.
    Humanized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub text: String,
    pub source: Source,
}

/// Describes a lookup that found nothing for the current language.
#[derive(Debug, Clone, Copy)]
pub struct TranslationRequest<'a> {
    pub key: &'a str,
    pub namespace: Option<&'a str>,
    pub language: &'a str,
    /// What would be shown if nothing is supplied.
    pub fallback: &'a str,
}

/// Consumer of missing-translation events. Returning `Some` persists the text.
pub trait MissingTranslation {
    fn supply(&mut self, request: &TranslationRequest<'_>) -> Option<String>;
}

impl<F> MissingTranslation for F
where
    F: FnMut(&TranslationRequest<'_>) -> Option<String>,
{
    fn supply(&mut self, request: &TranslationRequest<'_>) -> Option<String> {
        self(request)
    }
}

#[derive(Debug)]
pub struct LocalizedStrings {
    path: PathBuf,
    language: String,
    document: Value,
    table: BTreeMap<String, String>,
    /// Keys already offered to a handler this session.
    asked: HashSet<String>,
}

impl LocalizedStrings {
    /// Loads the language document at `path` for `language`.
    pub fn load(path: &Path, language: &str) -> StringsResult<Self> {
        let mut strings = Self {
            path: path.to_path_buf(),
            language: language.to_string(),
            document: Value::Object(Map::new()),
            table: BTreeMap::new(),
            asked: HashSet::new(),
        };
        strings.reload()?;
        Ok(strings)
    }

    /// Re-reads the backing document, discarding the in-memory table.
    pub fn reload(&mut self) -> StringsResult<()> {
        let loaded: Value = document::load_json(&self.path)?;
        if !loaded.is_object() {
            return Err(StringsError::NotAnObject {
                path: self.path.clone(),
            });
        }
        let mut table = BTreeMap::new();
        flatten_into(&mut table, "", &loaded);
        log::debug!(
            "Loaded {} localized strings from '{}'",
            table.len(),
            self.path.display()
        );
        self.table = table;
        self.document = loaded;
        Ok(())
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn set_language(&mut self, language: &str) {
        if self.language != language {
            self.language = language.to_string();
            self.asked.clear();
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves `key` within `namespace` without side effects.
    ///
    /// Order: `{ns}.{key}.{lang}`, `{key}.{lang}`, `{ns}.{key}.en`, `{key}.en`,
    /// then the key with underscores turned into spaces.
    pub fn resolve(&self, key: &str, namespace: Option<&str>) -> Resolved {
        if let Some(text) = self.lookup(key, namespace, &self.language) {
            return Resolved {
                text: text.to_string(),
                source: Source::Current,
            };
        }
        if self.language != FALLBACK_LANGUAGE
            && let Some(text) = self.lookup(key, namespace, FALLBACK_LANGUAGE)
        {
            return Resolved {
                text: text.to_string(),
                source: Source::Fallback,
            };
        }
        Resolved {
            text: humanize(key),
            source: Source::Humanized,
        }
    }

    /// Shorthand for `resolve(..).text`.
    pub fn text(&self, key: &str, namespace: Option<&str>) -> String {
        self.resolve(key, namespace).text
    }

    /// Resolves `key`, offering a missing current-language entry to `handler`
    /// once per key per session. A supplied text is persisted under
    /// `{ns}.{key}.{lang}` (or `{key}.{lang}`) and returned.
    pub fn resolve_or_supply(
        &mut self,
        key: &str,
        namespace: Option<&str>,
        handler: Option<&mut dyn MissingTranslation>,
    ) -> String {
        let resolved = self.resolve(key, namespace);
        let Some(handler) = handler else {
            return resolved.text;
        };
        if resolved.source == Source::Current {
            return resolved.text;
        }

        let full_key = qualified_key(key, namespace);
        if !self.asked.insert(full_key.clone()) {
            return resolved.text;
        }

        let language = self.language.clone();
        let request = TranslationRequest {
            key,
            namespace,
            language: &language,
            fallback: &resolved.text,
        };
        let supplied = handler
            .supply(&request)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        match supplied {
            Some(text) => {
                if let Err(e) = self.set(&full_key, &language, &text) {
                    log::warn!("Could not persist translation for '{}': {}", full_key, e);
                }
                text
            }
            None => resolved.text,
        }
    }

    /// Writes `{key}.{lang} = text` into the document and reloads the table.
    pub fn set(&mut self, key: &str, lang: &str, text: &str) -> StringsResult<()> {
        let dotted = format!("{}.{}", key, lang);
        let segments: Vec<&str> = dotted.split('.').collect();
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(StringsError::InvalidKey { key: dotted.clone() });
        }

        let mut updated = self.document.clone();
        set_path(&mut updated, &segments, text, &dotted)?;
        document::save_json(&self.path, &updated)?;
        log::info!("Stored translation '{}' in '{}'", dotted, self.path.display());
        self.reload()
    }

    /// Every language code that appears as a leaf in the document.
    pub fn languages(&self) -> BTreeSet<String> {
        self.table
            .keys()
            .filter_map(|k| k.rsplit_once('.').map(|(_, lang)| lang.to_string()))
            .collect()
    }

    /// Keys that have a translation in some language but not in `lang`.
    pub fn missing_keys(&self, lang: &str) -> Vec<String> {
        let mut bases: BTreeSet<&str> = BTreeSet::new();
        for key in self.table.keys() {
            if let Some((base, _)) = key.rsplit_once('.') {
                bases.insert(base);
            }
        }
        bases
            .into_iter()
            .filter(|base| !self.table.contains_key(&format!("{}.{}", base, lang)))
            .map(str::to_string)
            .collect()
    }

    /// All translations stored for the dotted `key`.
    pub fn entries(&self, key: &str) -> BTreeMap<String, String> {
        let prefix = format!("{}.", key);
        self.table
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(&prefix)
                    .filter(|lang| !lang.contains('.'))
                    .map(|lang| (lang.to_string(), v.clone()))
            })
            .collect()
    }

    fn lookup(&self, key: &str, namespace: Option<&str>, lang: &str) -> Option<&str> {
        let scoped = namespace.map(|ns| format!("{}.{}.{}", ns, key, lang));
        let bare = format!("{}.{}", key, lang);
        scoped
            .iter()
            .chain(std::iter::once(&bare))
            .find_map(|k| self.table.get(k))
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Replaces `{name}` placeholders in `template`.
pub fn interpolate(template: &str, values: &[(&str, &str)]) -> String {
    let mut result = template.to_owned();
    for (key, value) in values {
        let placeholder = format!("{{{key}}}");
        result = result.replace(&placeholder, value);
    }
    result
}

fn qualified_key(key: &str, namespace: Option<&str>) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{}.{}", ns, key),
        _ => key.to_string(),
    }
}

fn humanize(key: &str) -> String {
    let human = key.replace('_', " ");
    if human.trim().is_empty() {
        key.to_string()
    } else {
        human
    }
}

fn flatten_into(table: &mut BTreeMap<String, String>, prefix: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{}.{}", prefix, k)
                };
                flatten_into(table, &key, v);
            }
        }
        Value::String(s) => {
            table.insert(prefix.to_string(), s.clone());
        }
        other => log::trace!("Ignoring non-string entry '{}': {}", prefix, other),
    }
}

fn set_path(node: &mut Value, segments: &[&str], text: &str, full: &str) -> StringsResult<()> {
    let conflict = || StringsError::KeyConflict {
        key: full.to_string(),
    };
    let Some((last, parents)) = segments.split_last() else {
        return Err(StringsError::InvalidKey {
            key: full.to_string(),
        });
    };

    let mut current = node;
    for segment in parents {
        let map = current.as_object_mut().ok_or_else(conflict)?;
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    let map = current.as_object_mut().ok_or_else(conflict)?;
    if map.get(*last).is_some_and(Value::is_object) {
        return Err(conflict());
    }
    map.insert(last.to_string(), Value::String(text.to_string()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn store_with(json: &str, lang: &str) -> (TempDir, LocalizedStrings) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lang.json");
        fs::write(&path, json).unwrap();
        let strings = LocalizedStrings::load(&path, lang).unwrap();
        (dir, strings)
    }

    #[test]
    fn test_english_fallback_when_current_language_missing() {
        let (_dir, strings) = store_with(r#"{"greet":{"en":"Hello"}}"#, "fr");
        let resolved = strings.resolve("greet", None);
        assert_eq!(resolved.text, "Hello");
        assert_eq!(resolved.source, Source::Fallback);
    }

    #[test]
    fn test_unknown_key_is_humanized() {
        let (_dir, strings) = store_with("{}", "fr");
        assert_eq!(strings.text("not_set_key", None), "not set key");
        assert_eq!(strings.text("___", None), "___");
    }

    #[test]
    fn test_lookup_order_prefers_namespace_then_current_language() {
        let json = r#"{
            "menu": { "title": { "en": "Menu (scoped)", "es": "Menú" } },
            "title": { "en": "Title", "fr": "Titre" }
        }"#;
        let (_dir, strings) = store_with(json, "fr");
        // Current language beats the namespaced English entry.
        assert_eq!(strings.text("title", Some("menu")), "Titre");

        let (_dir, strings) = store_with(json, "es");
        assert_eq!(strings.text("title", Some("menu")), "Menú");

        let (_dir, strings) = store_with(json, "de");
        assert_eq!(strings.text("title", Some("menu")), "Menu (scoped)");
        assert_eq!(strings.text("title", None), "Title");
    }

    #[test]
    fn test_resolve_without_handler_never_prompts() {
        let (_dir, mut strings) = store_with(r#"{"greet":{"en":"Hello"}}"#, "fr");
        assert_eq!(strings.resolve_or_supply("greet", None, None), "Hello");
    }

    #[test]
    fn test_supplied_translation_is_persisted_under_namespace() {
        let (dir, mut strings) = store_with(r#"{"greet":{"en":"Hello"}}"#, "fr");
        let mut handler = |req: &TranslationRequest<'_>| {
            assert_eq!(req.fallback, "Hello");
            Some("Bonjour".to_string())
        };

        let text = strings.resolve_or_supply("greet", Some("menu"), Some(&mut handler));
        assert_eq!(text, "Bonjour");
        assert_eq!(strings.resolve("greet", Some("menu")).source, Source::Current);

        let on_disk: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("lang.json")).unwrap())
                .unwrap();
        assert_eq!(on_disk["menu"]["greet"]["fr"], "Bonjour");
        assert_eq!(on_disk["greet"]["en"], "Hello");
    }

    #[test]
    fn test_handler_is_asked_once_per_key() {
        let (_dir, mut strings) = store_with("{}", "fr");
        let mut calls = 0;
        let mut handler = |_: &TranslationRequest<'_>| {
            calls += 1;
            None
        };
        strings.resolve_or_supply("quit", None, Some(&mut handler));
        strings.resolve_or_supply("quit", None, Some(&mut handler));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_set_rejects_shape_conflicts() {
        let (_dir, mut strings) = store_with(r#"{"greet":"flat"}"#, "en");
        let err = strings.set("greet", "en", "Hello").unwrap_err();
        assert!(matches!(err, StringsError::KeyConflict { .. }));
    }

    #[test]
    fn test_languages_and_missing_keys() {
        let json = r#"{"a":{"en":"A","es":"A-es"},"b":{"en":"B"}}"#;
        let (_dir, strings) = store_with(json, "en");
        let langs: Vec<_> = strings.languages().into_iter().collect();
        assert_eq!(langs, vec!["en", "es"]);
        assert_eq!(strings.missing_keys("es"), vec!["b"]);
        assert_eq!(strings.entries("a").get("es").map(String::as_str), Some("A-es"));
    }

    #[test]
    fn test_interpolate_replaces_named_placeholders() {
        assert_eq!(
            interpolate("Task '{name}' on {os}", &[("name", "vim"), ("os", "linux")]),
            "Task 'vim' on linux"
        );
    }
}
