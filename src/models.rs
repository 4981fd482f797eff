// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Language code → text. Ordered so rewritten documents stay stable.
pub type Translations = BTreeMap<String, String>;

// --- PLATFORMS ---

/// The operating system families a task can carry commands for.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
    Macos,
}

impl Platform {
    /// All platforms, in document order.
    pub const ALL: [Self; 3] = [Self::Linux, Self::Windows, Self::Macos];

    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::Macos
        } else {
            Self::Linux
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
            Self::Macos => "macos",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "windows" | "win" => Ok(Self::Windows),
            "macos" | "mac" | "osx" | "darwin" => Ok(Self::Macos),
            other => Err(format!("Unknown platform '{}'", other)),
        }
    }
}

// --- TASK DOCUMENT MODELS ---

/// A named, platform-keyed set of shell commands (plus an optional download)
/// representing one installable or configurable unit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Task {
    pub name: String,
    #[serde(default)]
    pub description: Translations,
    #[serde(default)]
    pub category: Translations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macos: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub download_url: BTreeMap<String, String>,
    /// Fields this version does not know about, carried through rewrites.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, lang: &str, text: impl Into<String>) -> Self {
        self.description.insert(lang.to_string(), text.into());
        self
    }

    pub fn with_category(mut self, lang: &str, text: impl Into<String>) -> Self {
        self.category.insert(lang.to_string(), text.into());
        self
    }

    pub fn with_commands(mut self, platform: Platform, commands: Vec<String>) -> Self {
        *self.platform_slot(platform) = Some(commands);
        self
    }

    pub fn with_download_url(mut self, platform: Platform, url: impl Into<String>) -> Self {
        self.download_url
            .insert(platform.as_str().to_string(), url.into());
        self
    }

    /// Commands to run on `platform`. An absent list means nothing to run.
    pub fn commands(&self, platform: Platform) -> &[String] {
        let slot = match platform {
            Platform::Linux => &self.linux,
            Platform::Windows => &self.windows,
            Platform::Macos => &self.macos,
        };
        slot.as_deref().unwrap_or(&[])
    }

    /// Mutable command list for `platform`, created empty if absent.
    pub fn commands_mut(&mut self, platform: Platform) -> &mut Vec<String> {
        self.platform_slot(platform).get_or_insert_with(Vec::new)
    }

    pub fn has_platform(&self, platform: Platform) -> bool {
        match platform {
            Platform::Linux => self.linux.is_some(),
            Platform::Windows => self.windows.is_some(),
            Platform::Macos => self.macos.is_some(),
        }
    }

    pub fn download_url(&self, platform: Platform) -> Option<&str> {
        self.download_url
            .get(platform.as_str())
            .map(String::as_str)
            .filter(|url| !url.trim().is_empty())
    }

    pub fn field(&self, field: TaskField) -> &Translations {
        match field {
            TaskField::Description => &self.description,
            TaskField::Category => &self.category,
        }
    }

    pub fn field_mut(&mut self, field: TaskField) -> &mut Translations {
        match field {
            TaskField::Description => &mut self.description,
            TaskField::Category => &mut self.category,
        }
    }

    fn platform_slot(&mut self, platform: Platform) -> &mut Option<Vec<String>> {
        match platform {
            Platform::Linux => &mut self.linux,
            Platform::Windows => &mut self.windows,
            Platform::Macos => &mut self.macos,
        }
    }
}

/// The translatable text fields of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Description,
    Category,
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Description => "description",
            Self::Category => "category",
        })
    }
}

/// The on-disk shape of `tasks.json`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TaskDocument {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

// --- PROFILE DOCUMENT MODELS ---

/// A named, ordered set of task references executed together.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub description: Translations,
    #[serde(default)]
    pub tasks: Vec<String>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, lang: &str, text: impl Into<String>) -> Self {
        self.description.insert(lang.to_string(), text.into());
        self
    }

    pub fn with_tasks<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tasks = tasks.into_iter().map(Into::into).collect();
        self.normalize_tasks();
        self
    }

    /// Sorts and deduplicates the task references (set semantics).
    pub fn normalize_tasks(&mut self) {
        self.tasks.sort();
        self.tasks.dedup();
    }
}

/// The on-disk shape of `profiles.json`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProfileDocument {
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

// --- IMPORT / EXPORT MODELS ---

/// One profile entry of an import document. The variant is decided by the
/// type of the first array element.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportEntry {
    /// `[ "vim", "git" ]`
    Minimal(Vec<String>),
    /// `[ { "name": "vim", ... }, ... ]`
    Complete(Vec<Task>),
}

impl ImportEntry {
    pub fn task_names(&self) -> Vec<String> {
        match self {
            Self::Minimal(names) => names.clone(),
            Self::Complete(tasks) => tasks.iter().map(|t| t.name.clone()).collect(),
        }
    }
}

/// Picks the text for `lang`, falling back to English, then to any entry.
pub fn pick_translation<'a>(translations: &'a Translations, lang: &str) -> Option<&'a str> {
    translations
        .get(lang)
        .or_else(|| translations.get(crate::constants::FALLBACK_LANGUAGE))
        .or_else(|| translations.values().next())
        .map(String::as_str)
}
