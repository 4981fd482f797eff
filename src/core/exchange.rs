//! # Profile Exchange
//!
//! Imports profiles from, and exports them to, standalone JSON files.
//!
//! An import document maps profile names to arrays. Whether an array holds task
//! names (minimal) or whole task objects (complete) is decided by its first
//! element; the remaining elements must match. Complete imports also create any
//! tasks the task store does not know yet. Existing tasks are never overwritten.
//!
//! Exports write two files side by side: `<name>.json` with the task names and
//! `<name>-full.json` with the referenced task objects. A profile whose name
//! ends in `-full` is not exported, since its minimal file would take the place
//! of another profile's full export.

use crate::constants::FULL_EXPORT_SUFFIX;
use crate::core::document::{self, DocumentError};
use crate::core::profile_store::ProfileStore;
use crate::core::store::{self, RecordKind, StoreError};
use crate::core::task_store::TaskStore;
use crate::models::{ImportEntry, Profile, Task};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Import file '{path}' is malformed: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub profiles_created: Vec<String>,
    pub profiles_updated: Vec<String>,
    pub tasks_created: Vec<String>,
    /// Complete-import tasks whose name already existed.
    pub tasks_skipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub minimal: PathBuf,
    pub full: PathBuf,
}

/// Reads and classifies an import document.
pub fn read_import(path: &Path) -> ExchangeResult<Vec<(String, ImportEntry)>> {
    let value: Value = document::load_json(path)?;
    parse_import(path, value)
}

/// Classifies each profile entry of an already parsed import document.
pub fn parse_import(path: &Path, value: Value) -> ExchangeResult<Vec<(String, ImportEntry)>> {
    let malformed = |reason: String| ExchangeError::Malformed {
        path: path.to_path_buf(),
        reason,
    };
    let Value::Object(map) = value else {
        return Err(malformed("expected an object of profiles".into()));
    };

    let mut entries = Vec::with_capacity(map.len());
    for (profile, items) in map {
        let Value::Array(items) = items else {
            return Err(malformed(format!("'{}' is not an array", profile)));
        };
        let entry = match items.first() {
            None | Some(Value::String(_)) => {
                let names = items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => Ok(s),
                        other => Err(malformed(format!(
                            "'{}' mixes task names with {}",
                            profile, other
                        ))),
                    })
                    .collect::<ExchangeResult<Vec<_>>>()?;
                ImportEntry::Minimal(names)
            }
            Some(Value::Object(_)) => {
                let tasks = items
                    .into_iter()
                    .map(serde_json::from_value::<Task>)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| malformed(format!("'{}': {}", profile, e)))?;
                ImportEntry::Complete(tasks)
            }
            Some(other) => {
                return Err(malformed(format!(
                    "'{}' starts with unsupported value {}",
                    profile, other
                )));
            }
        };
        entries.push((profile, entry));
    }
    Ok(entries)
}

/// Applies an import document to the stores.
///
/// Missing profiles are created with their name as the description in `lang`;
/// existing profiles receive the imported names as a set union.
pub fn import_profiles(
    path: &Path,
    tasks: &mut TaskStore,
    profiles: &mut ProfileStore,
    lang: &str,
) -> ExchangeResult<ImportSummary> {
    let entries = normalize_entries(read_import(path)?)?;
    let mut summary = ImportSummary::default();

    for (profile_name, entry) in entries {
        let names = entry.task_names();

        if let ImportEntry::Complete(records) = entry {
            for task in records {
                if tasks.get(&task.name).is_some() {
                    summary.tasks_skipped.push(task.name);
                    continue;
                }
                let name = task.name.clone();
                tasks.create(task)?;
                summary.tasks_created.push(name);
            }
        }

        if profiles.get(&profile_name).is_some() {
            profiles.add_task_refs(&profile_name, &names)?;
            summary.profiles_updated.push(profile_name);
        } else {
            let profile = Profile::new(profile_name.as_str())
                .with_description(lang, profile_name.as_str())
                .with_tasks(names);
            profiles.create(profile)?;
            summary.profiles_created.push(profile_name);
        }
    }

    log::info!(
        "Imported '{}': {} profiles created, {} updated, {} tasks created",
        path.display(),
        summary.profiles_created.len(),
        summary.profiles_updated.len(),
        summary.tasks_created.len()
    );
    Ok(summary)
}

/// Trims and checks every profile and task name before anything is written, so
/// lookups match the names the stores keep and a bad name aborts the whole import.
fn normalize_entries(
    entries: Vec<(String, ImportEntry)>,
) -> ExchangeResult<Vec<(String, ImportEntry)>> {
    entries
        .into_iter()
        .map(|(profile, entry)| -> ExchangeResult<(String, ImportEntry)> {
            let profile = store::validate_name(RecordKind::Profile, &profile)?;
            let entry = match entry {
                ImportEntry::Minimal(names) => ImportEntry::Minimal(
                    names
                        .iter()
                        .map(|n| store::validate_name(RecordKind::Task, n))
                        .collect::<Result<_, _>>()?,
                ),
                ImportEntry::Complete(tasks) => ImportEntry::Complete(
                    tasks
                        .into_iter()
                        .map(|mut task| -> Result<Task, StoreError> {
                            task.name = store::validate_name(RecordKind::Task, &task.name)?;
                            Ok(task)
                        })
                        .collect::<Result<_, _>>()?,
                ),
            };
            Ok((profile, entry))
        })
        .collect()
}

/// Writes `<name>.json` and `<name>-full.json` for `profile_name` into `out_dir`.
///
/// The full export contains the referenced tasks in reference order; dangling
/// references appear only in the minimal file.
pub fn export_profile(
    tasks: &TaskStore,
    profiles: &ProfileStore,
    profile_name: &str,
    out_dir: &Path,
) -> ExchangeResult<ExportPaths> {
    let profile = profiles.find(profile_name)?;
    if !store::is_file_stem(&profile.name) {
        return Err(StoreError::InvalidInput(format!(
            "Profile '{}' cannot be used as a file name.",
            profile.name
        ))
        .into());
    }
    if profile.name.ends_with(FULL_EXPORT_SUFFIX) {
        return Err(StoreError::InvalidInput(format!(
            "Profile '{}' ends in '{}' and would overwrite another profile's full export.",
            profile.name, FULL_EXPORT_SUFFIX
        ))
        .into());
    }

    let minimal_doc = BTreeMap::from([(profile.name.as_str(), &profile.tasks)]);
    let full_tasks: Vec<&Task> = profile
        .tasks
        .iter()
        .filter_map(|name| tasks.get(name))
        .collect();
    let full_doc = BTreeMap::from([(profile.name.as_str(), full_tasks)]);

    let paths = ExportPaths {
        minimal: out_dir.join(format!("{}.json", profile.name)),
        full: out_dir.join(format!("{}{}.json", profile.name, FULL_EXPORT_SUFFIX)),
    };
    document::save_json(&paths.minimal, &minimal_doc)?;
    document::save_json(&paths.full, &full_doc)?;
    log::info!(
        "Exported profile '{}' to '{}'",
        profile.name,
        out_dir.display()
    );
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;
    use serde_json::json;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn stores() -> (TempDir, TaskStore, ProfileStore) {
        let dir = tempdir().unwrap();
        let tasks_path = dir.path().join("tasks.json");
        let profiles_path = dir.path().join("profiles.json");
        fs::write(&tasks_path, r#"{"tasks":[]}"#).unwrap();
        fs::write(&profiles_path, r#"{"profiles":[]}"#).unwrap();
        let tasks = TaskStore::load(&tasks_path).unwrap();
        let profiles = ProfileStore::load(&profiles_path).unwrap();
        (dir, tasks, profiles)
    }

    #[test]
    fn test_entry_type_is_detected_from_first_element() {
        let value = json!({
            "dev": ["vim", "git"],
            "media": [{ "name": "vlc", "linux": ["sudo apt install -y vlc"] }],
            "empty": []
        });
        let entries = parse_import(Path::new("in.json"), value).unwrap();
        let by_name: BTreeMap<_, _> = entries.into_iter().collect();
        assert!(matches!(by_name["dev"], ImportEntry::Minimal(_)));
        assert!(matches!(by_name["media"], ImportEntry::Complete(_)));
        assert_eq!(by_name["empty"], ImportEntry::Minimal(vec![]));
    }

    #[test]
    fn test_mixed_or_scalar_entries_are_malformed() {
        let mixed = json!({ "dev": ["vim", { "name": "git" }] });
        assert!(matches!(
            parse_import(Path::new("in.json"), mixed),
            Err(ExchangeError::Malformed { .. })
        ));
        let scalar = json!({ "dev": [42] });
        assert!(parse_import(Path::new("in.json"), scalar).is_err());
        assert!(parse_import(Path::new("in.json"), json!(["vim"])).is_err());
    }

    #[test]
    fn test_export_then_import_reproduces_name_set() {
        let (dir, mut tasks, mut profiles) = stores();
        tasks
            .create(Task::new("vim").with_commands(Platform::Linux, vec!["true".into()]))
            .unwrap();
        profiles
            .create(Profile::new("dev").with_tasks(["vim", "git", "vim", "curl"]))
            .unwrap();

        let out = dir.path().join("out");
        let paths = export_profile(&tasks, &profiles, "dev", &out).unwrap();
        assert!(paths.full.ends_with("dev-full.json"));

        let full: Value = serde_json::from_str(&fs::read_to_string(&paths.full).unwrap()).unwrap();
        assert_eq!(full["dev"].as_array().unwrap().len(), 1);

        profiles.delete("dev").unwrap();
        let summary = import_profiles(&paths.minimal, &mut tasks, &mut profiles, "en").unwrap();
        assert_eq!(summary.profiles_created, vec!["dev"]);
        assert_eq!(profiles.find("dev").unwrap().tasks, vec!["curl", "git", "vim"]);
    }

    #[test]
    fn test_complete_import_creates_unknown_tasks_only() {
        let (dir, mut tasks, mut profiles) = stores();
        tasks
            .create(Task::new("vim").with_description("en", "Mine"))
            .unwrap();
        profiles.create(Profile::new("dev").with_tasks(["zsh"])).unwrap();

        let import = dir.path().join("import.json");
        fs::write(
            &import,
            json!({ "dev": [
                { "name": "vim", "description": { "en": "Theirs" } },
                { "name": "git", "linux": ["sudo apt install -y git"] }
            ]})
            .to_string(),
        )
        .unwrap();

        let summary = import_profiles(&import, &mut tasks, &mut profiles, "en").unwrap();
        assert_eq!(summary.tasks_created, vec!["git"]);
        assert_eq!(summary.tasks_skipped, vec!["vim"]);
        assert_eq!(summary.profiles_updated, vec!["dev"]);
        assert_eq!(tasks.find("vim").unwrap().description["en"], "Mine");
        assert_eq!(profiles.find("dev").unwrap().tasks, vec!["git", "vim", "zsh"]);
    }

    #[test]
    fn test_padded_import_keys_extend_existing_records() {
        let (dir, mut tasks, mut profiles) = stores();
        tasks.create(Task::new("vim")).unwrap();
        profiles.create(Profile::new("dev").with_tasks(["zsh"])).unwrap();

        let import = dir.path().join("import.json");
        fs::write(
            &import,
            json!({ "dev ": [
                { "name": " vim", "description": { "en": "Theirs" } },
                { "name": "git ", "linux": ["sudo apt install -y git"] }
            ]})
            .to_string(),
        )
        .unwrap();

        let summary = import_profiles(&import, &mut tasks, &mut profiles, "en").unwrap();
        assert_eq!(summary.profiles_updated, vec!["dev"]);
        assert!(summary.profiles_created.is_empty());
        assert_eq!(summary.tasks_skipped, vec!["vim"]);
        assert_eq!(summary.tasks_created, vec!["git"]);
        assert_eq!(profiles.list().len(), 1);
        assert_eq!(profiles.find("dev").unwrap().tasks, vec!["git", "vim", "zsh"]);
    }

    #[test]
    fn test_import_with_a_bad_profile_key_writes_nothing() {
        let (dir, mut tasks, mut profiles) = stores();
        let import = dir.path().join("import.json");
        fs::write(
            &import,
            json!({
                "a-good": [{ "name": "git" }],
                "../escaped": [{ "name": "vim" }]
            })
            .to_string(),
        )
        .unwrap();

        let result = import_profiles(&import, &mut tasks, &mut profiles, "en");
        assert!(matches!(
            result,
            Err(ExchangeError::Store(StoreError::InvalidInput(_)))
        ));
        assert!(tasks.is_empty());
        assert!(profiles.list().is_empty());
    }

    #[test]
    fn test_export_refuses_names_that_leave_the_output_directory() {
        let (dir, tasks, _) = stores();
        let profiles_path = dir.path().join("profiles.json");
        fs::write(
            &profiles_path,
            json!({ "profiles": [{ "name": "../escaped", "tasks": ["vim"] }] }).to_string(),
        )
        .unwrap();
        let profiles = ProfileStore::load(&profiles_path).unwrap();

        let out = dir.path().join("out");
        let result = export_profile(&tasks, &profiles, "../escaped", &out);
        assert!(matches!(
            result,
            Err(ExchangeError::Store(StoreError::InvalidInput(_)))
        ));
        assert!(!dir.path().join("escaped.json").exists());
        assert!(!dir.path().join("escaped-full.json").exists());
    }

    #[test]
    fn test_export_refuses_names_shadowing_a_full_export() {
        let (dir, tasks, mut profiles) = stores();
        profiles.create(Profile::new("dev").with_tasks(["vim"])).unwrap();
        profiles.create(Profile::new("dev-full").with_tasks(["git"])).unwrap();

        let out = dir.path().join("out");
        let written = export_profile(&tasks, &profiles, "dev", &out).unwrap();
        assert!(matches!(
            export_profile(&tasks, &profiles, "dev-full", &out),
            Err(ExchangeError::Store(StoreError::InvalidInput(_)))
        ));

        let full: Value = serde_json::from_str(&fs::read_to_string(&written.full).unwrap()).unwrap();
        assert!(full.get("dev").is_some());
    }
}
