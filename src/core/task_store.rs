//! # Task Store
//!
//! An ordered collection of [`Task`] records backed by `tasks.json`. Every
//! mutation is applied to a copy of the document, written atomically, and only
//! then swapped into memory, so a failed write leaves the store unchanged.

use crate::constants::FALLBACK_LANGUAGE;
use crate::core::document;
use crate::core::store::{RecordKind, StoreError, StoreResult, validate_name};
use crate::models::{Platform, Task, TaskDocument, TaskField, pick_translation};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Supplies an English rendering of text entered in another language.
pub trait Translator {
    fn translate(&mut self, text: &str, from: &str, to: &str) -> Option<String>;
}

impl<F> Translator for F
where
    F: FnMut(&str, &str, &str) -> Option<String>,
{
    fn translate(&mut self, text: &str, from: &str, to: &str) -> Option<String> {
        self(text, from, to)
    }
}

/// A translator that never has an answer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTranslation;

impl Translator for NoTranslation {
    fn translate(&mut self, _text: &str, _from: &str, _to: &str) -> Option<String> {
        None
    }
}

#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    document: TaskDocument,
}

impl TaskStore {
    /// Loads and validates the task document at `path`.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let document = read_document(path)?;
        log::debug!(
            "Loaded {} tasks from '{}'",
            document.tasks.len(),
            path.display()
        );
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    /// Discards the in-memory copy and re-reads the document.
    pub fn reload(&mut self) -> StoreResult<()> {
        self.document = read_document(&self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> &[Task] {
        &self.document.tasks
    }

    pub fn len(&self) -> usize {
        self.document.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.tasks.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.document.tasks.iter().find(|t| t.name == name)
    }

    pub fn find(&self, name: &str) -> StoreResult<&Task> {
        self.get(name).ok_or_else(|| not_found(name))
    }

    /// Appends a new task. Fails with `DuplicateKey` if the name is taken.
    pub fn create(&mut self, mut task: Task) -> StoreResult<()> {
        task.name = validate_name(RecordKind::Task, &task.name)?;
        if self.get(&task.name).is_some() {
            return Err(StoreError::DuplicateKey {
                kind: RecordKind::Task,
                name: task.name,
            });
        }
        log::info!("Creating task '{}'", task.name);
        self.commit(|doc| {
            doc.tasks.push(task);
            Ok(())
        })
    }

    /// Sets `field[lang] = value`. For a non-English `lang`, the translator is
    /// asked for English and `field["en"]` is set only when it answers.
    pub fn update_field(
        &mut self,
        name: &str,
        field: TaskField,
        value: &str,
        lang: &str,
        translator: &mut dyn Translator,
    ) -> StoreResult<()> {
        self.find(name)?;
        let english = if lang != FALLBACK_LANGUAGE {
            translator
                .translate(value, lang, FALLBACK_LANGUAGE)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        } else {
            None
        };
        if lang != FALLBACK_LANGUAGE && english.is_none() {
            log::debug!("No English translation supplied for {} of '{}'", field, name);
        }

        self.commit(|doc| {
            let task = find_in(doc, name)?;
            let translations = task.field_mut(field);
            translations.insert(lang.to_string(), value.to_string());
            if let Some(en) = english {
                translations.insert(FALLBACK_LANGUAGE.to_string(), en);
            }
            Ok(())
        })
    }

    /// Appends `command` to the task's command list for `platform`.
    pub fn append_command(&mut self, name: &str, platform: Platform, command: &str) -> StoreResult<()> {
        let command = command.trim();
        if command.is_empty() {
            return Err(StoreError::InvalidInput("Command cannot be empty.".into()));
        }
        self.commit(|doc| {
            find_in(doc, name)?
                .commands_mut(platform)
                .push(command.to_string());
            Ok(())
        })
    }

    /// Sets the download URL for `platform`, or clears it with `None`.
    pub fn set_download_url(
        &mut self,
        name: &str,
        platform: Platform,
        url: Option<&str>,
    ) -> StoreResult<()> {
        let url = url.map(str::trim).filter(|u| !u.is_empty());
        self.commit(|doc| {
            let task = find_in(doc, name)?;
            match url {
                Some(u) => {
                    task.download_url
                        .insert(platform.as_str().to_string(), u.to_string());
                }
                None => {
                    task.download_url.remove(platform.as_str());
                }
            }
            Ok(())
        })
    }

    /// Removes the task. Deleting an absent name is a no-op and returns `false`.
    pub fn delete(&mut self, name: &str) -> StoreResult<bool> {
        if self.get(name).is_none() {
            log::debug!("Delete of absent task '{}' ignored", name);
            return Ok(false);
        }
        self.commit(|doc| {
            doc.tasks.retain(|t| t.name != name);
            Ok(())
        })?;
        log::info!("Deleted task '{}'", name);
        Ok(true)
    }

    /// Distinct category labels in `lang`, sorted.
    pub fn categories(&self, lang: &str) -> Vec<String> {
        self.document
            .tasks
            .iter()
            .filter_map(|t| pick_translation(&t.category, lang))
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Tasks whose category label in `lang` equals `category`.
    pub fn in_category(&self, lang: &str, category: &str) -> Vec<&Task> {
        self.document
            .tasks
            .iter()
            .filter(|t| pick_translation(&t.category, lang) == Some(category))
            .collect()
    }

    fn commit<F>(&mut self, mutate: F) -> StoreResult<()>
    where
        F: FnOnce(&mut TaskDocument) -> StoreResult<()>,
    {
        let mut next = self.document.clone();
        mutate(&mut next)?;
        document::save_json(&self.path, &next)?;
        self.document = next;
        Ok(())
    }
}

fn read_document(path: &Path) -> StoreResult<TaskDocument> {
    let doc: TaskDocument = document::load_json(path)?;
    document::ensure_unique_names(path, "task", doc.tasks.iter().map(|t| t.name.as_str()))?;
    Ok(doc)
}

fn find_in<'a>(doc: &'a mut TaskDocument, name: &str) -> StoreResult<&'a mut Task> {
    doc.tasks
        .iter_mut()
        .find(|t| t.name == name)
        .ok_or_else(|| not_found(name))
}

fn not_found(name: &str) -> StoreError {
    StoreError::NotFound {
        kind: RecordKind::Task,
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn empty_store() -> (TempDir, TaskStore) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, r#"{ "tasks": [] }"#).unwrap();
        let store = TaskStore::load(&path).unwrap();
        (dir, store)
    }

    fn vim() -> Task {
        Task::new("vim")
            .with_description("en", "Text editor")
            .with_category("en", "Editors")
            .with_commands(Platform::Linux, vec!["sudo apt install -y vim".into()])
    }

    #[test]
    fn test_create_then_find_returns_same_name() {
        let (_dir, mut store) = empty_store();
        store.create(vim()).unwrap();
        assert_eq!(store.find("vim").unwrap().name, "vim");
    }

    #[test]
    fn test_duplicate_create_is_rejected_and_length_unchanged() {
        let (_dir, mut store) = empty_store();
        store.create(vim()).unwrap();
        let err = store.create(vim()).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_then_find_is_not_found_and_absent_delete_is_noop() {
        let (_dir, mut store) = empty_store();
        store.create(vim()).unwrap();
        assert!(store.delete("vim").unwrap());
        assert!(matches!(store.find("vim"), Err(StoreError::NotFound { .. })));

        store.create(vim()).unwrap();
        assert!(!store.delete("emacs").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_mutations_are_persisted_to_disk() {
        let (_dir, mut store) = empty_store();
        store.create(vim()).unwrap();
        store
            .append_command("vim", Platform::Macos, "brew install vim")
            .unwrap();

        let reloaded = TaskStore::load(store.path()).unwrap();
        let task = reloaded.find("vim").unwrap();
        assert_eq!(task.commands(Platform::Macos), ["brew install vim"]);
        assert_eq!(task.commands(Platform::Linux), ["sudo apt install -y vim"]);
    }

    #[test]
    fn test_update_field_non_english_sets_english_from_translator() {
        let (_dir, mut store) = empty_store();
        store.create(Task::new("git")).unwrap();

        let mut translator = |text: &str, from: &str, to: &str| {
            assert_eq!((from, to), ("es", "en"));
            Some(format!("{} (en)", text))
        };
        store
            .update_field("git", TaskField::Description, "Control de versiones", "es", &mut translator)
            .unwrap();

        let task = store.find("git").unwrap();
        assert_eq!(task.description["es"], "Control de versiones");
        assert_eq!(task.description["en"], "Control de versiones (en)");
    }

    #[test]
    fn test_update_field_without_translation_leaves_english_unset() {
        let (_dir, mut store) = empty_store();
        store.create(Task::new("git")).unwrap();
        store
            .update_field("git", TaskField::Category, "Outils", "fr", &mut NoTranslation)
            .unwrap();
        let task = store.find("git").unwrap();
        assert_eq!(task.category.get("fr").map(String::as_str), Some("Outils"));
        assert!(!task.category.contains_key("en"));
    }

    #[test]
    fn test_update_field_on_absent_task_is_not_found() {
        let (_dir, mut store) = empty_store();
        let err = store
            .update_field("nope", TaskField::Description, "x", "en", &mut NoTranslation)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_set_and_clear_download_url() {
        let (_dir, mut store) = empty_store();
        store.create(vim()).unwrap();
        store
            .set_download_url("vim", Platform::Windows, Some("https://example.org/vim.exe"))
            .unwrap();
        assert_eq!(
            store.find("vim").unwrap().download_url(Platform::Windows),
            Some("https://example.org/vim.exe")
        );
        store.set_download_url("vim", Platform::Windows, None).unwrap();
        assert_eq!(store.find("vim").unwrap().download_url(Platform::Windows), None);
    }

    #[test]
    fn test_duplicate_names_on_disk_are_rejected_at_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, r#"{ "tasks": [ {"name":"a"}, {"name":"a"} ] }"#).unwrap();
        assert!(TaskStore::load(&path).is_err());
    }

    #[test]
    fn test_categories_are_distinct_and_sorted() {
        let (_dir, mut store) = empty_store();
        store.create(vim()).unwrap();
        store
            .create(Task::new("nano").with_category("en", "Editors"))
            .unwrap();
        store
            .create(Task::new("git").with_category("en", "Development"))
            .unwrap();
        assert_eq!(store.categories("en"), vec!["Development", "Editors"]);
        assert_eq!(store.in_category("en", "Editors").len(), 2);
    }
}
