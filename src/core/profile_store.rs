//! # Profile Store
//!
//! Named collections of task references backed by `profiles.json`. Mirrors the
//! task store: copy, mutate, write atomically, swap. Task references are kept
//! sorted and deduplicated on every mutation; they are not checked against the
//! task store.

use crate::core::document;
use crate::core::store::{RecordKind, StoreError, StoreResult, validate_name};
use crate::models::{Profile, ProfileDocument};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct ProfileStore {
    path: PathBuf,
    document: ProfileDocument,
}

impl ProfileStore {
    pub fn load(path: &Path) -> StoreResult<Self> {
        let document = read_document(path)?;
        log::debug!(
            "Loaded {} profiles from '{}'",
            document.profiles.len(),
            path.display()
        );
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    pub fn reload(&mut self) -> StoreResult<()> {
        self.document = read_document(&self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> &[Profile] {
        &self.document.profiles
    }

    pub fn len(&self) -> usize {
        self.document.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.profiles.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.document.profiles.iter().find(|p| p.name == name)
    }

    pub fn find(&self, name: &str) -> StoreResult<&Profile> {
        self.get(name).ok_or_else(|| not_found(name))
    }

    /// Appends a new profile. Fails with `DuplicateKey` if the name is taken.
    pub fn create(&mut self, mut profile: Profile) -> StoreResult<()> {
        profile.name = validate_name(RecordKind::Profile, &profile.name)?;
        if self.get(&profile.name).is_some() {
            return Err(StoreError::DuplicateKey {
                kind: RecordKind::Profile,
                name: profile.name,
            });
        }
        profile.normalize_tasks();
        log::info!("Creating profile '{}'", profile.name);
        self.commit(|doc| {
            doc.profiles.push(profile);
            Ok(())
        })
    }

    pub fn update_description(&mut self, name: &str, lang: &str, text: &str) -> StoreResult<()> {
        self.commit(|doc| {
            find_in(doc, name)?
                .description
                .insert(lang.to_string(), text.to_string());
            Ok(())
        })
    }

    /// Adds `task` to the profile's references as a set union.
    pub fn add_task_ref(&mut self, name: &str, task: &str) -> StoreResult<()> {
        let task = validate_name(RecordKind::Task, task)?;
        self.commit(|doc| {
            let profile = find_in(doc, name)?;
            profile.tasks.push(task);
            profile.normalize_tasks();
            Ok(())
        })
    }

    /// Set union of `tasks` into the profile's references in a single write.
    pub fn add_task_refs<I, S>(&mut self, name: &str, tasks: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tasks = tasks
            .into_iter()
            .map(|t| validate_name(RecordKind::Task, t.as_ref()))
            .collect::<StoreResult<Vec<_>>>()?;
        self.commit(|doc| {
            let profile = find_in(doc, name)?;
            profile.tasks.extend(tasks);
            profile.normalize_tasks();
            Ok(())
        })
    }

    /// Removes `task` from the profile's references. Returns whether it was there.
    pub fn remove_task_ref(&mut self, name: &str, task: &str) -> StoreResult<bool> {
        if !self.find(name)?.tasks.iter().any(|t| t == task) {
            return Ok(false);
        }
        self.commit(|doc| {
            let profile = find_in(doc, name)?;
            profile.tasks.retain(|t| t != task);
            profile.normalize_tasks();
            Ok(())
        })?;
        Ok(true)
    }

    /// Removes the profile. Deleting an absent name is a no-op and returns `false`.
    pub fn delete(&mut self, name: &str) -> StoreResult<bool> {
        if self.get(name).is_none() {
            log::debug!("Delete of absent profile '{}' ignored", name);
            return Ok(false);
        }
        self.commit(|doc| {
            doc.profiles.retain(|p| p.name != name);
            Ok(())
        })?;
        log::info!("Deleted profile '{}'", name);
        Ok(true)
    }

    /// Profiles that reference `task`.
    pub fn referencing(&self, task: &str) -> Vec<&Profile> {
        self.document
            .profiles
            .iter()
            .filter(|p| p.tasks.iter().any(|t| t == task))
            .collect()
    }

    fn commit<F>(&mut self, mutate: F) -> StoreResult<()>
    where
        F: FnOnce(&mut ProfileDocument) -> StoreResult<()>,
    {
        let mut next = self.document.clone();
        mutate(&mut next)?;
        document::save_json(&self.path, &next)?;
        self.document = next;
        Ok(())
    }
}

fn read_document(path: &Path) -> StoreResult<ProfileDocument> {
    let doc: ProfileDocument = document::load_json(path)?;
    document::ensure_unique_names(
        path,
        "profile",
        doc.profiles.iter().map(|p| p.name.as_str()),
    )?;
    Ok(doc)
}

fn find_in<'a>(doc: &'a mut ProfileDocument, name: &str) -> StoreResult<&'a mut Profile> {
    doc.profiles
        .iter_mut()
        .find(|p| p.name == name)
        .ok_or_else(|| not_found(name))
}

fn not_found(name: &str) -> StoreError {
    StoreError::NotFound {
        kind: RecordKind::Profile,
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn store_with_dev() -> (TempDir, ProfileStore) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        fs::write(&path, r#"{ "profiles": [] }"#).unwrap();
        let mut store = ProfileStore::load(&path).unwrap();
        store
            .create(Profile::new("dev").with_description("en", "Developer workstation"))
            .unwrap();
        (dir, store)
    }

    #[test]
    fn test_add_task_ref_twice_keeps_single_occurrence() {
        let (_dir, mut store) = store_with_dev();
        store.add_task_ref("dev", "vim").unwrap();
        store.add_task_ref("dev", "vim").unwrap();
        let refs = &store.find("dev").unwrap().tasks;
        assert_eq!(refs.iter().filter(|t| *t == "vim").count(), 1);
    }

    #[test]
    fn test_task_refs_are_kept_sorted() {
        let (_dir, mut store) = store_with_dev();
        for task in ["vim", "curl", "git"] {
            store.add_task_ref("dev", task).unwrap();
        }
        assert_eq!(store.find("dev").unwrap().tasks, vec!["curl", "git", "vim"]);
    }

    #[test]
    fn test_duplicate_profile_is_rejected() {
        let (_dir, mut store) = store_with_dev();
        let err = store.create(Profile::new("dev")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_absent_profile_is_noop() {
        let (_dir, mut store) = store_with_dev();
        assert!(!store.delete("gaming").unwrap());
        assert_eq!(store.len(), 1);
        assert!(store.delete("dev").unwrap());
        assert!(matches!(store.find("dev"), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_remove_task_ref_and_description_update_persist() {
        let (_dir, mut store) = store_with_dev();
        store.add_task_ref("dev", "vim").unwrap();
        store.add_task_ref("dev", "git").unwrap();
        assert!(store.remove_task_ref("dev", "vim").unwrap());
        assert!(!store.remove_task_ref("dev", "vim").unwrap());
        store.update_description("dev", "es", "Estación de desarrollo").unwrap();

        let reloaded = ProfileStore::load(store.path()).unwrap();
        let dev = reloaded.find("dev").unwrap();
        assert_eq!(dev.tasks, vec!["git"]);
        assert_eq!(dev.description["es"], "Estación de desarrollo");
        assert_eq!(reloaded.referencing("git").len(), 1);
    }

    #[test]
    fn test_add_task_ref_to_missing_profile_is_not_found() {
        let (_dir, mut store) = store_with_dev();
        let err = store.add_task_ref("gaming", "steam").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
