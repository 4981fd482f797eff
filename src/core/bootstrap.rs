//! # Bootstrap
//!
//! Makes sure the three core documents exist before any store is opened. A
//! present document is left alone. A missing one is downloaded when a URL is
//! configured for it, and seeded locally otherwise: the language document from
//! the copy bundled into the binary, tasks and profiles as empty collections.
//! A failed download is fatal for startup.

use crate::constants::{
    BUNDLED_LANGUAGE_DOCUMENT, LANGUAGE_FILENAME, PROFILES_FILENAME, TASKS_FILENAME,
};
use crate::core::document::{self, DocumentError};
use crate::core::settings::DocumentSources;
use crate::models::{ProfileDocument, TaskDocument};
use crate::system::download::{DownloadError, Downloader};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Could not download the {kind} document from '{url}': {source}")]
    Download {
        kind: DocumentKind,
        url: String,
        #[source]
        source: DownloadError,
    },
    #[error("Could not create a scratch directory: {0}")]
    Scratch(#[from] std::io::Error),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

pub type BootstrapResult<T> = Result<T, BootstrapError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Tasks,
    Profiles,
    Language,
}

impl DocumentKind {
    pub const ALL: [Self; 3] = [Self::Tasks, Self::Profiles, Self::Language];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Tasks => TASKS_FILENAME,
            Self::Profiles => PROFILES_FILENAME,
            Self::Language => LANGUAGE_FILENAME,
        }
    }

    fn source_url(self, sources: &DocumentSources) -> Option<&str> {
        let url = match self {
            Self::Tasks => &sources.tasks_url,
            Self::Profiles => &sources.profiles_url,
            Self::Language => &sources.language_url,
        };
        url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tasks => "task",
            Self::Profiles => "profile",
            Self::Language => "language",
        })
    }
}

/// How a document came to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Existing,
    Downloaded,
    Seeded,
}

/// Locations of the core documents inside a data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPaths {
    pub tasks: PathBuf,
    pub profiles: PathBuf,
    pub language: PathBuf,
}

impl DocumentPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            tasks: dir.join(TASKS_FILENAME),
            profiles: dir.join(PROFILES_FILENAME),
            language: dir.join(LANGUAGE_FILENAME),
        }
    }

    pub fn get(&self, kind: DocumentKind) -> &Path {
        match kind {
            DocumentKind::Tasks => &self.tasks,
            DocumentKind::Profiles => &self.profiles,
            DocumentKind::Language => &self.language,
        }
    }
}

/// Ensures every core document exists.
pub fn ensure_documents(
    paths: &DocumentPaths,
    sources: &DocumentSources,
    downloader: &dyn Downloader,
) -> BootstrapResult<Vec<(DocumentKind, Provenance)>> {
    DocumentKind::ALL
        .iter()
        .map(|&kind| {
            let provenance =
                ensure_document(kind, paths.get(kind), kind.source_url(sources), downloader)?;
            Ok((kind, provenance))
        })
        .collect()
}

pub fn ensure_document(
    kind: DocumentKind,
    path: &Path,
    url: Option<&str>,
    downloader: &dyn Downloader,
) -> BootstrapResult<Provenance> {
    if path.exists() {
        return Ok(Provenance::Existing);
    }

    match url {
        Some(url) => {
            log::info!("Downloading {} document from '{}'", kind, url);
            download_document(kind, path, url, downloader)?;
            Ok(Provenance::Downloaded)
        }
        None => {
            log::info!("Seeding {} document at '{}'", kind, path.display());
            seed_document(kind, path)?;
            Ok(Provenance::Seeded)
        }
    }
}

/// Fetches into a scratch directory and only installs the file once it parses.
fn download_document(
    kind: DocumentKind,
    path: &Path,
    url: &str,
    downloader: &dyn Downloader,
) -> BootstrapResult<()> {
    let scratch = tempfile::tempdir()?;
    let staged = scratch.path().join(kind.file_name());
    downloader
        .fetch(url, &staged)
        .map_err(|source| BootstrapError::Download {
            kind,
            url: url.to_string(),
            source,
        })?;

    let content = fs::read_to_string(&staged).map_err(|source| DocumentError::Io {
        path: staged.clone(),
        source,
    })?;
    let _: serde_json::Value = document::parse_json(path, &content)?;
    document::atomic_write(path, content.as_bytes())?;
    Ok(())
}

fn seed_document(kind: DocumentKind, path: &Path) -> BootstrapResult<()> {
    match kind {
        DocumentKind::Tasks => document::save_json(path, &TaskDocument::default())?,
        DocumentKind::Profiles => document::save_json(path, &ProfileDocument::default())?,
        DocumentKind::Language => {
            document::atomic_write(path, BUNDLED_LANGUAGE_DOCUMENT.as_bytes())?
        }
    }
    Ok(())
}
