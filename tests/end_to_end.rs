use setupkit::core::bootstrap::{self, DocumentPaths, Provenance};
use setupkit::core::exchange;
use setupkit::core::profile_store::ProfileStore;
use setupkit::core::settings::DocumentSources;
use setupkit::core::strings::{LocalizedStrings, Source, TranslationRequest};
use setupkit::core::task_runner::{RunOutcome, RunnerConfig, TaskRunner};
use setupkit::core::task_store::TaskStore;
use setupkit::models::{Platform, Profile};
use setupkit::system::download::{DownloadError, Downloader};
use setupkit::system::executor::{CommandShell, CommandStatus, ExecutionError};
use setupkit::system::package_manager::PackageManager;
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

/// Records every command line and reports a fixed exit code.
struct RecordingShell {
    ran: RefCell<Vec<String>>,
    exit_code: i32,
}

impl RecordingShell {
    fn exiting_with(exit_code: i32) -> Self {
        Self {
            ran: RefCell::new(Vec::new()),
            exit_code,
        }
    }
}

impl CommandShell for RecordingShell {
    fn run(&self, command_line: &str) -> Result<CommandStatus, ExecutionError> {
        self.ran.borrow_mut().push(command_line.to_string());
        Ok(CommandStatus {
            success: self.exit_code == 0,
            code: Some(self.exit_code),
        })
    }
}

struct OfflineDownloader;

impl Downloader for OfflineDownloader {
    fn fetch(&self, _url: &str, _dest: &Path) -> Result<(), DownloadError> {
        Err(DownloadError::NetworkUnavailable {
            probe: "offline".into(),
        })
    }

    fn download_and_install(&self, url: &str, _platform: Platform) -> Result<(), DownloadError> {
        self.fetch(url, Path::new("unused"))
    }
}

fn linux_runner_config() -> RunnerConfig {
    RunnerConfig {
        platform: Platform::Linux,
        language: "en".into(),
        package_manager: Some(PackageManager::Apt),
        strict_fallback: false,
        placeholder_description: "Installed with the system package manager".into(),
    }
}

/// A data directory with seeded documents, as on a fresh install.
fn fresh_install() -> (TempDir, DocumentPaths) {
    let dir = tempdir().unwrap();
    let paths = DocumentPaths::in_dir(dir.path());
    bootstrap::ensure_documents(&paths, &DocumentSources::default(), &OfflineDownloader).unwrap();
    (dir, paths)
}

#[test]
fn known_task_runs_its_single_command_and_reports_success_despite_exit_code() {
    let (_dir, paths) = fresh_install();
    fs::write(
        &paths.tasks,
        r#"{ "tasks": [ { "name": "vim", "linux": ["sudo apt install -y vim"] } ] }"#,
    )
    .unwrap();
    let mut tasks = TaskStore::load(&paths.tasks).unwrap();
    let shell = RecordingShell::exiting_with(100);
    let runner = TaskRunner::new(linux_runner_config(), &shell, &OfflineDownloader);

    let report = runner.run_task(&mut tasks, "vim").unwrap();

    assert_eq!(*shell.ran.borrow(), vec!["sudo apt install -y vim"]);
    assert!(report.is_success());
    assert_eq!(
        report.outcome,
        RunOutcome::Completed {
            attempted: 1,
            failed: 1,
            download_failed: false
        }
    );
}

#[test]
fn unknown_task_falls_back_to_package_manager_and_is_recorded() {
    let (_dir, paths) = fresh_install();
    let mut tasks = TaskStore::load(&paths.tasks).unwrap();
    let shell = RecordingShell::exiting_with(0);
    let runner = TaskRunner::new(linux_runner_config(), &shell, &OfflineDownloader);

    runner.run_task(&mut tasks, "foo").unwrap();

    assert_eq!(*shell.ran.borrow(), vec!["sudo apt install -y foo"]);
    let reloaded = TaskStore::load(&paths.tasks).unwrap();
    let foo = reloaded.find("foo").unwrap();
    assert_eq!(foo.commands(Platform::Linux).len(), 1);
    assert!(!foo.has_platform(Platform::Windows));
    assert!(!foo.has_platform(Platform::Macos));
    assert!(!foo.description.is_empty());
}

#[test]
fn download_failure_is_reported_and_commands_still_run() {
    let (_dir, paths) = fresh_install();
    fs::write(
        &paths.tasks,
        r#"{ "tasks": [ { "name": "code", "linux": ["code --version"],
             "download_url": { "linux": "https://example.org/code.deb" } } ] }"#,
    )
    .unwrap();
    let mut tasks = TaskStore::load(&paths.tasks).unwrap();
    let shell = RecordingShell::exiting_with(0);
    let runner = TaskRunner::new(linux_runner_config(), &shell, &OfflineDownloader);

    let report = runner.run_task(&mut tasks, "code").unwrap();

    assert_eq!(*shell.ran.borrow(), vec!["code --version"]);
    assert!(matches!(
        report.outcome,
        RunOutcome::Completed {
            download_failed: true,
            ..
        }
    ));
}

#[test]
fn profile_with_dangling_reference_installs_it_and_keeps_going() {
    let (_dir, paths) = fresh_install();
    fs::write(
        &paths.tasks,
        r#"{ "tasks": [ { "name": "git", "linux": ["git --version"] } ] }"#,
    )
    .unwrap();
    let mut tasks = TaskStore::load(&paths.tasks).unwrap();
    let mut profiles = ProfileStore::load(&paths.profiles).unwrap();
    profiles
        .create(Profile::new("dev").with_tasks(["htop", "git"]))
        .unwrap();

    let shell = RecordingShell::exiting_with(0);
    let runner = TaskRunner::new(linux_runner_config(), &shell, &OfflineDownloader);
    let report = runner.run_profile(&mut tasks, profiles.find("dev").unwrap());

    assert_eq!(report.failures(), 0);
    assert_eq!(
        *shell.ran.borrow(),
        vec!["git --version", "sudo apt install -y htop"]
    );
    assert!(tasks.get("htop").is_some());
}

#[test]
fn exported_minimal_profile_imports_back_to_the_same_name_set() {
    let (dir, paths) = fresh_install();
    let mut tasks = TaskStore::load(&paths.tasks).unwrap();
    let mut profiles = ProfileStore::load(&paths.profiles).unwrap();
    profiles
        .create(Profile::new("media").with_tasks(["vlc", "gimp", "vlc", "audacity"]))
        .unwrap();
    let before = profiles.find("media").unwrap().tasks.clone();

    let out = dir.path().join("exports");
    let written = exchange::export_profile(&tasks, &profiles, "media", &out).unwrap();
    profiles.delete("media").unwrap();
    exchange::import_profiles(&written.minimal, &mut tasks, &mut profiles, "en").unwrap();

    assert_eq!(profiles.find("media").unwrap().tasks, before);
    assert_eq!(before, vec!["audacity", "gimp", "vlc"]);
}

#[test]
fn english_fallback_and_humanized_keys_without_prompting() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lang.json");
    fs::write(&path, r#"{ "greet": { "en": "Hello" } }"#).unwrap();
    let mut strings = LocalizedStrings::load(&path, "fr").unwrap();

    let greet = strings.resolve("greet", None);
    assert_eq!(greet.text, "Hello");
    assert_eq!(greet.source, Source::Fallback);
    assert_eq!(strings.resolve_or_supply("not_set_key", None, None), "not set key");

    let mut asked = Vec::new();
    let mut record = |request: &TranslationRequest<'_>| {
        asked.push(request.key.to_string());
        Some("Bonjour".to_string())
    };
    assert_eq!(strings.resolve_or_supply("greet", None, Some(&mut record)), "Bonjour");
    drop(record);
    assert_eq!(asked, vec!["greet"]);

    let reloaded = LocalizedStrings::load(&path, "fr").unwrap();
    assert_eq!(reloaded.text("greet", None), "Bonjour");
}

#[test]
fn bundled_language_document_has_english_and_spanish_for_every_key() {
    let (_dir, paths) = fresh_install();
    let strings = LocalizedStrings::load(&paths.language, "en").unwrap();
    assert!(strings.missing_keys("en").is_empty());
    assert!(strings.missing_keys("es").is_empty());
    assert!(strings.languages().contains("es"));
}

#[test]
fn seeded_documents_are_reported_as_seeded_then_existing() {
    let dir = tempdir().unwrap();
    let paths = DocumentPaths::in_dir(dir.path());
    let first =
        bootstrap::ensure_documents(&paths, &DocumentSources::default(), &OfflineDownloader)
            .unwrap();
    assert!(first.iter().all(|(_, p)| *p == Provenance::Seeded));
    let second =
        bootstrap::ensure_documents(&paths, &DocumentSources::default(), &OfflineDownloader)
            .unwrap();
    assert!(second.iter().all(|(_, p)| *p == Provenance::Existing));
}
