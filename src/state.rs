// src/state.rs

use crate::cli::prompt::{DialoguerPrompter, PlainPrompter, Prompter, has_terminal};
use crate::constants::LANG_ENV_VAR;
use crate::core::bootstrap::{self, DocumentPaths};
use crate::core::paths;
use crate::core::profile_store::ProfileStore;
use crate::core::settings::{self, Settings, UiMode};
use crate::core::strings::{LocalizedStrings, MissingTranslation, TranslationRequest, interpolate};
use crate::core::task_runner::{ProfileReport, RunReport, RunnerConfig, RunnerResult, TaskRunner};
use crate::core::task_store::TaskStore;
use crate::models::{Platform, TaskField};
use crate::system::download::{Downloader, SystemDownloader};
use crate::system::executor::{CommandShell, SystemShell};
use crate::system::package_manager::PackageManager;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Overrides collected from global command-line flags.
#[derive(Debug, Default, Clone)]
pub struct StartupOptions {
    pub lang: Option<String>,
    pub data_dir: Option<String>,
    pub config: Option<PathBuf>,
    pub plain: bool,
    pub no_prompt: bool,
}

/// Everything one session works with: settings, the three stores, and the
/// collaborators that talk to the user and the system.
pub struct AppState {
    pub settings: Settings,
    pub settings_path: PathBuf,
    pub platform: Platform,
    pub package_manager: Option<PackageManager>,
    pub strings: LocalizedStrings,
    pub tasks: TaskStore,
    pub profiles: ProfileStore,
    pub prompter: Box<dyn Prompter>,
    pub shell: Box<dyn CommandShell>,
    pub downloader: Box<dyn Downloader>,
}

impl AppState {
    /// Loads settings, ensures the core documents exist, and opens the stores.
    pub fn bootstrap(options: &StartupOptions) -> Result<Self> {
        let settings_path = match &options.config {
            Some(path) => path.clone(),
            None => paths::get_settings_path()?,
        };
        let mut settings = Settings::load_or_create(&settings_path)
            .with_context(|| format!("Failed to load settings from '{}'", settings_path.display()))?;

        if let Some(dir) = &options.data_dir {
            settings.data_dir = Some(dir.clone());
        }
        if options.plain {
            settings.ui = UiMode::Plain;
        }
        if options.no_prompt {
            settings.interactive_strings = false;
        }

        let language = match options.lang.as_deref() {
            Some(raw) => settings::parse_language_tag(raw).unwrap_or_else(|| raw.to_string()),
            None => settings.resolve_language(
                env::var(LANG_ENV_VAR).ok().as_deref(),
                env::var("LANG").ok().as_deref(),
            ),
        };
        log::debug!("Active language: {}", language);

        let data_dir = settings.data_dir()?;
        let documents = DocumentPaths::in_dir(&data_dir);
        let downloader = SystemDownloader::new(settings.connectivity_probe.clone());
        bootstrap::ensure_documents(&documents, &settings.documents, &downloader)
            .context("Cannot start without the task, profile and language documents")?;

        let strings = LocalizedStrings::load(&documents.language, &language)?;
        let tasks = TaskStore::load(&documents.tasks)?;
        let profiles = ProfileStore::load(&documents.profiles)?;

        let rich = match settings.ui {
            UiMode::Dialog => true,
            UiMode::Plain => false,
            UiMode::Auto => has_terminal(),
        };
        let prompter: Box<dyn Prompter> = if rich {
            Box::new(DialoguerPrompter::new())
        } else {
            let notice = strings.text("invalid_choice", Some("common"));
            Box::new(PlainPrompter::stdio().with_invalid_notice(notice))
        };

        let platform = Platform::current();
        Ok(Self {
            package_manager: PackageManager::detect(platform),
            platform,
            settings,
            settings_path,
            strings,
            tasks,
            profiles,
            prompter,
            shell: Box::new(SystemShell),
            downloader: Box::new(downloader),
        })
    }

    pub fn language(&self) -> &str {
        self.strings.language()
    }

    /// Localized UI text for `key` in namespace `ns`. When interactive strings
    /// are enabled, a missing translation is asked for once and stored.
    pub fn t(&mut self, ns: &str, key: &str) -> String {
        if !self.settings.interactive_strings {
            return self.strings.text(key, Some(ns));
        }
        let mut supplier = PromptSupplier {
            prompter: self.prompter.as_mut(),
        };
        let handler: &mut dyn MissingTranslation = &mut supplier;
        self.strings.resolve_or_supply(key, Some(ns), Some(handler))
    }

    /// [`Self::t`] with `{placeholder}` substitution.
    pub fn tf(&mut self, ns: &str, key: &str, values: &[(&str, &str)]) -> String {
        interpolate(&self.t(ns, key), values)
    }

    /// Updates a task's description or category in the active language, asking
    /// for an English version when the active language is not English.
    pub fn update_task_field(&mut self, name: &str, field: TaskField, value: &str) -> Result<()> {
        let label = self.t("tasks", "prompt_english_version");
        let language = self.language().to_string();
        let mut translator = PromptTranslator {
            prompter: self.prompter.as_mut(),
            label,
        };
        self.tasks
            .update_field(name, field, value, &language, &mut translator)?;
        Ok(())
    }

    pub fn run_task(&mut self, name: &str) -> RunnerResult<RunReport> {
        let config = self.runner_config();
        let runner = TaskRunner::new(config, self.shell.as_ref(), self.downloader.as_ref());
        runner.run_task(&mut self.tasks, name)
    }

    pub fn run_profile(&mut self, name: &str) -> Result<ProfileReport> {
        let profile = self.profiles.find(name)?.clone();
        let config = self.runner_config();
        let runner = TaskRunner::new(config, self.shell.as_ref(), self.downloader.as_ref());
        Ok(runner.run_profile(&mut self.tasks, &profile))
    }

    fn runner_config(&mut self) -> RunnerConfig {
        RunnerConfig {
            platform: self.platform,
            language: self.language().to_string(),
            package_manager: self.package_manager,
            strict_fallback: self.settings.strict_fallback,
            placeholder_description: self.t("runner", "placeholder_description"),
        }
    }
}

/// Asks the user for a missing UI string.
struct PromptSupplier<'a, P: ?Sized> {
    prompter: &'a mut P,
}

impl<P: Prompter + ?Sized> MissingTranslation for PromptSupplier<'_, P> {
    fn supply(&mut self, request: &TranslationRequest<'_>) -> Option<String> {
        let key = match request.namespace {
            Some(ns) => format!("{}.{}", ns, request.key),
            None => request.key.to_string(),
        };
        let prompt = format!(
            "[{}] {} (\"{}\")",
            request.language, key, request.fallback
        );
        match self.prompter.input(&prompt, None) {
            Ok(text) => Some(text),
            Err(e) => {
                log::debug!("No translation supplied for '{}': {}", key, e);
                None
            }
        }
    }
}

/// Asks the user for the English rendering of text typed in another language.
struct PromptTranslator<'a, P: ?Sized> {
    prompter: &'a mut P,
    label: String,
}

impl<P: Prompter + ?Sized> crate::core::task_store::Translator for PromptTranslator<'_, P> {
    fn translate(&mut self, text: &str, _from: &str, _to: &str) -> Option<String> {
        let prompt = interpolate(&self.label, &[("text", text)]);
        self.prompter.input(&prompt, None).ok()
    }
}
