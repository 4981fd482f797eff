//! # Task Runner
//!
//! Runs a task by name on the configured platform:
//!
//! - **Found:** the download URL for the platform (if any) is fetched and
//!   installed first, then each command runs in order as a literal shell
//!   invocation. Commands are fire-and-continue: a failing command is reported
//!   and the next one still runs, and the run is reported as completed.
//! - **Not found:** the platform's package manager is asked to install the
//!   task name as a package, and a minimal task record is appended for it.
//!   By default the record is written whatever the install outcome was;
//!   `strict_fallback` writes it only after a successful install.
//!
//! Profiles run their task references in order through the same path, with no
//! rollback between entries.

use crate::core::store::StoreError;
use crate::core::task_store::TaskStore;
use crate::models::{Platform, Profile, Task};
use crate::system::download::Downloader;
use crate::system::executor::{CommandShell, ExecutionError};
use crate::system::package_manager::PackageManager;
use colored::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Task '{name}' not found and no package manager is available on {platform}.")]
    NoPackageManager { name: String, platform: Platform },
    #[error("'{name}' cannot be used as a package identifier.")]
    InvalidPackageName { name: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

pub type RunnerResult<T> = Result<T, RunnerError>;

/// Explicit runtime configuration for a runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub platform: Platform,
    pub language: String,
    pub package_manager: Option<PackageManager>,
    /// Only record fallback tasks whose install succeeded.
    pub strict_fallback: bool,
    /// Description given to tasks recorded by the fallback path.
    pub placeholder_description: String,
}

impl RunnerConfig {
    pub fn new(platform: Platform, language: &str) -> Self {
        Self {
            platform,
            language: language.to_string(),
            package_manager: PackageManager::detect(platform),
            strict_fallback: false,
            placeholder_description: "Installed with the system package manager".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A known task ran. Every command was attempted.
    Completed {
        attempted: usize,
        failed: usize,
        download_failed: bool,
    },
    /// Unknown task; the package manager was invoked.
    FallbackInstalled {
        command: String,
        installed: bool,
        recorded: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub task: String,
    pub outcome: RunOutcome,
}

impl RunReport {
    /// A completed task always counts as success (fire-and-continue); a
    /// fallback counts as success when the package manager exited cleanly.
    pub fn is_success(&self) -> bool {
        match &self.outcome {
            RunOutcome::Completed { .. } => true,
            RunOutcome::FallbackInstalled { installed, .. } => *installed,
        }
    }
}

#[derive(Debug)]
pub struct ProfileReport {
    pub profile: String,
    pub results: Vec<(String, RunnerResult<RunReport>)>,
}

impl ProfileReport {
    pub fn failures(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, r)| !matches!(r, Ok(report) if report.is_success()))
            .count()
    }
}

pub struct TaskRunner<'a> {
    config: RunnerConfig,
    shell: &'a dyn CommandShell,
    downloader: &'a dyn Downloader,
}

impl std::fmt::Debug for TaskRunner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRunner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> TaskRunner<'a> {
    pub fn new(
        config: RunnerConfig,
        shell: &'a dyn CommandShell,
        downloader: &'a dyn Downloader,
    ) -> Self {
        Self {
            config,
            shell,
            downloader,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Looks `name` up in `tasks` and runs it, or falls back to the package manager.
    pub fn run_task(&self, tasks: &mut TaskStore, name: &str) -> RunnerResult<RunReport> {
        match tasks.get(name) {
            Some(task) => Ok(self.run_found(task)),
            None => self.run_fallback(tasks, name),
        }
    }

    /// Runs each task reference of `profile` in declared order.
    pub fn run_profile(&self, tasks: &mut TaskStore, profile: &Profile) -> ProfileReport {
        log::info!(
            "Running profile '{}' ({} tasks)",
            profile.name,
            profile.tasks.len()
        );
        let results = profile
            .tasks
            .iter()
            .map(|name| {
                println!("\n{} {}", "■".cyan(), name.bold());
                let result = self.run_task(tasks, name);
                if let Err(e) = &result {
                    log::warn!("Task '{}' in profile '{}' failed: {}", name, profile.name, e);
                }
                (name.clone(), result)
            })
            .collect();
        ProfileReport {
            profile: profile.name.clone(),
            results,
        }
    }

    fn run_found(&self, task: &Task) -> RunReport {
        let platform = self.config.platform;
        let mut download_failed = false;

        if let Some(url) = task.download_url(platform) {
            println!("{} {}", "↓".blue(), url.green());
            if let Err(e) = self.downloader.download_and_install(url, platform) {
                log::warn!("Download step for '{}' failed: {}", task.name, e);
                println!("{} {}", "Warning:".yellow(), e);
                download_failed = true;
            }
        }

        let commands = task.commands(platform);
        if commands.is_empty() && task.download_url(platform).is_none() {
            log::debug!("Task '{}' has nothing to run on {}", task.name, platform);
        }

        let mut failed = 0;
        for command in commands {
            println!("{} {}", "→".blue(), command.green());
            match self.shell.run(command) {
                Ok(status) if status.success => {}
                Ok(status) => {
                    failed += 1;
                    let code = status
                        .code
                        .map_or_else(|| "signal".to_string(), |c| c.to_string());
                    println!(
                        "{} '{}' exited with {}; continuing.",
                        "Warning:".yellow(),
                        command,
                        code
                    );
                }
                Err(e) => {
                    failed += 1;
                    println!("{} {}; continuing.", "Warning:".yellow(), e);
                }
            }
        }

        RunReport {
            task: task.name.clone(),
            outcome: RunOutcome::Completed {
                attempted: commands.len(),
                failed,
                download_failed,
            },
        }
    }

    fn run_fallback(&self, tasks: &mut TaskStore, name: &str) -> RunnerResult<RunReport> {
        let platform = self.config.platform;
        let pm = self
            .config
            .package_manager
            .ok_or_else(|| RunnerError::NoPackageManager {
                name: name.to_string(),
                platform,
            })?;
        let command = pm
            .install_command(name)
            .ok_or_else(|| RunnerError::InvalidPackageName {
                name: name.to_string(),
            })?;

        log::info!("Task '{}' not found; falling back to {}", name, pm);
        println!("{} {}", "→".blue(), command.green());
        let installed = match self.shell.run(&command) {
            Ok(status) => status.success,
            Err(e) => {
                println!("{} {}", "Warning:".yellow(), e);
                false
            }
        };

        let recorded = if installed || !self.config.strict_fallback {
            let task = Task::new(name)
                .with_description(&self.config.language, &self.config.placeholder_description)
                .with_commands(platform, vec![command.clone()]);
            tasks.create(task)?;
            true
        } else {
            log::info!("Install of '{}' failed; not recording it (strict mode)", name);
            false
        };

        Ok(RunReport {
            task: name.to_string(),
            outcome: RunOutcome::FallbackInstalled {
                command,
                installed,
                recorded,
            },
        })
    }
}
