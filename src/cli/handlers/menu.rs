use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{
    cli::{
        handlers::{commons, export, import, lang, profile, profiles_menu, run, tasks_menu},
        prompt::PromptError,
    },
    core::paths,
    state::AppState,
};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Starts the interactive menu.")]
struct MenuArgs {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainEntry {
    RunTask,
    RunProfile,
    InstallPackage,
    ManageTasks,
    ManageProfiles,
    Import,
    Export,
    Languages,
    Exit,
}

impl MainEntry {
    const ALL: [Self; 9] = [
        Self::RunTask,
        Self::RunProfile,
        Self::InstallPackage,
        Self::ManageTasks,
        Self::ManageProfiles,
        Self::Import,
        Self::Export,
        Self::Languages,
        Self::Exit,
    ];

    fn key(self) -> &'static str {
        match self {
            Self::RunTask => "run_task",
            Self::RunProfile => "run_profile",
            Self::InstallPackage => "install_package",
            Self::ManageTasks => "manage_tasks",
            Self::ManageProfiles => "manage_profiles",
            Self::Import => "import",
            Self::Export => "export",
            Self::Languages => "languages",
            Self::Exit => "exit",
        }
    }
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    MenuArgs::try_parse_from(&args)?;

    loop {
        let Some(entry) = select_entry(state, "menu", "title", &MainEntry::ALL, MainEntry::key)?
        else {
            break;
        };
        let outcome = match entry {
            MainEntry::Exit => break,
            MainEntry::RunTask => run_task(state),
            MainEntry::RunProfile => run_profile(state),
            MainEntry::InstallPackage => install_package(state),
            MainEntry::ManageTasks => tasks_menu::show(state),
            MainEntry::ManageProfiles => profiles_menu::show(state),
            MainEntry::Import => import_flow(state),
            MainEntry::Export => export_flow(state),
            MainEntry::Languages => languages_menu(state),
        };
        if let Err(e) = outcome {
            if is_closed(&e) {
                break;
            }
            eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        }
    }

    println!("{}", state.t("menu", "goodbye"));
    Ok(())
}

/// Shows `entries` as a localized menu. `None` when the user backs out or
/// the input stream ends.
pub fn select_entry<E: Copy>(
    state: &mut AppState,
    ns: &str,
    title_key: &str,
    entries: &[E],
    key: fn(E) -> &'static str,
) -> Result<Option<E>> {
    let title = state.t(ns, title_key);
    let labels: Vec<String> = entries.iter().map(|e| state.t(ns, key(*e))).collect();
    match state.prompter.select(&title, &labels, 0) {
        Ok(choice) => Ok(choice.and_then(|i| entries.get(i).copied())),
        Err(PromptError::Closed) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn is_closed(error: &anyhow::Error) -> bool {
    matches!(error.downcast_ref::<PromptError>(), Some(PromptError::Closed))
}

fn run_task(state: &mut AppState) -> Result<()> {
    if let Some(name) = commons::choose_task(state)? {
        run::run_one(state, &name);
    }
    Ok(())
}

fn run_profile(state: &mut AppState) -> Result<()> {
    if let Some(name) = commons::choose_profile(state)? {
        profile::run_profile(state, &name)?;
    }
    Ok(())
}

/// Runs a name that need not be a known task, so unknown names go to the
/// package manager.
fn install_package(state: &mut AppState) -> Result<()> {
    if let Some(name) = commons::ask_text(state, "menu", "prompt_package", None)? {
        run::run_one(state, &name);
    }
    Ok(())
}

fn import_flow(state: &mut AppState) -> Result<()> {
    let Some(raw) = commons::ask_text(state, "exchange", "prompt_file", None)? else {
        return Ok(());
    };
    let path = paths::resolve_user_path(&raw)?;
    import::import_file(state, &path)
}

fn export_flow(state: &mut AppState) -> Result<()> {
    let Some(name) = commons::choose_profile(state)? else {
        return Ok(());
    };
    let Some(raw) = commons::ask_text(state, "exchange", "prompt_out_dir", Some("."))? else {
        return Ok(());
    };
    let out_dir = paths::resolve_user_path(&raw)?;
    export::export_to(state, &name, &out_dir)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LanguageEntry {
    Switch,
    FillMissing,
    EditEntry,
    Back,
}

impl LanguageEntry {
    const ALL: [Self; 4] = [Self::Switch, Self::FillMissing, Self::EditEntry, Self::Back];

    fn key(self) -> &'static str {
        match self {
            Self::Switch => "switch",
            Self::FillMissing => "fill_missing",
            Self::EditEntry => "edit_entry",
            Self::Back => "back",
        }
    }
}

fn languages_menu(state: &mut AppState) -> Result<()> {
    loop {
        lang::show_languages(state);
        let Some(entry) = select_entry(state, "lang", "title", &LanguageEntry::ALL, LanguageEntry::key)?
        else {
            return Ok(());
        };
        match entry {
            LanguageEntry::Back => return Ok(()),
            LanguageEntry::Switch => switch_language(state)?,
            LanguageEntry::FillMissing => {
                let code = state.language().to_string();
                lang::fill_missing(state, &code)?;
            }
            LanguageEntry::EditEntry => lang::edit_entry(state)?,
        }
    }
}

fn switch_language(state: &mut AppState) -> Result<()> {
    let mut codes: Vec<String> = state.strings.languages().into_iter().collect();
    let other = state.t("lang", "other");
    codes.push(other.clone());
    let current = codes
        .iter()
        .position(|c| c == state.language())
        .unwrap_or(0);

    let prompt = state.t("lang", "switch");
    let Some(code) = state
        .prompter
        .select(&prompt, &codes, current)?
        .and_then(|i| codes.get(i).cloned())
    else {
        return Ok(());
    };
    if code == other {
        if let Some(code) = commons::ask_text(state, "lang", "prompt_code", None)? {
            lang::switch_language(state, &code)?;
        }
        return Ok(());
    }
    lang::switch_language(state, &code)
}
