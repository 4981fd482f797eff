use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::*;

use crate::{
    cli::handlers::commons,
    constants::FALLBACK_LANGUAGE,
    core::settings,
    state::AppState,
};

/// Typed during `fill` to stop early.
const STOP_WORD: &str = ":q";

#[derive(Subcommand, Debug)]
enum LangAction {
    /// Shows the active language and the languages present in the document.
    List,
    /// Makes `code` the active language and saves it in the settings.
    Set { code: String },
    /// Lists keys with no text in `code` (default: the active language).
    Missing { code: Option<String> },
    /// Asks for each missing text in `code` and stores the answers.
    Fill { code: Option<String> },
    /// Stores one text directly.
    Edit {
        /// Dotted key, e.g. `menu.run_task`.
        key: String,
        text: String,
        #[arg(long)]
        code: Option<String>,
    },
}

#[derive(Parser, Debug)]
#[command(no_binary_name = true, about = "Inspects and edits the language document.")]
struct LangArgs {
    #[command(subcommand)]
    action: Option<LangAction>,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let lang_args = LangArgs::try_parse_from(&args)?;
    match lang_args.action.unwrap_or(LangAction::List) {
        LangAction::List => show_languages(state),
        LangAction::Set { code } => switch_language(state, &code)?,
        LangAction::Missing { code } => {
            let code = code.unwrap_or_else(|| state.language().to_string());
            show_missing(state, &code);
        }
        LangAction::Fill { code } => {
            let code = code.unwrap_or_else(|| state.language().to_string());
            fill_missing(state, &code)?;
        }
        LangAction::Edit { key, text, code } => {
            let code = code.unwrap_or_else(|| state.language().to_string());
            state.strings.set(&key, &code, &text)?;
            commons::print_success(&state.t("lang", "saved"));
        }
    }
    Ok(())
}

pub fn show_languages(state: &mut AppState) {
    let current = state.language().to_string();
    let available = state
        .strings
        .languages()
        .into_iter()
        .collect::<Vec<_>>()
        .join(", ");
    println!("{}", state.tf("lang", "current", &[("lang", current.as_str())]));
    println!("{}", state.tf("lang", "available", &[("langs", available.as_str())]));
}

/// Switches the session language and persists the choice.
pub fn switch_language(state: &mut AppState, raw: &str) -> Result<()> {
    let code = settings::parse_language_tag(raw)
        .ok_or_else(|| anyhow!("'{}' is not a language code", raw))?;
    state.strings.set_language(&code);
    state.settings.language = Some(code.clone());
    state
        .settings
        .save(&state.settings_path)
        .with_context(|| format!("Failed to save '{}'", state.settings_path.display()))?;
    commons::print_success(&state.tf("lang", "switched", &[("lang", code.as_str())]));
    Ok(())
}

pub fn show_missing(state: &mut AppState, code: &str) {
    let missing = state.strings.missing_keys(code);
    if missing.is_empty() {
        commons::print_success(&state.tf("lang", "none_missing", &[("lang", code)]));
        return;
    }
    let count = missing.len().to_string();
    println!(
        "{}",
        state.tf("lang", "missing_count", &[("count", count.as_str()), ("lang", code)])
    );
    for key in missing {
        println!("  {}", key.dimmed());
    }
}

/// Walks every key lacking a `code` text and asks for it. An empty answer
/// skips the key; `:q` stops.
pub fn fill_missing(state: &mut AppState, code: &str) -> Result<usize> {
    let missing = state.strings.missing_keys(code);
    if missing.is_empty() {
        commons::print_success(&state.tf("lang", "none_missing", &[("lang", code)]));
        return Ok(0);
    }
    println!("{}", state.t("lang", "stop_hint").dimmed());

    let mut stored = 0;
    for key in missing {
        let entries = state.strings.entries(&key);
        let reference = entries
            .get(FALLBACK_LANGUAGE)
            .or_else(|| entries.values().next())
            .cloned()
            .unwrap_or_default();
        let prompt = format!("{} ({}) \"{}\"", key.cyan(), code, reference);
        let answer = state.prompter.input(&prompt, None)?;
        let answer = answer.trim();
        if answer == STOP_WORD {
            break;
        }
        if answer.is_empty() {
            continue;
        }
        state.strings.set(&key, code, answer)?;
        stored += 1;
    }

    let count = stored.to_string();
    commons::print_success(&state.tf("lang", "filled", &[("count", count.as_str())]));
    Ok(stored)
}

/// Prompts for a key and a text, then stores it for the active language.
pub fn edit_entry(state: &mut AppState) -> Result<()> {
    let Some(key) = commons::ask_text(state, "lang", "prompt_key", None)? else {
        return Ok(());
    };
    let code = state.language().to_string();
    let current = state.strings.entries(&key).get(&code).cloned();
    let label = state.tf("lang", "prompt_text", &[("lang", code.as_str())]);
    let text = state.prompter.input(&label, current.as_deref())?;
    if text.trim().is_empty() {
        println!("{}", state.t("common", "cancelled"));
        return Ok(());
    }
    state.strings.set(&key, &code, text.trim())?;
    commons::print_success(&state.t("lang", "saved"));
    Ok(())
}
