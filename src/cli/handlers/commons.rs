// src/cli/handlers/commons.rs

// Shared pickers and report printers used by several handlers.

use anyhow::Result;
use colored::*;

use crate::{
    core::task_runner::{ProfileReport, RunOutcome, RunReport},
    models::{Platform, Task, pick_translation},
    state::AppState,
};

pub fn print_success(message: &str) {
    println!("{} {}", "✔".green(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "!".yellow().bold(), message.yellow());
}

/// `name - description`, using the best available description language.
pub fn task_label(task: &Task, lang: &str) -> String {
    match pick_translation(&task.description, lang) {
        Some(desc) if !desc.is_empty() => format!("{} - {}", task.name, desc),
        _ => task.name.clone(),
    }
}

/// Asks for a non-empty line. An empty answer means cancel.
pub fn ask_text(state: &mut AppState, ns: &str, key: &str, default: Option<&str>) -> Result<Option<String>> {
    let prompt = state.t(ns, key);
    let answer = state.prompter.input(&prompt, default)?;
    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

/// Lets the user pick a task, going through categories first when there is
/// more than one.
pub fn choose_task(state: &mut AppState) -> Result<Option<String>> {
    if state.tasks.is_empty() {
        print_warning(&state.t("tasks", "none"));
        return Ok(None);
    }
    let lang = state.language().to_string();

    let mut groups = state.tasks.categories(&lang);
    let has_uncategorized = state
        .tasks
        .list()
        .iter()
        .any(|t| pick_translation(&t.category, &lang).is_none());
    let uncategorized = state.t("tasks", "uncategorized");
    if has_uncategorized {
        groups.push(uncategorized.clone());
    }

    let category = if groups.len() > 1 {
        let prompt = state.t("tasks", "choose_category");
        match state.prompter.select(&prompt, &groups, 0)? {
            Some(i) => groups.get(i).cloned(),
            None => return Ok(None),
        }
    } else {
        None
    };

    let candidates: Vec<&Task> = match &category {
        Some(c) if has_uncategorized && *c == uncategorized => state
            .tasks
            .list()
            .iter()
            .filter(|t| pick_translation(&t.category, &lang).is_none())
            .collect(),
        Some(c) => state.tasks.in_category(&lang, c),
        None => state.tasks.list().iter().collect(),
    };
    let names: Vec<String> = candidates.iter().map(|t| t.name.clone()).collect();
    let labels: Vec<String> = candidates.iter().map(|t| task_label(t, &lang)).collect();

    let prompt = state.t("tasks", "choose");
    Ok(state
        .prompter
        .select(&prompt, &labels, 0)?
        .and_then(|i| names.get(i).cloned()))
}

pub fn choose_profile(state: &mut AppState) -> Result<Option<String>> {
    if state.profiles.is_empty() {
        print_warning(&state.t("profiles", "none"));
        return Ok(None);
    }
    let lang = state.language().to_string();
    let names: Vec<String> = state.profiles.list().iter().map(|p| p.name.clone()).collect();
    let labels: Vec<String> = state
        .profiles
        .list()
        .iter()
        .map(|p| match pick_translation(&p.description, &lang) {
            Some(desc) if desc != p.name => format!("{} - {}", p.name, desc),
            _ => p.name.clone(),
        })
        .collect();
    let prompt = state.t("profiles", "choose");
    Ok(state
        .prompter
        .select(&prompt, &labels, 0)?
        .and_then(|i| names.get(i).cloned()))
}

/// Picks a platform, defaulting to the one we are running on.
pub fn choose_platform(state: &mut AppState) -> Result<Option<Platform>> {
    let items: Vec<String> = Platform::ALL.iter().map(|p| p.to_string()).collect();
    let default = Platform::ALL
        .iter()
        .position(|p| *p == state.platform)
        .unwrap_or(0);
    let prompt = state.t("tasks", "choose_platform");
    Ok(state
        .prompter
        .select(&prompt, &items, default)?
        .and_then(|i| Platform::ALL.get(i).copied()))
}

pub fn print_run_report(state: &mut AppState, report: &RunReport) {
    let task = report.task.as_str();
    match &report.outcome {
        RunOutcome::Completed {
            attempted,
            failed,
            download_failed,
        } => {
            if *download_failed {
                print_warning(&state.tf("runner", "download_failed", &[("task", task)]));
            }
            if *failed == 0 {
                print_success(&state.tf("runner", "completed", &[("task", task)]));
            } else {
                let (failed, attempted) = (failed.to_string(), attempted.to_string());
                print_warning(&state.tf(
                    "runner",
                    "completed_with_failures",
                    &[("task", task), ("failed", failed.as_str()), ("attempted", attempted.as_str())],
                ));
            }
        }
        RunOutcome::FallbackInstalled {
            installed,
            recorded,
            ..
        } => {
            if *installed {
                print_success(&state.tf("runner", "fallback_installed", &[("task", task)]));
            } else {
                print_warning(&state.tf("runner", "fallback_failed", &[("task", task)]));
            }
            if *recorded {
                println!("  {}", state.tf("runner", "fallback_recorded", &[("task", task)]));
            }
        }
    }
}

pub fn print_profile_report(state: &mut AppState, report: &ProfileReport) {
    for (name, result) in &report.results {
        match result {
            Ok(run) => print_run_report(state, run),
            Err(e) => {
                let error = e.to_string();
                print_warning(&state.tf("runner", "failed", &[("task", name.as_str()), ("error", error.as_str())]));
            }
        }
    }
    let failed = report.failures();
    let ok = (report.results.len() - failed).to_string();
    let failed = failed.to_string();
    let summary = state.tf(
        "runner",
        "profile_summary",
        &[
            ("profile", report.profile.as_str()),
            ("ok", ok.as_str()),
            ("failed", failed.as_str()),
        ],
    );
    println!("\n{}", summary.bold());
}
