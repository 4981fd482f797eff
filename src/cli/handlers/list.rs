use anyhow::Result;
use clap::{Parser, ValueEnum};
use colored::*;
use std::collections::BTreeMap;

use crate::{
    cli::handlers::commons,
    models::{Platform, Task, pick_translation},
    state::AppState,
};

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum ListKind {
    #[default]
    Tasks,
    Profiles,
}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Lists tasks grouped by category, or profiles.")]
struct ListArgs {
    /// What to list.
    #[arg(value_enum, default_value_t = ListKind::Tasks)]
    what: ListKind,

    /// Only show tasks that have commands or a download for this platform.
    #[arg(long)]
    platform: Option<Platform>,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let list_args = ListArgs::try_parse_from(&args)?;
    match list_args.what {
        ListKind::Tasks => print_tasks(state, list_args.platform),
        ListKind::Profiles => print_profiles(state),
    }
    Ok(())
}

fn print_tasks(state: &mut AppState, platform: Option<Platform>) {
    if state.tasks.is_empty() {
        commons::print_warning(&state.t("tasks", "none"));
        return;
    }
    let lang = state.language().to_string();
    let uncategorized = state.t("tasks", "uncategorized");

    let mut groups: BTreeMap<String, Vec<&Task>> = BTreeMap::new();
    for task in state.tasks.list() {
        if let Some(p) = platform
            && !task.has_platform(p)
            && task.download_url(p).is_none()
        {
            continue;
        }
        let category = pick_translation(&task.category, &lang)
            .map(str::to_string)
            .unwrap_or_else(|| uncategorized.clone());
        groups.entry(category).or_default().push(task);
    }

    for (category, tasks) in &groups {
        println!("\n{}", category.yellow().bold());
        for task in tasks {
            let platforms: Vec<&str> = Platform::ALL
                .iter()
                .filter(|p| task.has_platform(**p) || task.download_url(**p).is_some())
                .map(|p| p.as_str())
                .collect();
            println!(
                "  {} {}",
                commons::task_label(task, &lang).cyan(),
                format!("[{}]", platforms.join(", ")).dimmed()
            );
        }
    }
}

fn print_profiles(state: &mut AppState) {
    if state.profiles.is_empty() {
        commons::print_warning(&state.t("profiles", "none"));
        return;
    }
    let lang = state.language().to_string();
    for profile in state.profiles.list() {
        let title = match pick_translation(&profile.description, &lang) {
            Some(desc) if desc != profile.name => format!("{} - {}", profile.name, desc),
            _ => profile.name.clone(),
        };
        println!("\n{}", title.cyan().bold());
        for task in &profile.tasks {
            let marker = if state.tasks.get(task).is_some() {
                "•".green()
            } else {
                "?".yellow()
            };
            println!("  {} {}", marker, task);
        }
    }
}
