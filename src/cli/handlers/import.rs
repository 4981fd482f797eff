use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;

use crate::{
    cli::handlers::commons,
    core::{exchange, paths},
    state::AppState,
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Imports profiles from a JSON file (task names or complete task objects)."
)]
struct ImportArgs {
    /// The JSON file to import.
    file: String,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let import_args = ImportArgs::try_parse_from(&args)?;
    let path = paths::resolve_user_path(&import_args.file)?;
    import_file(state, &path)
}

pub fn import_file(state: &mut AppState, path: &Path) -> Result<()> {
    let lang = state.language().to_string();
    let summary = exchange::import_profiles(path, &mut state.tasks, &mut state.profiles, &lang)
        .with_context(|| format!("Failed to import '{}'", path.display()))?;

    let created = summary.profiles_created.len().to_string();
    let updated = summary.profiles_updated.len().to_string();
    let tasks = summary.tasks_created.len().to_string();
    commons::print_success(&state.tf(
        "exchange",
        "imported",
        &[
            ("created", created.as_str()),
            ("updated", updated.as_str()),
            ("tasks", tasks.as_str()),
        ],
    ));
    if !summary.tasks_skipped.is_empty() {
        let skipped = summary.tasks_skipped.join(", ");
        println!(
            "  {}",
            state.tf("exchange", "skipped_tasks", &[("tasks", skipped.as_str())])
        );
    }
    Ok(())
}
