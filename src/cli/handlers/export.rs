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
    about = "Exports a profile as <name>.json (task names) and <name>-full.json (task objects)."
)]
struct ExportArgs {
    /// The profile to export.
    profile: String,

    /// Directory the two files are written to.
    #[arg(long, default_value = ".")]
    out: String,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let export_args = ExportArgs::try_parse_from(&args)?;
    let out_dir = paths::resolve_user_path(&export_args.out)?;
    export_to(state, &export_args.profile, &out_dir)
}

pub fn export_to(state: &mut AppState, profile: &str, out_dir: &Path) -> Result<()> {
    let written = exchange::export_profile(&state.tasks, &state.profiles, profile, out_dir)
        .with_context(|| format!("Failed to export profile '{}'", profile))?;
    let minimal = written.minimal.display().to_string();
    let full = written.full.display().to_string();
    commons::print_success(&state.tf(
        "exchange",
        "exported",
        &[("minimal", minimal.as_str()), ("full", full.as_str())],
    ));
    Ok(())
}
