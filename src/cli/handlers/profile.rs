use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;

use crate::{cli::handlers::commons, state::AppState};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Runs every task referenced by a profile, in order."
)]
struct ProfileArgs {
    /// Name of the profile to run.
    name: String,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let profile_args = ProfileArgs::try_parse_from(&args)?;
    if run_profile(state, &profile_args.name)? > 0 {
        return Err(anyhow!(state.tf(
            "runner",
            "profile_failed",
            &[("profile", profile_args.name.as_str())]
        )));
    }
    Ok(())
}

/// Runs the profile and prints the per-task reports. Returns the failure count.
pub fn run_profile(state: &mut AppState, name: &str) -> Result<usize> {
    let profile = state.profiles.find(name)?;
    if profile.tasks.is_empty() {
        commons::print_warning(&state.tf("profiles", "empty", &[("name", name)]));
        return Ok(0);
    }
    println!("{} {}", "▶".cyan(), name.bold());

    let report = state.run_profile(name)?;
    commons::print_profile_report(state, &report);
    Ok(report.failures())
}
