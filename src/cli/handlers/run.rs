use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;

use crate::{cli::handlers::commons, state::AppState};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Runs tasks by name. Unknown names are installed with the system package manager."
)]
struct RunArgs {
    /// Names of the tasks to run, in order.
    #[arg(required = true)]
    tasks: Vec<String>,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let run_args = RunArgs::try_parse_from(&args)?;
    let mut failures = 0;

    for name in &run_args.tasks {
        println!("\n{} {}", "■".cyan(), name.bold());
        if !run_one(state, name) {
            failures += 1;
        }
    }

    if failures > 0 {
        let count = failures.to_string();
        return Err(anyhow!(state.tf("runner", "tasks_failed", &[("count", count.as_str())])));
    }
    Ok(())
}

/// Runs one task and prints its report. Returns whether it succeeded.
pub fn run_one(state: &mut AppState, name: &str) -> bool {
    match state.run_task(name) {
        Ok(report) => {
            commons::print_run_report(state, &report);
            report.is_success()
        }
        Err(e) => {
            let error = e.to_string();
            commons::print_warning(&state.tf(
                "runner",
                "failed",
                &[("task", name), ("error", error.as_str())],
            ));
            false
        }
    }
}
