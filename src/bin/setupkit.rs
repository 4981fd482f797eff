// src/bin/setupkit.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;
use setupkit::{
    cli::{Cli, handlers},
    state::AppState,
};

// --- Command Definition and Registry ---

/// A command, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &mut AppState) -> Result<()>,
}

/// Every command the binary understands. Each handler parses its own arguments.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "menu",
        aliases: &[],
        handler: handlers::menu::handle,
    },
    CommandDefinition {
        name: "run",
        aliases: &["install"],
        handler: handlers::run::handle,
    },
    CommandDefinition {
        name: "profile",
        aliases: &[],
        handler: handlers::profile::handle,
    },
    CommandDefinition {
        name: "list",
        aliases: &["ls"],
        handler: handlers::list::handle,
    },
    CommandDefinition {
        name: "import",
        aliases: &[],
        handler: handlers::import::handle,
    },
    CommandDefinition {
        name: "export",
        aliases: &[],
        handler: handlers::export::handle,
    },
    CommandDefinition {
        name: "lang",
        aliases: &["language"],
        handler: handlers::lang::handle,
    },
];

fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run_cli(cli) {
        // Handler argument errors (including `--help`) render themselves.
        if let Some(clap_err) = e.downcast_ref::<clap::Error>() {
            clap_err.exit();
        }
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let (name, args) = cli.command();
    let command = find_command(&name).ok_or_else(|| {
        let known: Vec<&str> = COMMAND_REGISTRY.iter().map(|c| c.name).collect();
        anyhow!("Unknown command '{}'. Available: {}", name, known.join(", "))
    })?;

    let mut state = AppState::bootstrap(&cli.startup_options())?;
    (command.handler)(args, &mut state)
}
