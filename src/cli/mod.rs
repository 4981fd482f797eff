use clap::Parser;
use std::path::PathBuf;

pub mod handlers;
pub mod prompt;

use crate::state::StartupOptions;

/// setupkit: install software and run setup tasks from JSON-defined menus.
///
/// With no command, the interactive menu starts. Commands:
///   menu                         Interactive menu (default)
///   run <task>...                Run tasks by name
///   profile <name>               Run every task of a profile
///   list [tasks|profiles]        Show tasks (by category) or profiles
///   import <file>                Import profiles from a JSON file
///   export <profile> [--out DIR] Write <profile>.json and <profile>-full.json
///   lang [list|set|missing|fill] Inspect or edit the language document
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Language code for this session (e.g. `es`).
    #[arg(long, value_name = "CODE")]
    pub lang: Option<String>,

    /// Directory holding tasks.json, profiles.json and lang.json.
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<String>,

    /// Settings file to use instead of the default one.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Use numbered text prompts instead of interactive widgets.
    #[arg(long)]
    pub plain: bool,

    /// Never ask for missing translations.
    #[arg(long)]
    pub no_prompt: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// The command followed by its arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Cli {
    pub fn startup_options(&self) -> StartupOptions {
        StartupOptions {
            lang: self.lang.clone(),
            data_dir: self.data_dir.clone(),
            config: self.config.clone(),
            plain: self.plain,
            no_prompt: self.no_prompt,
        }
    }

    /// Splits the trailing arguments into the command name and its arguments.
    pub fn command(&self) -> (String, Vec<String>) {
        match self.args.split_first() {
            Some((name, rest)) => (name.clone(), rest.to_vec()),
            None => ("menu".to_string(), Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_then_command_args() {
        let cli = Cli::try_parse_from([
            "setupkit", "--lang", "es", "--plain", "export", "dev", "--out", "/tmp",
        ])
        .unwrap();
        assert_eq!(cli.lang.as_deref(), Some("es"));
        assert!(cli.plain);
        let (name, args) = cli.command();
        assert_eq!(name, "export");
        assert_eq!(args, vec!["dev", "--out", "/tmp"]);
    }

    #[test]
    fn test_no_command_defaults_to_menu() {
        let cli = Cli::try_parse_from(["setupkit", "--no-prompt"]).unwrap();
        assert!(cli.no_prompt);
        assert_eq!(cli.command(), ("menu".to_string(), vec![]));
    }
}
