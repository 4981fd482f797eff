// src/system/executor.rs

use std::env;
use std::path::Path;
use std::process::{Command as StdCommand, ExitStatus, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("No command specified to run.")]
    EmptyCommand,
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
}

/// Outcome of one shell invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    pub success: bool,
    pub code: Option<i32>,
}

impl From<ExitStatus> for CommandStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

/// Something that can run a literal shell command line.
///
/// The system implementation blocks until the command exits; there is no
/// timeout. Tests substitute a recording implementation.
pub trait CommandShell {
    fn run(&self, command_line: &str) -> Result<CommandStatus, ExecutionError>;
}

/// Runs commands through the platform shell (`sh -c` / `cmd /C`) with the
/// terminal's stdio inherited.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShell;

impl CommandShell for SystemShell {
    fn run(&self, command_line: &str) -> Result<CommandStatus, ExecutionError> {
        execute_command(command_line)
    }
}

/// Executes a command line as a literal shell invocation and waits for it.
/// Output is not captured.
pub fn execute_command(command_line: &str) -> Result<CommandStatus, ExecutionError> {
    let trimmed_command = command_line.trim();
    if trimmed_command.is_empty() {
        return Err(ExecutionError::EmptyCommand);
    }

    let mut command = shell_command(trimmed_command);
    command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    log::debug!("Executing: {}", trimmed_command);
    let status = command
        .status()
        .map_err(|e| ExecutionError::CommandFailed(trimmed_command.to_string(), e))?;
    log::trace!("'{}' exited with {:?}", trimmed_command, status.code());
    Ok(status.into())
}

/// Runs a program with explicit arguments (no shell parsing).
pub fn execute_program(program: &str, args: &[&str]) -> Result<CommandStatus, ExecutionError> {
    log::debug!("Executing program: {} {:?}", program, args);
    StdCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map(CommandStatus::from)
        .map_err(|e| ExecutionError::CommandFailed(program.to_string(), e))
}

fn shell_command(command_line: &str) -> StdCommand {
    if cfg!(target_os = "windows") {
        let mut cmd = StdCommand::new("cmd");
        cmd.arg("/C").arg(command_line);
        cmd
    } else {
        let mut cmd = StdCommand::new("sh");
        cmd.arg("-c").arg(command_line);
        cmd
    }
}

/// Whether `executable_name` is found in any `PATH` directory.
pub fn is_executable_in_path(executable_name: &str) -> bool {
    let Ok(path_var) = env::var("PATH") else {
        return false;
    };
    let candidates: Vec<String> = if cfg!(target_os = "windows") {
        vec![
            executable_name.to_string(),
            format!("{}.exe", executable_name),
            format!("{}.cmd", executable_name),
        ]
    } else {
        vec![executable_name.to_string()]
    };
    env::split_paths(&path_var).any(|dir| {
        candidates
            .iter()
            .any(|candidate| Path::new(&dir).join(candidate).is_file())
    })
}
