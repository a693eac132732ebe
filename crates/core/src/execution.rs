use std::path::Path;
use std::process::{Command, Stdio};

use log::info;

use crate::error::{Error, Result};

/// Exit status POSIX shells report when the command itself cannot be found.
const SHELL_COMMAND_NOT_FOUND: i32 = 127;

/// Captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs `command_line` through `shell -c` in `working_directory`, capturing
/// stdout and stderr. Blocks until the command exits.
///
/// # Errors
///
/// Returns [`Error::SubProcess`] if the shell cannot be launched,
/// [`Error::CommandNotFound`] if the shell reports an unknown command, and
/// [`Error::SubProcessExit`] for any other non-zero exit.
pub fn run_shell_command(
    shell: &str,
    command_line: &str,
    working_directory: &Path,
) -> Result<CommandOutput> {
    info!(
        "Executing `{}` with `{}` in `{}`",
        command_line,
        shell,
        working_directory.display()
    );

    let output = Command::new(shell)
        .arg("-c")
        .arg(command_line)
        .current_dir(working_directory)
        .stdin(Stdio::null())
        .output()?;

    let captured = CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    };

    if output.status.success() {
        return Ok(captured);
    }

    if output.status.code() == Some(SHELL_COMMAND_NOT_FOUND) {
        let program = command_line
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();
        return Err(Error::CommandNotFound(program));
    }

    Err(Error::SubProcessExit {
        status: output.status.to_string(),
        stderr: captured.stderr,
    })
}
