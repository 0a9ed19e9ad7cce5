//! External command execution
//!
//! Commands are spawned directly from an argv vector with an explicit working
//! directory. No shell is involved and the process-wide current directory is
//! never touched, so a failing command cannot leave the caller elsewhere.
//!
//! Calls block until the child exits. There is no timeout: a hanging git
//! process hangs the operation that started it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::debug;

use crate::error::{PodError, PodResult};

/// A single command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Program to execute (must be in PATH or absolute path)
    pub program: String,
    /// Arguments to pass to the program
    pub args: Vec<String>,
    /// Working directory for execution
    pub working_dir: PathBuf,
}

impl Command {
    pub fn new(program: impl Into<String>, working_dir: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Exit status and captured output of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Runs external commands on behalf of the submodule gateway
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion.
    ///
    /// A command that ran and exited non-zero is `Ok` with that status; only
    /// failing to start the process is an error.
    fn run(&self, command: &Command) -> PodResult<CommandOutput>;

    /// Run `command` and turn a non-zero exit into [`PodError::CommandFailed`]
    fn run_checked(&self, command: &Command) -> PodResult<CommandOutput> {
        let output = self.run(command)?;
        if output.success() {
            Ok(output)
        } else {
            Err(PodError::CommandFailed {
                command: command.to_string(),
                status: output.status,
            })
        }
    }
}

/// Spawns real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &Command) -> PodResult<CommandOutput> {
        debug!(
            "Running `{}` in {}",
            command,
            command.working_dir.display()
        );

        let output = std::process::Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.working_dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| PodError::Spawn {
                command: command.to_string(),
                source,
            })?;

        // Killed by a signal: no exit code, still a failure
        let status = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !stdout.trim().is_empty() {
            debug!("{}: {}", command.program, stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            debug!("{} (stderr): {}", command.program, stderr.trim_end());
        }
        debug!("`{}` exited with {}", command, status);

        Ok(CommandOutput {
            status,
            stdout,
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_display_joins_args() {
        let cmd = Command::new("git", "/tmp")
            .args(["submodule", "add"])
            .arg("https://example.com/qtcurl.git")
            .arg("qtcurl");
        assert_eq!(
            cmd.to_string(),
            "git submodule add https://example.com/qtcurl.git qtcurl"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_in_given_directory() {
        let temp_dir = TempDir::new().unwrap();
        let before = std::env::current_dir().unwrap();

        let output = SystemRunner
            .run(&Command::new("pwd", temp_dir.path()))
            .unwrap();

        assert!(output.success());
        let reported = PathBuf::from(output.stdout.trim()).canonicalize().unwrap();
        assert_eq!(reported, temp_dir.path().canonicalize().unwrap());
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let cmd = Command::new("sh", temp_dir.path()).args(["-c", "exit 3"]);

        let output = SystemRunner.run(&cmd).unwrap();
        assert_eq!(output.status, 3);

        let err = SystemRunner.run_checked(&cmd).unwrap_err();
        assert!(matches!(err, PodError::CommandFailed { status: 3, .. }));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let temp_dir = TempDir::new().unwrap();
        let cmd = Command::new("qtpods-no-such-program", temp_dir.path());

        let err = SystemRunner.run(&cmd).unwrap_err();
        assert!(matches!(err, PodError::Spawn { .. }));
    }
}
