//! Invocation of the external multiplexer binary.
//!
//! Every backend operation is one (or two) calls to `tmux`/`screen`. This
//! module owns spawning, output collection and the per-call timeout so the
//! backends only deal with arguments and text.

use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Timeout used when none is configured.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure to run a multiplexer command at all.
///
/// A command that runs and exits non-zero is not an error at this level;
/// callers inspect [`CommandOutput::code`] because "exit 1" often just
/// means "no such session".
#[derive(Debug, Error)]
pub enum CommandError {
    /// Executable missing
    #[error("{program}: not found in PATH")]
    NotFound {
        /// Program that was looked up
        program: String,
    },

    /// Spawning failed for another reason
    #[error("{program}: failed to start: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Collecting output failed
    #[error("{program}: failed to read output: {source}")]
    Io {
        /// Program being waited on
        program: String,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The command did not finish in time and was killed
    #[error("{program}: timed out after {}ms", .timeout.as_millis())]
    TimedOut {
        /// Program that hung
        program: String,
        /// Configured limit
        timeout: Duration,
    },
}

impl CommandError {
    /// Whether the executable itself is missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CommandError::NotFound { .. })
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code (None when killed by a signal)
    pub code: Option<i32>,
    /// Standard output, lossily decoded
    pub stdout: String,
    /// Standard error, lossily decoded
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the command exited with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// One-line description of a failed run, used in error messages.
    pub fn describe(&self) -> String {
        let status = match self.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        };
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            status
        } else {
            format!("{status} (stderr: {stderr})")
        }
    }
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// A multiplexer executable plus the arguments every call starts with.
///
/// Leading arguments carry global options such as tmux's `-L <socket>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    program: String,
    leading_args: Vec<String>,
    timeout: Duration,
}

impl Program {
    /// Program with no leading arguments and the default timeout.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Add an argument passed before every subcommand.
    pub fn leading_arg(mut self, arg: impl Into<String>) -> Self {
        self.leading_args.push(arg.into());
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Executable name or path.
    pub fn name(&self) -> &str {
        &self.program
    }

    /// Per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run with the given arguments.
    pub async fn run(&self, args: &[&str]) -> Result<CommandOutput, CommandError> {
        self.run_with_env(args, &[]).await
    }

    /// Run with the given arguments and extra environment variables.
    pub async fn run_with_env(
        &self,
        args: &[&str],
        envs: &[(&str, &str)],
    ) -> Result<CommandOutput, CommandError> {
        debug!(program = %self.program, ?args, "running multiplexer command");

        let child = Command::new(&self.program)
            .args(&self.leading_args)
            .args(args)
            .envs(envs.iter().copied())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    CommandError::NotFound {
                        program: self.program.clone(),
                    }
                } else {
                    CommandError::Spawn {
                        program: self.program.clone(),
                        source,
                    }
                }
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let output = CommandOutput::from(output);
                debug!(program = %self.program, code = ?output.code, "command finished");
                Ok(output)
            }
            Ok(Err(source)) => Err(CommandError::Io {
                program: self.program.clone(),
                source,
            }),
            Err(_) => {
                warn!(
                    "{} {:?} timed out after {:?}",
                    self.program, args, self.timeout
                );
                Err(CommandError::TimedOut {
                    program: self.program.clone(),
                    timeout: self.timeout,
                })
            }
        }
    }
}
