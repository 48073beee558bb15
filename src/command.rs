// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! External command execution.
//!
//! Every call out to `kind` or `docker` goes through the [`CommandRunner`] trait.
//! The production implementation, [`ProcessRunner`], spawns the process with
//! `tokio::process`, captures stdout and stderr, and kills the child if it runs
//! longer than the configured timeout. Tests substitute an in-memory runner.
//!
//! [`Toolchain`] is the only place that knows the exact argv of each subcommand.
//!
//! # Example
//!
//! ```rust,no_run
//! use kind_native::command::{CommandRunner, ProcessRunner, Toolchain};
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let runner = ProcessRunner::new(Duration::from_secs(30));
//! let tools = Toolchain::default();
//! let listing = tools.get_clusters();
//! let output = runner.run(&listing).await?;
//! let stdout = output.into_stdout(&listing)?;
//! # Ok(())
//! # }
//! ```

use crate::constants::{DOCKER_BINARY, KIND_BINARY};
use crate::errors::CommandError;
use crate::metrics;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, error};

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the argument list starts with `prefix` (e.g. `["volume", "rm"]`).
    #[must_use]
    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        self.args.len() >= prefix.len() && self.args.iter().zip(prefix).all(|(a, p)| a == p)
    }

    /// File name of the program, used as a metrics label.
    #[must_use]
    pub fn program_label(&self) -> &str {
        Path::new(&self.program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.program)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a process that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed output with the given exit code and stderr.
    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout of a successful run, or [`CommandError::Failed`] otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Failed`] when the exit code is not zero.
    pub fn into_stdout(self, invocation: &Invocation) -> Result<String, CommandError> {
        if self.is_success() {
            Ok(self.stdout)
        } else {
            Err(CommandError::Failed {
                command: invocation.to_string(),
                exit_code: self.exit_code,
                stderr: self.stderr,
            })
        }
    }
}

/// Runs external commands.
///
/// Implementations return `Err` only when the process could not be run to
/// completion. A non-zero exit is reported as an `Ok` [`CommandOutput`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError>;
}

/// Runs an invocation and returns its stdout, treating a non-zero exit as an error.
///
/// # Errors
///
/// Returns a [`CommandError`] if the process could not be run or exited non-zero.
pub async fn run_checked(
    runner: &dyn CommandRunner,
    invocation: &Invocation,
) -> Result<String, CommandError> {
    runner.run(invocation).await?.into_stdout(invocation)
}

/// [`CommandRunner`] backed by real child processes.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        let command = invocation.to_string();
        debug!(%command, "Running external command");
        let start = Instant::now();

        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                error!(%command, error = %source, "Failed to spawn external command");
                metrics::record_command(invocation.program_label(), "spawn_error", start.elapsed());
                CommandError::Spawn {
                    command: command.clone(),
                    source,
                }
            })?;

        // Dropping the wait future on timeout drops the child, and kill_on_drop reaps it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                metrics::record_command(invocation.program_label(), "spawn_error", start.elapsed());
                return Err(CommandError::Spawn { command, source });
            }
            Err(_) => {
                let timeout_secs = self.timeout.as_secs();
                error!(%command, timeout_secs, "External command timed out");
                metrics::record_command(invocation.program_label(), "timeout", start.elapsed());
                return Err(CommandError::TimedOut {
                    command,
                    timeout: self.timeout,
                });
            }
        };

        let result = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        let status = if result.is_success() {
            "success"
        } else {
            "failure"
        };
        metrics::record_command(invocation.program_label(), status, start.elapsed());
        debug!(
            %command,
            exit_code = ?result.exit_code,
            elapsed_ms = start.elapsed().as_millis(),
            "External command finished"
        );

        Ok(result)
    }
}

/// Renders the `kind` and `docker` subcommands the provider uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub kind: String,
    pub docker: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            kind: KIND_BINARY.to_string(),
            docker: DOCKER_BINARY.to_string(),
        }
    }
}

impl Toolchain {
    pub fn new(kind: impl Into<String>, docker: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            docker: docker.into(),
        }
    }

    /// `kind create cluster --name <name> --config <path>`
    #[must_use]
    pub fn create_cluster(&self, name: &str, config_path: &Path) -> Invocation {
        Invocation::new(
            &self.kind,
            [
                "create".to_string(),
                "cluster".to_string(),
                "--name".to_string(),
                name.to_string(),
                "--config".to_string(),
                config_path.display().to_string(),
            ],
        )
    }

    /// `kind delete cluster --name <name>`
    #[must_use]
    pub fn delete_cluster(&self, name: &str) -> Invocation {
        Invocation::new(&self.kind, ["delete", "cluster", "--name", name])
    }

    /// `kind get clusters`
    #[must_use]
    pub fn get_clusters(&self) -> Invocation {
        Invocation::new(&self.kind, ["get", "clusters"])
    }

    /// `docker volume create --name=<name>`
    #[must_use]
    pub fn create_volume(&self, name: &str) -> Invocation {
        Invocation::new(
            &self.docker,
            [
                "volume".to_string(),
                "create".to_string(),
                format!("--name={name}"),
            ],
        )
    }

    /// `docker volume rm <name>`
    #[must_use]
    pub fn remove_volume(&self, name: &str) -> Invocation {
        Invocation::new(&self.docker, ["volume", "rm", name])
    }

    /// `docker volume ls --filter name=<name> --format {{.Name}}`
    #[must_use]
    pub fn list_volumes_named(&self, name: &str) -> Invocation {
        Invocation::new(
            &self.docker,
            [
                "volume".to_string(),
                "ls".to_string(),
                "--filter".to_string(),
                format!("name={name}"),
                "--format".to_string(),
                "{{.Name}}".to_string(),
            ],
        )
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod command_tests;
