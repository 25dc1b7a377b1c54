//! Command execution
//!
//! All external programs run through a [`CommandExecutor`]. Production code uses
//! [`SystemExecutor`], which spawns the program and captures its output; tests
//! substitute a recording fake so provisioning logic can be checked without
//! touching the account database.
//!
//! A non-zero exit status is NOT an error at this layer. Callers decide what a
//! failure means (account creation tolerates it, for instance), so `execute`
//! only returns `Err` when the program could not be run at all.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::command_traits::CommandInvocation;

/// Runs built commands.
pub trait CommandExecutor {
    /// Run the command to completion.
    fn execute(&self, invocation: &CommandInvocation) -> Result<CommandOutput>;

    /// Whether side effects are being skipped.
    fn is_dry_run(&self) -> bool {
        false
    }
}

impl<E: CommandExecutor + ?Sized> CommandExecutor for &E {
    fn execute(&self, invocation: &CommandInvocation) -> Result<CommandOutput> {
        (**self).execute(invocation)
    }

    fn is_dry_run(&self) -> bool {
        (**self).is_dry_run()
    }
}

/// Spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor {
    dry_run: bool,
}

impl SystemExecutor {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

impl CommandExecutor for SystemExecutor {
    fn execute(&self, invocation: &CommandInvocation) -> Result<CommandOutput> {
        let command_line = invocation.command_line();

        if self.dry_run {
            info!("[DRY RUN] Skipped: {}", command_line);
            return Ok(CommandOutput::dry_run(&command_line));
        }

        info!("Running command: {}", command_line);

        let mut cmd = Command::new(invocation.program);
        cmd.args(&invocation.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn {}", invocation.program))?;

        if let Some(ref input) = invocation.stdin {
            // Dropped at the end of this block so the child sees EOF.
            let mut pipe = child
                .stdin
                .take()
                .with_context(|| format!("No stdin pipe for {}", invocation.program))?;
            pipe.write_all(input.as_bytes())
                .with_context(|| format!("Failed writing stdin of {}", invocation.program))?;
        }

        let output = child
            .wait_with_output()
            .with_context(|| format!("Failed waiting for {}", invocation.program))?;

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
            success: output.status.success(),
            dry_run: false,
        };

        if !result.stdout.trim().is_empty() {
            debug!("Command output: {}", result.stdout.trim());
        }
        if !result.success {
            debug!(
                "{} exited with code {}: {}",
                invocation.program,
                result.exit_code.unwrap_or(-1),
                result.stderr.trim()
            );
        }

        Ok(result)
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Output from a command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output from the command.
    pub stdout: String,
    /// Standard error from the command.
    pub stderr: String,
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Whether the command exited successfully (exit code 0).
    pub success: bool,
    /// The command was not actually run.
    pub dry_run: bool,
}

impl CommandOutput {
    /// A successful run with no output.
    pub fn succeeded() -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: Some(0),
            success: true,
            dry_run: false,
        }
    }

    /// A failed run with the given exit code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code: Some(exit_code),
            success: false,
            dry_run: false,
        }
    }

    fn dry_run(command_line: &str) -> Self {
        Self {
            stdout: format!("[DRY RUN] Skipped: {}\n", command_line),
            stderr: String::new(),
            exit_code: Some(0),
            success: true,
            dry_run: true,
        }
    }

    /// Check if the command succeeded and return an error if not.
    pub fn ensure_success(&self, context: &str) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            let code = self.exit_code.unwrap_or(-1);
            anyhow::bail!(
                "{} failed (exit code {}): {}",
                context,
                code,
                self.stderr.trim()
            )
        }
    }
}
