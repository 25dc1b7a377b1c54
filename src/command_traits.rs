//! Type-safe command argument contracts.
//!
//! Every external program this tool drives (`addgroup`, `adduser`, `chpasswd`,
//! `smbpasswd`, `chown`, `chmod`) has a struct implementing [`CommandArgs`].
//! The struct definition is the contract: flags are produced in one place and
//! the compiler catches a missing field.
//!
//! # Secrets
//!
//! Passwords never appear in `to_cli_args()`. Arguments are visible in
//! `/proc/<pid>/cmdline` to every user in the container; secrets travel on
//! stdin via `stdin()` instead, and [`CommandInvocation`]'s `Debug` output
//! redacts them.

use std::fmt;

/// Trait for typed command arguments.
///
/// # Contract
///
/// - `program()`: the executable name, resolved through `PATH`.
/// - `to_cli_args()`: arguments exactly as the program expects them.
/// - `stdin()`: data piped to the program's standard input, if any.
///
/// # Example
///
/// ```
/// use sharedock::command_traits::CommandArgs;
/// use sharedock::commands::account::AddGroupArgs;
///
/// let args = AddGroupArgs {
///     group: "users".to_string(),
///     gid: Some(100),
/// };
///
/// assert_eq!(args.program(), "addgroup");
/// assert_eq!(args.to_cli_args(), vec!["-g", "100", "--", "users"]);
/// ```
pub trait CommandArgs {
    /// Get the program name.
    fn program(&self) -> &'static str;

    /// Convert struct fields to command line arguments.
    fn to_cli_args(&self) -> Vec<String>;

    /// Data to write to the program's stdin.
    fn stdin(&self) -> Option<String> {
        None
    }

    /// Snapshot this command into a concrete invocation for an executor.
    fn invocation(&self) -> CommandInvocation {
        CommandInvocation {
            program: self.program(),
            args: self.to_cli_args(),
            stdin: self.stdin(),
        }
    }
}

/// A fully built command, ready to hand to a [`crate::command_runner::CommandExecutor`].
#[derive(Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: &'static str,
    pub args: Vec<String>,
    pub stdin: Option<String>,
}

impl CommandInvocation {
    /// `program arg1 arg2 ...` for log lines. Never includes stdin.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Debug for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandInvocation")
            .field("program", &self.program)
            .field("args", &self.args)
            .field(
                "stdin",
                &self
                    .stdin
                    .as_ref()
                    .map(|s| format!("<redacted {} bytes>", s.len())),
            )
            .finish()
    }
}
