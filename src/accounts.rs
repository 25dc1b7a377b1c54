//! Account storage capability.
//!
//! [`AccountStore`] is the narrow interface the provisioner talks to. Every
//! operation reports an [`AccountOutcome`] instead of failing, so the
//! provisioner applies one tolerance policy no matter how accounts are stored.
//!
//! [`CommandAccountStore`] implements it on top of the busybox account applets
//! and `smbpasswd`.

use tracing::debug;

use crate::command_runner::{CommandExecutor, CommandOutput};
use crate::command_traits::CommandArgs;
use crate::commands::account::{
    AddGroupArgs, AddUserArgs, ChpasswdArgs, SmbPasswdAddArgs, SmbPasswdEnableArgs,
};

/// Exit status `groupadd`/`useradd` use for "name already in use".
const SHADOW_EXISTS_EXIT_CODE: i32 = 9;

/// Result of a single account operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountOutcome {
    /// The change was made.
    Applied,
    /// The group or user was already there.
    AlreadyExists,
    /// Anything else. Carries a human-readable reason.
    Failed(String),
}

impl AccountOutcome {
    /// True unless the operation failed outright.
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Operations needed to provision one share account.
pub trait AccountStore {
    /// Create `group`, with `gid` when given.
    fn ensure_group(&self, group: &str, gid: Option<u32>) -> AccountOutcome;

    /// Create a no-home, no-login `user` whose primary group is `group`.
    fn ensure_user(&self, user: &str, group: &str, uid: Option<u32>) -> AccountOutcome;

    /// Set the OS login password.
    fn set_password(&self, user: &str, password: &str) -> AccountOutcome;

    /// Register `user` with the SMB password backend and enable the entry.
    fn register_share_auth(&self, user: &str, password: &str) -> AccountOutcome;
}

/// [`AccountStore`] backed by external commands.
#[derive(Debug, Clone)]
pub struct CommandAccountStore<E> {
    executor: E,
}

impl<E: CommandExecutor> CommandAccountStore<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    fn run<A: CommandArgs>(&self, args: &A) -> Result<CommandOutput, String> {
        self.executor
            .execute(&args.invocation())
            .map_err(|e| format!("{:#}", e))
    }

    /// Run a creation command, telling "already exists" apart from real failures.
    fn create<A: CommandArgs>(&self, args: &A, kind: &str, name: &str) -> AccountOutcome {
        match self.run(args) {
            Ok(output) if output.success => AccountOutcome::Applied,
            Ok(output) if reports_existing(&output, kind, name) => {
                debug!("{} {} already exists", kind, name);
                AccountOutcome::AlreadyExists
            }
            Ok(output) => AccountOutcome::Failed(describe_failure(args.program(), &output)),
            Err(reason) => AccountOutcome::Failed(reason),
        }
    }

    fn update<A: CommandArgs>(&self, args: &A) -> AccountOutcome {
        match self.run(args) {
            Ok(output) if output.success => AccountOutcome::Applied,
            Ok(output) => AccountOutcome::Failed(describe_failure(args.program(), &output)),
            Err(reason) => AccountOutcome::Failed(reason),
        }
    }
}

impl<E: CommandExecutor> AccountStore for CommandAccountStore<E> {
    fn ensure_group(&self, group: &str, gid: Option<u32>) -> AccountOutcome {
        let args = AddGroupArgs {
            group: group.to_string(),
            gid,
        };
        self.create(&args, "group", group)
    }

    fn ensure_user(&self, user: &str, group: &str, uid: Option<u32>) -> AccountOutcome {
        let args = AddUserArgs {
            user: user.to_string(),
            group: group.to_string(),
            uid,
        };
        self.create(&args, "user", user)
    }

    fn set_password(&self, user: &str, password: &str) -> AccountOutcome {
        self.update(&ChpasswdArgs {
            user: user.to_string(),
            password: password.to_string(),
        })
    }

    fn register_share_auth(&self, user: &str, password: &str) -> AccountOutcome {
        let added = self.update(&SmbPasswdAddArgs {
            user: user.to_string(),
            password: password.to_string(),
        });
        if !added.is_ok() {
            return added;
        }

        self.update(&SmbPasswdEnableArgs {
            user: user.to_string(),
        })
    }
}

/// busybox: `addgroup: group 'users' in use`; shadow: `group 'users' already exists` / exit 9.
fn reports_existing(output: &CommandOutput, kind: &str, name: &str) -> bool {
    if output.exit_code == Some(SHADOW_EXISTS_EXIT_CODE) {
        return true;
    }
    let stderr = output.stderr.as_str();
    let quoted = format!("{} '{}'", kind, name);
    stderr.contains(&format!("{} in use", quoted))
        || stderr.contains(&format!("{} already exists", quoted))
}

fn describe_failure(program: &str, output: &CommandOutput) -> String {
    let code = output
        .exit_code
        .map_or_else(|| "signal".to_string(), |c| c.to_string());
    let stderr = output.stderr.trim();
    if stderr.is_empty() {
        format!("{} exited with {}", program, code)
    } else {
        format!("{} exited with {}: {}", program, code, stderr)
    }
}
