//! Type-safe arguments for account management commands.
//!
//! This module provides typed argument structs for:
//! - `AddGroupArgs` for `addgroup`
//! - `AddUserArgs` for `adduser`
//! - `ChpasswdArgs` for `chpasswd` (password via stdin)
//! - `SmbPasswdAddArgs` for `smbpasswd -a` (password via stdin)
//! - `SmbPasswdEnableArgs` for `smbpasswd -e`
//!
//! Flags follow the busybox applets shipped in the container image. Names are
//! always placed after `--` so a leading `-` is never read as an option.

use crate::command_traits::CommandArgs;

// ============================================================================
// Add Group
// ============================================================================

/// Type-safe arguments for `addgroup`.
///
/// # Field to Flag Mapping
///
/// | Rust Field | CLI Flag | Notes |
/// |------------|----------|-------|
/// | `gid`      | `-g`     | Omitted when `None` |
/// | `group`    | (positional) | Group name |
#[derive(Debug, Clone)]
pub struct AddGroupArgs {
    /// Group name to create.
    pub group: String,
    /// Explicit numeric group id.
    pub gid: Option<u32>,
}

impl CommandArgs for AddGroupArgs {
    fn program(&self) -> &'static str {
        "addgroup"
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(4);
        if let Some(gid) = self.gid {
            args.push("-g".to_string());
            args.push(gid.to_string());
        }
        args.push("--".to_string());
        args.push(self.group.clone());
        args
    }
}

// ============================================================================
// Add User
// ============================================================================

/// Type-safe arguments for `adduser`.
///
/// Creates a system-style account: `-D` leaves the password unset (login
/// disabled until `chpasswd` runs) and `-H` skips the home directory.
///
/// # Field to Flag Mapping
///
/// | Rust Field | CLI Flag | Notes |
/// |------------|----------|-------|
/// | `uid`      | `-u`     | Omitted when `None` |
/// | `group`    | `-G`     | Primary group, must exist |
/// | `user`     | (positional) | Account name |
#[derive(Debug, Clone)]
pub struct AddUserArgs {
    pub user: String,
    pub group: String,
    pub uid: Option<u32>,
}

impl CommandArgs for AddUserArgs {
    fn program(&self) -> &'static str {
        "adduser"
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec!["-D".to_string(), "-H".to_string()];
        if let Some(uid) = self.uid {
            args.push("-u".to_string());
            args.push(uid.to_string());
        }
        args.push("-G".to_string());
        args.push(self.group.clone());
        args.push("--".to_string());
        args.push(self.user.clone());
        args
    }
}

// ============================================================================
// Set OS Password
// ============================================================================

/// Type-safe arguments for `chpasswd`.
///
/// Reads `user:password` lines from stdin; takes no arguments.
#[derive(Clone)]
pub struct ChpasswdArgs {
    pub user: String,
    pub password: String,
}

impl CommandArgs for ChpasswdArgs {
    fn program(&self) -> &'static str {
        "chpasswd"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![]
    }

    fn stdin(&self) -> Option<String> {
        Some(format!("{}:{}\n", self.user, self.password))
    }
}

// ============================================================================
// Samba Password Backend
// ============================================================================

/// Type-safe arguments for `smbpasswd -a -s <user>`.
///
/// `-s` makes smbpasswd read the new password from stdin twice
/// (entry + confirmation) instead of prompting on a terminal.
#[derive(Clone)]
pub struct SmbPasswdAddArgs {
    pub user: String,
    pub password: String,
}

impl CommandArgs for SmbPasswdAddArgs {
    fn program(&self) -> &'static str {
        "smbpasswd"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "-a".to_string(),
            "-s".to_string(),
            "--".to_string(),
            self.user.clone(),
        ]
    }

    fn stdin(&self) -> Option<String> {
        Some(format!("{0}\n{0}\n", self.password))
    }
}

/// Type-safe arguments for `smbpasswd -e <user>`.
#[derive(Debug, Clone)]
pub struct SmbPasswdEnableArgs {
    pub user: String,
}

impl CommandArgs for SmbPasswdEnableArgs {
    fn program(&self) -> &'static str {
        "smbpasswd"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["-e".to_string(), "--".to_string(), self.user.clone()]
    }
}

// ============================================================================
// Tests
// ============================================================================
