//! Pre-flight sanity checks for the runtime environment
//!
//! Verifies before provisioning that:
//! - The account and permission binaries are on `PATH`
//! - The process runs with root privileges (EUID 0)
//!
//! Findings are only logged. Every step that depends on them already
//! tolerates failure, and a partial bootstrap is more useful than none.

use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;

use tracing::{debug, warn};

/// Result of environment verification
#[derive(Debug)]
pub struct SanityCheckResult {
    pub missing_binaries: Vec<String>,
    pub is_root: bool,
}

impl SanityCheckResult {
    /// Returns true if all checks passed
    pub fn is_ok(&self) -> bool {
        self.missing_binaries.is_empty() && self.is_root
    }
}

/// Binaries invoked during provisioning and directory setup
pub const REQUIRED_BINARIES: &[&str] = &[
    "addgroup",  // busybox
    "adduser",   // busybox
    "chpasswd",  // busybox
    "smbpasswd", // samba
    "chown",
    "chmod",
];

/// Check if a binary is available in one of the `PATH` directories
fn binary_exists(name: &str, path_var: Option<&OsStr>) -> bool {
    let Some(paths) = path_var else {
        return false;
    };
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
    which::which_in(name, Some(paths), cwd).is_ok()
}

/// Check if running as root (EUID 0)
fn is_running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Perform all sanity checks and return the result
pub fn verify_environment() -> SanityCheckResult {
    let path_var = env::var_os("PATH");
    let missing = REQUIRED_BINARIES
        .iter()
        .filter(|binary| !binary_exists(binary, path_var.as_deref()))
        .map(|binary| (*binary).to_string())
        .collect();

    SanityCheckResult {
        missing_binaries: missing,
        is_root: is_running_as_root(),
    }
}

/// Log the findings of [`verify_environment`]
pub fn report(result: &SanityCheckResult) {
    if result.is_ok() {
        debug!("Pre-flight checks passed");
        return;
    }

    if !result.is_root {
        warn!("Not running as root; account and ownership changes will likely fail");
    }
    for binary in &result.missing_binaries {
        warn!("Required binary not found on PATH: {}", binary);
    }
}
