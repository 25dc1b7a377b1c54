//! Share directory setup.
//!
//! Creates every share path (with parents) and hands it to the first declared
//! account with mode `755`. Ownership and mode are applied with `chown` and
//! `chmod`; their failures are warnings.

use std::fs;
use std::path::Path;

use tracing::{error, info, warn};

use crate::command_runner::CommandExecutor;
use crate::command_traits::CommandArgs;
use crate::commands::permissions::{ChmodArgs, ChownArgs};
use crate::config::{AuthEntry, ShareDockConfig};

/// Mode applied to every share directory.
pub const SHARE_MODE: &str = "755";

/// Per-run summary of directory work.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryReport {
    /// Directories that exist after the run.
    pub ready: usize,
    /// Paths that could not be created.
    pub failed: Vec<String>,
    /// Paths whose ownership or mode could not be applied.
    pub permission_warnings: Vec<String>,
}

/// Ensure each share directory exists and carries the default owner.
pub fn setup_share_directories<E: CommandExecutor + ?Sized>(
    config: &ShareDockConfig,
    executor: &E,
) -> DirectoryReport {
    let owner = config.default_owner();
    let mut report = DirectoryReport::default();

    for share in &config.share {
        let path = Path::new(&share.path);

        if executor.is_dry_run() {
            info!("[DRY RUN] Skipped: create directory {}", path.display());
        } else if let Err(e) = fs::create_dir_all(path) {
            error!("Could not create share directory {}: {}", path.display(), e);
            report.failed.push(share.path.clone());
            continue;
        }
        report.ready += 1;

        if let Some(owner) = owner {
            if let Err(reason) = apply_permissions(path, owner, executor) {
                warn!("Could not set permissions on {}: {}", path.display(), reason);
                report.permission_warnings.push(share.path.clone());
            }
        }
    }

    report
}

/// `chown user:group` then `chmod 755`. Both are attempted; the first error is returned.
fn apply_permissions<E: CommandExecutor + ?Sized>(
    path: &Path,
    owner: &AuthEntry,
    executor: &E,
) -> Result<(), String> {
    let chown = ChownArgs {
        user: owner.user.clone(),
        group: owner.group.clone(),
        path: path.to_path_buf(),
    };
    let chmod = ChmodArgs {
        mode: SHARE_MODE,
        path: path.to_path_buf(),
    };

    let chown_result = run_checked(&chown, executor);
    let chmod_result = run_checked(&chmod, executor);
    chown_result.and(chmod_result)
}

fn run_checked<A: CommandArgs, E: CommandExecutor + ?Sized>(
    args: &A,
    executor: &E,
) -> Result<(), String> {
    executor
        .execute(&args.invocation())
        .and_then(|output| output.ensure_success(args.program()))
        .map_err(|e| format!("{:#}", e))
}
