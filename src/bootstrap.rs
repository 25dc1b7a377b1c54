//! Bootstrap orchestration.
//!
//! Fixed sequence: load config, provision accounts, write smb.conf, write
//! exports, set up share directories. Only the load and the two writes can
//! fail the run; everything else is best-effort and ends up in [`RunSummary`].

use std::path::{Path, PathBuf};

use tracing::info;

use crate::accounts::{AccountStore, CommandAccountStore};
use crate::command_runner::{CommandExecutor, SystemExecutor};
use crate::config::{DEFAULT_CONFIG_PATH, ShareDockConfig};
use crate::error::Result;
use crate::nfs::{self, DEFAULT_EXPORTS_PATH};
use crate::provision::{self, ProvisionReport};
use crate::sanity;
use crate::shares::{self, DirectoryReport};
use crate::smb::{self, DEFAULT_SMB_CONF_PATH, SmbSettings};

/// Explicit startup parameters. Nothing below this reads the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub config_path: PathBuf,
    pub smb: SmbSettings,
    pub smb_conf_path: PathBuf,
    pub exports_path: PathBuf,
    /// Log commands and print generated files instead of applying anything.
    pub dry_run: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            smb: SmbSettings::default(),
            smb_conf_path: PathBuf::from(DEFAULT_SMB_CONF_PATH),
            exports_path: PathBuf::from(DEFAULT_EXPORTS_PATH),
            dry_run: false,
        }
    }
}

/// What a completed run did.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub accounts: ProvisionReport,
    pub shares: usize,
    pub exports: usize,
    pub directories: DirectoryReport,
}

impl RunSummary {
    /// One-line account of the run for the final log entry.
    pub fn headline(&self) -> String {
        format!(
            "{} share(s), {} NFS export(s), {} account(s) ready, {} account(s) failed, \
             {} share directory(ies) not created, {} permission warning(s)",
            self.shares,
            self.exports,
            self.accounts.ready(),
            self.accounts.failed(),
            self.directories.failed.len(),
            self.directories.permission_warnings.len()
        )
    }
}

/// Load the configured document and apply it to this system.
pub fn run(settings: &Settings) -> Result<RunSummary> {
    info!("Loading configuration from {}", settings.config_path.display());
    let config = ShareDockConfig::load_from_file(&settings.config_path)?;

    let preflight = sanity::verify_environment();
    sanity::report(&preflight);

    let executor = SystemExecutor::new(settings.dry_run);
    let store = CommandAccountStore::new(executor);
    apply(&config, settings, &store, &executor)
}

/// Apply an already-loaded document with the given account store and executor.
pub fn apply<S, E>(
    config: &ShareDockConfig,
    settings: &Settings,
    store: &S,
    executor: &E,
) -> Result<RunSummary>
where
    S: AccountStore + ?Sized,
    E: CommandExecutor + ?Sized,
{
    let accounts = provision::provision_accounts(&config.auth, store);

    let smb_conf = smb::render_smb_conf(config, &settings.smb);
    if settings.dry_run {
        print_generated(&settings.smb_conf_path, &smb_conf);
    } else {
        smb::write_smb_conf(&settings.smb_conf_path, &smb_conf)?;
    }

    let exports = nfs::render_exports(config);
    if settings.dry_run {
        print_generated(&settings.exports_path, &exports);
    } else {
        nfs::write_exports(&settings.exports_path, &exports)?;
    }

    let directories = shares::setup_share_directories(config, executor);

    Ok(RunSummary {
        accounts,
        shares: config.share.len(),
        exports: exports.lines().count(),
        directories,
    })
}

/// Render both generated files without touching the system.
pub fn render(config: &ShareDockConfig, settings: &Settings) -> Vec<(PathBuf, String)> {
    vec![
        (
            settings.smb_conf_path.clone(),
            smb::render_smb_conf(config, &settings.smb),
        ),
        (settings.exports_path.clone(), nfs::render_exports(config)),
    ]
}

fn print_generated(path: &Path, contents: &str) {
    info!("[DRY RUN] Skipped: write {}", path.display());
    println!("# ---- {} ----", path.display());
    print!("{}", contents);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.config_path, PathBuf::from("/data/config.yml"));
        assert_eq!(settings.smb_conf_path, PathBuf::from("/etc/samba/smb.conf"));
        assert_eq!(settings.exports_path, PathBuf::from("/etc/exports"));
        assert_eq!(settings.smb.workgroup, "WORKGROUP");
        assert_eq!(settings.smb.log_level, "0");
        assert!(!settings.dry_run);
    }

    #[test]
    fn test_render_pairs_paths_with_contents() {
        let config = ShareDockConfig::from_yaml_str(
            "share:\n  - name: pub\n    path: /srv/pub\n    nfs:\n      readonly: true\n",
        )
        .unwrap();
        let rendered = render(&config, &Settings::default());

        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0].0, PathBuf::from("/etc/samba/smb.conf"));
        assert!(rendered[0].1.contains("[pub]\npath = /srv/pub\n"));
        assert_eq!(rendered[1].1, "/srv/pub *(ro)\n");
    }

    #[test]
    fn test_headline_counts_directory_problems() {
        let summary = RunSummary {
            shares: 3,
            exports: 1,
            directories: DirectoryReport {
                ready: 2,
                failed: vec!["/srv/blocked".to_string()],
                permission_warnings: vec!["/srv/a".to_string(), "/srv/b".to_string()],
            },
            ..RunSummary::default()
        };

        let headline = summary.headline();
        assert!(headline.starts_with("3 share(s), 1 NFS export(s), 0 account(s) ready"));
        assert!(headline.contains("1 share directory(ies) not created"));
        assert!(headline.ends_with("2 permission warning(s)"));
    }

    #[test]
    fn test_run_missing_config() {
        let settings = Settings {
            config_path: PathBuf::from("/nonexistent/config.yml"),
            ..Settings::default()
        };
        let err = run(&settings).unwrap_err();
        assert!(err.is_config_failure());
    }
}
