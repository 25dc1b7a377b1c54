use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::bootstrap::Settings;
use crate::config::DEFAULT_CONFIG_PATH;
use crate::nfs::DEFAULT_EXPORTS_PATH;
use crate::smb::{DEFAULT_LOG_LEVEL, DEFAULT_SMB_CONF_PATH, DEFAULT_WORKGROUP, SmbSettings};

/// sharedock - container bootstrap for Samba and NFS file sharing
///
/// Every option can also be set through its environment variable, so the
/// container entrypoint can run the binary with no arguments.
#[derive(Parser, Debug)]
#[command(name = "sharedock-init")]
#[command(about = "Provision accounts and render Samba/NFS configuration from a YAML document")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration document
    #[arg(long, global = true, env = "CONFIG_FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Samba workgroup written to the [global] section
    #[arg(long, global = true, env = "SAMBA_WORKGROUP", default_value = DEFAULT_WORKGROUP)]
    pub workgroup: String,

    /// Samba `log level` value
    #[arg(long, global = true, env = "SAMBA_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub samba_log_level: String,

    /// Where to write the Samba configuration
    #[arg(long, global = true, env = "SMB_CONF_PATH", default_value = DEFAULT_SMB_CONF_PATH)]
    pub smb_conf: PathBuf,

    /// Where to write the NFS exports table
    #[arg(long, global = true, env = "NFS_EXPORTS_PATH", default_value = DEFAULT_EXPORTS_PATH)]
    pub exports: PathBuf,

    /// Dry-run mode: show what would be executed without making changes.
    ///
    /// Account and permission commands are logged but not run, generated
    /// files are printed to stdout, and no directories are created.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Apply the configuration (the default when no command is given)
    Apply,
    /// Load and validate the configuration document without applying it
    Validate,
    /// Print the Samba configuration and exports that would be written
    Render,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The explicit settings handed to the bootstrap.
    pub fn settings(&self) -> Settings {
        Settings {
            config_path: self.config.clone(),
            smb: SmbSettings {
                workgroup: self.workgroup.clone(),
                log_level: self.samba_log_level.clone(),
            },
            smb_conf_path: self.smb_conf.clone(),
            exports_path: self.exports.clone(),
            dry_run: self.dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["sharedock-init"]).unwrap();
        assert!(cli.command.is_none());

        // Environment may override defaults on a developer machine; only check
        // what cannot come from there.
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_cli_flags_build_settings() {
        let cli = Cli::try_parse_from([
            "sharedock-init",
            "--config",
            "/tmp/c.yml",
            "--workgroup",
            "HOME",
            "--samba-log-level",
            "3",
            "--smb-conf",
            "/tmp/smb.conf",
            "--exports",
            "/tmp/exports",
            "--dry-run",
            "render",
        ])
        .unwrap();

        assert_eq!(cli.command, Some(Commands::Render));
        let settings = cli.settings();
        assert_eq!(settings.config_path, PathBuf::from("/tmp/c.yml"));
        assert_eq!(settings.smb.workgroup, "HOME");
        assert_eq!(settings.smb.log_level, "3");
        assert_eq!(settings.smb_conf_path, PathBuf::from("/tmp/smb.conf"));
        assert_eq!(settings.exports_path, PathBuf::from("/tmp/exports"));
        assert!(settings.dry_run);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["sharedock-init", "validate", "--config", "/x.yml"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Validate));
        assert_eq!(cli.config, PathBuf::from("/x.yml"));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
