//! sharedock library
//!
//! Turns one YAML document into the runtime state of a file-sharing
//! container: OS and Samba accounts, smb.conf, /etc/exports and share
//! directories. The `sharedock-init` binary is a thin CLI over [`bootstrap`].

pub mod accounts;
pub mod bootstrap;
pub mod cli;
pub mod command_runner;
pub mod command_traits;
pub mod commands;
pub mod config;
pub mod error;
pub mod nfs;
pub mod provision;
pub mod sanity;
pub mod shares;
pub mod smb;

// Re-export main types for convenience
pub use accounts::{AccountOutcome, AccountStore, CommandAccountStore};
pub use bootstrap::{RunSummary, Settings};
pub use command_runner::{CommandExecutor, CommandOutput, SystemExecutor};
pub use command_traits::{CommandArgs, CommandInvocation};
pub use config::{AuthEntry, OptionMap, OptionValue, ShareDockConfig, ShareEntry};
pub use error::ShareDockError;
pub use nfs::{NfsFlag, render_exports};
pub use provision::{AccountStatus, ProvisionReport};
pub use smb::{SmbSettings, render_smb_conf};
