//! Samba configuration generator.
//!
//! Output layout:
//!
//! ```text
//! [global]
//! workgroup = WORKGROUP
//! server string = ShareDock Server
//! security = user
//! passdb backend = tdbsam
//! log level = 0
//! map to guest = Bad User
//! <global lines from the document>
//!
//! [<share name>]
//! path = <share path>
//! <key> = <value>
//! ```

use std::fs;
use std::path::Path;

use tracing::info;

use crate::config::{OptionValue, ShareDockConfig};
use crate::error::{Result, ShareDockError};

/// Where smbd reads its configuration.
pub const DEFAULT_SMB_CONF_PATH: &str = "/etc/samba/smb.conf";

pub const DEFAULT_WORKGROUP: &str = "WORKGROUP";
pub const DEFAULT_LOG_LEVEL: &str = "0";
pub const SERVER_STRING: &str = "ShareDock Server";

/// Process-level inputs to the `[global]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmbSettings {
    pub workgroup: String,
    /// Passed through verbatim; Samba accepts e.g. `1 auth:3`.
    pub log_level: String,
}

impl Default for SmbSettings {
    fn default() -> Self {
        Self {
            workgroup: DEFAULT_WORKGROUP.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Render the full smb.conf. Pure; identical inputs give identical output.
pub fn render_smb_conf(config: &ShareDockConfig, settings: &SmbSettings) -> String {
    let mut lines = vec![
        "[global]".to_string(),
        format!("workgroup = {}", settings.workgroup),
        format!("server string = {}", SERVER_STRING),
        "security = user".to_string(),
        "passdb backend = tdbsam".to_string(),
        format!("log level = {}", settings.log_level),
        "map to guest = Bad User".to_string(),
    ];

    lines.extend(config.global.iter().cloned());

    for share in &config.share {
        lines.push(String::new());
        lines.push(format!("[{}]", share.name));
        lines.push(format!("path = {}", share.path));

        if let Some(ref smb) = share.smb {
            for (key, value) in smb.iter() {
                lines.push(format!("{} = {}", key, smb_value(value)));
            }
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Booleans use Samba's `yes`/`no`; everything else is written as-is.
fn smb_value(value: &OptionValue) -> String {
    match value {
        OptionValue::Bool(true) => "yes".to_string(),
        OptionValue::Bool(false) => "no".to_string(),
        other => other.to_string(),
    }
}

/// Overwrite `path` with `contents`. Any failure is fatal for the run.
pub fn write_smb_conf(path: &Path, contents: &str) -> Result<()> {
    write_generated(path, contents)
        .map_err(|e| ShareDockError::smb_config(format!("{}: {}", path.display(), e)))?;
    info!("Samba configuration written to {}", path.display());
    Ok(())
}

pub(crate) fn write_generated(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}
