//! NFS exports generator.
//!
//! One line per share that declares `nfs`:
//!
//! ```text
//! <path> *(<option>,<option>,...)
//! ```
//!
//! Five keys take booleans and map to paired flag words (see [`NfsFlag`]).
//! Any other key passes through as `key=value`, or as a bare `key` when its
//! value is null. With no resulting options the share gets
//! [`DEFAULT_EXPORT_OPTIONS`].

use std::path::Path;
use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};
use tracing::{info, warn};

use crate::config::{OptionMap, OptionValue, ShareDockConfig};
use crate::error::{Result, ShareDockError};
use crate::smb::write_generated;

/// Where the NFS server reads its export table.
pub const DEFAULT_EXPORTS_PATH: &str = "/etc/exports";

/// Options used when a share's `nfs` mapping yields nothing.
pub const DEFAULT_EXPORT_OPTIONS: [&str; 3] = ["rw", "sync", "no_subtree_check"];

/// Client specification for every export line.
pub const EXPORT_CLIENTS: &str = "*";

/// Boolean export options with a flag word for each state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum NfsFlag {
    Readonly,
    Sync,
    SubtreeCheck,
    AllSquash,
    RootSquash,
}

impl NfsFlag {
    /// Flag written for `true`.
    pub fn enabled(self) -> &'static str {
        match self {
            Self::Readonly => "ro",
            Self::Sync => "sync",
            Self::SubtreeCheck => "subtree_check",
            Self::AllSquash => "all_squash",
            Self::RootSquash => "root_squash",
        }
    }

    /// Flag written for `false`.
    pub fn disabled(self) -> &'static str {
        match self {
            Self::Readonly => "rw",
            Self::Sync => "async",
            Self::SubtreeCheck => "no_subtree_check",
            Self::AllSquash => "no_all_squash",
            Self::RootSquash => "no_root_squash",
        }
    }

    pub fn flag(self, on: bool) -> &'static str {
        if on { self.enabled() } else { self.disabled() }
    }
}

/// Translate one share's `nfs` mapping into export options, in mapping order.
pub fn export_options(options: &OptionMap) -> Vec<String> {
    let mut out = Vec::with_capacity(options.len());

    for (key, value) in options.iter() {
        match (NfsFlag::from_str(key), value) {
            (Ok(flag), OptionValue::Bool(on)) => out.push(flag.flag(*on).to_string()),
            (Ok(_), other) => {
                warn!("NFS option '{}' expects true/false, got '{}'; skipping", key, other);
            }
            (Err(_), OptionValue::Null) => out.push(key.to_string()),
            (Err(_), other) => out.push(format!("{}={}", key, other)),
        }
    }

    if out.is_empty() {
        out.extend(DEFAULT_EXPORT_OPTIONS.iter().map(|s| s.to_string()));
    }
    out
}

/// `<path> *(<options>)`, without the trailing newline.
pub fn export_line(path: &str, options: &OptionMap) -> String {
    format!(
        "{} {}({})",
        path,
        EXPORT_CLIENTS,
        export_options(options).join(",")
    )
}

/// Render the full exports file. Empty when no share declares `nfs`.
pub fn render_exports(config: &ShareDockConfig) -> String {
    config
        .nfs_shares()
        .map(|(share, nfs)| export_line(&share.path, nfs) + "\n")
        .collect()
}

/// Overwrite `path` with `contents`. Any failure is fatal for the run.
pub fn write_exports(path: &Path, contents: &str) -> Result<()> {
    write_generated(path, contents)
        .map_err(|e| ShareDockError::exports(format!("{}: {}", path.display(), e)))?;
    info!(
        "NFS exports written to {} ({} export(s))",
        path.display(),
        contents.lines().count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use strum::IntoEnumIterator;
    use tempfile::TempDir;

    fn options(yaml: &str) -> OptionMap {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_flag_names_match_config_keys() {
        let keys: Vec<String> = NfsFlag::iter().map(|f| f.to_string()).collect();
        assert_eq!(
            keys,
            vec!["readonly", "sync", "subtree_check", "all_squash", "root_squash"]
        );
        assert_eq!(NfsFlag::from_str("subtree_check").unwrap(), NfsFlag::SubtreeCheck);
        assert!(NfsFlag::from_str("anonuid").is_err());
    }

    #[test]
    fn test_flag_pairs() {
        for flag in NfsFlag::iter() {
            assert_ne!(flag.enabled(), flag.disabled());
        }
        assert_eq!(NfsFlag::Readonly.flag(true), "ro");
        assert_eq!(NfsFlag::Readonly.flag(false), "rw");
        assert_eq!(NfsFlag::RootSquash.flag(false), "no_root_squash");
    }

    #[test]
    fn test_readonly_true_sync_false() {
        assert_eq!(
            export_options(&options("readonly: true\nsync: false\n")),
            vec!["ro", "async"]
        );
    }

    #[test]
    fn test_mapping_order_is_kept() {
        assert_eq!(
            export_options(&options("sync: false\nreadonly: true\n")),
            vec!["async", "ro"]
        );
    }

    #[test]
    fn test_pass_through_options() {
        assert_eq!(
            export_options(&options(
                "readonly: false\nanonuid: 1000\nanongid: 1000\nfsid: root\ninsecure:\n"
            )),
            vec!["rw", "anonuid=1000", "anongid=1000", "fsid=root", "insecure"]
        );
    }

    #[test]
    fn test_non_boolean_mapped_key_is_dropped() {
        assert_eq!(
            export_options(&options("readonly: \"yes\"\nanonuid: 1\n")),
            vec!["anonuid=1"]
        );
    }

    #[test]
    fn test_defaults_when_empty_or_filtered() {
        let defaults: Vec<String> = DEFAULT_EXPORT_OPTIONS.iter().map(|s| s.to_string()).collect();
        assert_eq!(export_options(&OptionMap::default()), defaults);
        assert_eq!(export_options(&options("sync: 1\n")), defaults);
    }

    #[test]
    fn test_render_skips_shares_without_nfs() {
        let config = ShareDockConfig::from_yaml_str(
            r#"
share:
  - name: smb-only
    path: /srv/smb
  - name: both
    path: /srv/both
    nfs:
      readonly: false
  - name: defaults
    path: /srv/defaults
    nfs: {}
"#,
        )
        .unwrap();

        assert_eq!(
            render_exports(&config),
            "/srv/both *(rw)\n/srv/defaults *(rw,sync,no_subtree_check)\n"
        );
    }

    #[test]
    fn test_render_empty_config() {
        assert_eq!(render_exports(&ShareDockConfig::default()), "");
    }

    #[test]
    fn test_write_exports() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exports");

        write_exports(&path, "/srv/a *(rw)\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "/srv/a *(rw)\n");

        let err = write_exports(dir.path(), "").unwrap_err();
        assert!(matches!(err, ShareDockError::Exports(_)));
    }
}
