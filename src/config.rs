//! Configuration document loading and the typed model it decodes into.
//!
//! The document is YAML with three optional top-level keys:
//!
//! ```yaml
//! global:
//!   - "server min protocol = SMB2"
//! auth:
//!   - user: alice
//!     group: users
//!     uid: 1000
//!     password_file: /run/secrets/alice
//! share:
//!   - name: pub
//!     path: /srv/pub
//!     smb:
//!       read only: "no"
//!     nfs:
//!       readonly: false
//!       anonuid: 1000
//! ```
//!
//! Option mappings keep document order since both generators emit them in
//! the order they were written.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Result, ShareDockError};

/// Default location of the configuration document inside the container.
pub const DEFAULT_CONFIG_PATH: &str = "/data/config.yml";

/// Root of the configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShareDockConfig {
    /// Raw lines appended to the SMB `[global]` section.
    #[serde(default, deserialize_with = "null_as_default")]
    pub global: Vec<String>,

    /// Accounts to provision, in document order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub auth: Vec<AuthEntry>,

    /// Shared directories, in document order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub share: Vec<ShareEntry>,

    /// Keys this tool does not understand. Logged, never acted on.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// A declared OS / file-sharing account.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthEntry {
    #[serde(deserialize_with = "scalar_string")]
    pub user: String,
    #[serde(deserialize_with = "scalar_string")]
    pub group: String,
    #[serde(default)]
    pub uid: Option<u32>,
    #[serde(default)]
    pub gid: Option<u32>,
    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub password: Option<String>,
    #[serde(default)]
    pub password_file: Option<PathBuf>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Where an account's password comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordSource<'a> {
    Inline(&'a str),
    File(&'a Path),
}

impl AuthEntry {
    /// The single password source to consult. Inline wins over a file.
    pub fn password_source(&self) -> Option<PasswordSource<'_>> {
        if let Some(ref password) = self.password {
            return Some(PasswordSource::Inline(password));
        }
        self.password_file
            .as_deref()
            .map(PasswordSource::File)
    }
}

/// A path-backed directory exported over SMB and/or NFS.
#[derive(Debug, Clone, Deserialize)]
pub struct ShareEntry {
    /// SMB section name.
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(deserialize_with = "scalar_string")]
    pub path: String,
    /// Raw SMB options for this share's section.
    #[serde(default)]
    pub smb: Option<OptionMap>,
    /// NFS export options. `None` means the share is not exported;
    /// an explicit null decodes to an empty map.
    #[serde(default, deserialize_with = "null_as_empty_options")]
    pub nfs: Option<OptionMap>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// A scalar option value as written in the document.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Number(serde_yaml::Number),
    Text(String),
    Null,
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn contains_newline(&self) -> bool {
        matches!(self, Self::Text(s) if s.contains('\n'))
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
            Self::Null => Ok(()),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<u64> for OptionValue {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl<'de> Deserialize<'de> for OptionValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ScalarVisitor;

        impl<'de> Visitor<'de> for ScalarVisitor {
            type Value = OptionValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a scalar value (string, number, boolean or null)")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Self::Value, E> {
                Ok(OptionValue::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
                Ok(OptionValue::Number(v.into()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
                Ok(OptionValue::Number(v.into()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
                Ok(OptionValue::Number(v.into()))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
                Ok(OptionValue::Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Self::Value, E> {
                Ok(OptionValue::Text(v))
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(OptionValue::Null)
            }

            fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(OptionValue::Null)
            }

            fn visit_some<D: Deserializer<'de>>(
                self,
                deserializer: D,
            ) -> std::result::Result<Self::Value, D::Error> {
                OptionValue::deserialize(deserializer)
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

/// Ordered `key -> value` option mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionMap(Vec<(String, OptionValue)>);

impl OptionMap {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'de> Deserialize<'de> for OptionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct OptionMapVisitor;

        impl<'de> Visitor<'de> for OptionMapVisitor {
            type Value = OptionMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of option names to scalar values")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, OptionValue>()? {
                    entries.push((key, value));
                }
                Ok(OptionMap(entries))
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(OptionMap::default())
            }
        }

        deserializer.deserialize_map(OptionMapVisitor)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty_options<'de, D>(deserializer: D) -> std::result::Result<Option<OptionMap>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(
        Option::<OptionMap>::deserialize(deserializer)?.unwrap_or_default(),
    ))
}

/// Accept any scalar for a string field so `name: 2024` or `password: 1234` work.
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match OptionValue::deserialize(deserializer)? {
        OptionValue::Null => Err(de::Error::custom("value must not be null")),
        other => Ok(other.to_string()),
    }
}

fn optional_scalar_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match OptionValue::deserialize(deserializer)? {
        OptionValue::Null => Ok(None),
        other => Ok(Some(other.to_string())),
    }
}

impl ShareDockConfig {
    /// Load, decode and validate the document at `path`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ShareDockError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        debug!("Read {} bytes from {}", content.len(), path.display());

        Self::from_yaml_str(&content)
    }

    /// Decode and validate a document held in memory.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if is_blank_document(content) {
            return Err(ShareDockError::EmptyConfig);
        }

        let document: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| ShareDockError::parse(e.to_string()))?;

        if is_empty_value(&document) {
            return Err(ShareDockError::EmptyConfig);
        }
        if !document.is_mapping() {
            return Err(ShareDockError::parse(
                "top-level document must be a mapping",
            ));
        }

        let config: Self =
            serde_yaml::from_value(document).map_err(|e| ShareDockError::parse(e.to_string()))?;

        config.warn_unknown_keys();
        config.validate()?;

        Ok(config)
    }

    /// The account that owns every share directory, if any account is declared.
    pub fn default_owner(&self) -> Option<&AuthEntry> {
        self.auth.first()
    }

    /// Shares that produce an NFS export line.
    pub fn nfs_shares(&self) -> impl Iterator<Item = (&ShareEntry, &OptionMap)> {
        self.share
            .iter()
            .filter_map(|share| share.nfs.as_ref().map(|nfs| (share, nfs)))
    }

    /// Reject only what would corrupt the generated files or the account commands.
    pub fn validate(&self) -> Result<()> {
        for (i, line) in self.global.iter().enumerate() {
            if line.contains('\n') {
                return Err(ShareDockError::validation(format!(
                    "global[{}] must be a single line",
                    i
                )));
            }
        }

        for (i, entry) in self.auth.iter().enumerate() {
            if entry.user.trim().is_empty() {
                return Err(ShareDockError::validation(format!(
                    "auth[{}]: user must be specified",
                    i
                )));
            }
            // chpasswd reads `user:password` lines
            if entry.user.contains([':', '\n']) {
                return Err(ShareDockError::validation(format!(
                    "auth[{}]: user '{}' cannot contain ':' or newlines",
                    i,
                    entry.user.escape_debug()
                )));
            }
            if entry.group.trim().is_empty() {
                return Err(ShareDockError::validation(format!(
                    "auth[{}]: group must be specified",
                    i
                )));
            }
        }

        for (i, share) in self.share.iter().enumerate() {
            if share.name.trim().is_empty() {
                return Err(ShareDockError::validation(format!(
                    "share[{}]: name must be specified",
                    i
                )));
            }
            if share.name.contains(['[', ']', '\n']) {
                return Err(ShareDockError::validation(format!(
                    "share[{}]: name '{}' cannot contain brackets or newlines",
                    i, share.name
                )));
            }
            if share.path.trim().is_empty() {
                return Err(ShareDockError::validation(format!(
                    "share '{}': path must be specified",
                    share.name
                )));
            }
            if share.path.contains('\n') {
                return Err(ShareDockError::validation(format!(
                    "share '{}': path must be a single line",
                    share.name
                )));
            }

            let options = share.smb.iter().chain(share.nfs.iter());
            for map in options {
                for (key, value) in map.iter() {
                    if key.contains('\n') || value.contains_newline() {
                        return Err(ShareDockError::validation(format!(
                            "share '{}': option '{}' must be a single line",
                            share.name,
                            key.escape_debug()
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    fn warn_unknown_keys(&self) {
        for key in self.extra.keys() {
            warn!("Ignoring unknown top-level key '{}'", key);
        }
        for entry in &self.auth {
            for key in entry.extra.keys() {
                warn!("Ignoring unknown key '{}' in auth entry for {}", key, entry.user);
            }
        }
        for share in &self.share {
            for key in share.extra.keys() {
                warn!("Ignoring unknown key '{}' in share {}", key, share.name);
            }
        }
    }
}

/// A file holding only whitespace, comments or document markers.
fn is_blank_document(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

/// Falsy top-level values: null, false, zero, or an empty string/sequence/mapping.
fn is_empty_value(value: &serde_yaml::Value) -> bool {
    use serde_yaml::Value;

    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Sequence(seq) => seq.is_empty(),
        Value::Mapping(map) => map.is_empty(),
        Value::Tagged(_) => false,
    }
}
