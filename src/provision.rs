//! Account provisioning.
//!
//! Walks the auth entries in document order and drives an [`AccountStore`].
//! Provisioning is best-effort: a problem with one entry is logged and the
//! next entry is still processed. Nothing here aborts the run.

use std::fs;
use std::io;

use tracing::{debug, error, info, warn};

use crate::accounts::{AccountOutcome, AccountStore};
use crate::config::{AuthEntry, PasswordSource};

/// What happened to a single auth entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountStatus {
    /// Account exists and has both an OS and an SMB password.
    Ready,
    /// Account exists but no password could be resolved; SMB access will not work.
    NoPassword,
    /// A password step failed; the reason has been logged.
    Failed(String),
}

/// Per-run summary, in document order.
#[derive(Debug, Clone, Default)]
pub struct ProvisionReport {
    pub accounts: Vec<(String, AccountStatus)>,
}

impl ProvisionReport {
    pub fn ready(&self) -> usize {
        self.count(|s| *s == AccountStatus::Ready)
    }

    pub fn without_password(&self) -> usize {
        self.count(|s| *s == AccountStatus::NoPassword)
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, AccountStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&AccountStatus) -> bool) -> usize {
        self.accounts.iter().filter(|(_, s)| pred(s)).count()
    }
}

/// Provision every entry. Never fails; see the report for per-entry results.
pub fn provision_accounts<S: AccountStore + ?Sized>(
    entries: &[AuthEntry],
    store: &S,
) -> ProvisionReport {
    let mut report = ProvisionReport::default();

    for entry in entries {
        let status = provision_account(entry, store);
        if let AccountStatus::Failed(ref reason) = status {
            error!("Error setting up user {}: {}", entry.user, reason);
        }
        report.accounts.push((entry.user.clone(), status));
    }

    info!(
        "Provisioned {} account(s): {} ready, {} without password, {} failed",
        report.accounts.len(),
        report.ready(),
        report.without_password(),
        report.failed()
    );

    report
}

/// Provision a single entry: group, user, then passwords.
pub fn provision_account<S: AccountStore + ?Sized>(entry: &AuthEntry, store: &S) -> AccountStatus {
    let user = entry.user.as_str();
    let group = entry.group.as_str();
    info!("Setting up user {} in group {}", user, group);

    // Either may pre-exist from a previous container start.
    tolerate("group", group, store.ensure_group(group, entry.gid));
    tolerate("user", user, store.ensure_user(user, group, entry.uid));

    let Some(password) = resolve_password(entry) else {
        warn!(
            "No password provided for {}, Samba access will not work",
            user
        );
        return AccountStatus::NoPassword;
    };

    if let AccountOutcome::Failed(reason) = store.set_password(user, &password) {
        return AccountStatus::Failed(format!("setting password: {}", reason));
    }

    info!("Adding Samba user {}", user);
    if let AccountOutcome::Failed(reason) = store.register_share_auth(user, &password) {
        return AccountStatus::Failed(format!("registering Samba user: {}", reason));
    }

    info!("Samba user {} created and enabled", user);
    AccountStatus::Ready
}

fn tolerate(kind: &str, name: &str, outcome: AccountOutcome) {
    match outcome {
        AccountOutcome::Applied => debug!("Created {} {}", kind, name),
        AccountOutcome::AlreadyExists => debug!("Reusing existing {} {}", kind, name),
        AccountOutcome::Failed(reason) => {
            warn!("Could not create {} {} (continuing): {}", kind, name, reason)
        }
    }
}

/// Resolve the entry's password from exactly one source.
///
/// Inline wins over `password_file`. A file is read in full with trailing
/// whitespace removed. Missing or unreadable files, and empty results, yield
/// `None` with a warning.
pub fn resolve_password(entry: &AuthEntry) -> Option<String> {
    let user = entry.user.as_str();

    let password = match entry.password_source()? {
        PasswordSource::Inline(password) => {
            info!("Using password from config for user {}", user);
            password.to_string()
        }
        PasswordSource::File(path) => match fs::read_to_string(path) {
            Ok(content) => {
                info!("Using password from file for user {}", user);
                content.trim_end().to_string()
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Password file {} not found", path.display());
                warn!("User {} created but password not set", user);
                return None;
            }
            Err(e) => {
                warn!("Could not read password file {}: {}", path.display(), e);
                warn!("User {} created but password not set", user);
                return None;
            }
        },
    };

    if password.is_empty() {
        warn!("Password for user {} is empty, ignoring it", user);
        return None;
    }

    Some(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[derive(Default)]
    struct FakeStore {
        calls: RefCell<Vec<String>>,
        fail_password_for: Option<&'static str>,
        fail_groups: bool,
    }

    impl AccountStore for FakeStore {
        fn ensure_group(&self, group: &str, gid: Option<u32>) -> AccountOutcome {
            self.calls
                .borrow_mut()
                .push(format!("group {} {:?}", group, gid));
            if self.fail_groups {
                AccountOutcome::Failed("bad group".to_string())
            } else {
                AccountOutcome::AlreadyExists
            }
        }

        fn ensure_user(&self, user: &str, group: &str, uid: Option<u32>) -> AccountOutcome {
            self.calls
                .borrow_mut()
                .push(format!("user {} {} {:?}", user, group, uid));
            AccountOutcome::Applied
        }

        fn set_password(&self, user: &str, password: &str) -> AccountOutcome {
            self.calls
                .borrow_mut()
                .push(format!("passwd {} {}", user, password));
            if self.fail_password_for == Some(user) {
                AccountOutcome::Failed("chpasswd exited with 1".to_string())
            } else {
                AccountOutcome::Applied
            }
        }

        fn register_share_auth(&self, user: &str, password: &str) -> AccountOutcome {
            self.calls
                .borrow_mut()
                .push(format!("smb {} {}", user, password));
            AccountOutcome::Applied
        }
    }

    fn entry(user: &str) -> AuthEntry {
        AuthEntry {
            user: user.to_string(),
            group: "users".to_string(),
            uid: None,
            gid: None,
            password: None,
            password_file: None,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_full_provisioning_sequence() {
        let store = FakeStore::default();
        let alice = AuthEntry {
            uid: Some(1000),
            gid: Some(100),
            password: Some("secret".to_string()),
            ..entry("alice")
        };

        assert_eq!(provision_account(&alice, &store), AccountStatus::Ready);
        assert_eq!(
            *store.calls.borrow(),
            vec![
                "group users Some(100)",
                "user alice users Some(1000)",
                "passwd alice secret",
                "smb alice secret",
            ]
        );
    }

    #[test]
    fn test_no_password_source() {
        let store = FakeStore::default();
        assert_eq!(
            provision_account(&entry("bob"), &store),
            AccountStatus::NoPassword
        );
        // Accounts are still created.
        assert_eq!(store.calls.borrow().len(), 2);
    }

    #[test]
    fn test_password_file_is_trimmed() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"from-file \n\n").unwrap();
        file.flush().unwrap();

        let bob = AuthEntry {
            password_file: Some(file.path().to_path_buf()),
            ..entry("bob")
        };
        assert_eq!(resolve_password(&bob).as_deref(), Some("from-file"));
    }

    #[test]
    fn test_missing_password_file() {
        let bob = AuthEntry {
            password_file: Some(PathBuf::from("/nonexistent/secret")),
            ..entry("bob")
        };
        assert_eq!(resolve_password(&bob), None);

        let store = FakeStore::default();
        assert_eq!(provision_account(&bob, &store), AccountStatus::NoPassword);
    }

    #[test]
    fn test_inline_password_wins_over_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"from-file\n").unwrap();
        file.flush().unwrap();

        let carol = AuthEntry {
            password: Some("inline".to_string()),
            password_file: Some(file.path().to_path_buf()),
            ..entry("carol")
        };

        let store = FakeStore::default();
        provision_account(&carol, &store);
        assert!(store.calls.borrow().contains(&"smb carol inline".to_string()));
    }

    #[test]
    fn test_empty_password_is_ignored() {
        let dave = AuthEntry {
            password: Some(String::new()),
            ..entry("dave")
        };
        assert_eq!(resolve_password(&dave), None);
    }

    #[test]
    fn test_failure_does_not_stop_later_entries() {
        let store = FakeStore {
            fail_password_for: Some("alice"),
            ..FakeStore::default()
        };
        let entries = vec![
            AuthEntry {
                password: Some("a".to_string()),
                ..entry("alice")
            },
            AuthEntry {
                password: Some("b".to_string()),
                ..entry("bob")
            },
        ];

        let report = provision_accounts(&entries, &store);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.ready(), 1);
        assert!(matches!(report.accounts[0].1, AccountStatus::Failed(_)));
        assert_eq!(report.accounts[1], ("bob".to_string(), AccountStatus::Ready));

        // Samba registration is skipped for the failed entry only.
        let calls = store.calls.borrow();
        assert!(!calls.contains(&"smb alice a".to_string()));
        assert!(calls.contains(&"smb bob b".to_string()));
    }

    #[test]
    fn test_group_failure_is_tolerated() {
        let store = FakeStore {
            fail_groups: true,
            ..FakeStore::default()
        };
        let erin = AuthEntry {
            password: Some("pw".to_string()),
            ..entry("erin")
        };
        assert_eq!(provision_account(&erin, &store), AccountStatus::Ready);
    }
}
