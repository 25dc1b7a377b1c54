//! Shared fakes for integration tests.
//!
//! Nothing here touches the real account database: the store and executor
//! record every call so tests can assert on them.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::Path;

use sharedock::command_runner::{CommandExecutor, CommandOutput};
use sharedock::command_traits::CommandInvocation;
use sharedock::{AccountOutcome, AccountStore, Settings};

/// One recorded `AccountStore` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Group(String, Option<u32>),
    User(String, String, Option<u32>),
    Password(String, String),
    ShareAuth(String, String),
}

/// `AccountStore` that always succeeds and remembers what it was asked.
#[derive(Default)]
pub struct RecordingStore {
    pub calls: RefCell<Vec<StoreCall>>,
}

impl RecordingStore {
    pub fn share_auth_password(&self, user: &str) -> Option<String> {
        self.calls.borrow().iter().find_map(|call| match call {
            StoreCall::ShareAuth(u, p) if u == user => Some(p.clone()),
            _ => None,
        })
    }
}

impl AccountStore for RecordingStore {
    fn ensure_group(&self, group: &str, gid: Option<u32>) -> AccountOutcome {
        self.calls
            .borrow_mut()
            .push(StoreCall::Group(group.to_string(), gid));
        AccountOutcome::Applied
    }

    fn ensure_user(&self, user: &str, group: &str, uid: Option<u32>) -> AccountOutcome {
        self.calls
            .borrow_mut()
            .push(StoreCall::User(user.to_string(), group.to_string(), uid));
        AccountOutcome::Applied
    }

    fn set_password(&self, user: &str, password: &str) -> AccountOutcome {
        self.calls
            .borrow_mut()
            .push(StoreCall::Password(user.to_string(), password.to_string()));
        AccountOutcome::Applied
    }

    fn register_share_auth(&self, user: &str, password: &str) -> AccountOutcome {
        self.calls
            .borrow_mut()
            .push(StoreCall::ShareAuth(user.to_string(), password.to_string()));
        AccountOutcome::Applied
    }
}

/// `CommandExecutor` that records command lines and reports success.
#[derive(Default)]
pub struct RecordingExecutor {
    pub calls: RefCell<Vec<CommandInvocation>>,
}

impl CommandExecutor for RecordingExecutor {
    fn execute(&self, invocation: &CommandInvocation) -> anyhow::Result<CommandOutput> {
        self.calls.borrow_mut().push(invocation.clone());
        Ok(CommandOutput::succeeded())
    }
}

/// Settings that write both generated files under `dir`.
pub fn settings_in(dir: &Path) -> Settings {
    Settings {
        config_path: dir.join("config.yml"),
        smb_conf_path: dir.join("etc/samba/smb.conf"),
        exports_path: dir.join("etc/exports"),
        ..Settings::default()
    }
}
