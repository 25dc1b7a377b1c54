//! Type-safe arguments for ownership and mode changes on share directories.

use std::path::PathBuf;

use crate::command_traits::CommandArgs;

/// Type-safe arguments for `chown -- <user>:<group> <path>`.
#[derive(Debug, Clone)]
pub struct ChownArgs {
    pub user: String,
    pub group: String,
    pub path: PathBuf,
}

impl CommandArgs for ChownArgs {
    fn program(&self) -> &'static str {
        "chown"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "--".to_string(),
            format!("{}:{}", self.user, self.group),
            self.path.display().to_string(),
        ]
    }
}

/// Type-safe arguments for `chmod -- <mode> <path>`.
#[derive(Debug, Clone)]
pub struct ChmodArgs {
    /// Octal mode string, e.g. `755`.
    pub mode: &'static str,
    pub path: PathBuf,
}

impl CommandArgs for ChmodArgs {
    fn program(&self) -> &'static str {
        "chmod"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "--".to_string(),
            self.mode.to_string(),
            self.path.display().to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chown_args() {
        let args = ChownArgs {
            user: "alice".to_string(),
            group: "users".to_string(),
            path: PathBuf::from("/srv/pub"),
        };
        assert_eq!(args.program(), "chown");
        assert_eq!(args.to_cli_args(), vec!["--", "alice:users", "/srv/pub"]);
    }

    #[test]
    fn test_chmod_args() {
        let args = ChmodArgs {
            mode: "755",
            path: PathBuf::from("/srv/pub"),
        };
        assert_eq!(args.program(), "chmod");
        assert_eq!(args.to_cli_args(), vec!["--", "755", "/srv/pub"]);
    }

    #[test]
    fn test_relative_dash_path_is_not_an_option() {
        let args = ChownArgs {
            user: "alice".to_string(),
            group: "users".to_string(),
            path: PathBuf::from("-R"),
        };
        assert_eq!(args.to_cli_args(), vec!["--", "alice:users", "-R"]);
    }
}
