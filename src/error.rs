//! Error handling module for sharedock
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Only the fatal tier lives here; recoverable provisioning problems are
//! reported as [`crate::accounts::AccountOutcome`] values and logged.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for sharedock
#[derive(Error, Debug)]
pub enum ShareDockError {
    /// The configuration document does not exist
    #[error("Configuration file {} not found!", .0.display())]
    ConfigNotFound(PathBuf),

    /// The configuration document parsed to nothing (null, empty mapping, ...)
    #[error("Error: Configuration file is empty or invalid")]
    EmptyConfig,

    /// YAML syntax or decode errors
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Document decoded but cannot produce well-formed output
    #[error("Validation error: {0}")]
    Validation(String),

    /// Writing the Samba configuration failed
    #[error("Error generating Samba configuration: {0}")]
    SmbConfig(String),

    /// Writing the NFS exports file failed
    #[error("Error generating NFS exports: {0}")]
    Exports(String),

    /// IO errors outside the generators
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sharedock operations
pub type Result<T> = std::result::Result<T, ShareDockError>;

impl ShareDockError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an SMB generation error
    pub fn smb_config(msg: impl Into<String>) -> Self {
        Self::SmbConfig(msg.into())
    }

    /// Create an exports generation error
    pub fn exports(msg: impl Into<String>) -> Self {
        Self::Exports(msg.into())
    }

    /// True for errors raised by one of the two config generators.
    ///
    /// These already carry their own message prefix and are reported as-is.
    pub fn is_generator_failure(&self) -> bool {
        matches!(self, Self::SmbConfig(_) | Self::Exports(_))
    }

    /// True for errors that describe the document itself rather than a run failure.
    pub fn is_config_failure(&self) -> bool {
        matches!(self, Self::ConfigNotFound(_) | Self::EmptyConfig)
    }
}
