//! Typed error hierarchy for storysync.
//!
//! - `SyncError` — validation and per-item synchronization failures
//! - `ConfigError` — invalid runtime configuration values

use thiserror::Error;

use crate::sync::remote_error::RemoteError;

/// Errors from validating and synchronizing one batch.
///
/// The remote variants display exactly the extracted tracker message, since
/// that text is what the caller receives. The extra fields are for logs.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Missing required field: {field}")]
    Validation { field: &'static str },

    #[error("{error}")]
    RemoteCreate {
        item: usize,
        status: Option<u16>,
        error: RemoteError,
    },

    #[error("{error}")]
    RemoteAttach {
        item: usize,
        issue: String,
        status: Option<u16>,
        error: RemoteError,
    },

    #[error("{error}")]
    Transport { item: usize, error: RemoteError },

    #[error("Failed to build tracker client: {0}")]
    ClientBuild(String),
}

impl SyncError {
    /// Short taxonomy label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::RemoteCreate { .. } => "remote_create",
            Self::RemoteAttach { .. } => "remote_attach",
            Self::Transport { .. } => "transport",
            Self::ClientBuild(_) => "client_build",
        }
    }

    /// 1-based position of the failing item, when the failure belongs to one.
    pub fn item(&self) -> Option<usize> {
        match self {
            Self::RemoteCreate { item, .. }
            | Self::RemoteAttach { item, .. }
            | Self::Transport { item, .. } => Some(*item),
            Self::Validation { .. } | Self::ClientBuild(_) => None,
        }
    }
}

/// Errors from building runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("Invalid log format '{0}': expected 'pretty' or 'json'")]
    InvalidLogFormat(String),
}
