use async_trait::async_trait;

use super::models::{CreateIssuePayload, CreatedIssue};
use super::remote_error::RemoteError;

/// A failed tracker call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerFailure {
    /// HTTP status of the error response; `None` when no response arrived.
    pub status: Option<u16>,
    pub error: RemoteError,
}

impl TrackerFailure {
    pub fn rejected(status: u16, error: RemoteError) -> Self {
        Self {
            status: Some(status),
            error,
        }
    }

    pub fn transport(error: RemoteError) -> Self {
        Self {
            status: None,
            error,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.status.is_none()
    }
}

/// The external issue tracker a batch is replicated into.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Create one issue and return the identifiers the tracker assigned.
    async fn create_issue(&self, payload: &CreateIssuePayload)
    -> Result<CreatedIssue, TrackerFailure>;

    /// Attach an existing issue to an iteration (sprint).
    async fn attach_to_iteration(&self, iteration_id: &str, issue: &str)
    -> Result<(), TrackerFailure>;
}
