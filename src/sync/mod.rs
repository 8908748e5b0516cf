//! Issue synchronization — replicate a batch of work items into Jira.
//!
//! ## Flow
//!
//! ```text
//! SyncRequestBody ──validate_request()──> SyncRequest
//!                                              │
//!                          JiraTracker::new() (Basic auth encoded once)
//!                                              │
//!                    BatchSynchronizer::run()  │  for each item, in order:
//!                                              │    derive_summary()
//!                                              │    create_issue()
//!                                              │    attach_to_iteration()  (iterationId set)
//!                                              │  stop at first failure
//!                                              v
//!                                         SyncResult
//! ```
//!
//! | Module         | Responsibility                                          |
//! |----------------|---------------------------------------------------------|
//! | `models`       | Wire and domain types: `WorkItem`, `SyncResult`, ...    |
//! | `validate`     | Required-field checks before any remote call            |
//! | `summary`      | Work item → issue summary                               |
//! | `tracker`      | `IssueTracker` trait and `TrackerFailure`               |
//! | `jira`         | `JiraTracker`, the reqwest-backed `IssueTracker`        |
//! | `remote_error` | Tagged union of tracker failure shapes + message rules  |
//! | `engine`       | `BatchSynchronizer`, sequential short-circuit loop      |
//!
//! Issues created before a failure are not rolled back, and a resubmitted
//! batch creates them again.

pub mod engine;
pub mod jira;
pub mod models;
pub mod remote_error;
pub mod summary;
pub mod tracker;
pub mod validate;

use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::config::SyncConfig;
use crate::errors::SyncError;

pub use engine::{BatchFailure, BatchReport, BatchSynchronizer};
pub use jira::JiraTracker;
pub use models::{SyncRequest, SyncRequestBody, SyncResult, WorkItem};
pub use tracker::IssueTracker;
pub use validate::validate_request;

/// Validate and synchronize one batch, collapsing every outcome into a
/// [`SyncResult`].
pub async fn sync_batch(config: &SyncConfig, body: SyncRequestBody) -> SyncResult {
    match run_batch(config, body).await {
        Ok(()) => SyncResult::succeeded(),
        Err(err) => SyncResult::failed(err.to_string()),
    }
}

/// Like [`sync_batch`], but keeps the typed error so callers can tell a
/// rejected batch from a local failure.
pub async fn run_batch(config: &SyncConfig, body: SyncRequestBody) -> Result<(), SyncError> {
    let batch_id = Uuid::new_v4();
    try_sync_batch(config, body)
        .instrument(info_span!("sync_batch", %batch_id))
        .await
}

async fn try_sync_batch(config: &SyncConfig, body: SyncRequestBody) -> Result<(), SyncError> {
    let request = validate_request(body).inspect_err(|err| {
        warn!(kind = err.kind(), error = %err, "Rejected sync request");
    })?;

    info!(
        tracker = %request.tracker_base_url,
        project = %request.project_key,
        items = request.items.len(),
        iteration = request.iteration_id.as_deref(),
        "Synchronizing batch"
    );

    let tracker = JiraTracker::new(config, &request.tracker_base_url, &request.credentials)
        .inspect_err(|err| {
            warn!(kind = err.kind(), error = %err, "Could not build tracker client");
        })?;
    let synchronizer = BatchSynchronizer::new(tracker);

    match synchronizer.run(&request).await {
        Ok(_) => Ok(()),
        Err(failure) => {
            engine::log_failure(&failure);
            Err(failure.error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(items: Option<Vec<WorkItem>>) -> SyncRequestBody {
        SyncRequestBody {
            // Nothing listens here; only batches that make no call succeed.
            tracker_base_url: Some("http://127.0.0.1:9".into()),
            username: Some("pm".into()),
            api_token: Some("tok".into()),
            project_key: Some("ACME".into()),
            items,
            iteration_id: None,
        }
    }

    #[tokio::test]
    async fn test_empty_batch_is_success() {
        let result = sync_batch(&SyncConfig::default(), body(Some(vec![]))).await;
        assert_eq!(result, SyncResult::succeeded());
    }

    #[tokio::test]
    async fn test_missing_field_is_failure() {
        let result = sync_batch(&SyncConfig::default(), body(None)).await;
        assert!(!result.success);
        assert_eq!(
            result.error_message.as_deref(),
            Some("Missing required field: items")
        );
    }

    #[tokio::test]
    async fn test_unreachable_tracker_reports_transport_message() {
        let config = SyncConfig::with_timeout_ms(500).unwrap();
        let result = sync_batch(&config, body(Some(vec![WorkItem::new("x")]))).await;
        assert!(!result.success);
        let message = result.error_message.unwrap();
        assert!(!message.is_empty());
        assert_ne!(message, "Unknown error");
    }

    #[tokio::test]
    async fn test_run_batch_keeps_client_build_error() {
        let config = SyncConfig {
            user_agent: "bad\nagent".into(),
            ..SyncConfig::default()
        };
        let err = run_batch(&config, body(Some(vec![WorkItem::new("x")])))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::ClientBuild(_)));
    }
}
