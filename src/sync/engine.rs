//! Sequential batch replication with short-circuit on the first failure.

use tracing::{debug, info, warn};

use crate::errors::SyncError;

use super::models::{CreateIssuePayload, SyncRequest};
use super::summary::derive_summary;
use super::tracker::{IssueTracker, TrackerFailure};

/// What a batch did before it finished or stopped.
///
/// Only used for logging; the caller sees a batch-level result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Create calls that returned successfully, in item order.
    pub created: usize,
    /// Identifiers returned by the tracker (items without one are skipped).
    pub created_keys: Vec<String>,
    pub attached: usize,
}

/// A batch that stopped early: the error plus what happened before it.
#[derive(Debug)]
pub struct BatchFailure {
    pub report: BatchReport,
    pub error: SyncError,
}

/// Replicates the items of one request into an [`IssueTracker`].
pub struct BatchSynchronizer<T: IssueTracker> {
    tracker: T,
}

impl<T: IssueTracker> BatchSynchronizer<T> {
    pub fn new(tracker: T) -> Self {
        Self { tracker }
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Process every item in order, stopping at the first failure.
    ///
    /// Issues created before a failure stay in the tracker; nothing is rolled
    /// back or retried. On failure the partial report is returned alongside
    /// the error so it can be logged.
    pub async fn run(&self, request: &SyncRequest) -> Result<BatchReport, BatchFailure> {
        let mut report = BatchReport::default();

        for (index, item) in request.items.iter().enumerate() {
            let position = index + 1;
            let payload = CreateIssuePayload::story(&request.project_key, derive_summary(item));
            debug!(item = position, summary = %payload.fields.summary, "Creating issue");

            let created = match self.tracker.create_issue(&payload).await {
                Ok(created) => created,
                Err(failure) => {
                    return Err(BatchFailure {
                        error: create_error(position, failure),
                        report,
                    });
                }
            };
            report.created += 1;

            let Some(issue) = created.identifier().map(str::to_string) else {
                debug!(item = position, "Tracker returned no issue identifier");
                continue;
            };
            report.created_keys.push(issue.clone());

            if let Some(iteration_id) = request.iteration_id.as_deref() {
                debug!(item = position, issue = %issue, iteration = iteration_id, "Attaching issue to iteration");
                if let Err(failure) = self.tracker.attach_to_iteration(iteration_id, &issue).await {
                    return Err(BatchFailure {
                        error: attach_error(position, issue, failure),
                        report,
                    });
                }
                report.attached += 1;
            }
        }

        info!(
            created = report.created,
            attached = report.attached,
            "Batch synchronized"
        );
        Ok(report)
    }
}

fn create_error(item: usize, failure: TrackerFailure) -> SyncError {
    if failure.is_transport() {
        return SyncError::Transport {
            item,
            error: failure.error,
        };
    }
    SyncError::RemoteCreate {
        item,
        status: failure.status,
        error: failure.error,
    }
}

fn attach_error(item: usize, issue: String, failure: TrackerFailure) -> SyncError {
    if failure.is_transport() {
        return SyncError::Transport {
            item,
            error: failure.error,
        };
    }
    SyncError::RemoteAttach {
        item,
        issue,
        status: failure.status,
        error: failure.error,
    }
}

/// Log a failed batch without exposing credentials.
pub(crate) fn log_failure(failure: &BatchFailure) {
    let BatchFailure { report, error } = failure;
    warn!(
        kind = error.kind(),
        item = error.item(),
        created_before_failure = report.created,
        created_keys = ?report.created_keys,
        error = %error,
        "Batch stopped at first failure"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::models::{CreatedIssue, Credentials, WorkItem};
    use crate::sync::remote_error::RemoteError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Create(String),
        Attach { iteration: String, issue: String },
    }

    /// Scripted tracker that records every call.
    #[derive(Default)]
    struct FakeTracker {
        calls: Mutex<Vec<Call>>,
        /// 1-based create call that fails with the given failure.
        fail_create: Option<(usize, TrackerFailure)>,
        /// 1-based attach call that fails with the given failure.
        fail_attach: Option<(usize, TrackerFailure)>,
        /// Respond to creates without an identifier.
        anonymous: bool,
        /// Keys keep counting across batches, like a real tracker.
        next_key: Mutex<usize>,
    }

    impl FakeTracker {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn creates(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| matches!(c, Call::Create(_)))
                .count()
        }

        fn attaches(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| matches!(c, Call::Attach { .. }))
                .count()
        }
    }

    #[async_trait]
    impl IssueTracker for FakeTracker {
        async fn create_issue(
            &self,
            payload: &CreateIssuePayload,
        ) -> Result<CreatedIssue, TrackerFailure> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Create(payload.fields.summary.clone()));
            if let Some((n, failure)) = &self.fail_create {
                if self.creates() == *n {
                    return Err(failure.clone());
                }
            }
            if self.anonymous {
                return Ok(CreatedIssue::default());
            }
            let mut next = self.next_key.lock().unwrap();
            *next += 1;
            Ok(CreatedIssue {
                id: Some(format!("{}", 10000 + *next)),
                key: Some(format!("ACME-{}", *next)),
            })
        }

        async fn attach_to_iteration(
            &self,
            iteration_id: &str,
            issue: &str,
        ) -> Result<(), TrackerFailure> {
            self.calls.lock().unwrap().push(Call::Attach {
                iteration: iteration_id.to_string(),
                issue: issue.to_string(),
            });
            if let Some((n, failure)) = &self.fail_attach {
                if self.attaches() == *n {
                    return Err(failure.clone());
                }
            }
            Ok(())
        }
    }

    fn request(items: Vec<WorkItem>, iteration_id: Option<&str>) -> SyncRequest {
        SyncRequest {
            tracker_base_url: "https://acme.atlassian.net".into(),
            credentials: Credentials {
                username: "pm".into(),
                token: "tok".into(),
            },
            project_key: "ACME".into(),
            items,
            iteration_id: iteration_id.map(str::to_string),
        }
    }

    fn items(n: usize) -> Vec<WorkItem> {
        (1..=n).map(|i| WorkItem::new(format!("Story {}", i))).collect()
    }

    fn rejected(description: &str) -> TrackerFailure {
        TrackerFailure::rejected(400, RemoteError::StructuredDescription(description.into()))
    }

    #[tokio::test]
    async fn test_empty_batch_succeeds_without_calls() {
        let sync = BatchSynchronizer::new(FakeTracker::default());
        let report = sync.run(&request(vec![], Some("7"))).await.unwrap();
        assert_eq!(report, BatchReport::default());
        assert!(sync.tracker().calls().is_empty());
    }

    #[tokio::test]
    async fn test_items_processed_in_order() {
        let sync = BatchSynchronizer::new(FakeTracker::default());
        let batch = vec![
            WorkItem::new("Plan the sprint").with_actor("PM"),
            WorkItem::new("Fix login"),
            WorkItem::default(),
        ];
        let report = sync.run(&request(batch, None)).await.unwrap();
        assert_eq!(report.created, 3);
        assert_eq!(report.created_keys, vec!["ACME-1", "ACME-2", "ACME-3"]);
        assert_eq!(
            sync.tracker().calls(),
            vec![
                Call::Create("As PM, Plan the sprint".into()),
                Call::Create("Fix login".into()),
                Call::Create("User Story".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_iteration_means_no_attach_calls() {
        let sync = BatchSynchronizer::new(FakeTracker::default());
        sync.run(&request(items(4), None)).await.unwrap();
        assert_eq!(sync.tracker().creates(), 4);
        assert_eq!(sync.tracker().attaches(), 0);
    }

    #[tokio::test]
    async fn test_each_created_issue_attached_to_iteration() {
        let sync = BatchSynchronizer::new(FakeTracker::default());
        let report = sync.run(&request(items(2), Some("42"))).await.unwrap();
        assert_eq!(report.attached, 2);
        assert_eq!(
            sync.tracker().calls(),
            vec![
                Call::Create("Story 1".into()),
                Call::Attach {
                    iteration: "42".into(),
                    issue: "ACME-1".into()
                },
                Call::Create("Story 2".into()),
                Call::Attach {
                    iteration: "42".into(),
                    issue: "ACME-2".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_attach_skipped_without_identifier() {
        let tracker = FakeTracker {
            anonymous: true,
            ..FakeTracker::default()
        };
        let sync = BatchSynchronizer::new(tracker);
        let report = sync.run(&request(items(3), Some("42"))).await.unwrap();
        assert_eq!(report.created, 3);
        assert!(report.created_keys.is_empty());
        assert_eq!(sync.tracker().attaches(), 0);
    }

    #[tokio::test]
    async fn test_first_create_failure_stops_batch() {
        for k in 1..=5 {
            let tracker = FakeTracker {
                fail_create: Some((k, rejected(&format!("item {} rejected", k)))),
                ..FakeTracker::default()
            };
            let sync = BatchSynchronizer::new(tracker);
            let BatchFailure { report, error: err } =
                sync.run(&request(items(5), Some("9"))).await.unwrap_err();

            assert_eq!(sync.tracker().creates(), k, "creates for k={}", k);
            assert!(sync.tracker().attaches() < k);
            assert_eq!(report.created, k - 1);
            assert_eq!(err.to_string(), format!("item {} rejected", k));
            assert!(matches!(err, SyncError::RemoteCreate { item, status: Some(400), .. } if item == k));
        }
    }

    #[tokio::test]
    async fn test_attach_failure_stops_batch() {
        let tracker = FakeTracker {
            fail_attach: Some((
                2,
                TrackerFailure::rejected(
                    400,
                    RemoteError::MessageList(vec!["Sprint is closed".into()]),
                ),
            )),
            ..FakeTracker::default()
        };
        let sync = BatchSynchronizer::new(tracker);
        let BatchFailure { report, error: err } =
            sync.run(&request(items(4), Some("9"))).await.unwrap_err();

        assert_eq!(sync.tracker().creates(), 2);
        assert_eq!(sync.tracker().attaches(), 2);
        assert_eq!(report.attached, 1);
        assert_eq!(err.to_string(), "Sprint is closed");
        match err {
            SyncError::RemoteAttach { item, issue, .. } => {
                assert_eq!(item, 2);
                assert_eq!(issue, "ACME-2");
            }
            other => panic!("Expected RemoteAttach, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_classified() {
        let tracker = FakeTracker {
            fail_create: Some((
                1,
                TrackerFailure::transport(RemoteError::TransportFailure(
                    "connection refused".into(),
                )),
            )),
            ..FakeTracker::default()
        };
        let sync = BatchSynchronizer::new(tracker);
        let err = sync.run(&request(items(3), None)).await.unwrap_err().error;
        assert!(matches!(err, SyncError::Transport { item: 1, .. }));
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(sync.tracker().creates(), 1);
    }

    #[tokio::test]
    async fn test_resubmission_duplicates_already_created_items() {
        // No idempotency key: a retried batch recreates what already exists.
        let tracker = FakeTracker {
            fail_create: Some((3, rejected("quota exceeded"))),
            ..FakeTracker::default()
        };
        let sync = BatchSynchronizer::new(tracker);
        let batch = request(items(4), None);

        let first = sync.run(&batch).await.unwrap_err().report;
        assert_eq!(first.created_keys, vec!["ACME-1", "ACME-2"]);

        let second = sync.run(&batch).await.unwrap();
        assert_eq!(second.created, 4);

        let story_one_creates = sync
            .tracker()
            .calls()
            .iter()
            .filter(|c| **c == Call::Create("Story 1".into()))
            .count();
        assert_eq!(story_one_creates, 2);
        assert_eq!(second.created_keys[0], "ACME-3");
    }
}
