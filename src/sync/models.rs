use serde::{Deserialize, Serialize};

/// Inbound synchronization request as it arrives on the wire.
///
/// Every field is optional here so that a missing field is reported by
/// [`validate_request`](super::validate::validate_request) with a readable
/// message instead of a JSON extractor rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequestBody {
    pub tracker_base_url: Option<String>,
    pub username: Option<String>,
    pub api_token: Option<String>,
    pub project_key: Option<String>,
    pub items: Option<Vec<WorkItem>>,
    pub iteration_id: Option<String>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

// The token must never reach a log line.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub tracker_base_url: String,
    pub credentials: Credentials,
    pub project_key: String,
    pub items: Vec<WorkItem>,
    pub iteration_id: Option<String>,
}

/// A locally-authored unit of work to replicate into the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    #[serde(default)]
    pub content: String,
    /// Informational only; never sent to the tracker.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub actor: Option<String>,
}

impl WorkItem {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

/// Body of the tracker's issue-create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateIssuePayload {
    pub fields: IssueFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueFields {
    pub project: ProjectRef,
    pub summary: String,
    pub issuetype: IssueTypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRef {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueTypeRef {
    pub name: String,
}

/// Issue type every synchronized work item is created as.
pub const STORY_ISSUE_TYPE: &str = "Story";

impl CreateIssuePayload {
    pub fn story(project_key: &str, summary: String) -> Self {
        Self {
            fields: IssueFields {
                project: ProjectRef {
                    key: project_key.to_string(),
                },
                summary,
                issuetype: IssueTypeRef {
                    name: STORY_ISSUE_TYPE.to_string(),
                },
            },
        }
    }
}

/// Identifiers the tracker assigned to a freshly created issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreatedIssue {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

impl CreatedIssue {
    /// Identifier used for the iteration attach call: key first, then id.
    pub fn identifier(&self) -> Option<&str> {
        self.key
            .as_deref()
            .filter(|k| !k.is_empty())
            .or_else(|| self.id.as_deref().filter(|id| !id.is_empty()))
    }
}

/// Body of the tracker's attach-to-iteration call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachIssuesPayload {
    pub issues: Vec<String>,
}

/// The single outcome reported for a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SyncResult {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            error_message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
        }
    }
}
