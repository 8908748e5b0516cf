use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Url;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;

use crate::config::SyncConfig;
use crate::errors::SyncError;

use super::models::{AttachIssuesPayload, CreateIssuePayload, CreatedIssue, Credentials};
use super::remote_error::RemoteError;
use super::tracker::{IssueTracker, TrackerFailure};

const CREATE_ISSUE_PATH: [&str; 4] = ["rest", "api", "3", "issue"];

/// Path segments of the sprint attach endpoint. The id stays one segment.
fn sprint_issues_path(iteration_id: &str) -> [&str; 6] {
    ["rest", "agile", "1.0", "sprint", iteration_id, "issue"]
}

/// Encode `username:token` as an HTTP Basic credential.
pub fn basic_auth_value(credentials: &Credentials) -> String {
    let raw = format!("{}:{}", credentials.username, credentials.token);
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(raw)
    )
}

/// Jira REST client scoped to one batch.
///
/// The Basic credential is encoded once here and sent as a default header
/// on every call the batch makes.
pub struct JiraTracker {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl JiraTracker {
    pub fn new(
        config: &SyncConfig,
        base_url: &str,
        credentials: &Credentials,
    ) -> Result<Self, SyncError> {
        let mut auth = HeaderValue::from_str(&basic_auth_value(credentials))
            .map_err(|e| SyncError::ClientBuild(e.to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| SyncError::ClientBuild(e.to_string()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SyncError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join `segments` onto the base URL, percent-encoding each one so a
    /// caller-supplied value cannot add segments, a query or a fragment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TrackerFailure> {
        let invalid = |reason: String| {
            TrackerFailure::transport(RemoteError::TransportFailure(format!(
                "Invalid tracker URL {}: {}",
                self.base_url, reason
            )))
        };
        if let Some(dot) = segments.iter().copied().find(|s| matches!(*s, "" | "." | "..")) {
            return Err(invalid(format!("bad path segment {:?}", dot)));
        }

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<String, TrackerFailure> {
        let url = self.endpoint(segments)?;
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| TrackerFailure::transport(RemoteError::from_transport(&e, self.timeout)))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| TrackerFailure::transport(RemoteError::from_transport(&e, self.timeout)))?;

        if !status.is_success() {
            return Err(TrackerFailure::rejected(
                status.as_u16(),
                RemoteError::from_response(status.as_u16(), &text),
            ));
        }
        Ok(text)
    }
}

#[async_trait]
impl IssueTracker for JiraTracker {
    async fn create_issue(
        &self,
        payload: &CreateIssuePayload,
    ) -> Result<CreatedIssue, TrackerFailure> {
        let text = self.post_json(&CREATE_ISSUE_PATH, payload).await?;
        // A success body we cannot read still means the issue exists; it just
        // cannot be attached to an iteration.
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }

    async fn attach_to_iteration(
        &self,
        iteration_id: &str,
        issue: &str,
    ) -> Result<(), TrackerFailure> {
        let payload = AttachIssuesPayload {
            issues: vec![issue.to_string()],
        };
        self.post_json(&sprint_issues_path(iteration_id), &payload)
            .await?;
        Ok(())
    }
}
