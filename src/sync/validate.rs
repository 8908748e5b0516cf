//! Presence checks on an inbound request, run before any tracker call.

use crate::errors::SyncError;

use super::models::{Credentials, SyncRequest, SyncRequestBody};

/// Check required fields and produce a typed [`SyncRequest`].
///
/// Empty strings count as missing. An empty `items` list is accepted: the
/// batch then vacuously succeeds.
pub fn validate_request(body: SyncRequestBody) -> Result<SyncRequest, SyncError> {
    let tracker_base_url = required(body.tracker_base_url, "trackerBaseUrl")?;
    let username = required(body.username, "username")?;
    let token = required(body.api_token, "apiToken")?;
    let project_key = required(body.project_key, "projectKey")?;
    let items = body
        .items
        .ok_or(SyncError::Validation { field: "items" })?;

    Ok(SyncRequest {
        tracker_base_url,
        credentials: Credentials { username, token },
        project_key,
        items,
        iteration_id: body.iteration_id.filter(|id| !id.is_empty()),
    })
}

fn required(value: Option<String>, field: &'static str) -> Result<String, SyncError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(SyncError::Validation { field })
}
