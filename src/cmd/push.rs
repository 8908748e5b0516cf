//! One-shot batch command — `storysync push`.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use storysync::config::SyncConfig;
use storysync::sync::{self, SyncRequestBody};

/// Run one batch from a JSON request file and print the `SyncResult`.
///
/// Returns whether the batch succeeded.
pub async fn cmd_push(
    file: &Path,
    timeout_ms: u64,
    username: Option<String>,
    api_token: Option<String>,
) -> Result<bool> {
    let config = SyncConfig::with_timeout_ms(timeout_ms)?;

    let raw = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read request file {}", file.display()))?
    };

    let mut body: SyncRequestBody =
        serde_json::from_str(&raw).context("Failed to parse sync request JSON")?;
    if username.is_some() {
        body.username = username;
    }
    if api_token.is_some() {
        body.api_token = api_token;
    }

    let result = sync::sync_batch(&config, body).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result.success)
}
