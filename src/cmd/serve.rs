//! Sync API server command — `storysync serve`.

use anyhow::Result;

use storysync::config::{ServerConfig, SyncConfig};

pub async fn cmd_serve(host: String, port: u16, timeout_ms: u64, dev: bool) -> Result<()> {
    let sync = SyncConfig::with_timeout_ms(timeout_ms)?;

    storysync::server::start_server(ServerConfig {
        host,
        port,
        dev_mode: dev,
        sync,
    })
    .await?;

    Ok(())
}
