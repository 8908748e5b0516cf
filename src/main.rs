use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use storysync::config::LogFormat;

mod cmd;

#[derive(Parser)]
#[command(name = "storysync")]
#[command(version, about = "Replicate work-item batches into Jira as stories")]
pub struct Cli {
    /// Raise the default log level to debug
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format: pretty or json
    #[arg(long, global = true, env = "STORYSYNC_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the sync API (POST /api/sync)
    Serve {
        /// Interface to bind
        #[arg(long, env = "STORYSYNC_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to serve on
        #[arg(short, long, env = "STORYSYNC_PORT", default_value = "3141")]
        port: u16,

        /// Per-call timeout for tracker requests, in milliseconds
        #[arg(long, env = "STORYSYNC_TIMEOUT_MS", default_value = "5000")]
        timeout_ms: u64,

        /// Enable dev mode (CORS permissive for a local dashboard)
        #[arg(long, env = "STORYSYNC_DEV")]
        dev: bool,
    },
    /// Synchronize one batch from a JSON file and print the result
    Push {
        /// Path to the request JSON, or '-' for stdin
        file: PathBuf,

        /// Per-call timeout for tracker requests, in milliseconds
        #[arg(long, env = "STORYSYNC_TIMEOUT_MS", default_value = "5000")]
        timeout_ms: u64,

        /// Tracker username (overrides the file)
        #[arg(long, env = "STORYSYNC_USERNAME")]
        username: Option<String>,

        /// Tracker API token (overrides the file)
        #[arg(long, env = "STORYSYNC_API_TOKEN", hide_env_values = true)]
        api_token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    storysync::logging::init_tracing(cli.log_format, cli.verbose);

    match cli.command {
        Commands::Serve {
            host,
            port,
            timeout_ms,
            dev,
        } => {
            cmd::cmd_serve(host, port, timeout_ms, dev).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Push {
            file,
            timeout_ms,
            username,
            api_token,
        } => {
            let success = cmd::cmd_push(&file, timeout_ms, username, api_token).await?;
            Ok(if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
