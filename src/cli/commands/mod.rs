//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod download;
mod serve;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{
    FetchConfig, ServerConfig, Settings, StoreConfig, DEFAULT_AWS_ACCESS_KEY_ID,
    DEFAULT_AWS_REGION, DEFAULT_AWS_SECRET_ACCESS_KEY, DEFAULT_FETCH_TIMEOUT_SECS,
    DEFAULT_MAX_UPLOAD_MB, DEFAULT_S3_BUCKET, DEFAULT_S3_ENDPOINT, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT,
};
use crate::fetch::USER_AGENT;

#[derive(Parser)]
#[command(name = "streamrelay")]
#[command(about = "Relay files between object storage and remote URLs")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Bind address: a port, a host, or host:port (overrides --host/--port)
        #[arg(long, short)]
        bind: Option<String>,
        #[command(flatten)]
        server: ServerArgs,
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Fetch URLs into a local ZIP archive
    Download {
        /// URLs to fetch, in archive order
        #[arg(required = true)]
        urls: Vec<String>,
        /// Output archive path
        #[arg(short, long, default_value = "download.zip")]
        output: PathBuf,
        #[command(flatten)]
        fetch: FetchArgs,
    },
}

#[derive(Args)]
struct ServerArgs {
    /// Interface to listen on
    #[arg(long, env = "SERVER_HOST", default_value = DEFAULT_SERVER_HOST)]
    host: String,
    /// Port to listen on
    #[arg(long, short, env = "SERVER_PORT", default_value_t = DEFAULT_SERVER_PORT)]
    port: u16,
    /// Request body limit in megabytes
    #[arg(long, env = "MAX_UPLOAD_SIZE", default_value_t = DEFAULT_MAX_UPLOAD_MB)]
    max_upload_size: usize,
}

impl ServerArgs {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            max_upload_mb: self.max_upload_size,
        }
    }
}

#[derive(Args)]
struct StoreArgs {
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_AWS_REGION)]
    region: String,
    #[arg(long, env = "AWS_ACCESS_KEY_ID", default_value = DEFAULT_AWS_ACCESS_KEY_ID, hide_env_values = true)]
    access_key_id: String,
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", default_value = DEFAULT_AWS_SECRET_ACCESS_KEY, hide_env_values = true)]
    secret_access_key: String,
    /// S3-compatible endpoint, also the base of returned object URLs
    #[arg(long, env = "S3_ENDPOINT", default_value = DEFAULT_S3_ENDPOINT)]
    endpoint: String,
    #[arg(long, env = "S3_BUCKET", default_value = DEFAULT_S3_BUCKET)]
    bucket: String,
}

impl StoreArgs {
    fn into_config(self) -> StoreConfig {
        StoreConfig {
            region: self.region,
            access_key_id: self.access_key_id,
            secret_access_key: self.secret_access_key,
            endpoint: self.endpoint,
            bucket: self.bucket,
        }
    }
}

#[derive(Args)]
struct FetchArgs {
    /// Seconds a remote fetch may stall before it is abandoned
    #[arg(long, env = "FETCH_TIMEOUT", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    fetch_timeout: u64,
}

impl FetchArgs {
    fn into_config(self) -> FetchConfig {
        FetchConfig {
            timeout: Duration::from_secs(self.fetch_timeout),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            server,
            store,
            fetch,
        } => {
            let mut settings = Settings {
                server: server.into_config(),
                store: store.into_config(),
                fetch: fetch.into_config(),
            };
            if let Some(bind) = bind {
                let (host, port) =
                    serve::parse_bind_address(&bind, &settings.server.host, settings.server.port)?;
                settings.server.host = host;
                settings.server.port = port;
            }
            serve::cmd_serve(&settings).await
        }
        Commands::Download { urls, output, fetch } => {
            download::cmd_download(&fetch.into_config(), urls, &output).await
        }
    }
}
