//! streamrelay binary: environment, logging, then the CLI.

use streamrelay::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // S3 credentials and server settings may come from a local .env
    let _ = dotenvy::dotenv();

    // RUST_LOG wins; otherwise -v raises the crate to info
    let default_filter = if cli::is_verbose() {
        "streamrelay=info"
    } else {
        "streamrelay=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    cli::run().await
}
