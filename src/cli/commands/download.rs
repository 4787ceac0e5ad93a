//! Local download command.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use console::style;
use tokio::io::BufWriter;

use crate::config::FetchConfig;
use crate::fetch::HttpFetcher;
use crate::pipeline::{DownloadPipeline, DownloadRequest, DownloadSummary, OutcomeResult};
use crate::utils::format_size;

/// Fetch `urls` into a ZIP archive at `output`.
pub async fn cmd_download(
    fetch: &FetchConfig,
    urls: Vec<String>,
    output: &Path,
) -> anyhow::Result<()> {
    let summary = download_to_file(fetch, urls, output).await?;
    print_summary(&summary, output);
    Ok(())
}

async fn download_to_file(
    fetch: &FetchConfig,
    urls: Vec<String>,
    output: &Path,
) -> anyhow::Result<DownloadSummary> {
    let request = DownloadRequest::new(urls)?;
    let pipeline = DownloadPipeline::new(Arc::new(HttpFetcher::new(fetch)?));

    println!(
        "{} Fetching {} URLs into {}",
        style("→").cyan(),
        request.len(),
        output.display()
    );

    let file = tokio::fs::File::create(output)
        .await
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let summary = pipeline
        .run(&request, BufWriter::new(file))
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(summary)
}

fn print_summary(summary: &DownloadSummary, output: &Path) {
    for outcome in &summary.outcomes {
        match &outcome.result {
            OutcomeResult::Success(size) => println!(
                "  {} {} ({})",
                style("✓").green(),
                outcome.entry_name,
                format_size(*size)
            ),
            OutcomeResult::Failure(reason) => println!(
                "  {} {}: {}",
                style("✗").red(),
                outcome.entry_name,
                reason
            ),
        }
    }

    let status = if summary.failed == 0 {
        style("✓").green()
    } else if summary.succeeded == 0 {
        style("✗").red()
    } else {
        style("!").yellow()
    };
    println!(
        "{} {} of {} files archived to {} ({})",
        status,
        summary.succeeded,
        summary.requested,
        output.display(),
        format_size(summary.bytes_written)
    );
}
