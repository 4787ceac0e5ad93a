//! Download pipeline.
//!
//! Fetches every requested URL in order and streams each successful body
//! into a ZIP archive as it arrives. Per-URL failures never stop the batch:
//! they are collected into a `_download_errors.txt` entry written after all
//! fetched files, plus an `_ALL_DOWNLOADS_FAILED.txt` marker when nothing
//! succeeded. Only a failing sink (the client went away) or an archive that
//! cannot be finalized aborts a run.
//!
//! URLs are processed one at a time, so at most one remote body is open and
//! memory stays bounded by a single chunk regardless of the batch size.

mod naming;
mod report;
mod request;
mod types;

pub use naming::{derive_entry_name, EntryNames, FALLBACK_NAME};
pub use report::{DownloadReport, ALL_FAILED_ENTRY, ALL_FAILED_MESSAGE, REPORT_ENTRY};
pub use request::{DownloadRequest, InputError};
pub use types::{DownloadSummary, FetchOutcome, OutcomeResult};

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::io::AsyncWrite;

use crate::archive::{ArchiveError, ArchiveWriter, EntryWriter};
use crate::fetch::Fetcher;

/// Conditions that end a run early.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The output sink stopped accepting bytes.
    #[error("output closed: {0}")]
    Sink(#[source] std::io::Error),
    #[error("archive could not be written: {0}")]
    Archive(#[source] ArchiveError),
}

impl From<ArchiveError> for PipelineError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::Sink(io) => PipelineError::Sink(io),
            other => PipelineError::Archive(other),
        }
    }
}

/// How a single URL failed.
enum EntryFailure {
    /// Goes into the report; the batch continues.
    Recorded(String),
    /// Ends the run.
    Fatal(PipelineError),
}

impl EntryFailure {
    fn from_archive(context: &str, err: ArchiveError) -> Self {
        if err.is_fatal() {
            EntryFailure::Fatal(err.into())
        } else {
            EntryFailure::Recorded(format!("{} - {}", context, err))
        }
    }
}

/// Fetch-and-archive orchestrator.
pub struct DownloadPipeline {
    fetcher: Arc<dyn Fetcher>,
}

impl DownloadPipeline {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Stream the archive for `request` into `sink`.
    ///
    /// The sink is flushed after every URL so bytes reach the consumer while
    /// the batch is still running. On `Ok` the archive has been finalized.
    pub async fn run<W>(
        &self,
        request: &DownloadRequest,
        sink: W,
    ) -> Result<DownloadSummary, PipelineError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut archive = ArchiveWriter::open(sink);
        let mut names = EntryNames::new();
        names.reserve(REPORT_ENTRY);
        names.reserve(ALL_FAILED_ENTRY);

        let mut outcomes = Vec::with_capacity(request.len());

        for url in request.urls() {
            let derived = derive_entry_name(url);
            let outcome = match self.fetch_into(&mut archive, &mut names, url, &derived).await {
                Ok((entry_name, size)) => {
                    tracing::debug!("Archived {} as {} ({} bytes)", url, entry_name, size);
                    FetchOutcome {
                        source_url: url.clone(),
                        entry_name,
                        result: OutcomeResult::Success(size),
                    }
                }
                Err(EntryFailure::Recorded(reason)) => {
                    tracing::warn!("Failed to fetch {}: {}", url, reason);
                    FetchOutcome {
                        source_url: url.clone(),
                        entry_name: derived,
                        result: OutcomeResult::Failure(reason),
                    }
                }
                Err(EntryFailure::Fatal(err)) => {
                    tracing::warn!(
                        "Aborting download after {} of {} URLs: {}",
                        outcomes.len(),
                        request.len(),
                        err
                    );
                    return Err(err);
                }
            };
            outcomes.push(outcome);

            archive.flush().await?;
        }

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();

        if let Some(report) = DownloadReport::from_outcomes(&outcomes, Utc::now()) {
            write_text_entry(&mut archive, REPORT_ENTRY, &report.render()).await?;
        }
        if succeeded == 0 {
            write_text_entry(&mut archive, ALL_FAILED_ENTRY, ALL_FAILED_MESSAGE).await?;
        }

        let (_, bytes_written) = archive.close().await?;

        let summary = DownloadSummary {
            requested: request.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            bytes_written,
            outcomes,
        };
        tracing::info!(
            "Download finished: {} requested, {} succeeded, {} failed, {} bytes",
            summary.requested,
            summary.succeeded,
            summary.failed,
            summary.bytes_written
        );
        Ok(summary)
    }

    /// Fetch one URL into a new entry. Returns the entry name and size.
    async fn fetch_into<W>(
        &self,
        archive: &mut ArchiveWriter<W>,
        names: &mut EntryNames,
        url: &str,
        derived: &str,
    ) -> Result<(String, u64), EntryFailure>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut body = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| EntryFailure::Recorded(e.to_string()))?;

        let name = names.allocate(derived);
        let mut entry = match archive.create_entry(&name).await {
            Ok(entry) => entry,
            Err(err) => {
                names.release(&name);
                return Err(EntryFailure::from_archive("failed to create zip entry", err));
            }
        };

        while let Some(chunk) = body.chunk().await {
            let failure = match chunk {
                Ok(bytes) => match entry.write(&bytes).await {
                    Ok(()) => continue,
                    Err(err) => EntryFailure::from_archive("failed to write", err),
                },
                Err(err) => EntryFailure::Recorded(format!("failed to write - {}", err)),
            };
            names.release(&name);
            return Err(abort_entry(entry, failure).await);
        }

        match entry.finish().await {
            Ok(size) => Ok((name, size)),
            Err(err) => {
                names.release(&name);
                Err(EntryFailure::from_archive("failed to write", err))
            }
        }
    }
}

/// Close a half-written entry, keeping the original failure unless the sink died.
async fn abort_entry<W>(entry: EntryWriter<'_, W>, failure: EntryFailure) -> EntryFailure
where
    W: AsyncWrite + Unpin + Send,
{
    if let EntryFailure::Fatal(_) = failure {
        return failure;
    }
    match entry.abort().await {
        Err(err) if err.is_fatal() => EntryFailure::Fatal(err.into()),
        _ => failure,
    }
}

async fn write_text_entry<W>(
    archive: &mut ArchiveWriter<W>,
    name: &str,
    content: &str,
) -> Result<(), PipelineError>
where
    W: AsyncWrite + Unpin + Send,
{
    match add_text_entry(archive, name, content).await {
        Ok(_) => {}
        Err(err) if err.is_fatal() => return Err(err.into()),
        Err(err) => tracing::warn!("Could not add {} to archive: {}", name, err),
    }
    archive.flush().await?;
    Ok(())
}

async fn add_text_entry<W>(
    archive: &mut ArchiveWriter<W>,
    name: &str,
    content: &str,
) -> Result<u64, ArchiveError>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut entry = archive.create_entry(name).await?;
    entry.write(content.as_bytes()).await?;
    entry.finish().await
}
