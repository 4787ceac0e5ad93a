//! Per-URL outcomes and run summaries.

/// Result of fetching and archiving one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeResult {
    /// Entry written; uncompressed byte count.
    Success(u64),
    /// Nothing usable was archived; human-readable reason.
    Failure(String),
}

/// Outcome for one requested URL, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub source_url: String,
    /// Entry name in the archive on success, derived name otherwise.
    pub entry_name: String,
    pub result: OutcomeResult,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.result, OutcomeResult::Success(_))
    }

    /// Report line for a failed outcome: `name: reason`.
    pub fn failure_line(&self) -> Option<String> {
        match &self.result {
            OutcomeResult::Failure(reason) => Some(format!("{}: {}", self.entry_name, reason)),
            OutcomeResult::Success(_) => None,
        }
    }
}

/// What a completed pipeline run produced.
#[derive(Debug, Clone)]
pub struct DownloadSummary {
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Archive bytes sent to the sink, directory included.
    pub bytes_written: u64,
    pub outcomes: Vec<FetchOutcome>,
}
