//! Error report and all-failed marker entries.

use chrono::{DateTime, SecondsFormat, Utc};

use super::types::FetchOutcome;

pub const REPORT_ENTRY: &str = "_download_errors.txt";
pub const ALL_FAILED_ENTRY: &str = "_ALL_DOWNLOADS_FAILED.txt";
pub const ALL_FAILED_MESSAGE: &str =
    "ERROR: All file downloads failed. Please check _download_errors.txt for details.\n";

/// Summary of a run with at least one failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub generated_at: DateTime<Utc>,
    pub total_requested: usize,
    pub success_count: usize,
    /// `name: reason`, in request order.
    pub failures: Vec<String>,
}

impl DownloadReport {
    /// Build a report, or `None` when every outcome succeeded.
    pub fn from_outcomes(outcomes: &[FetchOutcome], generated_at: DateTime<Utc>) -> Option<Self> {
        let failures: Vec<String> = outcomes.iter().filter_map(|o| o.failure_line()).collect();
        if failures.is_empty() {
            return None;
        }

        Some(Self {
            generated_at,
            total_requested: outcomes.len(),
            success_count: outcomes.iter().filter(|o| o.is_success()).count(),
            failures,
        })
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn render(&self) -> String {
        let mut report = String::new();
        report.push_str("Download Error Report\n");
        report.push_str("=====================\n");
        report.push_str(&format!(
            "Generated: {}\n\n",
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        report.push_str(&format!("Total requested: {}\n", self.total_requested));
        report.push_str(&format!("Successful: {}\n", self.success_count));
        report.push_str(&format!("Failed: {}\n\n", self.failure_count()));
        report.push_str("Failed files:\n");
        for failure in &self.failures {
            report.push_str(&format!("  - {}\n", failure));
        }
        report
    }
}
