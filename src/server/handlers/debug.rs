//! `GET /debug/memory`: process memory and runtime task counts.
//!
//! Lets an operator watch resident memory stay flat while a large download
//! streams.

use axum::{response::IntoResponse, Json};
use serde::Serialize;

const MIB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Serialize)]
pub struct MemoryReport {
    /// Resident set size. `None` where the platform does not report it.
    pub physical_mb: Option<f64>,
    pub virtual_mb: Option<f64>,
    /// Runtime worker threads.
    pub workers: usize,
    /// Tasks currently alive on the runtime, streaming downloads included.
    pub alive_tasks: usize,
}

impl MemoryReport {
    pub fn collect() -> Self {
        let (physical_mb, virtual_mb) = match memory_stats::memory_stats() {
            Some(usage) => (
                Some(usage.physical_mem as f64 / MIB),
                Some(usage.virtual_mem as f64 / MIB),
            ),
            None => (None, None),
        };
        let metrics = tokio::runtime::Handle::current().metrics();

        Self {
            physical_mb,
            virtual_mb,
            workers: metrics.num_workers(),
            alive_tasks: metrics.num_alive_tasks(),
        }
    }
}

pub async fn memory() -> impl IntoResponse {
    Json(MemoryReport::collect())
}
