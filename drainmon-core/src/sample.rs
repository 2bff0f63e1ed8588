//! Sample data model and metrics endpoint wire types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which scheduler phase produced a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Fixed-duration load-test window
    Test,
    /// Open-ended wait for background tasks to drain
    BgCompletion,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::BgCompletion => "bg_completion",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the server's internal runtime metrics
///
/// These six fields are endpoint-derived and stand or fall together: a
/// sample carries either the whole snapshot or none of it, so a partially
/// populated group is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSnapshot {
    pub thread_pool_total: u64,
    pub thread_pool_borrowed: u64,
    pub thread_pool_available: u64,
    pub thread_pool_waiting: u64,
    pub pending_bg_tasks: u64,
    pub active_threads: u64,
}

/// One row of the monitoring time series
#[derive(Debug, Clone, Serialize)]
pub struct Sample {
    /// Capture instant; monotonically non-decreasing across a run
    pub timestamp: DateTime<Utc>,

    /// CPU usage since the previous collection. The first value after
    /// attach is a priming baseline and is written but not meaningful.
    pub cpu_percent: f32,

    /// Resident set size in bytes
    pub memory_rss_bytes: u64,

    /// Virtual memory size in bytes
    pub memory_vms_bytes: u64,

    /// OS thread count of the monitored process
    pub process_threads: u64,

    /// Endpoint-derived metrics; `None` when the endpoint was unreachable
    /// or returned a non-success or malformed response
    pub runtime: Option<RuntimeSnapshot>,

    /// Scheduler phase that produced this sample
    pub phase: Phase,
}

/// Wire shape of the consumed `GET /metrics` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub thread_pool: ThreadPoolStats,
    pub background_tasks: BackgroundTaskStats,
    pub threading: ThreadingStats,
}

/// Worker-pool occupancy figures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadPoolStats {
    pub total_tokens: u64,
    pub borrowed_tokens: u64,
    pub available_tokens: u64,
    pub tasks_waiting: u64,
}

/// Background-task counter figures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundTaskStats {
    pub pending_count: u64,
}

/// Process threading figures as reported by the server itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadingStats {
    pub active_thread_count: u64,
}

impl From<MetricsResponse> for RuntimeSnapshot {
    fn from(response: MetricsResponse) -> Self {
        Self {
            thread_pool_total: response.thread_pool.total_tokens,
            thread_pool_borrowed: response.thread_pool.borrowed_tokens,
            thread_pool_available: response.thread_pool.available_tokens,
            thread_pool_waiting: response.thread_pool.tasks_waiting,
            pending_bg_tasks: response.background_tasks.pending_count,
            active_threads: response.threading.active_thread_count,
        }
    }
}
