//! Per-sample metrics collection
//!
//! Combines OS-level process stats (via sysinfo) with the server's
//! internal runtime-metrics endpoint into one [`Sample`] per call. The
//! endpoint is best-effort: any probe failure degrades the sample to
//! OS-only metrics. The process disappearing is the one fatal condition.

use crate::error::{CollectError, MonitorError};
use crate::sample::{MetricsResponse, Phase, RuntimeSnapshot, Sample};
use chrono::Utc;
use drainmon_config::HttpConfig;
use reqwest::Client;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::debug;

/// Collector bound to one monitored process and one metrics URL
pub struct Collector {
    system: System,
    pid: Pid,
    client: Client,
    metrics_url: String,
}

impl Collector {
    /// Attach to a process and perform the priming CPU refresh
    ///
    /// CPU usage is measured between consecutive refreshes, so the first
    /// sample after attach reports a baseline value. Fails if the process
    /// does not exist.
    pub fn attach(
        pid: u32,
        metrics_url: impl Into<String>,
        http: &HttpConfig,
    ) -> Result<Self, MonitorError> {
        let pid = Pid::from_u32(pid);
        let mut system = System::new();

        let refreshed =
            system.refresh_processes_specifics(ProcessesToUpdate::Some(&[pid]), true, refresh_kind());
        if refreshed == 0 || system.process(pid).is_none() {
            return Err(CollectError::ProcessGone { pid: pid.as_u32() }.into());
        }

        // reqwest enforces the probe timeout; it is configured to not
        // exceed the sampling interval so a dead endpoint cannot stall
        // the cadence.
        let client = Client::builder()
            .timeout(http.timeout)
            .user_agent(&http.user_agent)
            .build()?;

        Ok(Self {
            system,
            pid,
            client,
            metrics_url: metrics_url.into(),
        })
    }

    /// PID of the monitored process
    pub fn pid(&self) -> u32 {
        self.pid.as_u32()
    }

    /// Collect one sample, tagged with the caller's phase
    pub async fn collect(&mut self, phase: Phase) -> Result<Sample, CollectError> {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            refresh_kind(),
        );

        let process = self
            .system
            .process(self.pid)
            .ok_or(CollectError::ProcessGone {
                pid: self.pid.as_u32(),
            })?;

        let cpu_percent = process.cpu_usage();
        let memory_rss_bytes = process.memory();
        let memory_vms_bytes = process.virtual_memory();
        let process_threads = thread_count(process);

        let runtime = self.probe_runtime_metrics().await;

        Ok(Sample {
            timestamp: Utc::now(),
            cpu_percent,
            memory_rss_bytes,
            memory_vms_bytes,
            process_threads,
            runtime,
            phase,
        })
    }

    /// Probe the metrics endpoint; `None` on any failure
    async fn probe_runtime_metrics(&self) -> Option<RuntimeSnapshot> {
        let response = match self.client.get(&self.metrics_url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("metrics endpoint unreachable: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            debug!("metrics endpoint returned {}", response.status());
            return None;
        }

        match response.json::<MetricsResponse>().await {
            Ok(metrics) => Some(metrics.into()),
            Err(e) => {
                debug!("malformed metrics response: {}", e);
                None
            }
        }
    }
}

fn refresh_kind() -> ProcessRefreshKind {
    let kind = ProcessRefreshKind::nothing().with_cpu().with_memory();
    #[cfg(target_os = "linux")]
    let kind = kind.with_tasks();
    kind
}

#[cfg(target_os = "linux")]
fn thread_count(process: &sysinfo::Process) -> u64 {
    process.tasks().map(|tasks| tasks.len() as u64).unwrap_or(0)
}

#[cfg(not(target_os = "linux"))]
fn thread_count(_process: &sysinfo::Process) -> u64 {
    0
}
