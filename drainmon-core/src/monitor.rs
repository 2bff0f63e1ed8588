//! Monitoring run orchestration
//!
//! Ties attach, collection, and scheduling together: resolve the target
//! process, prime the CPU measurement, open the output sink, then hand
//! the loop to the [`PhaseScheduler`].

use crate::collector::Collector;
use crate::error::MonitorError;
use crate::locator::find_target_process;
use crate::scheduler::{Outcome, PhaseScheduler, Schedule};
use crate::sink::CsvSink;
use drainmon_config::DrainmonConfig;
use std::path::Path;
use tracing::info;

/// A fully attached monitoring run, ready to execute
pub struct MonitorRun {
    collector: Collector,
    sink: CsvSink,
    schedule: Schedule,
}

impl MonitorRun {
    /// Resolve the target process and open the output sink
    ///
    /// Fails before any sample is written if no target process can be
    /// found, if an explicit PID does not exist, or if the output file
    /// cannot be created.
    pub fn attach(config: &DrainmonConfig, output: impl AsRef<Path>) -> Result<Self, MonitorError> {
        let pid = match config.monitor.pid {
            Some(pid) => pid,
            None => find_target_process(&config.monitor.process_markers).ok_or_else(|| {
                MonitorError::ProcessNotFound {
                    launcher: config.monitor.process_markers.launcher.clone(),
                    module: config.monitor.process_markers.module.clone(),
                }
            })?,
        };

        // Attach performs the priming CPU refresh; the first sample's
        // cpu_percent is a baseline.
        let collector = Collector::attach(pid, &config.monitor.metrics_url, &config.http)?;
        let sink = CsvSink::create(output)?;

        info!(
            "monitoring process {} ({}s test, {:.1}s interval, {}s max drain wait)",
            pid,
            config.monitor.test_duration.as_secs(),
            config.monitor.sample_interval.as_secs_f64(),
            config.monitor.max_drain_wait.as_secs()
        );

        Ok(Self {
            collector,
            sink,
            schedule: Schedule {
                test_duration: config.monitor.test_duration,
                interval: config.monitor.sample_interval,
                max_drain_wait: config.monitor.max_drain_wait,
            },
        })
    }

    /// PID of the monitored process
    pub fn pid(&self) -> u32 {
        self.collector.pid()
    }

    /// Drive both phases to a terminal outcome
    ///
    /// The sink flushes on every row, so all terminal paths (including
    /// errors propagated here) leave the output file readable.
    pub async fn run(mut self) -> Result<Outcome, MonitorError> {
        PhaseScheduler::new(&mut self.collector, &mut self.sink, self.schedule)
            .run()
            .await
    }
}
