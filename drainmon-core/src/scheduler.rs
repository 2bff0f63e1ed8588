//! Two-phase sampling scheduler
//!
//! Drives the monitoring state machine: a fixed-duration test phase
//! followed by a drain phase that ends when the server's pending
//! background-task counter is observed at exactly zero, the drain deadline
//! expires, the metrics endpoint is lost, or the monitored process goes
//! away. Phase-transition logic lives here, behind the [`SampleSource`]
//! seam, so it is testable against scripted sources without a live
//! process.

use crate::error::{CollectError, MonitorError};
use crate::sample::{Phase, Sample};
use crate::sink::SampleSink;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{info, warn};

/// Produces one sample per call; implemented by [`crate::Collector`] and
/// by scripted fakes in tests.
#[async_trait]
pub trait SampleSource: Send {
    async fn collect(&mut self, phase: Phase) -> Result<Sample, CollectError>;
}

#[async_trait]
impl SampleSource for crate::Collector {
    async fn collect(&mut self, phase: Phase) -> Result<Sample, CollectError> {
        crate::Collector::collect(self, phase).await
    }
}

/// Terminal state of a monitoring run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Pending counter observed at exactly zero before the drain deadline
    Complete,
    /// Drain deadline expired without ever observing zero
    DrainTimeout,
    /// Metrics endpoint lost during drain; completion cannot be verified
    EndpointLost,
    /// Monitored process exited mid-run
    ProcessGone,
}

impl Outcome {
    /// Process exit status for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Complete => 0,
            Self::DrainTimeout | Self::EndpointLost | Self::ProcessGone => 1,
        }
    }
}

/// Timing knobs for one run
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    /// Length of the test phase
    pub test_duration: Duration,
    /// Target cadence between samples
    pub interval: Duration,
    /// Hard ceiling on the drain phase
    pub max_drain_wait: Duration,
}

/// The two-phase sampling loop
pub struct PhaseScheduler<'a, C: SampleSource, S: SampleSink> {
    source: &'a mut C,
    sink: &'a mut S,
    schedule: Schedule,
}

impl<'a, C: SampleSource, S: SampleSink> PhaseScheduler<'a, C, S> {
    pub fn new(source: &'a mut C, sink: &'a mut S, schedule: Schedule) -> Self {
        Self {
            source,
            sink,
            schedule,
        }
    }

    /// Run the test phase then the drain phase to a terminal outcome
    ///
    /// Every collected sample is written before any transition decision is
    /// made from it. Cadence is best-effort: a collection-plus-write cycle
    /// that overruns the interval starts the next cycle immediately
    /// instead of queueing missed ticks.
    pub async fn run(self) -> Result<Outcome, MonitorError> {
        let start = Instant::now();

        info!(
            "monitoring phase 1: load test ({}s)",
            self.schedule.test_duration.as_secs()
        );

        let test_deadline = start + self.schedule.test_duration;
        while Instant::now() < test_deadline {
            let cycle_start = Instant::now();
            match self.source.collect(Phase::Test).await {
                Ok(sample) => {
                    self.sink.write_sample(&sample)?;
                    log_status(&sample, start, None);
                }
                Err(CollectError::ProcessGone { pid }) => {
                    warn!("process {} disappeared during the test phase", pid);
                    return Ok(Outcome::ProcessGone);
                }
            }
            sleep_until(cycle_start + self.schedule.interval).await;
        }

        info!(
            "monitoring phase 2: waiting for background tasks (up to {}s)",
            self.schedule.max_drain_wait.as_secs()
        );

        let drain_start = Instant::now();
        let drain_deadline = drain_start + self.schedule.max_drain_wait;
        let mut last_pending: Option<u64> = None;

        while Instant::now() < drain_deadline {
            let cycle_start = Instant::now();
            let sample = match self.source.collect(Phase::BgCompletion).await {
                Ok(sample) => sample,
                Err(CollectError::ProcessGone { pid }) => {
                    warn!("process {} disappeared during the drain phase", pid);
                    return Ok(Outcome::ProcessGone);
                }
            };

            self.sink.write_sample(&sample)?;
            log_status(&sample, start, Some(drain_start));

            match sample.runtime.as_ref().map(|r| r.pending_bg_tasks) {
                None => {
                    warn!("metrics endpoint lost during drain; completion cannot be verified");
                    return Ok(Outcome::EndpointLost);
                }
                Some(0) => {
                    info!(
                        "all background tasks completed: drain took {:.1}s, total monitoring time {:.1}s",
                        drain_start.elapsed().as_secs_f64(),
                        start.elapsed().as_secs_f64()
                    );
                    return Ok(Outcome::Complete);
                }
                Some(pending) => {
                    last_pending = Some(pending);
                }
            }

            sleep_until(cycle_start + self.schedule.interval).await;
        }

        match last_pending {
            Some(pending) => warn!(
                "background tasks did not complete within {}s; last observed pending count: {}",
                self.schedule.max_drain_wait.as_secs(),
                pending
            ),
            None => warn!(
                "background tasks did not complete within {}s",
                self.schedule.max_drain_wait.as_secs()
            ),
        }
        Ok(Outcome::DrainTimeout)
    }
}

/// One status line per sample, mirroring the row just written
fn log_status(sample: &Sample, start: Instant, drain_start: Option<Instant>) {
    let elapsed = start.elapsed().as_secs();
    let phase_suffix = match drain_start {
        Some(drain_start) => format!(" / +{}s bg", drain_start.elapsed().as_secs()),
        None => String::new(),
    };

    match &sample.runtime {
        Some(rt) => info!(
            "[{}s{}] cpu {:.1}%, pool {}/{}, pending bg {}",
            elapsed,
            phase_suffix,
            sample.cpu_percent,
            rt.thread_pool_borrowed,
            rt.thread_pool_total,
            rt.pending_bg_tasks
        ),
        None => info!(
            "[{}s{}] cpu {:.1}%, metrics endpoint unavailable",
            elapsed, phase_suffix, sample.cpu_percent
        ),
    }
}
