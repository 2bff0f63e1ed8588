//! Scheduler state-machine tests against scripted sample sources
//!
//! Uses tokio's paused clock, so wall-clock durations here are virtual and
//! the tests run instantly.

use async_trait::async_trait;
use chrono::Utc;
use drainmon_core::error::{CollectError, SinkError};
use drainmon_core::scheduler::{Outcome, PhaseScheduler, SampleSource, Schedule};
use drainmon_core::sink::SampleSink;
use drainmon_core::{Phase, RuntimeSnapshot, Sample};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// One scripted collection result
#[derive(Clone)]
enum Step {
    /// Healthy sample with the given pending count
    Pending(u64),
    /// Endpoint down: OS-only sample
    NoEndpoint,
    /// Monitored process has exited
    Gone,
    /// Healthy sample, but collection itself consumes the given time
    Slow(Duration, u64),
}

struct ScriptedSource {
    steps: VecDeque<Step>,
    /// Replayed once the script is exhausted
    fallback: Step,
}

impl ScriptedSource {
    fn new(steps: Vec<Step>, fallback: Step) -> Self {
        Self {
            steps: steps.into(),
            fallback,
        }
    }

    fn repeating(step: Step) -> Self {
        Self::new(Vec::new(), step)
    }
}

fn sample(phase: Phase, pending: Option<u64>) -> Sample {
    Sample {
        timestamp: Utc::now(),
        cpu_percent: 10.0,
        memory_rss_bytes: 100 * 1024 * 1024,
        memory_vms_bytes: 400 * 1024 * 1024,
        process_threads: 8,
        runtime: pending.map(|pending_bg_tasks| RuntimeSnapshot {
            thread_pool_total: 40,
            thread_pool_borrowed: 4,
            thread_pool_available: 36,
            thread_pool_waiting: 0,
            pending_bg_tasks,
            active_threads: 44,
        }),
        phase,
    }
}

#[async_trait]
impl SampleSource for ScriptedSource {
    async fn collect(&mut self, phase: Phase) -> Result<Sample, CollectError> {
        let step = self.steps.pop_front().unwrap_or_else(|| self.fallback.clone());
        match step {
            Step::Pending(pending) => Ok(sample(phase, Some(pending))),
            Step::NoEndpoint => Ok(sample(phase, None)),
            Step::Gone => Err(CollectError::ProcessGone { pid: 4242 }),
            Step::Slow(duration, pending) => {
                tokio::time::advance(duration).await;
                Ok(sample(phase, Some(pending)))
            }
        }
    }
}

/// In-memory sink capturing every written row
#[derive(Default)]
struct MemorySink {
    samples: Vec<Sample>,
}

impl SampleSink for MemorySink {
    fn write_sample(&mut self, sample: &Sample) -> Result<(), SinkError> {
        self.samples.push(sample.clone());
        Ok(())
    }
}

fn schedule(test: f64, interval: f64, drain: f64) -> Schedule {
    Schedule {
        test_duration: Duration::from_secs_f64(test),
        interval: Duration::from_secs_f64(interval),
        max_drain_wait: Duration::from_secs_f64(drain),
    }
}

#[tokio::test(start_paused = true)]
async fn test_phase_sample_count_and_tagging() {
    // 2s test at 0.5s cadence: samples at t=0, 0.5, 1.0, 1.5
    let mut source = ScriptedSource::repeating(Step::Pending(3));
    let mut sink = MemorySink::default();

    let outcome = PhaseScheduler::new(&mut source, &mut sink, schedule(2.0, 0.5, 1.0))
        .run()
        .await
        .unwrap();

    let test_samples: Vec<_> = sink
        .samples
        .iter()
        .filter(|s| s.phase == Phase::Test)
        .collect();
    assert_eq!(test_samples.len(), 4);
    for sample in &test_samples {
        assert_eq!(sample.runtime.unwrap().pending_bg_tasks, 3);
    }

    // Counter never reached zero, so the drain phase timed out
    assert_eq!(outcome, Outcome::DrainTimeout);
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(sink.samples.last().unwrap().phase, Phase::BgCompletion);
}

#[tokio::test(start_paused = true)]
async fn test_drain_completes_when_counter_reaches_zero() {
    // One test-phase sample, then the drain observes 2, 1, 0
    let mut source = ScriptedSource::new(
        vec![
            Step::Pending(5),
            Step::Pending(2),
            Step::Pending(1),
            Step::Pending(0),
        ],
        Step::Pending(0),
    );
    let mut sink = MemorySink::default();

    let outcome = PhaseScheduler::new(&mut source, &mut sink, schedule(1.0, 1.0, 60.0))
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Complete);
    assert_eq!(outcome.exit_code(), 0);

    let drain_samples: Vec<_> = sink
        .samples
        .iter()
        .filter(|s| s.phase == Phase::BgCompletion)
        .collect();
    assert_eq!(drain_samples.len(), 3);
    assert_eq!(drain_samples.last().unwrap().runtime.unwrap().pending_bg_tasks, 0);
}

#[tokio::test(start_paused = true)]
async fn test_zero_check_is_strict_equality() {
    // A counter oscillating near zero must still be observed at exactly 0
    let mut source = ScriptedSource::new(
        vec![
            Step::Pending(1),
            Step::Pending(2),
            Step::Pending(1),
            Step::Pending(2),
            Step::Pending(0),
        ],
        Step::Pending(0),
    );
    let mut sink = MemorySink::default();

    let outcome = PhaseScheduler::new(&mut source, &mut sink, schedule(1.0, 1.0, 60.0))
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Complete);
    let drain_samples: Vec<_> = sink
        .samples
        .iter()
        .filter(|s| s.phase == Phase::BgCompletion)
        .collect();
    assert_eq!(drain_samples.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_endpoint_down_throughout_run() {
    // The test phase still runs its full wall-clock length with OS-only
    // samples; the drain cannot verify completion and exits early.
    let mut source = ScriptedSource::repeating(Step::NoEndpoint);
    let mut sink = MemorySink::default();

    let start = Instant::now();
    let outcome = PhaseScheduler::new(&mut source, &mut sink, schedule(2.0, 0.5, 60.0))
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::EndpointLost);
    assert_eq!(outcome.exit_code(), 1);

    // Full test phase plus a single drain sample, nowhere near the 60s ceiling
    assert!(start.elapsed() >= Duration::from_secs(2));
    assert!(start.elapsed() < Duration::from_secs(3));

    let test_samples = sink
        .samples
        .iter()
        .filter(|s| s.phase == Phase::Test)
        .count();
    assert_eq!(test_samples, 4);
    for sample in &sink.samples {
        assert!(sample.runtime.is_none());
    }
    assert_eq!(sink.samples.last().unwrap().phase, Phase::BgCompletion);
}

#[tokio::test(start_paused = true)]
async fn test_endpoint_loss_mid_drain_exits_early() {
    let mut source = ScriptedSource::new(
        vec![Step::Pending(5), Step::Pending(3), Step::NoEndpoint],
        Step::Pending(3),
    );
    let mut sink = MemorySink::default();

    let outcome = PhaseScheduler::new(&mut source, &mut sink, schedule(1.0, 1.0, 60.0))
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::EndpointLost);
    // The degraded sample is still written before the early exit
    assert!(sink.samples.last().unwrap().runtime.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_process_gone_mid_drain_exits_without_sleeping() {
    let mut source = ScriptedSource::new(
        vec![Step::Pending(5), Step::Pending(2), Step::Gone],
        Step::Gone,
    );
    let mut sink = MemorySink::default();

    let start = Instant::now();
    let outcome = PhaseScheduler::new(&mut source, &mut sink, schedule(1.0, 1.0, 60.0))
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::ProcessGone);
    assert_eq!(outcome.exit_code(), 1);

    // Test phase (1s) + one drain cycle's sleep (1s); the failed collection
    // returns immediately, with no further sleep cycle.
    assert_eq!(start.elapsed(), Duration::from_secs(2));
    assert_eq!(sink.samples.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_process_gone_during_test_phase() {
    let mut source = ScriptedSource::new(vec![Step::Pending(1), Step::Gone], Step::Gone);
    let mut sink = MemorySink::default();

    let outcome = PhaseScheduler::new(&mut source, &mut sink, schedule(10.0, 1.0, 60.0))
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::ProcessGone);
    assert_eq!(sink.samples.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_overrunning_cycles_do_not_backlog() {
    // Each collection takes 1.5x the interval; the scheduler starts the
    // next cycle immediately instead of queueing missed ticks.
    let mut source = ScriptedSource::new(
        vec![
            Step::Slow(Duration::from_millis(1500), 7),
            Step::Slow(Duration::from_millis(1500), 7),
            Step::Slow(Duration::from_millis(1500), 7),
        ],
        Step::Pending(0),
    );
    let mut sink = MemorySink::default();

    let outcome = PhaseScheduler::new(&mut source, &mut sink, schedule(3.0, 1.0, 60.0))
        .run()
        .await
        .unwrap();

    // Samples at t=0 and t=1.5 only; t=3.0 is past the deadline
    let test_samples = sink
        .samples
        .iter()
        .filter(|s| s.phase == Phase::Test)
        .count();
    assert_eq!(test_samples, 2);
    assert_eq!(outcome, Outcome::Complete);
}
