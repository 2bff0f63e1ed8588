//! Resource and task-completion monitor for load tests
//!
//! Attaches to a running server process, samples its OS-level resource
//! usage together with the server's internal runtime-metrics endpoint at a
//! fixed cadence, and writes the time series to CSV. A run moves through a
//! fixed-duration test phase followed by a drain phase that ends once the
//! server's pending background-task counter is observed at zero, or when a
//! wall-clock deadline expires.

pub mod collector;
pub mod counter;
pub mod error;
pub mod locator;
pub mod monitor;
pub mod sample;
pub mod scheduler;
pub mod sink;

pub use collector::Collector;
pub use counter::PendingTaskCounter;
pub use error::{CollectError, MonitorError, SinkError};
pub use monitor::MonitorRun;
pub use sample::{MetricsResponse, Phase, RuntimeSnapshot, Sample};
pub use scheduler::{Outcome, PhaseScheduler, SampleSource, Schedule};
pub use sink::{CsvSink, SampleSink};
