//! Monitor error types

use thiserror::Error;

/// Per-sample collection failure
///
/// Endpoint unavailability is not an error: the collector degrades the
/// sample to OS-only metrics instead. The only collection failure that
/// exists is the monitored process itself going away, which ends the run.
#[derive(Error, Debug)]
pub enum CollectError {
    /// The monitored process has exited
    #[error("monitored process {pid} no longer exists")]
    ProcessGone { pid: u32 },
}

/// Output sink failure
#[derive(Error, Debug)]
pub enum SinkError {
    /// CSV serialization or write error
    #[error("failed to write sample row: {0}")]
    Csv(#[from] csv::Error),

    /// IO error creating or flushing the output file
    #[error("output file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal monitoring run errors
#[derive(Error, Debug)]
pub enum MonitorError {
    /// No process matched the configured command-line markers at startup
    #[error("could not find a process matching '{launcher}' and '{module}'")]
    ProcessNotFound { launcher: String, module: String },

    /// The target process was gone at attach time
    #[error(transparent)]
    Collect(#[from] CollectError),

    /// The HTTP probe client could not be constructed
    #[error("failed to build HTTP probe client: {0}")]
    ProbeClient(#[from] reqwest::Error),

    /// The output sink could not be written
    #[error(transparent)]
    Sink(#[from] SinkError),
}
