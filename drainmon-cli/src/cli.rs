//! CLI argument parsing definitions

use clap::Parser;
use std::path::PathBuf;

/// Monitor a server process's resources during and after a load test
#[derive(Parser)]
#[command(name = "drainmon", version, about, long_about = None)]
pub struct Cli {
    /// Output CSV file path
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: PathBuf,

    /// Expected test duration in seconds (default: 30)
    #[arg(long, short = 'd', value_name = "SECONDS")]
    pub test_duration: Option<u64>,

    /// Sample interval in seconds (default: 1.0)
    #[arg(long, short = 'i', value_name = "SECONDS")]
    pub interval: Option<f64>,

    /// Maximum time to wait for background tasks after the test, in seconds (default: 60)
    #[arg(long, value_name = "SECONDS")]
    pub max_bg_wait: Option<u64>,

    /// Process ID to monitor (skips the process scan)
    #[arg(long, short = 'p', value_name = "PID")]
    pub pid: Option<u32>,

    /// URL of the server's metrics endpoint
    #[arg(long, value_name = "URL")]
    pub metrics_url: Option<String>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}
