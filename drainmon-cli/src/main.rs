use anyhow::{Context, Result};
use clap::Parser;
use drainmon_config::domains::logging::LogFormat;
use drainmon_config::{ConfigLoader, DrainmonConfig};
use drainmon_core::{MonitorRun, Outcome};
use std::time::Duration;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            std::process::exit(1);
        }
    };

    init_tracing(cli.log_level.as_deref(), &config);

    match run(&cli, &config).await {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

/// Load configuration from file/environment and apply CLI flag overrides
fn load_config(cli: &Cli) -> Result<DrainmonConfig> {
    let loader = ConfigLoader::new();
    let mut config = loader
        .load(cli.config.as_ref())
        .context("failed to load configuration")?;

    if let Some(seconds) = cli.test_duration {
        config.monitor.test_duration = Duration::from_secs(seconds);
    }
    if let Some(seconds) = cli.interval {
        config.monitor.sample_interval = Duration::from_secs_f64(seconds);
    }
    if let Some(seconds) = cli.max_bg_wait {
        config.monitor.max_drain_wait = Duration::from_secs(seconds);
    }
    if let Some(pid) = cli.pid {
        config.monitor.pid = Some(pid);
    }
    if let Some(ref url) = cli.metrics_url {
        config.monitor.metrics_url = url.clone();
    }

    // Flags can invalidate a previously valid configuration
    config
        .validate_all()
        .context("invalid configuration after applying CLI flags")?;

    Ok(config)
}

/// Initialize tracing; flag beats environment beats config file
fn init_tracing(log_level: Option<&str>, config: &DrainmonConfig) {
    let env_filter = match log_level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| {
            eprintln!("Invalid log level '{}', falling back to 'info'", level);
            EnvFilter::new("info")
        }),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str())),
    };

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    match config.logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: &Cli, config: &DrainmonConfig) -> Result<Outcome> {
    let run = MonitorRun::attach(config, &cli.output)
        .context("failed to start monitoring run")?;
    let outcome = run.run().await.context("monitoring run failed")?;
    Ok(outcome)
}
