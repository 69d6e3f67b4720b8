//! Logging configuration using tracing

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Pick the log filter: `--verbose` wins, then `RUST_LOG`, then the config
fn build_filter(verbose: bool, configured_level: &str) -> anyhow::Result<EnvFilter> {
    if verbose {
        return Ok(EnvFilter::new("debug"));
    }

    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(configured_level)?),
    }
}

/// Initialize the logging system
pub fn init(config: &LoggingConfig, verbose: bool, json: bool) -> anyhow::Result<()> {
    let filter = build_filter(verbose, &config.level)?;

    if json || config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}
