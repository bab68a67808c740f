use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so table and JSON output on stdout stay clean.
/// `RUST_LOG` wins over `level` when set.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow!("invalid log level `{}`: {}", level, e))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))
}
