//! Logging setup for the Steel binary.

use tracing::subscriber::set_global_default;
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber and routes `log` records into it.
///
/// The filter is read from `RUST_LOG` and defaults to `info`.
pub fn init() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    set_global_default(subscriber)?;
    LogTracer::init()?;
    Ok(())
}
