use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::{SubscriberInitExt as _, TryInitError};
use tracing_subscriber::{EnvFilter, Layer as _};

pub const DEFAULT_LOG_LEVEL: &str = "info,pims_backend=debug,pims_remote=info";

#[derive(thiserror::Error, Debug)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("a global subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] TryInitError),
}

/// `RUST_LOG`, falling back to `filter`, falling back to [`DEFAULT_LOG_LEVEL`].
pub fn env_filter(filter: Option<&str>) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    Ok(EnvFilter::try_new(filter.unwrap_or(DEFAULT_LOG_LEVEL))?)
}

pub fn setup_logging(filter: Option<&str>) -> Result<(), TelemetryError> {
    let stdout_log = tracing_subscriber::fmt::layer().with_target(true);

    tracing_subscriber::registry()
        .with(stdout_log.with_filter(env_filter(filter)?))
        .try_init()?;
    Ok(())
}

/// Routes log output of a test through the test harness. Safe to call from every test.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(None).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)))
        .with_test_writer()
        .try_init();
}
