use anyhow::anyhow;
use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

/// Installs the global tracing subscriber shared by both binaries.
///
/// `RUST_LOG` wins when set; otherwise the caller's fallback filter applies
/// (the server uses "info,sqlx=warn" so pool chatter stays out of the logs).
pub fn init_tracing(default_filter: &str) -> Result<(), anyhow::Error> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize tracing: {e}"))
}
