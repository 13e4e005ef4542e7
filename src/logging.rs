use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_ENV: &str = "MINITRACK_LOG";

/// Install the stderr subscriber. `MINITRACK_LOG` wins over `RUST_LOG`;
/// `verbose` only changes the fallback level.
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let fallback = if verbose { "minitrack=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}
