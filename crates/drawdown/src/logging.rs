use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr, leaving stdout for reports.
///
/// The level applies to this crate; the engine logs at `warn` unless
/// `RUST_LOG` says otherwise.
pub fn init_logging(level: &str) -> color_eyre::Result<()> {
    let default_filter = format!("drawdown={level},drawdown_core=warn");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init()?;

    tracing::debug!("Logging initialized (filter={default_filter})");
    Ok(())
}
