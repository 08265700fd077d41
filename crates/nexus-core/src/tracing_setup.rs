use std::fs::OpenOptions;
use std::io;

use tracing_subscriber::{filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::constants::env;

/// Install the global subscriber: stderr output filtered by `RUST_LOG`
/// (default `info`), plus a debug-level file log when `NEXUS_LOG_FILE` is set.
pub fn init_tracing() -> io::Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let registry = tracing_subscriber::registry().with(stderr_layer);

    match std::env::var(env::LOG_FILE).ok().filter(|p| !p.is_empty()) {
        Some(log_path) => {
            let file = OpenOptions::new().create(true).append(true).open(&log_path)?;

            let file_layer = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_filter(LevelFilter::DEBUG);

            registry.with(file_layer).init();
            tracing::debug!(path = %log_path, "File logging enabled");
        }
        None => registry.init(),
    }
    Ok(())
}
