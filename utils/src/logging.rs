//! Structured logging initialization via `tracing`.

/// Initialize the tracing subscriber for the CLI and tools.
///
/// Respects `RUST_LOG` for filtering and defaults to `info` when unset.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}
