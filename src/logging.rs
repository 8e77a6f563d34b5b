//! Log output setup.

/// Installs the stdout subscriber. `RUST_LOG` overrides the default `padhook=info`.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "padhook=info".into()),
        )
        .try_init();
}
