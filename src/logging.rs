/// Installs the global `tracing` subscriber.
///
/// Honors `RUST_LOG`; defaults to info for this crate. Safe to call twice.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ytdlp_gui=info".into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
