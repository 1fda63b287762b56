use tracing_subscriber::EnvFilter;

/// Initialise logging to stderr so command output on stdout stays clean.
///
/// `level` comes from `log.level` in the config file. With `verbose` the
/// level becomes `debug` and `RUST_LOG` may override it; otherwise the
/// configured level is used as-is.
pub fn init(verbose: bool, level: &str) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
