use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `csv_combine=debug`.
pub const LOG_ENV: &str = "CSV_COMBINE_LOG";

/// Filter used when `CSV_COMBINE_LOG` is unset.
pub fn default_directive(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Events go to stderr so they never mix with
/// JSON written to stdout. Safe to call more than once.
pub fn init_logging(verbosity: u8, quiet: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
