//! Tracing subscriber setup for the binaries.
//!
//! Logs go to stderr so that stdout only carries results.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

/// Installs the global subscriber.
///
/// `verbosity` counts `-v` flags: 0=warn, 1=info, 2=debug, 3+=trace. `RUST_LOG`
/// overrides it when set.
pub fn init_logging(verbosity: u64) -> Result<(), TryInitError> {
    let level = level_for(verbosity);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "scmp_core={0},scmp_cli={0},scmp={0},scmp_dir_trees={0}",
            level
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity >= 2),
        )
        .try_init()
}

fn level_for(verbosity: u64) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
