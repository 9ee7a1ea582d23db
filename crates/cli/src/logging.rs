//! Log output for the CLI.
//!
//! The engine logs through the `log` facade; the subscriber installed here
//! picks those records up through `tracing-subscriber`'s `tracing-log` bridge
//! and writes everything to stderr so stdout stays machine-readable.

use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
}

impl LogConfig {
    /// - `--quiet`: errors only
    /// - 0 (no `-v`): warn
    /// - 1 (`-v`): info
    /// - 2 (`-vv`): debug
    /// - 3+ (`-vvv`): trace
    pub fn from_verbosity(verbosity: u8, quiet: bool) -> Self {
        let level = match (quiet, verbosity) {
            (true, _) => Level::ERROR,
            (false, 0) => Level::WARN,
            (false, 1) => Level::INFO,
            (false, 2) => Level::DEBUG,
            (false, _) => Level::TRACE,
        };
        Self { level }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the verbosity flags.
pub fn init_logging(config: &LogConfig) {
    let filter = build_env_filter(config.level);
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.as_str().to_lowercase();
        // Dependencies stay at warn.
        EnvFilter::new(format!("warn,dora={level},dora_recon={level}"))
    })
}
