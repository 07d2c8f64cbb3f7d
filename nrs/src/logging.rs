//!
//! Logging.
//!
//! The NRS crates only emit `tracing` events; installing a subscriber is
//! left to the program.  [`init`] installs the usual one: formatted output
//! filtered by `RUST_LOG` when it is set and by the configured level
//! otherwise.
//!

use tracing_subscriber::EnvFilter;

/// Build the filter for a configured level.  `RUST_LOG` wins when it is
/// set and valid; an invalid level falls back to `info`.
pub fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a formatting subscriber as the global default.
///
/// Returns false if a subscriber was already installed.
pub fn init(level: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_target(false)
        .try_init()
        .is_ok()
}
