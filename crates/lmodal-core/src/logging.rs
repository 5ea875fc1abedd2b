#![forbid(unsafe_code)]

//! Logging bootstrap.
//!
//! The library crates only emit through the `tracing` facade; installing a
//! subscriber is the host's decision. With the `tracing-json` feature this
//! module offers the one-line JSON setup used for production hosts.
//!
//! The filter is read from `RUST_LOG` and falls back to `info`.

/// Default filter directive when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Install a global JSON `tracing` subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .try_init()
}
