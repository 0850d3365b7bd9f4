#![forbid(unsafe_code)]

//! Logging setup.
//!
//! The sequencer emits `tracing` events; installing a subscriber is the
//! host's decision. With the `tracing-json` feature this module offers a
//! one-call JSON subscriber for production builds.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, error, info, info_span, trace, warn};

/// Install a global JSON subscriber filtered by `filter`
/// (`RUST_LOG` syntax, e.g. `"coachmark_runtime=debug"`).
///
/// `RUST_LOG` overrides `filter` when set.
///
/// # Errors
///
/// Fails if the filter does not parse or a global subscriber is already set.
#[cfg(feature = "tracing-json")]
pub fn init_json(filter: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tracing_subscriber::EnvFilter;

    let filter = match std::env::var("RUST_LOG") {
        Ok(env) if !env.is_empty() => EnvFilter::try_new(env)?,
        _ => EnvFilter::try_new(filter)?,
    };
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .try_init()
}
