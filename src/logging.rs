use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{GraphError, Result};

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `fallback` supplies the filter
/// directive, e.g. `"info"` or `"reelrank=debug"`. Events go to stderr
/// so command output on stdout stays clean.
pub fn init_logging(fallback: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(fallback)
            .map_err(|e| GraphError::InvalidArgument(format!("invalid log filter: {e}")))?,
    };
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|_| GraphError::InvalidArgument("logging already initialized".into()))
}
