use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding the log filter, e.g. `FORECAST_LOG=debug`.
pub const LOG_ENV_VAR: &str = "FORECAST_LOG";
const DEFAULT_FILTER: &str = "warn";

static INIT: Once = Once::new();

/// Installs the global subscriber once. Logs go to stderr so reports and
/// completion scripts on stdout stay clean.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}
