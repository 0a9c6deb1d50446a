use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_ENV: &str = "A11Y_AUDIT_LOG";

const DEFAULT_DIRECTIVE: &str = "a11y_audit=warn";

static INIT: Once = Once::new();

/// Install the stderr log subscriber. Safe to call more than once.
///
/// Levels come from `A11Y_AUDIT_LOG` (e.g. `a11y_audit=debug`), falling back
/// to warnings only when it is unset or unparsable.
pub fn init_logging() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(filter)
            .init();
    });
}
