//! Diagnostic logging to stderr.
//!
//! Output is filtered by `CHATMASK_LOG` (standard `EnvFilter` directives);
//! without it only warnings are shown, or debug output with `--verbose`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV_VAR: &str = "CHATMASK_LOG";

pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("chatmask=debug,warn")
        } else {
            EnvFilter::new("warn")
        }
    })
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            fmt::layer()
                .with_target(false)
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init()
        .ok();
}
