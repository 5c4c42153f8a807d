//! Tracing setup for the CLI.

use tracing_subscriber::EnvFilter;

use crate::GlobalArgs;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "OPTREG_LOG";

/// Filter used when `OPTREG_LOG` is unset.
pub fn default_directive(global: &GlobalArgs) -> &'static str {
    if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    }
}

/// Installs a stderr subscriber. `OPTREG_LOG` takes precedence over the
/// level implied by `--verbose` and `--quiet`.
pub fn init_logging(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(global)));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(global.color)
        .with_target(false)
        .try_init();
    if installed.is_err() {
        tracing::debug!("a tracing subscriber was already installed");
    }
}
