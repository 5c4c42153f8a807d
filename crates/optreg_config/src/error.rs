//! Errors raised while reading `optreg.toml`.

use std::path::PathBuf;

/// Why a configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("malformed configuration: {0}")]
    Parse(String),

    /// A required field is present but blank.
    #[error("`{0}` must not be empty")]
    Blank(&'static str),

    /// The same diagnostic code is listed under both `deny` and `allow`.
    #[error("diagnostic `{0}` is both denied and allowed")]
    ConflictingPolicy(String),
}
