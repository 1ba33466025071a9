//! Errors raised while reading a `boardkit.toml`.

use std::path::PathBuf;

/// Why a project configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The TOML is malformed or does not match the configuration schema.
    #[error("{origin}: {message}")]
    Parse {
        /// Where the text came from, a path or `boardkit.toml`.
        origin: String,
        /// The parser's message, including the offending location.
        message: String,
    },

    /// A required field is present but empty.
    #[error("{0} must not be empty")]
    MissingField(&'static str),

    /// The same resource is listed by two `[[request]]` entries.
    #[error("resource {name}.{index} requested more than once")]
    DuplicateRequest {
        /// Resource name.
        name: String,
        /// Resource index.
        index: u32,
    },
}
