//! Parsing and validation of `boardkit.toml` project configuration files.
//!
//! This crate reads the project configuration file and produces a strongly-typed
//! [`ProjectConfig`] naming the board, the requested resources and the build options.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use types::*;
