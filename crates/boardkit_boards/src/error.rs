//! Error types for the board registry.

use boardkit_platform::DefinitionError;

/// Errors that can occur when constructing a board by name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// No board is registered under the given name.
    #[error("unknown board '{name}' (available: {available})")]
    UnknownBoard {
        /// The requested name.
        name: String,
        /// Comma-separated list of registered boards.
        available: String,
    },

    /// A setting was given that the board does not take.
    #[error("board {board} has no setting '{key}'")]
    UnknownSetting {
        /// Board name.
        board: String,
        /// The unrecognised setting.
        key: String,
    },

    /// The board definition itself was rejected.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}
