//! Error types for building and programming.

use std::path::PathBuf;

use boardkit_platform::{ResolutionError, Stage};

use crate::pipeline::BuildState;

/// A malformed template or command line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// A `{{` without a matching `}}`.
    #[error("unterminated placeholder at byte {offset}")]
    Unterminated {
        /// Byte offset of the opening braces.
        offset: usize,
    },

    /// A placeholder that names nothing the renderer knows.
    #[error("unknown placeholder '{{{{{placeholder}}}}}'")]
    UnknownPlaceholder {
        /// The placeholder text between the braces.
        placeholder: String,
    },

    /// `{{artifact N}}` outside the extracted artifact list.
    #[error("artifact {index} requested but only {count} extracted")]
    ArtifactIndex {
        /// Requested index.
        index: usize,
        /// Number of extracted artifacts.
        count: usize,
    },

    /// A rendered command line with an unbalanced double quote.
    #[error("unbalanced quote in command: {line}")]
    UnbalancedQuote {
        /// The offending command line.
        line: String,
    },

    /// A rendered command line with no program.
    #[error("empty command")]
    EmptyCommand,
}

/// Errors raised while preparing or executing a build.
///
/// Every variant is terminal for the build plan that produced it.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A resource could not be resolved against the platform.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// A command or file template failed to render.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// The device has no known nextpnr option.
    #[error("unsupported device '{device}'")]
    UnsupportedDevice {
        /// The platform's device identifier.
        device: String,
    },

    /// The package has no known nextpnr option.
    #[error("unsupported package '{package}'")]
    UnsupportedPackage {
        /// The platform's package identifier.
        package: String,
    },

    /// A clock constraint names a resource the design does not request.
    #[error("clock constraint on {name}.{index}, which the design does not request")]
    UnrequestedClock {
        /// Resource name.
        name: String,
        /// Resource index.
        index: u32,
    },

    /// Two build inputs would be written to the same file.
    #[error("generated file '{file}' collides with another build input")]
    FileCollision {
        /// The contested file name.
        file: String,
    },

    /// A toolchain command is declared after a command of a later stage.
    #[error("command {index} belongs to stage {stage:?} but follows a {previous:?} command")]
    StageOrder {
        /// Zero-based position of the command.
        index: usize,
        /// The command's stage.
        stage: Stage,
        /// The stage of the command before it.
        previous: Stage,
    },

    /// A required executable is not available. Raised before any process starts.
    #[error("required tool '{tool}' not found (set {env_var} or add it to PATH)")]
    MissingTool {
        /// The tool name as declared by the platform.
        tool: String,
        /// The environment variable that overrides it.
        env_var: String,
    },

    /// A toolchain command exited unsuccessfully.
    #[error("command {index} failed ({}): {command}", exit_description(.code))]
    Execution {
        /// Zero-based position of the command in the plan.
        index: usize,
        /// The rendered command line.
        command: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
    },

    /// A toolchain command could not be started.
    #[error("failed to start '{command}': {source}")]
    Spawn {
        /// The rendered command line.
        command: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The plan is not in a state that allows the operation.
    #[error("cannot {operation} a build in state {state:?}")]
    InvalidState {
        /// The requested operation.
        operation: &'static str,
        /// The plan's current state.
        state: BuildState,
    },

    /// Reading or writing a build file failed.
    #[error("build I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors raised while programming a device.
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    /// The platform declares no way to program the board.
    #[error("platform '{platform}' does not support programming")]
    NoProgrammer {
        /// Platform name.
        platform: String,
    },

    /// An artifact the programmer needs is not in the artifact set.
    #[error("artifact '{name}' not found in build output")]
    MissingArtifact {
        /// The expected file name.
        name: String,
    },

    /// The programming tool is not available.
    #[error("programming tool '{tool}' not found (set {env_var} or add it to PATH)")]
    MissingTool {
        /// Conventional tool name.
        tool: String,
        /// The environment variable that overrides it.
        env_var: String,
    },

    /// The programming tool exited unsuccessfully. Not retried.
    #[error("programming failed ({}): {command}", exit_description(.code))]
    ProgramTool {
        /// The command line that was run.
        command: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
    },

    /// The programming tool could not be started.
    #[error("failed to start '{command}': {source}")]
    Spawn {
        /// The command line.
        command: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An argument template failed to render.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Extracting an artifact failed.
    #[error("artifact I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}
