//! Toolchain orchestration for boardkit platforms.
//!
//! A build is prepared from a [`Design`] and a [`Platform`](boardkit_platform::Platform)
//! into a [`BuildPlan`]: resources are resolved, option overrides merged,
//! toolchain inputs generated and command templates rendered. Executing the
//! plan runs the external toolchain through a [`ProcessRunner`] and yields
//! [`BuildArtifacts`], which [`program`] hands to the board's programming tool.

#![warn(missing_docs)]

pub mod artifacts;
pub mod design;
pub mod ecp5;
pub mod error;
pub mod pipeline;
pub mod program;
pub mod template;
pub mod tools;

pub use artifacts::{BuildArtifacts, ExtractedFiles};
pub use design::Design;
pub use error::{BuildError, ProgramError, TemplateError};
pub use pipeline::{prepare, BuildOptions, BuildPlan, BuildState, RenderedCommand};
pub use program::program;
pub use template::{render, split_args, TemplateContext};
pub use tools::{Exit, Invocation, ProcessRunner, SystemRunner, ToolEnv};
