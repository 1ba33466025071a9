//! Device programming from a finished build.

use indexmap::IndexMap;
use tracing::{debug, info};

use boardkit_platform::Platform;

use crate::artifacts::BuildArtifacts;
use crate::error::ProgramError;
use crate::template::{render, TemplateContext};
use crate::tools::{Invocation, ProcessRunner, ToolEnv};

/// Programs the board with `artifacts`.
///
/// Extracts exactly the files the platform's programmer declares, runs the
/// programming tool once, and removes the extracted files before returning.
/// A failing tool is reported, never retried.
pub fn program(
    artifacts: BuildArtifacts,
    platform: &Platform,
    env: &ToolEnv,
    runner: &mut dyn ProcessRunner,
) -> Result<(), ProgramError> {
    let programmer =
        platform
            .toolchain()
            .programmer
            .as_ref()
            .ok_or_else(|| ProgramError::NoProgrammer {
                platform: platform.name().to_string(),
            })?;

    let vars: IndexMap<String, String> = [
        ("platform", platform.name()),
        ("device", platform.device()),
        ("package", platform.package()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let ctx = TemplateContext::new(artifacts.name(), &vars);

    let names = programmer
        .artifacts
        .iter()
        .map(|a| render(a, &ctx))
        .collect::<Result<Vec<_>, _>>()?;

    let program = env
        .locate(&programmer.tool)
        .ok_or_else(|| ProgramError::MissingTool {
            tool: programmer.tool.clone(),
            env_var: programmer.env_var(),
        })?;

    let extracted = artifacts.extract(&names)?;
    let paths: Vec<String> = extracted
        .paths()
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    let ctx = ctx.with_artifacts(&paths);
    let args = programmer
        .args
        .iter()
        .map(|a| render(a, &ctx))
        .collect::<Result<Vec<_>, _>>()?;

    let invocation = Invocation {
        program,
        args,
        cwd: extracted.dir().to_path_buf(),
    };
    let command = invocation.display();
    debug!(%command, "programming");
    let exit = runner
        .run(&invocation)
        .map_err(|source| ProgramError::Spawn {
            command: command.clone(),
            source,
        })?;
    if !exit.success() {
        return Err(ProgramError::ProgramTool {
            command,
            code: exit.code,
        });
    }
    info!(platform = platform.name(), "device programmed");
    Ok(())
}
