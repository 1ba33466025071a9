//! `boardkit program`: loads a saved build onto the board.

use boardkit_build::{program, BuildArtifacts, SystemRunner, ToolEnv};

use crate::project::{load_platform, resolve_project_root};
use crate::{GlobalArgs, ProgramArgs};

/// Runs the `boardkit program` command.
///
/// Reads the artifacts of build `build.name` from `build.dir`; nothing is
/// rebuilt.
pub fn run(args: &ProgramArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let root = resolve_project_root(global)?;
    let config = boardkit_config::load_config(&root)?;
    let platform = load_platform(&config, args.board.as_deref())?;

    let dir = root.join(&config.build.dir);
    let artifacts = BuildArtifacts::load_from(&dir, &config.build.name)?;
    if artifacts.is_empty() {
        return Err(format!(
            "no artifacts for build '{}' in {}; run `boardkit build` first",
            config.build.name,
            dir.display()
        )
        .into());
    }

    if !global.quiet {
        eprintln!(" Programming {} with {}", platform.name(), config.build.name);
    }
    program(artifacts, &platform, &ToolEnv::from_process(), &mut SystemRunner)?;
    if !global.quiet {
        eprintln!("    Finished programming");
    }
    Ok(0)
}
