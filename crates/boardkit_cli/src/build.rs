//! `boardkit build`: runs the project through its board's toolchain.
//!
//! 1. Load `boardkit.toml` and construct the board
//! 2. Read the sources and prepare the build plan
//! 3. Either write the inputs and print the commands (`--dry-run`), or run
//!    the toolchain and save the artifacts to the build directory
//! 4. Optionally program the board with the fresh artifacts

use boardkit_build::{prepare, program, BuildOptions, SystemRunner, ToolEnv};
use boardkit_config::ProjectConfig;

use crate::project::{load_design, load_platform, resolve_project_root};
use crate::{BuildArgs, GlobalArgs};

/// Runs the `boardkit build` command.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let root = resolve_project_root(global)?;
    let config = boardkit_config::load_config(&root)?;
    let platform = load_platform(&config, args.board.as_deref())?;
    let design = load_design(&config, &root)?;
    let options = build_options(&config, args, global.verbose);

    if !global.quiet {
        eprintln!("   Building {} for {}", options.name, platform.name());
    }

    let mut plan = prepare(&design, &platform, &options)?;
    let out_dir = root.join(&config.build.dir);

    if args.dry_run {
        plan.write_inputs(&out_dir)?;
        for command in plan.commands() {
            println!("{}", command.line);
        }
        if !global.quiet {
            eprintln!(
                "      Wrote {} input files to {}",
                plan.files().len(),
                out_dir.display()
            );
        }
        return Ok(0);
    }

    let env = ToolEnv::from_process();
    let artifacts = plan.execute(&env, &mut SystemRunner)?;
    let saved = artifacts.save_to(&out_dir)?;
    if !global.quiet {
        eprintln!(
            "    Finished {} ({} files in {})",
            plan.name(),
            saved.len(),
            out_dir.display()
        );
    }

    if args.program {
        if !global.quiet {
            eprintln!(" Programming {}", platform.name());
        }
        program(artifacts, &platform, &env, &mut SystemRunner)?;
    }
    Ok(0)
}

/// Build options from `boardkit.toml`, with command-line overrides applied last.
fn build_options(config: &ProjectConfig, args: &BuildArgs, verbose: bool) -> BuildOptions {
    let mut options =
        BuildOptions::new(&config.build.name).verbose(config.build.verbose || verbose);
    let cli = args.overrides.iter().map(|(k, v)| (k, v));
    for (key, value) in config.build.overrides.iter().chain(cli) {
        options = options.with_override(key, value);
    }
    options
}
