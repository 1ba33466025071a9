//! boardkit CLI: describes FPGA boards and drives their vendor toolchains.
//!
//! Provides `boardkit boards` and `boardkit resources` to inspect the board
//! registry, `boardkit build` to run a project through its board's toolchain,
//! and `boardkit program` to load a saved bitstream onto the device.

#![warn(missing_docs)]

mod boards;
mod build;
mod program;
mod project;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

/// boardkit: FPGA board descriptions and toolchain orchestration.
#[derive(Parser, Debug)]
#[command(name = "boardkit", version, about = "FPGA board description and build driver")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `boardkit.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the registered boards.
    Boards,
    /// Show the resources of a board with their resolved pins.
    Resources(ResourcesArgs),
    /// Build the current project for its board.
    Build(BuildArgs),
    /// Program the board with the artifacts of a previous build.
    Program(ProgramArgs),
}

/// Arguments for the `boardkit resources` subcommand.
#[derive(Parser, Debug)]
pub struct ResourcesArgs {
    /// Registry name of the board.
    pub board: String,

    /// Board setting as KEY=VALUE (repeatable).
    #[arg(short, long = "set", value_parser = parse_key_value)]
    pub settings: Vec<(String, String)>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `boardkit build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Board to build for, overriding `board.name` in `boardkit.toml`.
    #[arg(short, long)]
    pub board: Option<String>,

    /// Toolchain option override as KEY=VALUE (repeatable).
    #[arg(short, long = "override", value_parser = parse_key_value)]
    pub overrides: Vec<(String, String)>,

    /// Write the toolchain inputs and print the commands without running them.
    #[arg(long)]
    pub dry_run: bool,

    /// Program the board after a successful build.
    #[arg(short, long, conflicts_with = "dry_run")]
    pub program: bool,
}

/// Arguments for the `boardkit program` subcommand.
#[derive(Parser, Debug)]
pub struct ProgramArgs {
    /// Board to program, overriding `board.name` in `boardkit.toml`.
    #[arg(short, long)]
    pub board: Option<String>,
}

/// Machine- or human-readable output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

/// Parses a `KEY=VALUE` argument.
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Boards => boards::list(&global),
        Command::Resources(ref args) => boards::resources(args, &global),
        Command::Build(ref args) => build::run(args, &global),
        Command::Program(ref args) => program::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
