//! Toolchain hooks: the per-platform description of how to build and program.
//!
//! A platform does not subclass a vendor flow. It carries a [`Toolchain`]
//! value that lists the tools it needs, the command templates to run in
//! order, extra input files, default option overrides and, optionally, how to
//! program the board. The build pipeline interprets this data.

use indexmap::IndexMap;
use serde::Serialize;

/// The family of the external toolchain, selecting which inputs are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolchainFamily {
    /// Lattice ECP5 through yosys, nextpnr-ecp5 and ecppack.
    LatticeEcp5,
    /// No generated inputs beyond design sources and file templates.
    #[default]
    Generic,
}

/// The build stage a command belongs to.
///
/// The pipeline moves to the matching state once every command of a stage
/// has succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Synthesis and place-and-route.
    Synthesize,
    /// Bitstream packing.
    Pack,
    /// Post-processing of packed artifacts.
    Finish,
}

/// A command line template tagged with its stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandTemplate {
    /// The stage this command belongs to.
    pub stage: Stage,
    /// The template text; may span several lines.
    pub template: String,
}

/// How to program a board from build artifacts.
///
/// `artifacts` and `args` are templates; `args` may refer to the extracted
/// artifact paths as `{{artifact N}}`. Each element of `args` is one argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramCommand {
    /// Conventional executable name, also used to derive the override variable.
    pub tool: String,
    /// Artifact file names to extract, e.g. `{{name}}.bit`.
    pub artifacts: Vec<String>,
    /// Argument templates.
    pub args: Vec<String>,
}

impl ProgramCommand {
    /// `dfu-util -D <name>.bit`, overridable through `DFU_UTIL`.
    pub fn dfu_util() -> Self {
        Self {
            tool: "dfu-util".to_string(),
            artifacts: vec!["{{name}}.bit".to_string()],
            args: vec!["-D".to_string(), "{{artifact 0}}".to_string()],
        }
    }

    /// `openocd` with a generated config and an SVF vector file, overridable
    /// through `OPENOCD`.
    pub fn openocd_svf() -> Self {
        Self {
            tool: "openocd".to_string(),
            artifacts: vec![
                "{{name}}-openocd.cfg".to_string(),
                "{{name}}.svf".to_string(),
            ],
            args: vec![
                "-f".to_string(),
                "{{artifact 0}}".to_string(),
                "-c".to_string(),
                "transport select jtag; init; svf -quiet {{artifact 1}}; exit".to_string(),
            ],
        }
    }

    /// Name of the environment variable that overrides the executable.
    pub fn env_var(&self) -> String {
        tool_env_var(&self.tool)
    }
}

/// Environment variable naming an override for `tool`.
///
/// Upper-cases the name and replaces `-` with `_`: `nextpnr-ecp5` becomes
/// `NEXTPNR_ECP5`.
pub fn tool_env_var(tool: &str) -> String {
    tool.to_ascii_uppercase().replace('-', "_")
}

/// Per-platform toolchain behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Toolchain {
    /// Which generated inputs the pipeline emits.
    pub family: ToolchainFamily,
    /// Executables that must be available before any command runs.
    pub required_tools: Vec<String>,
    /// Commands, executed in this order.
    pub commands: Vec<CommandTemplate>,
    /// Extra input files: templated name to templated body.
    pub files: IndexMap<String, String>,
    /// Default option values, overridable per build.
    pub overrides: IndexMap<String, String>,
    /// How to program the board, if supported.
    pub programmer: Option<ProgramCommand>,
}

impl Toolchain {
    /// Creates an empty toolchain of the given family.
    pub fn new(family: ToolchainFamily) -> Self {
        Self {
            family,
            ..Self::default()
        }
    }

    /// The open Lattice ECP5 flow: yosys, nextpnr-ecp5 and ecppack.
    ///
    /// `nextpnr_device` and `nextpnr_package` are filled in by the build
    /// pipeline from the platform's device and package.
    pub fn lattice_ecp5() -> Self {
        Self::new(ToolchainFamily::LatticeEcp5)
            .with_tool("yosys")
            .with_tool("nextpnr-ecp5")
            .with_tool("ecppack")
            .with_command(
                Stage::Synthesize,
                "{{tool yosys}} {{quiet -q}} {{opts yosys_opts}} -l {{name}}.rpt {{name}}.ys",
            )
            .with_command(
                Stage::Synthesize,
                "{{tool nextpnr-ecp5}} {{quiet --quiet}} {{opts nextpnr_opts}} \
                 --log {{name}}.tim {{nextpnr_device}} --package {{nextpnr_package}} \
                 --speed {{speed}} --json {{name}}.json --lpf {{name}}.lpf \
                 --textcfg {{name}}.config",
            )
            .with_command(
                Stage::Pack,
                "{{tool ecppack}} {{verbose --verbose}} {{opts ecppack_opts}} \
                 --input {{name}}.config --bit {{name}}.bit --svf {{name}}.svf",
            )
    }

    /// Requires an additional executable.
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        let tool = tool.into();
        if !self.required_tools.contains(&tool) {
            self.required_tools.push(tool);
        }
        self
    }

    /// Appends a command template.
    pub fn with_command(mut self, stage: Stage, template: impl Into<String>) -> Self {
        self.commands.push(CommandTemplate {
            stage,
            template: template.into(),
        });
        self
    }

    /// Adds (or replaces) an extra input file template.
    pub fn with_file(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.files.insert(name.into(), body.into());
        self
    }

    /// Sets a default option value.
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Sets the programming strategy.
    pub fn with_programmer(mut self, programmer: ProgramCommand) -> Self {
        self.programmer = Some(programmer);
        self
    }
}
