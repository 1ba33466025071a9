//! The build pipeline: prepare a plan, then execute it once.
//!
//! [`prepare`] resolves the platform, merges option overrides, generates the
//! toolchain input files and renders every command. [`BuildPlan::execute`]
//! checks that every tool exists, then runs the commands in order inside a
//! scoped temporary directory. The plan moves through
//! `Prepared → Synthesized → Packed → Done`, or to `Failed` on the first
//! error; a plan that is not `Prepared` cannot be executed again.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use boardkit_platform::{overlay, PhysicalBinding, Platform, Stage, ToolchainFamily};

use crate::artifacts::BuildArtifacts;
use crate::design::Design;
use crate::ecp5;
use crate::error::{BuildError, TemplateError};
use crate::template::{render, split_args, TemplateContext};
use crate::tools::{Invocation, ProcessRunner, ToolEnv};

/// Lifecycle of a [`BuildPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    /// Inputs generated and commands rendered; nothing has run.
    Prepared,
    /// Every synthesis command succeeded.
    Synthesized,
    /// Every packing command succeeded.
    Packed,
    /// Every command succeeded and the artifacts were collected.
    Done,
    /// A command or check failed. Terminal.
    Failed,
}

/// Per-build parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Artifact base name, `{{name}}` in templates.
    pub name: String,
    /// Option overrides; each key wins over the platform default.
    pub overrides: IndexMap<String, String>,
    /// Verbose toolchain output.
    pub verbose: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            name: "top".to_string(),
            overrides: IndexMap::new(),
            verbose: false,
        }
    }
}

impl BuildOptions {
    /// Options for a build with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds an option override.
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Sets verbosity.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// One rendered toolchain command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedCommand {
    /// Stage the command belongs to.
    pub stage: Stage,
    /// The tool to locate, i.e. the first word of the command.
    pub tool: String,
    /// Remaining arguments.
    pub args: Vec<String>,
    /// The rendered command line with whitespace collapsed.
    pub line: String,
}

/// A prepared build, bound to one platform.
#[derive(Debug)]
pub struct BuildPlan<'p> {
    platform: &'p Platform,
    name: String,
    overrides: IndexMap<String, String>,
    bindings: Vec<PhysicalBinding>,
    files: IndexMap<String, Vec<u8>>,
    commands: Vec<RenderedCommand>,
    state: BuildState,
}

/// Prepares a build of `design` for `platform`.
///
/// Every resource of the platform is resolved so that a broken definition
/// fails here rather than halfway through a toolchain run. Constraints are
/// emitted only for the resources the design requests.
pub fn prepare<'p>(
    design: &Design,
    platform: &'p Platform,
    options: &BuildOptions,
) -> Result<BuildPlan<'p>, BuildError> {
    let toolchain = platform.toolchain();
    platform.resolve_all()?;

    let mut bindings = Vec::new();
    for (name, index) in &design.requests {
        bindings.extend(platform.resolve(platform.lookup(name, *index)?)?);
    }
    for (name, index, clock) in &design.clocks {
        if !design.requests.iter().any(|(n, i)| n == name && i == index) {
            return Err(BuildError::UnrequestedClock {
                name: name.clone(),
                index: *index,
            });
        }
        let path = platform.lookup(name, *index)?.path();
        let nested = format!("{path}.");
        for binding in bindings
            .iter_mut()
            .filter(|b| b.path == path || b.path.starts_with(&nested))
        {
            binding.clock = Some(*clock);
        }
    }

    let overrides = overlay(&toolchain.overrides, &options.overrides);

    let mut vars: IndexMap<String, String> = [
        ("top", design.top.as_str()),
        ("platform", platform.name()),
        ("device", platform.device()),
        ("package", platform.package()),
        ("speed", platform.speed()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    if toolchain.family == ToolchainFamily::LatticeEcp5 {
        vars.extend(ecp5::template_vars(platform)?);
    }
    let ctx = TemplateContext::new(&options.name, &vars)
        .with_overrides(&overrides)
        .with_verbose(options.verbose);

    let mut files: IndexMap<String, Vec<u8>> = design
        .sources
        .iter()
        .map(|(file, text)| (file.clone(), text.clone().into_bytes()))
        .collect();
    let mut generated = Vec::new();
    if toolchain.family == ToolchainFamily::LatticeEcp5 {
        generated.push((
            format!("{}.ys", options.name),
            ecp5::yosys_script(&options.name, design, &overrides),
        ));
        generated.push((
            format!("{}.lpf", options.name),
            ecp5::lpf(&bindings, &overrides),
        ));
    }
    for (file, body) in &toolchain.files {
        generated.push((render(file, &ctx)?, render(body, &ctx)?));
    }
    for (file, body) in generated {
        if files.contains_key(&file) {
            return Err(BuildError::FileCollision { file });
        }
        files.insert(file, body.into_bytes());
    }

    let mut commands: Vec<RenderedCommand> = Vec::with_capacity(toolchain.commands.len());
    for (index, template) in toolchain.commands.iter().enumerate() {
        if let Some(previous) = commands.last().map(|c| c.stage) {
            if template.stage < previous {
                return Err(BuildError::StageOrder {
                    index,
                    stage: template.stage,
                    previous,
                });
            }
        }
        let rendered = render(&template.template, &ctx)?;
        let mut argv = split_args(&rendered)?.into_iter();
        let tool = argv.next().ok_or(TemplateError::EmptyCommand)?;
        let line = rendered.split_whitespace().collect::<Vec<_>>().join(" ");
        debug!(stage = ?template.stage, command = %line, "rendered command");
        commands.push(RenderedCommand {
            stage: template.stage,
            tool,
            args: argv.collect(),
            line,
        });
    }

    debug!(
        name = %options.name,
        platform = platform.name(),
        files = files.len(),
        commands = commands.len(),
        "build prepared"
    );
    Ok(BuildPlan {
        platform,
        name: options.name.clone(),
        overrides,
        bindings,
        files,
        commands,
        state: BuildState::Prepared,
    })
}

impl BuildPlan<'_> {
    /// Returns the build name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current state.
    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Returns the merged option overrides.
    pub fn overrides(&self) -> &IndexMap<String, String> {
        &self.overrides
    }

    /// Returns the bindings of the requested resources.
    pub fn bindings(&self) -> &[PhysicalBinding] {
        &self.bindings
    }

    /// Returns the generated input files.
    pub fn files(&self) -> &IndexMap<String, Vec<u8>> {
        &self.files
    }

    /// Returns the rendered commands in execution order.
    pub fn commands(&self) -> &[RenderedCommand] {
        &self.commands
    }

    /// Writes every input file into `dir`.
    pub fn write_inputs(&self, dir: &Path) -> Result<(), BuildError> {
        std::fs::create_dir_all(dir).map_err(|source| BuildError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        for (file, bytes) in &self.files {
            let path = dir.join(file);
            std::fs::write(&path, bytes).map_err(|source| BuildError::Io { path, source })?;
        }
        Ok(())
    }

    /// Runs the plan and collects every file the toolchain left behind.
    ///
    /// All tools are located before the first process starts. The build
    /// directory is removed on every exit path.
    pub fn execute(
        &mut self,
        env: &ToolEnv,
        runner: &mut dyn ProcessRunner,
    ) -> Result<BuildArtifacts, BuildError> {
        if self.state != BuildState::Prepared {
            return Err(BuildError::InvalidState {
                operation: "execute",
                state: self.state,
            });
        }
        let result = self.run(env, runner);
        if result.is_err() {
            self.transition(BuildState::Failed);
        }
        result
    }

    fn run(
        &mut self,
        env: &ToolEnv,
        runner: &mut dyn ProcessRunner,
    ) -> Result<BuildArtifacts, BuildError> {
        let programs = self.locate_tools(env)?;

        let dir = tempfile::Builder::new()
            .prefix("boardkit-")
            .tempdir()
            .map_err(|source| BuildError::Io {
                path: std::env::temp_dir(),
                source,
            })?;
        self.write_inputs(dir.path())?;

        for (index, program) in programs.into_iter().enumerate() {
            let command = &self.commands[index];
            let invocation = Invocation {
                program,
                args: command.args.clone(),
                cwd: dir.path().to_path_buf(),
            };
            debug!(index, command = %command.line, "running");
            let exit = runner
                .run(&invocation)
                .map_err(|source| BuildError::Spawn {
                    command: command.line.clone(),
                    source,
                })?;
            if !exit.success() {
                return Err(BuildError::Execution {
                    index,
                    command: command.line.clone(),
                    code: exit.code,
                });
            }

            let stage_done = self
                .commands
                .get(index + 1)
                .map_or(true, |next| next.stage != command.stage);
            if stage_done {
                let stage = command.stage;
                info!(build = %self.name, ?stage, "stage complete");
                self.transition(match stage {
                    Stage::Synthesize => BuildState::Synthesized,
                    Stage::Pack | Stage::Finish => BuildState::Packed,
                });
            }
        }

        let artifacts = BuildArtifacts::collect(dir.path(), &self.name)?;
        self.transition(BuildState::Done);
        Ok(artifacts)
    }

    fn locate_tools(&self, env: &ToolEnv) -> Result<Vec<PathBuf>, BuildError> {
        let toolchain = self.platform.toolchain();
        let locate = |tool: &str| {
            env.locate(tool).ok_or_else(|| BuildError::MissingTool {
                tool: tool.to_string(),
                env_var: boardkit_platform::tool_env_var(tool),
            })
        };
        for tool in &toolchain.required_tools {
            locate(tool)?;
        }
        self.commands.iter().map(|c| locate(&c.tool)).collect()
    }

    fn transition(&mut self, state: BuildState) {
        if self.state != state {
            debug!(build = %self.name, from = ?self.state, to = ?state, "state transition");
            self.state = state;
        }
    }
}
